use crate::search::Searchable;
use crate::validation::digits_only;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPredicate {
    /// Empty query: every record matches.
    All,
    Matching {
        /// Lower-cased query text.
        text: String,
        /// Digits of the query; `None` when it has none.
        digits: Option<String>,
    },
}

/// Builds the predicate for `query` as typed; only an empty query matches
/// everything.
pub fn build_predicate(query: &str) -> SearchPredicate {
    if query.is_empty() {
        return SearchPredicate::All;
    }

    let digits = digits_only(query);
    SearchPredicate::Matching {
        text: query.to_lowercase(),
        digits: if digits.is_empty() {
            None
        } else {
            Some(digits)
        },
    }
}

impl SearchPredicate {
    pub fn matches<R: Searchable + ?Sized>(&self, record: &R) -> bool {
        let (text, digits) = match self {
            SearchPredicate::All => return true,
            SearchPredicate::Matching { text, digits } => (text, digits),
        };

        if contains_ignore_case(record.search_name(), text)
            || contains_ignore_case(record.search_cpf(), text)
            || contains_ignore_case(record.search_phone(), text)
        {
            return true;
        }

        match digits {
            Some(digits) => {
                digits_only(record.search_cpf()).contains(digits.as_str())
                    || digits_only(record.search_phone()).contains(digits.as_str())
            }
            None => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SearchPredicate::All)
    }
}

/// Keeps the records matching `query`, preserving their order.
pub fn filter_records<'a, R: Searchable>(records: &'a [R], query: &str) -> Vec<&'a R> {
    let predicate = build_predicate(query);
    records
        .iter()
        .filter(|record| predicate.matches(*record))
        .collect()
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::{build_predicate, filter_records, SearchPredicate};
    use crate::search::Searchable;

    struct Record {
        name: &'static str,
        cpf: &'static str,
        phone: &'static str,
    }

    impl Searchable for Record {
        fn search_name(&self) -> &str {
            self.name
        }

        fn search_cpf(&self) -> &str {
            self.cpf
        }

        fn search_phone(&self) -> &str {
            self.phone
        }
    }

    fn maria() -> Record {
        Record {
            name: "Maria Conceição Souza",
            cpf: "123.456.789-00",
            phone: "(11) 91234-5678",
        }
    }

    fn roster() -> Vec<Record> {
        vec![
            maria(),
            Record {
                name: "João Da Silva",
                cpf: "111.444.777-35",
                phone: "(21) 99876-5432",
            },
        ]
    }

    #[test]
    fn empty_query_matches_everything() {
        let predicate = build_predicate("");
        assert_eq!(predicate, SearchPredicate::All);
        assert_eq!(filter_records(&roster(), "").len(), 2);
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_query() {
        let record = Record {
            name: "Maria Silvana",
            cpf: "111.444.777-35",
            phone: "(11) 91234-5678",
        };
        assert!(build_predicate("ana").matches(&record));
        assert!(!build_predicate("ana ").matches(&record));
        assert!(build_predicate("maria ").matches(&record));

        let blank = build_predicate("   ");
        assert!(!blank.is_all());
        assert!(!blank.matches(&record));
    }

    #[test]
    fn cpf_matches_with_or_without_punctuation() {
        let record = maria();
        for query in ["12345678900", "123.456.789-00", "1234", "456.789"] {
            assert!(build_predicate(query).matches(&record), "{query}");
        }
    }

    #[test]
    fn phone_matches_with_or_without_punctuation() {
        let record = maria();
        for query in ["11912345678", "(11) 91234-5678", "91234", "1234-5678", "(11)"] {
            assert!(build_predicate(query).matches(&record), "{query}");
        }
    }

    #[test]
    fn name_matches_case_insensitively() {
        let record = maria();
        for query in ["maria", "CONCEIÇÃO", "ção sou"] {
            assert!(build_predicate(query).matches(&record), "{query}");
        }
    }

    #[test]
    fn unrelated_query_does_not_match() {
        let record = maria();
        for query in ["pedro", "999999", "(31)"] {
            assert!(!build_predicate(query).matches(&record), "{query}");
        }
    }

    #[test]
    fn punctuation_only_query_uses_raw_path() {
        let predicate = build_predicate("-");
        assert_eq!(
            predicate,
            SearchPredicate::Matching {
                text: "-".to_string(),
                digits: None
            }
        );
        assert!(predicate.matches(&maria()));
    }

    #[test]
    fn filter_keeps_order_of_matches() {
        let records = roster();
        let matched = filter_records(&records, "9");
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].name, "Maria Conceição Souza");
        let matched = filter_records(&records, "silva");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].cpf, "111.444.777-35");
    }
}
