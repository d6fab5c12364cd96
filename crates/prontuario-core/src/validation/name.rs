use super::{Field, ValidationError, ValidationReason};

const MULTIPLICATION_SIGN: char = '\u{00D7}';
const DIVISION_SIGN: char = '\u{00F7}';

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    let all_letters = tokens
        .iter()
        .all(|token| token.chars().all(is_name_letter));
    if !all_letters {
        return Err(ValidationError::new(
            Field::FullName,
            ValidationReason::InvalidCharacters,
        ));
    }

    if tokens.len() < 2 {
        return Err(ValidationError::new(
            Field::FullName,
            ValidationReason::IncompleteName,
        ));
    }

    Ok(tokens
        .iter()
        .map(|token| title_case(token))
        .collect::<Vec<_>>()
        .join(" "))
}

/// ASCII letters plus the accented Latin-1 letters (U+00C0..=U+00FF).
pub fn is_name_letter(ch: char) -> bool {
    if ch.is_ascii_alphabetic() {
        return true;
    }
    ('\u{00C0}'..='\u{00FF}').contains(&ch) && ch != MULTIPLICATION_SIGN && ch != DIVISION_SIGN
}

fn title_case(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    if let Some(first) = chars.next() {
        out.push(single_letter(first, first.to_uppercase()));
    }
    for ch in chars {
        out.push(single_letter(ch, ch.to_lowercase()));
    }
    out
}

// 'ß' and 'ÿ' upper-case to something outside the accepted range; keep them.
fn single_letter(original: char, mut mapped: impl Iterator<Item = char>) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(ch), None) if is_name_letter(ch) => ch,
        _ => original,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_name_letter, validate_name};
    use crate::validation::ValidationReason;

    #[test]
    fn collapses_whitespace_and_title_cases() {
        let value = validate_name("joão   da   silva").unwrap();
        assert_eq!(value, "João Da Silva");
    }

    #[test]
    fn trims_and_lowercases_rest_of_token() {
        let value = validate_name("  MARIA\tCONCEIÇÃO  ").unwrap();
        assert_eq!(value, "Maria Conceição");
    }

    #[test]
    fn single_token_is_incomplete() {
        let err = validate_name("joão").unwrap_err();
        assert_eq!(err.reason, ValidationReason::IncompleteName);
    }

    #[test]
    fn blank_is_incomplete() {
        let err = validate_name("   ").unwrap_err();
        assert_eq!(err.reason, ValidationReason::IncompleteName);
    }

    #[test]
    fn digits_and_punctuation_are_rejected() {
        for raw in ["Ana Silva2", "Ana-Maria Silva", "Ana O'Neil", "Ana × Silva"] {
            let err = validate_name(raw).unwrap_err();
            assert_eq!(err.reason, ValidationReason::InvalidCharacters, "{raw}");
        }
    }

    #[test]
    fn invalid_characters_win_over_incomplete() {
        let err = validate_name("ana1").unwrap_err();
        assert_eq!(err.reason, ValidationReason::InvalidCharacters);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["joão da silva", "ÉLIO ÑUÑEZ", "ßandra ÿves", "zoë  ÁVILA"] {
            let once = validate_name(raw).unwrap();
            let twice = validate_name(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn latin1_letters_are_accepted() {
        assert!(is_name_letter('ç'));
        assert!(is_name_letter('Ã'));
        assert!(!is_name_letter('÷'));
        assert!(!is_name_letter('ł'));
    }
}
