mod predicate;

pub use predicate::{build_predicate, filter_records, SearchPredicate};

/// Fields a listing search looks at. Values are matched as stored, so
/// implementors return the normalized name, CPF and phone.
pub trait Searchable {
    fn search_name(&self) -> &str;
    fn search_cpf(&self) -> &str;
    fn search_phone(&self) -> &str;
}
