pub mod domain;
pub mod dto;
pub mod error;
pub mod form;
pub mod postal;
pub mod search;
pub mod time;
pub mod validation;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use form::{FormErrors, PatientForm, PatientPatch, ValidatedPatch, ValidatedPatient};
pub use postal::{Address, LookupError, PostalLookup};
pub use search::{build_predicate, filter_records, SearchPredicate, Searchable};
pub use validation::{Field, ValidationError, ValidationReason};
