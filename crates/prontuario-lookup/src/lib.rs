pub mod response;
pub mod viacep;

pub use prontuario_core::postal::{Address, LookupError, PostalLookup};
pub use response::parse_viacep_response;
pub use viacep::ViaCepClient;

pub type Result<T> = std::result::Result<T, LookupError>;
