use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address resolved from a CEP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("postal lookup unavailable: {0}")]
    Unavailable(String),
    #[error("postal lookup request failed: {0}")]
    Request(String),
    #[error("postal lookup returned an unexpected response: {0}")]
    Parse(String),
    #[error(transparent)]
    Validation(#[from] crate::validation::ValidationError),
}

/// Resolves a CEP into an address. `Ok(None)` means the code is well formed
/// but unknown to the provider.
pub trait PostalLookup {
    fn lookup(&self, cep: &str) -> Result<Option<Address>, LookupError>;
}

impl<F> PostalLookup for F
where
    F: Fn(&str) -> Result<Option<Address>, LookupError>,
{
    fn lookup(&self, cep: &str) -> Result<Option<Address>, LookupError> {
        self(cep)
    }
}
