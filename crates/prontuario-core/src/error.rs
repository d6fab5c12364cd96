use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid username: {0}")]
    InvalidUsername(String),
    #[error("attachment title is required")]
    EmptyAttachmentTitle,
    #[error("invalid attachment kind: {0}")]
    InvalidAttachmentKind(String),
    #[error("unsupported {kind} file extension: {extension}")]
    UnsupportedExtension {
        kind: &'static str,
        extension: String,
    },
}
