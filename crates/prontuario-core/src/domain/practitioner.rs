use crate::domain::ids::PractitionerId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: PractitionerId,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: i64,
}

pub fn normalize_username(raw: &str) -> Result<String, CoreError> {
    let value = raw.trim().to_ascii_lowercase();
    let valid = !value.is_empty()
        && value
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-'));
    if !valid {
        return Err(CoreError::InvalidUsername(raw.to_string()));
    }
    Ok(value)
}
