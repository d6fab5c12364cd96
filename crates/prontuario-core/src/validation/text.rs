use super::{Field, ValidationError, ValidationReason};

pub const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

pub fn validate_required_text(field: Field, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationReason::MissingValue));
    }
    Ok(trimmed.to_string())
}

pub fn validate_state(raw: &str) -> Result<String, ValidationError> {
    let value = validate_required_text(Field::State, raw)?.to_ascii_uppercase();
    if !BRAZILIAN_STATES.contains(&value.as_str()) {
        return Err(ValidationError::new(
            Field::State,
            ValidationReason::InvalidChoice,
        ));
    }
    Ok(value)
}

pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Blank input means "no email" and yields `Ok(None)`.
pub fn validate_email(raw: &str) -> Result<Option<String>, ValidationError> {
    let Some(email) = normalize_email(raw) else {
        return Ok(None);
    };

    let invalid = || ValidationError::new(Field::Email, ValidationReason::InvalidEmail);
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    Ok(Some(email))
}
