use super::{digits_only, Field, ValidationError, ValidationReason};

pub const CEP_DIGITS: usize = 8;

pub fn validate_cep(raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if digits.len() != CEP_DIGITS {
        return Err(ValidationError::new(
            Field::Cep,
            ValidationReason::WrongLength,
        ));
    }
    Ok(format!("{}-{}", &digits[..5], &digits[5..]))
}
