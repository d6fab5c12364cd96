use super::{digits_only, Field, ValidationError, ValidationReason};

pub const PHONE_DIGITS: usize = 11;

const MIN_AREA_CODE: u32 = 11;
const MAX_AREA_CODE: u32 = 99;

pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if digits.len() != PHONE_DIGITS {
        return Err(invalid(ValidationReason::WrongLength));
    }

    let area_code: u32 = digits[..2]
        .parse()
        .map_err(|_| invalid(ValidationReason::InvalidAreaCode))?;
    if !(MIN_AREA_CODE..=MAX_AREA_CODE).contains(&area_code) {
        return Err(invalid(ValidationReason::InvalidAreaCode));
    }

    if digits.as_bytes()[2] != b'9' {
        return Err(invalid(ValidationReason::NotMobileNumber));
    }

    Ok(format!(
        "({}) {}-{}",
        &digits[..2],
        &digits[2..7],
        &digits[7..]
    ))
}

fn invalid(reason: ValidationReason) -> ValidationError {
    ValidationError::new(Field::Phone, reason)
}
