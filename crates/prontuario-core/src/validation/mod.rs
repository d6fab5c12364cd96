//! Field validators for patient data.
//!
//! Every validator takes the raw user-entered value and either returns the
//! canonical form that gets stored, or the first rule it violated. Validators
//! are pure and independent of each other.

mod birth_date;
mod cep;
mod cpf;
mod name;
mod phone;
mod text;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use birth_date::{
    age_in_years, parse_birth_date, validate_birth_date, MAX_AGE_YEARS, MIN_AGE_YEARS,
};
pub use cep::{validate_cep, CEP_DIGITS};
pub use cpf::{cpf_check_digits, validate_cpf, CPF_DIGITS};
pub use name::{is_name_letter, validate_name};
pub use phone::{validate_phone, PHONE_DIGITS};
pub use text::{
    normalize_email, validate_email, validate_required_text, validate_state, BRAZILIAN_STATES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    BirthDate,
    Cpf,
    Sex,
    Phone,
    Email,
    Address,
    City,
    State,
    Cep,
    BloodType,
}

impl Field {
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::BirthDate => "birth_date",
            Field::Cpf => "cpf",
            Field::Sex => "sex",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::Cep => "cep",
            Field::BloodType => "blood_type",
        }
    }

}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    InvalidCharacters,
    IncompleteName,
    WrongLength,
    RepeatedDigits,
    InvalidCheckDigit,
    InvalidAreaCode,
    NotMobileNumber,
    MissingValue,
    FutureDate,
    TooYoung,
    ImplausibleAge,
    /// Raised by the store when another patient already holds the CPF.
    DuplicateId,
    InvalidFormat,
    InvalidChoice,
    InvalidEmail,
}

impl ValidationReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            ValidationReason::InvalidCharacters => "invalid_characters",
            ValidationReason::IncompleteName => "incomplete_name",
            ValidationReason::WrongLength => "wrong_length",
            ValidationReason::RepeatedDigits => "repeated_digits",
            ValidationReason::InvalidCheckDigit => "invalid_check_digit",
            ValidationReason::InvalidAreaCode => "invalid_area_code",
            ValidationReason::NotMobileNumber => "not_mobile_number",
            ValidationReason::MissingValue => "missing_value",
            ValidationReason::FutureDate => "future_date",
            ValidationReason::TooYoung => "too_young",
            ValidationReason::ImplausibleAge => "implausible_age",
            ValidationReason::DuplicateId => "duplicate_id",
            ValidationReason::InvalidFormat => "invalid_format",
            ValidationReason::InvalidChoice => "invalid_choice",
            ValidationReason::InvalidEmail => "invalid_email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub const fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    /// Human-readable explanation, suitable for a field-level message.
    pub fn message(&self) -> &'static str {
        match (self.field, self.reason) {
            (_, ValidationReason::InvalidCharacters) => "only letters and spaces are allowed",
            (_, ValidationReason::IncompleteName) => "enter at least first and last name",
            (Field::Cpf, ValidationReason::WrongLength) => "must have exactly 11 digits",
            (Field::Phone, ValidationReason::WrongLength) => {
                "must have exactly 11 digits (area code + number)"
            }
            (Field::Cep, ValidationReason::WrongLength) => "must have exactly 8 digits",
            (_, ValidationReason::WrongLength) => "has the wrong length",
            (_, ValidationReason::RepeatedDigits) => "cannot be a single repeated digit",
            (_, ValidationReason::InvalidCheckDigit) => "check digits do not match",
            (_, ValidationReason::InvalidAreaCode) => "area code must be between 11 and 99",
            (_, ValidationReason::NotMobileNumber) => {
                "mobile numbers must have 9 right after the area code"
            }
            (_, ValidationReason::MissingValue) => "is required",
            (_, ValidationReason::FutureDate) => "cannot be in the future",
            (_, ValidationReason::TooYoung) => "patient must be at least 1 year old",
            (_, ValidationReason::ImplausibleAge) => "age cannot exceed 150 years",
            (_, ValidationReason::DuplicateId) => "is already registered for another patient",
            (Field::BirthDate, ValidationReason::InvalidFormat) => {
                "expected YYYY-MM-DD or DD/MM/YYYY"
            }
            (_, ValidationReason::InvalidFormat) => "has an invalid format",
            (_, ValidationReason::InvalidChoice) => "is not one of the accepted values",
            (_, ValidationReason::InvalidEmail) => "is not a valid email address",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Keeps only ASCII digits, dropping any punctuation or whitespace.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
