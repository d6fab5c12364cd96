//! Patient form processing.
//!
//! A form runs every field validator independently and reports at most one
//! error per field, so a caller can re-prompt for the failing fields while
//! keeping the values that were accepted.

use crate::domain::{BloodType, Sex};
use crate::postal::Address;
use crate::validation::{
    parse_birth_date, validate_birth_date, validate_cep, validate_cpf, validate_email,
    validate_name, validate_phone, validate_required_text, validate_state, Field,
    ValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw, untrusted input for a new patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientForm {
    pub full_name: String,
    pub birth_date: String,
    pub cpf: String,
    pub sex: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub blood_type: Option<String>,
    pub allergies: String,
    pub medications: String,
    pub family_history: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatient {
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub cpf: String,
    pub sex: Sex,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub blood_type: Option<BloodType>,
    pub allergies: String,
    pub medications: String,
    pub family_history: String,
    pub notes: String,
}

/// Raw input for an edit. `None` leaves the field untouched; an empty
/// string clears the optional fields (email, blood type).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub full_name: Option<String>,
    pub birth_date: Option<String>,
    pub cpf: Option<String>,
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub family_history: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub sex: Option<Sex>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,
    pub blood_type: Option<Option<BloodType>>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub family_history: Option<String>,
    pub notes: Option<String>,
}

/// One error per failing field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<ValidationError>,
    checked: Vec<Field>,
}

impl FormErrors {
    /// Records the outcome of validating `field`, keeping only the first
    /// error reported for it.
    pub fn check<T>(&mut self, field: Field, result: Result<T, ValidationError>) -> Option<T> {
        if !self.checked.contains(&field) {
            self.checked.push(field);
        }
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    pub fn push(&mut self, err: ValidationError) {
        if self.for_field(err.field).is_none() {
            self.errors.push(err);
        }
    }

    pub fn for_field(&self, field: Field) -> Option<&ValidationError> {
        self.errors.iter().find(|err| err.field == field)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Fields that were checked and passed.
    pub fn valid_fields(&self) -> Vec<Field> {
        self.checked
            .iter()
            .copied()
            .filter(|field| self.for_field(*field).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl From<ValidationError> for FormErrors {
    fn from(err: ValidationError) -> Self {
        let mut errors = FormErrors::default();
        errors.check::<()>(err.field, Err(err));
        errors
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid patient data: {}", messages)
    }
}

impl std::error::Error for FormErrors {}

impl PatientForm {
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedPatient, FormErrors> {
        let mut errors = FormErrors::default();

        let full_name = errors.check(Field::FullName, validate_name(&self.full_name));
        let birth_date = errors.check(
            Field::BirthDate,
            parse_birth_date(&self.birth_date).and_then(|date| validate_birth_date(date, today)),
        );
        let cpf = errors.check(Field::Cpf, validate_cpf(&self.cpf));
        let sex = errors.check(Field::Sex, self.sex.parse::<Sex>());
        let phone = errors.check(Field::Phone, validate_phone(&self.phone));
        let email = errors.check(
            Field::Email,
            validate_email(self.email.as_deref().unwrap_or_default()),
        );
        let address = errors.check(
            Field::Address,
            validate_required_text(Field::Address, &self.address),
        );
        let city = errors.check(Field::City, validate_required_text(Field::City, &self.city));
        let state = errors.check(Field::State, validate_state(&self.state));
        let cep = errors.check(Field::Cep, validate_cep(&self.cep));
        let blood_type = errors.check(
            Field::BloodType,
            parse_optional_blood_type(self.blood_type.as_deref().unwrap_or_default()),
        );

        let assembled = (|| {
            Some(ValidatedPatient {
                full_name: full_name?,
                birth_date: birth_date?,
                cpf: cpf?,
                sex: sex?,
                phone: phone?,
                email: email?,
                address: address?,
                city: city?,
                state: state?,
                cep: cep?,
                blood_type: blood_type?,
                allergies: self.allergies.trim().to_string(),
                medications: self.medications.trim().to_string(),
                family_history: self.family_history.trim().to_string(),
                notes: self.notes.trim().to_string(),
            })
        })();

        match assembled {
            Some(patient) if errors.is_empty() => Ok(patient),
            _ => Err(errors),
        }
    }

    /// Fills blank address fields from a postal lookup result.
    pub fn fill_from_address(&mut self, address: &Address) {
        if self.address.trim().is_empty() && !address.street.is_empty() {
            self.address = address.street.clone();
        }
        if self.city.trim().is_empty() && !address.city.is_empty() {
            self.city = address.city.clone();
        }
        if self.state.trim().is_empty() && !address.state.is_empty() {
            self.state = address.state.clone();
        }
    }
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        *self == PatientPatch::default()
    }

    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedPatch, FormErrors> {
        let mut errors = FormErrors::default();
        let mut patch = ValidatedPatch::default();

        if let Some(raw) = self.full_name.as_deref() {
            patch.full_name = errors.check(Field::FullName, validate_name(raw));
        }
        if let Some(raw) = self.birth_date.as_deref() {
            patch.birth_date = errors.check(
                Field::BirthDate,
                parse_birth_date(raw).and_then(|date| validate_birth_date(date, today)),
            );
        }
        if let Some(raw) = self.cpf.as_deref() {
            patch.cpf = errors.check(Field::Cpf, validate_cpf(raw));
        }
        if let Some(raw) = self.sex.as_deref() {
            patch.sex = errors.check(Field::Sex, raw.parse::<Sex>());
        }
        if let Some(raw) = self.phone.as_deref() {
            patch.phone = errors.check(Field::Phone, validate_phone(raw));
        }
        if let Some(raw) = self.email.as_deref() {
            patch.email = errors.check(Field::Email, validate_email(raw));
        }
        if let Some(raw) = self.address.as_deref() {
            patch.address = errors.check(
                Field::Address,
                validate_required_text(Field::Address, raw),
            );
        }
        if let Some(raw) = self.city.as_deref() {
            patch.city = errors.check(Field::City, validate_required_text(Field::City, raw));
        }
        if let Some(raw) = self.state.as_deref() {
            patch.state = errors.check(Field::State, validate_state(raw));
        }
        if let Some(raw) = self.cep.as_deref() {
            patch.cep = errors.check(Field::Cep, validate_cep(raw));
        }
        if let Some(raw) = self.blood_type.as_deref() {
            patch.blood_type = errors.check(Field::BloodType, parse_optional_blood_type(raw));
        }
        patch.allergies = self.allergies.as_deref().map(|v| v.trim().to_string());
        patch.medications = self.medications.as_deref().map(|v| v.trim().to_string());
        patch.family_history = self.family_history.as_deref().map(|v| v.trim().to_string());
        patch.notes = self.notes.as_deref().map(|v| v.trim().to_string());

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

fn parse_optional_blood_type(raw: &str) -> Result<Option<BloodType>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<BloodType>().map(Some)
}
