use crate::domain::ids::{PatientId, PractitionerId};
use crate::search::Searchable;
use crate::validation::{age_in_years, Field, ValidationError, ValidationReason};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Sex {
    pub const fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        }
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "m" | "male" | "masculino" => Ok(Sex::Male),
            "f" | "female" | "feminino" => Ok(Sex::Female),
            "o" | "other" | "outro" => Ok(Sex::Other),
            "" => Err(ValidationError::new(
                Field::Sex,
                ValidationReason::MissingValue,
            )),
            _ => Err(ValidationError::new(
                Field::Sex,
                ValidationReason::InvalidChoice,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    pub const fn all() -> &'static [BloodType] {
        &[
            BloodType::APositive,
            BloodType::ANegative,
            BloodType::BPositive,
            BloodType::BNegative,
            BloodType::AbPositive,
            BloodType::AbNegative,
            BloodType::OPositive,
            BloodType::ONegative,
        ]
    }
}

impl FromStr for BloodType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_uppercase();
        BloodType::all()
            .iter()
            .copied()
            .find(|blood_type| blood_type.as_str() == value)
            .ok_or(ValidationError::new(
                Field::BloodType,
                ValidationReason::InvalidChoice,
            ))
    }
}

/// A patient record as stored. Every identity field holds its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub practitioner_id: PractitionerId,
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
    pub created_at: i64,
    pub updated_at: i64,
    pub active: bool,
}

impl Patient {
    pub fn age(&self, today: NaiveDate) -> i32 {
        age_in_years(self.birth_date, today)
    }
}

impl Searchable for Patient {
    fn search_name(&self) -> &str {
        &self.full_name
    }

    fn search_cpf(&self) -> &str {
        &self.cpf
    }

    fn search_phone(&self) -> &str {
        &self.phone
    }
}
