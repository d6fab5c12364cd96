use crate::domain::{
    Attachment, AttachmentId, AttachmentKind, BloodType, Patient, PatientId, Practitioner,
    PractitionerId, Sex,
};
use crate::validation::{Field, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PractitionerDto {
    pub id: PractitionerId,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: i64,
}

impl From<&Practitioner> for PractitionerDto {
    fn from(practitioner: &Practitioner) -> Self {
        Self {
            id: practitioner.id,
            username: practitioner.username.clone(),
            display_name: practitioner.display_name.clone(),
            created_at: practitioner.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientListItemDto {
    pub id: PatientId,
    pub full_name: String,
    pub cpf: String,
    pub phone: String,
    pub age: i32,
    pub active: bool,
    pub created_at: i64,
}

impl PatientListItemDto {
    pub fn from_patient(patient: &Patient, today: NaiveDate) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
            cpf: patient.cpf.clone(),
            phone: patient.phone.clone(),
            age: patient.age(today),
            active: patient.active,
            created_at: patient.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientListDto {
    /// Active patients owned by the practitioner, regardless of the search.
    pub total_active: i64,
    pub patients: Vec<PatientListItemDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDto {
    pub id: AttachmentId,
    pub patient_id: PatientId,
    pub kind: AttachmentKind,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub uploaded_at: i64,
}

impl From<&Attachment> for AttachmentDto {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id,
            patient_id: attachment.patient_id,
            kind: attachment.kind,
            title: attachment.title.clone(),
            description: attachment.description.clone(),
            file_path: attachment.file_path.clone(),
            uploaded_at: attachment.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetailDto {
    pub id: PatientId,
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub age: i32,
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
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub documents: Vec<AttachmentDto>,
    pub photos: Vec<AttachmentDto>,
}

impl PatientDetailDto {
    pub fn new(patient: &Patient, attachments: &[Attachment], today: NaiveDate) -> Self {
        let (documents, photos): (Vec<_>, Vec<_>) = attachments
            .iter()
            .partition(|attachment| attachment.kind == AttachmentKind::Document);
        Self {
            id: patient.id,
            full_name: patient.full_name.clone(),
            birth_date: patient.birth_date,
            age: patient.age(today),
            cpf: patient.cpf.clone(),
            sex: patient.sex,
            phone: patient.phone.clone(),
            email: patient.email.clone(),
            address: patient.address.clone(),
            city: patient.city.clone(),
            state: patient.state.clone(),
            cep: patient.cep.clone(),
            blood_type: patient.blood_type,
            allergies: patient.allergies.clone(),
            medications: patient.medications.clone(),
            family_history: patient.family_history.clone(),
            notes: patient.notes.clone(),
            active: patient.active,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
            documents: documents.into_iter().map(AttachmentDto::from).collect(),
            photos: photos.into_iter().map(AttachmentDto::from).collect(),
        }
    }
}

/// Outcome of checking one raw field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCheckDto {
    pub field: Field,
    pub input: String,
    pub normalized: Option<String>,
    pub error: Option<FieldErrorDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorDto {
    pub field: Field,
    pub reason: String,
    pub message: String,
}

impl From<&ValidationError> for FieldErrorDto {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field,
            reason: err.reason.as_str().to_string(),
            message: err.message().to_string(),
        }
    }
}

impl FieldCheckDto {
    pub fn from_result(field: Field, input: &str, result: Result<String, ValidationError>) -> Self {
        match result {
            Ok(normalized) => Self {
                field,
                input: input.to_string(),
                normalized: Some(normalized),
                error: None,
            },
            Err(err) => Self {
                field,
                input: input.to_string(),
                normalized: None,
                error: Some(FieldErrorDto::from(&err)),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}
