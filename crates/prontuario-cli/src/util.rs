use crate::error::invalid_input;
use anyhow::Result;
use prontuario_core::domain::{AttachmentId, PatientId};
use std::str::FromStr;

pub use prontuario_core::time::{
    format_date_br, format_timestamp_date, format_timestamp_datetime, local_today, now_utc,
};

pub fn parse_patient_id(raw: &str) -> Result<PatientId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("patient id cannot be empty"));
    }
    PatientId::from_str(trimmed)
        .map_err(|_| invalid_input(format!("invalid patient id: {trimmed}")))
}

pub fn parse_attachment_id(raw: &str) -> Result<AttachmentId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("attachment id cannot be empty"));
    }
    AttachmentId::from_str(trimmed)
        .map_err(|_| invalid_input(format!("invalid attachment id: {trimmed}")))
}

/// Shows `-` for blank optional text in human output.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
