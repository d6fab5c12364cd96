pub mod attachment;
pub mod ids;
pub mod patient;
pub mod practitioner;

pub use attachment::{normalize_attachment_title, Attachment, AttachmentKind};
pub use ids::{AttachmentId, PatientId, PractitionerId};
pub use patient::{BloodType, Patient, Sex};
pub use practitioner::{normalize_username, Practitioner};
