pub mod attachments;
pub mod patients;
pub mod practitioners;

pub use attachments::{AttachmentNew, AttachmentsRepo};
pub use patients::{PatientUpdate, PatientsRepo};
pub use practitioners::{PractitionerNew, PractitionersRepo};
