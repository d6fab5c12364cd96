use crate::domain::ids::{AttachmentId, PatientId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Document,
    Photo,
}

impl AttachmentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Document => "document",
            AttachmentKind::Photo => "photo",
        }
    }

    pub const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            AttachmentKind::Document => &["pdf"],
            AttachmentKind::Photo => &["jpg", "jpeg", "png", "gif"],
        }
    }

    /// Directory under the attachments root where files of this kind live.
    pub const fn directory(self) -> &'static str {
        match self {
            AttachmentKind::Document => "documents",
            AttachmentKind::Photo => "photos",
        }
    }

    /// Returns the lower-cased extension when it is allowed for this kind.
    pub fn check_extension(self, path: &Path) -> Result<String, CoreError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if self.allowed_extensions().contains(&extension.as_str()) {
            Ok(extension)
        } else {
            Err(CoreError::UnsupportedExtension {
                kind: self.as_str(),
                extension,
            })
        }
    }
}

impl FromStr for AttachmentKind {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "document" | "doc" | "pdf" => Ok(AttachmentKind::Document),
            "photo" | "image" => Ok(AttachmentKind::Photo),
            _ => Err(CoreError::InvalidAttachmentKind(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub patient_id: PatientId,
    pub kind: AttachmentKind,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub uploaded_at: i64,
}

pub fn normalize_attachment_title(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyAttachmentTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::AttachmentKind;
    use crate::error::CoreError;
    use std::path::Path;
    use std::str::FromStr;

    #[test]
    fn documents_must_be_pdf() {
        let kind = AttachmentKind::Document;
        assert_eq!(kind.check_extension(Path::new("exame.PDF")).unwrap(), "pdf");
        let err = kind.check_extension(Path::new("exame.docx")).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnsupportedExtension {
                kind: "document",
                extension: "docx".to_string()
            }
        );
    }

    #[test]
    fn photos_accept_common_image_types() {
        let kind = AttachmentKind::Photo;
        for name in ["a.jpg", "a.JPEG", "a.png", "a.gif"] {
            assert!(kind.check_extension(Path::new(name)).is_ok(), "{name}");
        }
        assert!(kind.check_extension(Path::new("a.bmp")).is_err());
        assert!(kind.check_extension(Path::new("no_extension")).is_err());
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!(AttachmentKind::from_str("PDF").unwrap(), AttachmentKind::Document);
        assert_eq!(AttachmentKind::from_str("image").unwrap(), AttachmentKind::Photo);
        assert!(AttachmentKind::from_str("video").is_err());
    }
}
