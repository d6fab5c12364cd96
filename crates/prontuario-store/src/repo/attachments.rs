use crate::error::{Result, StoreError};
use crate::files;
use prontuario_core::domain::{
    normalize_attachment_title, Attachment, AttachmentId, AttachmentKind, PatientId,
    PractitionerId,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AttachmentNew {
    pub patient_id: PatientId,
    pub kind: AttachmentKind,
    pub title: String,
    pub description: String,
    pub source: PathBuf,
}

pub struct AttachmentsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> AttachmentsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Copies the source file under `root` and records it. The copy is
    /// removed again if the record cannot be written.
    pub fn add(
        &self,
        now_utc: i64,
        owner: PractitionerId,
        root: &Path,
        input: AttachmentNew,
    ) -> Result<Attachment> {
        let title = normalize_attachment_title(&input.title)?;
        let extension = input.kind.check_extension(&input.source)?;
        ensure_patient_owned(self.conn, owner, input.patient_id)?;

        let id = AttachmentId::new();
        let relative = files::relative_path(input.kind, id, &extension, now_utc);
        let stored = files::store_file(root, &input.source, &relative)?;

        let attachment = Attachment {
            id,
            patient_id: input.patient_id,
            kind: input.kind,
            title,
            description: input.description.trim().to_string(),
            file_path: stored,
            uploaded_at: now_utc,
        };

        if let Err(err) = insert(self.conn, &attachment) {
            let _ = files::remove_file(root, &attachment.file_path);
            return Err(err);
        }
        Ok(attachment)
    }

    pub fn get_for_owner(
        &self,
        owner: PractitionerId,
        id: AttachmentId,
    ) -> Result<Option<Attachment>> {
        self.conn
            .query_row(
                "SELECT a.id, a.patient_id, a.kind, a.title, a.description, a.file_path, a.uploaded_at
                 FROM attachments a
                 INNER JOIN patients p ON p.id = a.patient_id
                 WHERE a.id = ?1 AND p.practitioner_id = ?2;",
                params![id.to_string(), owner.to_string()],
                |row| Ok(attachment_from_row(row)),
            )
            .optional()?
            .transpose()
    }

    /// Attachments of an owned patient, newest first.
    pub fn list_for_patient(
        &self,
        owner: PractitionerId,
        patient_id: PatientId,
    ) -> Result<Vec<Attachment>> {
        ensure_patient_owned(self.conn, owner, patient_id)?;
        list_for_patient_inner(self.conn, patient_id)
    }

    /// Deletes the record and returns it; file cleanup is left to the caller.
    pub fn delete(&self, owner: PractitionerId, id: AttachmentId) -> Result<Attachment> {
        let attachment = self
            .get_for_owner(owner, id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.conn
            .execute("DELETE FROM attachments WHERE id = ?1;", [id.to_string()])?;
        Ok(attachment)
    }
}

pub(crate) fn list_for_patient_inner(
    conn: &Connection,
    patient_id: PatientId,
) -> Result<Vec<Attachment>> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, kind, title, description, file_path, uploaded_at
         FROM attachments
         WHERE patient_id = ?1
         ORDER BY uploaded_at DESC, rowid DESC;",
    )?;
    let mut rows = stmt.query([patient_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(attachment_from_row(row)?);
    }
    Ok(items)
}

fn ensure_patient_owned(conn: &Connection, owner: PractitionerId, patient_id: PatientId) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM patients WHERE id = ?1 AND practitioner_id = ?2;",
            params![patient_id.to_string(), owner.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    found
        .map(|_| ())
        .ok_or_else(|| StoreError::NotFound(patient_id.to_string()))
}

fn insert(conn: &Connection, attachment: &Attachment) -> Result<()> {
    conn.execute(
        "INSERT INTO attachments (id, patient_id, kind, title, description, file_path, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            attachment.id.to_string(),
            attachment.patient_id.to_string(),
            attachment.kind.as_str(),
            attachment.title,
            attachment.description,
            attachment.file_path,
            attachment.uploaded_at,
        ],
    )?;
    Ok(())
}

fn attachment_from_row(row: &rusqlite::Row<'_>) -> Result<Attachment> {
    let id_str: String = row.get(0)?;
    let id = AttachmentId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let patient_str: String = row.get(1)?;
    let patient_id = PatientId::from_str(&patient_str)
        .map_err(|_| StoreError::InvalidId(patient_str.clone()))?;
    let kind_str: String = row.get(2)?;
    let kind = AttachmentKind::from_str(&kind_str)?;
    Ok(Attachment {
        id,
        patient_id,
        kind,
        title: row.get(3)?,
        description: row.get(4)?,
        file_path: row.get(5)?,
        uploaded_at: row.get(6)?,
    })
}
