use crate::error::{Result, StoreError};
use prontuario_core::domain::{normalize_username, Practitioner, PractitionerId};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct PractitionerNew {
    pub username: String,
    pub display_name: Option<String>,
}

pub struct PractitionersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PractitionersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: PractitionerNew) -> Result<Practitioner> {
        let username = normalize_username(&input.username)?;
        if self.get_by_username(&username)?.is_some() {
            return Err(StoreError::DuplicateUsername(username));
        }
        let practitioner = Practitioner {
            id: PractitionerId::new(),
            username,
            display_name: input
                .display_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            created_at: now_utc,
        };

        self.conn.execute(
            "INSERT INTO practitioners (id, username, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                practitioner.id.to_string(),
                practitioner.username,
                practitioner.display_name,
                practitioner.created_at,
            ],
        )?;
        Ok(practitioner)
    }

    pub fn get(&self, id: PractitionerId) -> Result<Option<Practitioner>> {
        self.conn
            .query_row(
                "SELECT id, username, display_name, created_at
                 FROM practitioners WHERE id = ?1;",
                [id.to_string()],
                |row| Ok(practitioner_from_row(row)),
            )
            .optional()?
            .transpose()
    }

    pub fn get_by_username(&self, username: &str) -> Result<Option<Practitioner>> {
        let Ok(username) = normalize_username(username) else {
            return Ok(None);
        };
        self.conn
            .query_row(
                "SELECT id, username, display_name, created_at
                 FROM practitioners WHERE username = ?1;",
                [username],
                |row| Ok(practitioner_from_row(row)),
            )
            .optional()?
            .transpose()
    }

    pub fn list(&self) -> Result<Vec<Practitioner>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, display_name, created_at
             FROM practitioners
             ORDER BY username ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(practitioner_from_row(row)?);
        }
        Ok(items)
    }
}

fn practitioner_from_row(row: &rusqlite::Row<'_>) -> Result<Practitioner> {
    let id_str: String = row.get(0)?;
    let id =
        PractitionerId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Practitioner {
        id,
        username: row.get(1)?,
        display_name: row.get(2)?,
        created_at: row.get(3)?,
    })
}
