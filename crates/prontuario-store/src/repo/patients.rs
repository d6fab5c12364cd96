use crate::error::{Result, StoreError};
use crate::repo::attachments::list_for_patient_inner;
use chrono::NaiveDate;
use prontuario_core::domain::{Attachment, BloodType, Patient, PatientId, PractitionerId, Sex};
use prontuario_core::form::{ValidatedPatch, ValidatedPatient};
use prontuario_core::search::filter_records;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

const PATIENT_COLUMNS: &str = "id, practitioner_id, full_name, birth_date, cpf, sex, phone, email, address, city, state, cep, blood_type, allergies, medications, family_history, notes, created_at, updated_at, active";
const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
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
    pub active: Option<bool>,
}

impl From<ValidatedPatch> for PatientUpdate {
    fn from(patch: ValidatedPatch) -> Self {
        Self {
            full_name: patch.full_name,
            birth_date: patch.birth_date,
            cpf: patch.cpf,
            sex: patch.sex,
            phone: patch.phone,
            email: patch.email,
            address: patch.address,
            city: patch.city,
            state: patch.state,
            cep: patch.cep,
            blood_type: patch.blood_type,
            allergies: patch.allergies,
            medications: patch.medications,
            family_history: patch.family_history,
            notes: patch.notes,
            active: None,
        }
    }
}

pub struct PatientsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PatientsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(
        &self,
        now_utc: i64,
        owner: PractitionerId,
        input: ValidatedPatient,
    ) -> Result<Patient> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let patient = create_inner(&tx, now_utc, owner, input)?;
            tx.commit()?;
            Ok(patient)
        } else {
            create_inner(self.conn, now_utc, owner, input)
        }
    }

    /// Unscoped lookup; callers acting for a practitioner use `get_for_owner`.
    pub fn get(&self, id: PatientId) -> Result<Option<Patient>> {
        get_inner(self.conn, id)
    }

    pub fn get_for_owner(&self, owner: PractitionerId, id: PatientId) -> Result<Option<Patient>> {
        Ok(get_inner(self.conn, id)?.filter(|patient| patient.practitioner_id == owner))
    }

    pub fn find_by_cpf(&self, cpf: &str) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE cpf = ?1;");
        self.conn
            .query_row(&sql, [cpf], |row| Ok(patient_from_row(row)))
            .optional()?
            .transpose()
    }

    pub fn update(
        &self,
        now_utc: i64,
        owner: PractitionerId,
        id: PatientId,
        update: PatientUpdate,
    ) -> Result<Patient> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let patient = update_inner(&tx, now_utc, owner, id, update)?;
            tx.commit()?;
            Ok(patient)
        } else {
            update_inner(self.conn, now_utc, owner, id, update)
        }
    }

    pub fn set_active(
        &self,
        now_utc: i64,
        owner: PractitionerId,
        id: PatientId,
        active: bool,
    ) -> Result<Patient> {
        let update = PatientUpdate {
            active: Some(active),
            ..Default::default()
        };
        self.update(now_utc, owner, id, update)
    }

    /// Deletes the patient and its attachment rows, returning the removed
    /// attachments so their files can be cleaned up.
    pub fn delete(&self, owner: PractitionerId, id: PatientId) -> Result<Vec<Attachment>> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let removed = delete_inner(&tx, owner, id)?;
            tx.commit()?;
            Ok(removed)
        } else {
            delete_inner(self.conn, owner, id)
        }
    }

    /// The practitioner's patients, newest registration first.
    pub fn list_for_owner(
        &self,
        owner: PractitionerId,
        include_inactive: bool,
    ) -> Result<Vec<Patient>> {
        let sql = format!(
            "SELECT {PATIENT_COLUMNS}
             FROM patients
             WHERE practitioner_id = ?1
               AND (?2 OR active = 1)
             ORDER BY created_at DESC, rowid DESC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![owner.to_string(), include_inactive])?;
        let mut patients = Vec::new();
        while let Some(row) = rows.next()? {
            patients.push(patient_from_row(row)?);
        }
        Ok(patients)
    }

    /// Scoped listing filtered by a free-text query over name, CPF and phone.
    pub fn search(
        &self,
        owner: PractitionerId,
        query: &str,
        include_inactive: bool,
    ) -> Result<Vec<Patient>> {
        let patients = self.list_for_owner(owner, include_inactive)?;
        Ok(filter_records(&patients, query)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn count_active(&self, owner: PractitionerId) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE practitioner_id = ?1 AND active = 1;",
            [owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn get_inner(conn: &Connection, id: PatientId) -> Result<Option<Patient>> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1;");
    conn.query_row(&sql, [id.to_string()], |row| Ok(patient_from_row(row)))
        .optional()?
        .transpose()
}

fn ensure_cpf_available(conn: &Connection, cpf: &str, current: Option<PatientId>) -> Result<()> {
    let holder: Option<String> = conn
        .query_row("SELECT id FROM patients WHERE cpf = ?1;", [cpf], |row| {
            row.get(0)
        })
        .optional()?;
    match holder {
        Some(holder) if current.map(|id| id.to_string()) != Some(holder.clone()) => {
            Err(StoreError::DuplicateCpf(cpf.to_string()))
        }
        _ => Ok(()),
    }
}

fn create_inner(
    conn: &Connection,
    now_utc: i64,
    owner: PractitionerId,
    input: ValidatedPatient,
) -> Result<Patient> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM practitioners WHERE id = ?1;",
            [owner.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Err(StoreError::NotFound(format!("practitioner {owner}")));
    }
    ensure_cpf_available(conn, &input.cpf, None)?;

    let patient = Patient {
        id: PatientId::new(),
        practitioner_id: owner,
        full_name: input.full_name,
        birth_date: input.birth_date,
        cpf: input.cpf,
        sex: input.sex,
        phone: input.phone,
        email: input.email,
        address: input.address,
        city: input.city,
        state: input.state,
        cep: input.cep,
        blood_type: input.blood_type,
        allergies: input.allergies,
        medications: input.medications,
        family_history: input.family_history,
        notes: input.notes,
        created_at: now_utc,
        updated_at: now_utc,
        active: true,
    };

    conn.execute(
        &format!(
            "INSERT INTO patients ({PATIENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20);"
        ),
        params![
            patient.id.to_string(),
            patient.practitioner_id.to_string(),
            patient.full_name,
            patient.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            patient.cpf,
            patient.sex.as_str(),
            patient.phone,
            patient.email,
            patient.address,
            patient.city,
            patient.state,
            patient.cep,
            patient.blood_type.map(BloodType::as_str),
            patient.allergies,
            patient.medications,
            patient.family_history,
            patient.notes,
            patient.created_at,
            patient.updated_at,
            patient.active,
        ],
    )?;

    Ok(patient)
}

fn update_inner(
    conn: &Connection,
    now_utc: i64,
    owner: PractitionerId,
    id: PatientId,
    update: PatientUpdate,
) -> Result<Patient> {
    let mut patient = get_inner(conn, id)?
        .filter(|patient| patient.practitioner_id == owner)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    if let Some(cpf) = update.cpf {
        ensure_cpf_available(conn, &cpf, Some(patient.id))?;
        patient.cpf = cpf;
    }
    if let Some(value) = update.full_name {
        patient.full_name = value;
    }
    if let Some(value) = update.birth_date {
        patient.birth_date = value;
    }
    if let Some(value) = update.sex {
        patient.sex = value;
    }
    if let Some(value) = update.phone {
        patient.phone = value;
    }
    if let Some(value) = update.email {
        patient.email = value;
    }
    if let Some(value) = update.address {
        patient.address = value;
    }
    if let Some(value) = update.city {
        patient.city = value;
    }
    if let Some(value) = update.state {
        patient.state = value;
    }
    if let Some(value) = update.cep {
        patient.cep = value;
    }
    if let Some(value) = update.blood_type {
        patient.blood_type = value;
    }
    if let Some(value) = update.allergies {
        patient.allergies = value;
    }
    if let Some(value) = update.medications {
        patient.medications = value;
    }
    if let Some(value) = update.family_history {
        patient.family_history = value;
    }
    if let Some(value) = update.notes {
        patient.notes = value;
    }
    if let Some(value) = update.active {
        patient.active = value;
    }
    patient.updated_at = now_utc;

    conn.execute(
        "UPDATE patients SET full_name = ?2, birth_date = ?3, cpf = ?4, sex = ?5, phone = ?6, email = ?7, address = ?8, city = ?9, state = ?10, cep = ?11, blood_type = ?12, allergies = ?13, medications = ?14, family_history = ?15, notes = ?16, updated_at = ?17, active = ?18
         WHERE id = ?1;",
        params![
            patient.id.to_string(),
            patient.full_name,
            patient.birth_date.format(BIRTH_DATE_FORMAT).to_string(),
            patient.cpf,
            patient.sex.as_str(),
            patient.phone,
            patient.email,
            patient.address,
            patient.city,
            patient.state,
            patient.cep,
            patient.blood_type.map(BloodType::as_str),
            patient.allergies,
            patient.medications,
            patient.family_history,
            patient.notes,
            patient.updated_at,
            patient.active,
        ],
    )?;

    Ok(patient)
}

fn delete_inner(conn: &Connection, owner: PractitionerId, id: PatientId) -> Result<Vec<Attachment>> {
    let patient = get_inner(conn, id)?
        .filter(|patient| patient.practitioner_id == owner)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let attachments = list_for_patient_inner(conn, patient.id)?;
    conn.execute("DELETE FROM patients WHERE id = ?1;", [patient.id.to_string()])?;
    Ok(attachments)
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Patient> {
    let id_str: String = row.get(0)?;
    let id = PatientId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    let owner_str: String = row.get(1)?;
    let practitioner_id = PractitionerId::from_str(&owner_str)
        .map_err(|_| StoreError::InvalidId(owner_str.clone()))?;
    let birth_str: String = row.get(3)?;
    let birth_date = NaiveDate::parse_from_str(&birth_str, BIRTH_DATE_FORMAT)
        .map_err(|_| StoreError::InvalidValue(format!("birth_date {birth_str}")))?;
    let sex_str: String = row.get(5)?;
    let sex =
        Sex::from_str(&sex_str).map_err(|_| StoreError::InvalidValue(format!("sex {sex_str}")))?;
    let blood_str: Option<String> = row.get(12)?;
    let blood_type = blood_str
        .map(|raw| {
            BloodType::from_str(&raw)
                .map_err(|_| StoreError::InvalidValue(format!("blood_type {raw}")))
        })
        .transpose()?;

    Ok(Patient {
        id,
        practitioner_id,
        full_name: row.get(2)?,
        birth_date,
        cpf: row.get(4)?,
        sex,
        phone: row.get(6)?,
        email: row.get(7)?,
        address: row.get(8)?,
        city: row.get(9)?,
        state: row.get(10)?,
        cep: row.get(11)?,
        blood_type,
        allergies: row.get(13)?,
        medications: row.get(14)?,
        family_history: row.get(15)?,
        notes: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
        active: row.get(19)?,
    })
}
