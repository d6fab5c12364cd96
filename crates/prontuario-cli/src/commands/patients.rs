use crate::commands::cep::{lookup_address, postal_client};
use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{
    format_date_br, format_timestamp_datetime, local_today, now_utc, or_dash, parse_patient_id,
};
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use prontuario_core::dto::{PatientDetailDto, PatientListDto, PatientListItemDto};
use prontuario_core::form::{PatientForm, PatientPatch};
use prontuario_core::validation::validate_cep;
use prontuario_store::files;
use prontuario_store::repo::PatientUpdate;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct AddPatientArgs {
    /// Full name (first and last name at least)
    #[arg(long)]
    pub name: Option<String>,
    /// YYYY-MM-DD or DD/MM/YYYY
    #[arg(long)]
    pub birth_date: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    /// M, F or O
    #[arg(long)]
    pub sex: Option<String>,
    /// Mobile number with area code, e.g. (11) 91234-5678
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub cep: Option<String>,
    #[arg(long)]
    pub blood_type: Option<String>,
    #[arg(long)]
    pub allergies: Option<String>,
    #[arg(long)]
    pub medications: Option<String>,
    #[arg(long)]
    pub family_history: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Fill empty address, city and state from the CEP
    #[arg(long, action = ArgAction::SetTrue)]
    pub lookup_address: bool,
}

#[derive(Debug, Args)]
pub struct EditPatientArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub birth_date: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Empty string clears the email
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub cep: Option<String>,
    /// Empty string clears the blood type
    #[arg(long)]
    pub blood_type: Option<String>,
    #[arg(long)]
    pub allergies: Option<String>,
    #[arg(long)]
    pub medications: Option<String>,
    #[arg(long)]
    pub family_history: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Matches name, CPF or phone; digits also match unformatted CPF/phone
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub include_inactive: bool,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

pub fn add_patient(ctx: &Context<'_>, args: AddPatientArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let lookup = args.lookup_address;
    let mut form = PatientForm {
        full_name: args.name.unwrap_or_default(),
        birth_date: args.birth_date.unwrap_or_default(),
        cpf: args.cpf.unwrap_or_default(),
        sex: args.sex.unwrap_or_default(),
        phone: args.phone.unwrap_or_default(),
        email: args.email,
        address: args.address.unwrap_or_default(),
        city: args.city.unwrap_or_default(),
        state: args.state.unwrap_or_default(),
        cep: args.cep.unwrap_or_default(),
        blood_type: args.blood_type,
        allergies: args.allergies.unwrap_or_default(),
        medications: args.medications.unwrap_or_default(),
        family_history: args.family_history.unwrap_or_default(),
        notes: args.notes.unwrap_or_default(),
    };

    if lookup {
        fill_address(ctx, &mut form)?;
    }

    let today = local_today();
    let input = form.validate(today)?;
    let patient = ctx
        .store
        .patients()
        .create(now_utc(), owner.id, input)
        .with_context(|| "create patient")?;

    if ctx.json {
        print_json(&PatientDetailDto::new(&patient, &[], today))?;
    } else {
        println!("created {} {}", patient.id, patient.full_name);
    }
    Ok(())
}

/// Best-effort: a failed or empty lookup leaves the form untouched.
fn fill_address(ctx: &Context<'_>, form: &mut PatientForm) -> Result<()> {
    let client = postal_client(ctx.config)?;
    let Ok(cep) = validate_cep(&form.cep) else {
        debug!("skipping address lookup for invalid cep");
        return Ok(());
    };
    match lookup_address(&client, &cep) {
        Ok(Some(address)) => form.fill_from_address(&address),
        Ok(None) => warn!(cep = %cep, "cep not found, address left as entered"),
        Err(err) => warn!(error = %format!("{err:#}"), "address lookup failed"),
    }
    Ok(())
}

pub fn edit_patient(ctx: &Context<'_>, args: EditPatientArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let id = parse_patient_id(&args.id)?;
    let patch = PatientPatch {
        full_name: args.name,
        birth_date: args.birth_date,
        cpf: args.cpf,
        sex: args.sex,
        phone: args.phone,
        email: args.email,
        address: args.address,
        city: args.city,
        state: args.state,
        cep: args.cep,
        blood_type: args.blood_type,
        allergies: args.allergies,
        medications: args.medications,
        family_history: args.family_history,
        notes: args.notes,
    };
    if patch.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let validated = patch.validate(local_today())?;
    let patient = ctx
        .store
        .patients()
        .update(now_utc(), owner.id, id, PatientUpdate::from(validated))
        .with_context(|| format!("update patient {id}"))?;

    if ctx.json {
        let attachments = ctx
            .store
            .attachments()
            .list_for_patient(owner.id, patient.id)?;
        print_json(&PatientDetailDto::new(&patient, &attachments, local_today()))?;
    } else {
        println!("updated {} {}", patient.id, patient.full_name);
    }
    Ok(())
}

pub fn show_patient(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let id = parse_patient_id(&args.id)?;
    let patient = ctx
        .store
        .patients()
        .get_for_owner(owner.id, id)?
        .ok_or_else(|| not_found("patient not found"))?;
    let attachments = ctx
        .store
        .attachments()
        .list_for_patient(owner.id, patient.id)?;
    let detail = PatientDetailDto::new(&patient, &attachments, local_today());

    if ctx.json {
        return print_json(&detail);
    }

    println!("id: {}", detail.id);
    println!("name: {}", detail.full_name);
    println!(
        "birth_date: {} ({} years)",
        format_date_br(detail.birth_date),
        detail.age
    );
    println!("cpf: {}", detail.cpf);
    println!("sex: {}", detail.sex.label());
    println!("phone: {}", detail.phone);
    if let Some(email) = detail.email.as_deref() {
        println!("email: {}", email);
    }
    println!(
        "address: {}, {} - {}, {}",
        detail.address, detail.city, detail.state, detail.cep
    );
    if let Some(blood_type) = detail.blood_type {
        println!("blood_type: {}", blood_type.as_str());
    }
    println!("allergies: {}", or_dash(&detail.allergies));
    println!("medications: {}", or_dash(&detail.medications));
    println!("family_history: {}", or_dash(&detail.family_history));
    println!("notes: {}", or_dash(&detail.notes));
    println!("active: {}", if detail.active { "yes" } else { "no" });
    println!(
        "created_at: {}",
        format_timestamp_datetime(detail.created_at)
    );
    println!(
        "updated_at: {}",
        format_timestamp_datetime(detail.updated_at)
    );

    for (label, items) in [("documents", &detail.documents), ("photos", &detail.photos)] {
        if items.is_empty() {
            println!("{label}: none");
            continue;
        }
        println!("{label}:");
        for item in items {
            println!(
                "  {}  {}  {}  {}",
                item.id,
                format_timestamp_datetime(item.uploaded_at),
                item.title,
                item.file_path
            );
        }
    }

    Ok(())
}

pub fn list_patients(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let query = args.search.as_deref().unwrap_or_default();
    let patients = ctx
        .store
        .patients()
        .search(owner.id, query, args.include_inactive)?;
    let total_active = ctx.store.patients().count_active(owner.id)?;

    let today = local_today();
    let listing = PatientListDto {
        total_active,
        patients: patients
            .iter()
            .map(|patient| PatientListItemDto::from_patient(patient, today))
            .collect(),
    };

    if ctx.json {
        return print_json(&listing);
    }

    if listing.patients.is_empty() {
        println!("no patients ({} active)", listing.total_active);
        return Ok(());
    }

    for item in &listing.patients {
        let status = if item.active { "" } else { "  [inactive]" };
        println!(
            "{}  {}  {}  {}  {}y{}",
            item.id, item.full_name, item.cpf, item.phone, item.age, status
        );
    }
    println!(
        "{} shown, {} active",
        listing.patients.len(),
        listing.total_active
    );
    Ok(())
}

pub fn set_patient_active(ctx: &Context<'_>, args: ToggleArgs, active: bool) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let id = parse_patient_id(&args.id)?;
    let patient = ctx
        .store
        .patients()
        .set_active(now_utc(), owner.id, id, active)?;

    if ctx.json {
        print_json(&PatientListItemDto::from_patient(&patient, local_today()))?;
    } else {
        let verb = if active { "reactivated" } else { "deactivated" };
        println!("{} {} {}", verb, patient.id, patient.full_name);
    }
    Ok(())
}

pub fn delete_patient(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let id = parse_patient_id(&args.id)?;
    let removed = ctx.store.patients().delete(owner.id, id)?;

    let root = ctx.attachments_root();
    for attachment in &removed {
        if let Err(err) = files::remove_file(&root, &attachment.file_path) {
            warn!(path = %attachment.file_path, error = %err, "failed to remove attachment file");
        }
    }

    if ctx.json {
        print_json(&serde_json::json!({
            "id": id,
            "attachments_removed": removed.len(),
        }))?;
    } else {
        println!("deleted {}", id);
    }
    Ok(())
}
