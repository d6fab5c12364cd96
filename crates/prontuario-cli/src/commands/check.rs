use crate::commands::print_json;
use crate::error::invalid_input;
use crate::util::local_today;
use anyhow::Result;
use clap::Args;
use prontuario_core::dto::FieldCheckDto;
use prontuario_core::validation::{
    parse_birth_date, validate_birth_date, validate_cep, validate_cpf, validate_name,
    validate_phone, Field,
};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub cpf: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub cep: Option<String>,
    #[arg(long)]
    pub birth_date: Option<String>,
}

pub fn check(json: bool, args: CheckArgs) -> Result<()> {
    let today = local_today();
    let mut results = Vec::new();

    if let Some(raw) = args.name.as_deref() {
        results.push(FieldCheckDto::from_result(
            Field::FullName,
            raw,
            validate_name(raw),
        ));
    }
    if let Some(raw) = args.birth_date.as_deref() {
        let normalized = parse_birth_date(raw)
            .and_then(|date| validate_birth_date(date, today))
            .map(|date| date.format("%Y-%m-%d").to_string());
        results.push(FieldCheckDto::from_result(Field::BirthDate, raw, normalized));
    }
    if let Some(raw) = args.cpf.as_deref() {
        results.push(FieldCheckDto::from_result(Field::Cpf, raw, validate_cpf(raw)));
    }
    if let Some(raw) = args.phone.as_deref() {
        results.push(FieldCheckDto::from_result(
            Field::Phone,
            raw,
            validate_phone(raw),
        ));
    }
    if let Some(raw) = args.cep.as_deref() {
        results.push(FieldCheckDto::from_result(Field::Cep, raw, validate_cep(raw)));
    }

    if results.is_empty() {
        return Err(invalid_input(
            "nothing to check: pass --name, --cpf, --phone, --cep or --birth-date",
        ));
    }

    if json {
        print_json(&results)?;
    } else {
        for result in &results {
            match (&result.normalized, &result.error) {
                (Some(normalized), _) => println!("{}: {}", result.field, normalized),
                (None, Some(error)) => {
                    println!("{}: invalid ({}): {}", result.field, error.reason, error.message)
                }
                (None, None) => {}
            }
        }
    }

    let failed = results.iter().filter(|result| !result.is_valid()).count();
    if failed > 0 {
        return Err(invalid_input(format!("{failed} field(s) failed validation")));
    }
    Ok(())
}
