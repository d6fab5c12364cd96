use crate::commands::{print_json, Context};
use crate::util::{format_timestamp_date, now_utc};
use anyhow::Result;
use clap::{Args, Subcommand};
use prontuario_core::dto::PractitionerDto;
use prontuario_store::repo::PractitionerNew;

#[derive(Debug, Subcommand)]
pub enum PractitionerCommand {
    Add(AddPractitionerArgs),
    Ls,
}

#[derive(Debug, Args)]
pub struct AddPractitionerArgs {
    #[arg(long)]
    pub username: String,
    /// Display name, e.g. "Dra. Maria Souza"
    #[arg(long)]
    pub name: Option<String>,
}

pub fn add_practitioner(ctx: &Context<'_>, args: AddPractitionerArgs) -> Result<()> {
    let practitioner = ctx.store.practitioners().create(
        now_utc(),
        PractitionerNew {
            username: args.username,
            display_name: args.name,
        },
    )?;

    if ctx.json {
        print_json(&PractitionerDto::from(&practitioner))?;
    } else {
        println!("created {} {}", practitioner.id, practitioner.username);
    }
    Ok(())
}

pub fn list_practitioners(ctx: &Context<'_>) -> Result<()> {
    let practitioners = ctx.store.practitioners().list()?;
    if ctx.json {
        let items: Vec<PractitionerDto> = practitioners.iter().map(PractitionerDto::from).collect();
        return print_json(&items);
    }

    if practitioners.is_empty() {
        println!("no practitioners");
        return Ok(());
    }
    for practitioner in practitioners {
        println!(
            "{}  {}  {}  since {}",
            practitioner.id,
            practitioner.username,
            practitioner.display_name.as_deref().unwrap_or("-"),
            format_timestamp_date(practitioner.created_at)
        );
    }
    Ok(())
}
