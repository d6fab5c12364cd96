mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{
    attachments, backup, cep, check, completions, patients, practitioners, Context,
};
use crate::error::{exit_code_for, report_error};
use prontuario_config as config;
use prontuario_config::AppConfig;
use prontuario_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "prontuario", version, about = "Patient records for practitioners")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Username of the acting practitioner (overrides config)
    #[arg(long, global = true)]
    practitioner: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Practitioner(practitioners::PractitionerCommand),
    #[command(name = "add-patient")]
    AddPatient(patients::AddPatientArgs),
    #[command(name = "edit-patient")]
    EditPatient(patients::EditPatientArgs),
    Show(patients::ShowArgs),
    List(patients::ListArgs),
    #[command(name = "deactivate-patient")]
    DeactivatePatient(patients::ToggleArgs),
    #[command(name = "reactivate-patient")]
    ReactivatePatient(patients::ToggleArgs),
    Delete(patients::DeleteArgs),
    Attach(attachments::AttachArgs),
    Detach(attachments::DetachArgs),
    /// Validate and normalize field values without saving
    Check(check::CheckArgs),
    /// Look up an address by CEP
    Cep(cep::CepArgs),
    Backup(backup::BackupArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        practitioner,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Check(args) => check::check(json, args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
                    Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }
            match command {
                Command::Cep(args) => cep::cep(&app_config, json, args),
                command => run_with_store(db_path, json, practitioner, &app_config, command),
            }
        }
    }
}

fn run_with_store(
    db_path: Option<PathBuf>,
    json: bool,
    practitioner: Option<String>,
    app_config: &AppConfig,
    command: Command,
) -> Result<()> {
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store = Store::open(&db_path)
        .with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: app_config,
        db_path: &db_path,
        practitioner: practitioner.as_deref(),
    };

    match command {
        Command::Practitioner(cmd) => match cmd {
            practitioners::PractitionerCommand::Add(args) => {
                practitioners::add_practitioner(&ctx, args)
            }
            practitioners::PractitionerCommand::Ls => practitioners::list_practitioners(&ctx),
        },
        Command::AddPatient(args) => patients::add_patient(&ctx, args),
        Command::EditPatient(args) => patients::edit_patient(&ctx, args),
        Command::Show(args) => patients::show_patient(&ctx, args),
        Command::List(args) => patients::list_patients(&ctx, args),
        Command::DeactivatePatient(args) => patients::set_patient_active(&ctx, args, false),
        Command::ReactivatePatient(args) => patients::set_patient_active(&ctx, args, true),
        Command::Delete(args) => patients::delete_patient(&ctx, args),
        Command::Attach(args) => attachments::attach(&ctx, args),
        Command::Detach(args) => attachments::detach(&ctx, args),
        Command::Backup(args) => backup::backup(&ctx, args),
        Command::Check(_) | Command::Cep(_) | Command::Completions(_) => {
            unreachable!("command handled before store initialization")
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
