use crate::error::{invalid_input, not_found};
use anyhow::Result;
use prontuario_config::AppConfig;
use prontuario_core::domain::Practitioner;
use prontuario_store::{paths, Store};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod attachments;
pub mod backup;
pub mod cep;
pub mod check;
pub mod completions;
pub mod patients;
pub mod practitioners;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
    pub db_path: &'a Path,
    /// `--practitioner` flag, taking precedence over the config file.
    pub practitioner: Option<&'a str>,
}

impl Context<'_> {
    /// The practitioner on whose behalf patient commands act.
    pub fn acting_practitioner(&self) -> Result<Practitioner> {
        let username = self
            .practitioner
            .or(self.config.practitioner.as_deref())
            .ok_or_else(|| {
                invalid_input("no practitioner selected: pass --practitioner or set it in config")
            })?;
        let practitioner = self
            .store
            .practitioners()
            .get_by_username(username)?
            .ok_or_else(|| not_found(format!("practitioner {username}")))?;
        debug!(username = %practitioner.username, "acting practitioner");
        Ok(practitioner)
    }

    pub fn attachments_root(&self) -> PathBuf {
        paths::attachments_dir(self.db_path)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
