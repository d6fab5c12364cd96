use crate::commands::{print_json, Context};
use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Args;
use prontuario_store::backup::BackupSummary;
use prontuario_store::error::StoreError;
use prontuario_store::paths;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Defaults to backups/prontuario-<timestamp>.sqlite3 next to the database
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BackupReport {
    output: String,
    size_bytes: u64,
    schema_version: i64,
    patients: i64,
    attachments: i64,
}

impl From<&BackupSummary> for BackupReport {
    fn from(summary: &BackupSummary) -> Self {
        Self {
            output: summary.path.display().to_string(),
            size_bytes: summary.size_bytes,
            schema_version: summary.schema_version,
            patients: summary.patients,
            attachments: summary.attachments,
        }
    }
}

pub fn backup(ctx: &Context<'_>, args: BackupArgs) -> Result<()> {
    let out = args.out.unwrap_or_else(|| {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        paths::backup_path(ctx.db_path, &stamp)
    });
    debug!(path = %out.display(), "writing backup");

    let summary = match ctx.store.backup_to(&out) {
        Ok(summary) => summary,
        Err(err @ StoreError::InvalidBackupPath(_)) => {
            return Err(err).with_context(|| {
                format!("refusing to overwrite the live database: {}", out.display())
            })
        }
        Err(err) => {
            return Err(err).with_context(|| format!("backup database to {}", out.display()))
        }
    };

    if ctx.json {
        return print_json(&BackupReport::from(&summary));
    }

    println!(
        "backup written to {} ({} bytes, {} patients, {} attachments)",
        summary.path.display(),
        summary.size_bytes,
        summary.patients,
        summary.attachments
    );
    println!(
        "attachment files are not included; copy {} separately",
        ctx.attachments_root().display()
    );
    Ok(())
}
