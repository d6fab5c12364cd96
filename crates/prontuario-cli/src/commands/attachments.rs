use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::{format_timestamp_datetime, now_utc, parse_attachment_id, parse_patient_id};
use anyhow::{Context as _, Result};
use clap::Args;
use prontuario_core::domain::AttachmentKind;
use prontuario_core::dto::AttachmentDto;
use prontuario_store::files;
use prontuario_store::repo::AttachmentNew;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Args)]
pub struct AttachArgs {
    /// Patient id
    pub id: String,
    /// document (PDF) or photo (jpg, jpeg, png, gif)
    #[arg(long)]
    pub kind: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct DetachArgs {
    pub attachment_id: String,
}

pub fn attach(ctx: &Context<'_>, args: AttachArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let patient_id = parse_patient_id(&args.id)?;
    let kind = AttachmentKind::from_str(&args.kind)
        .map_err(|_| invalid_input(format!("invalid attachment kind: {}", args.kind)))?;
    let source = args.file;
    let attachment = ctx
        .store
        .attachments()
        .add(
            now_utc(),
            owner.id,
            &ctx.attachments_root(),
            AttachmentNew {
                patient_id,
                kind,
                title: args.title,
                description: args.description,
                source: source.clone(),
            },
        )
        .with_context(|| format!("attach {}", source.display()))?;

    if ctx.json {
        print_json(&AttachmentDto::from(&attachment))?;
    } else {
        println!(
            "attached {} {} {} ({})",
            attachment.id,
            attachment.kind.as_str(),
            attachment.file_path,
            format_timestamp_datetime(attachment.uploaded_at)
        );
    }
    Ok(())
}

pub fn detach(ctx: &Context<'_>, args: DetachArgs) -> Result<()> {
    let owner = ctx.acting_practitioner()?;
    let id = parse_attachment_id(&args.attachment_id)?;
    let attachment = ctx.store.attachments().delete(owner.id, id)?;

    if let Err(err) = files::remove_file(&ctx.attachments_root(), &attachment.file_path) {
        warn!(path = %attachment.file_path, error = %err, "failed to remove attachment file");
    }

    if ctx.json {
        print_json(&AttachmentDto::from(&attachment))?;
    } else {
        println!("detached {} {}", attachment.id, attachment.title);
    }
    Ok(())
}
