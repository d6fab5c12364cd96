use crate::commands::print_json;
use crate::error::{invalid_input, not_found};
use anyhow::{Context as _, Result};
use clap::Args;
use prontuario_config::AppConfig;
use prontuario_core::postal::{Address, PostalLookup};
use prontuario_core::validation::validate_cep;
use prontuario_lookup::ViaCepClient;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Args)]
pub struct CepArgs {
    pub cep: String,
}

/// Postal lookup client built from `[postal_lookup]` in the config.
pub fn postal_client(config: &AppConfig) -> Result<ViaCepClient> {
    let settings = &config.postal_lookup;
    if !settings.enabled {
        return Err(invalid_input("postal lookup is disabled in config"));
    }
    let client = ViaCepClient::new(
        settings.base_url.clone(),
        Duration::from_secs(settings.timeout_secs),
    );
    debug!(base_url = client.base_url(), timeout = ?client.timeout(), "postal client");
    Ok(client)
}

/// Resolves an already validated CEP.
pub fn lookup_address(lookup: &impl PostalLookup, cep: &str) -> Result<Option<Address>> {
    debug!(cep, "postal lookup");
    lookup
        .lookup(cep)
        .with_context(|| format!("look up cep {cep}"))
}

pub fn cep(config: &AppConfig, json: bool, args: CepArgs) -> Result<()> {
    let cep = validate_cep(&args.cep)?;
    let client = postal_client(config)?;
    let address =
        lookup_address(&client, &cep)?.ok_or_else(|| not_found(format!("cep {cep}")))?;

    if json {
        return print_json(&address);
    }

    println!("cep: {}", address.cep);
    if !address.street.is_empty() {
        println!("street: {}", address.street);
    }
    if !address.neighborhood.is_empty() {
        println!("neighborhood: {}", address.neighborhood);
    }
    println!("city: {}", address.city);
    println!("state: {}", address.state);
    Ok(())
}
