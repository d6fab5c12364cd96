use crate::Result;
use prontuario_core::postal::{Address, LookupError};
use prontuario_core::validation::validate_cep;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ViaCepBody {
    cep: Option<String>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    erro: Option<Value>,
}

/// Parses a ViaCEP JSON body. The service answers unknown codes with
/// `{"erro": true}` (older deployments send the string `"true"`), which
/// maps to `Ok(None)`.
pub fn parse_viacep_response(body: &str) -> Result<Option<Address>> {
    let parsed: ViaCepBody =
        serde_json::from_str(body).map_err(|err| LookupError::Parse(err.to_string()))?;

    let not_found = match &parsed.erro {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
        _ => false,
    };
    if not_found {
        return Ok(None);
    }

    let cep = parsed
        .cep
        .ok_or_else(|| LookupError::Parse("missing cep".to_string()))?;
    let cep = validate_cep(&cep)?;

    Ok(Some(Address {
        cep,
        street: parsed.logradouro.trim().to_string(),
        neighborhood: parsed.bairro.trim().to_string(),
        city: parsed.localidade.trim().to_string(),
        state: parsed.uf.trim().to_ascii_uppercase(),
    }))
}
