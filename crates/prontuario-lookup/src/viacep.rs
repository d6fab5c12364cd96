use crate::Result;
use prontuario_core::postal::{Address, PostalLookup};
use std::time::Duration;

#[cfg(feature = "viacep")]
mod imp {
    use super::{Address, Duration, Result};
    use crate::response::parse_viacep_response;
    use prontuario_core::postal::LookupError;
    use prontuario_core::validation::{digits_only, validate_cep};
    use reqwest::blocking::Client;
    use url::Url;

    pub fn fetch_address(base_url: &str, timeout: Duration, cep: &str) -> Result<Option<Address>> {
        let digits = digits_only(&validate_cep(cep)?);
        let url = Url::parse(&format!("{}/{}/json/", base_url.trim_end_matches('/'), digits))
            .map_err(|err| LookupError::Request(format!("invalid lookup url: {err}")))?;

        let client = Client::builder()
            .user_agent(concat!("prontuario/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(request_error)?;

        let body = client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(request_error)?;

        parse_viacep_response(&body)
    }

    fn request_error(err: reqwest::Error) -> LookupError {
        LookupError::Request(err.to_string())
    }
}

#[cfg(not(feature = "viacep"))]
mod imp {
    use super::{Address, Duration, Result};
    use prontuario_core::postal::LookupError;

    pub fn fetch_address(
        _base_url: &str,
        _timeout: Duration,
        _cep: &str,
    ) -> Result<Option<Address>> {
        Err(LookupError::Unavailable(
            "postal lookup requires the viacep feature".to_string(),
        ))
    }
}

/// HTTP client for the ViaCEP service (`{base_url}/{digits}/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    base_url: String,
    timeout: Duration,
}

impl ViaCepClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl PostalLookup for ViaCepClient {
    fn lookup(&self, cep: &str) -> Result<Option<Address>> {
        imp::fetch_address(&self.base_url, self.timeout, cep)
    }
}

#[cfg(test)]
mod tests {
    use super::ViaCepClient;
    use prontuario_core::postal::{LookupError, PostalLookup};
    use std::time::Duration;

    #[test]
    fn malformed_cep_fails_before_any_request() {
        let client = ViaCepClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        let err = client.lookup("123").unwrap_err();
        let expected = if cfg!(feature = "viacep") {
            matches!(err, LookupError::Validation(_))
        } else {
            matches!(err, LookupError::Unavailable(_))
        };
        assert!(expected, "{err}");
    }
}
