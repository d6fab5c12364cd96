use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use prontuario_core::domain::normalize_username;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "prontuario";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_POSTAL_BASE_URL: &str = "https://viacep.com.br/ws";
pub const DEFAULT_POSTAL_TIMEOUT_SECS: u64 = 10;
pub const MAX_POSTAL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Username of the practitioner acting when `--practitioner` is not given.
    pub practitioner: Option<String>,
    pub postal_lookup: PostalLookupConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalLookupConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PostalLookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_POSTAL_BASE_URL.to_string(),
            timeout_secs: DEFAULT_POSTAL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid practitioner username: {0}")]
    InvalidPractitioner(String),
    #[error("invalid postal_lookup.base_url value: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid postal_lookup.timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    practitioner: Option<String>,
    postal_lookup: Option<PostalLookupFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostalLookupFile {
    enabled: Option<bool>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Loads the config file. A missing default file yields the defaults; an
/// explicitly requested file must exist.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(practitioner) = parsed.practitioner {
        let username = normalize_username(&practitioner)
            .map_err(|_| ConfigError::InvalidPractitioner(practitioner.clone()))?;
        config.practitioner = Some(username);
    }

    if let Some(lookup) = parsed.postal_lookup {
        if let Some(enabled) = lookup.enabled {
            config.postal_lookup.enabled = enabled;
        }
        if let Some(base_url) = lookup.base_url {
            let trimmed = base_url.trim().trim_end_matches('/');
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://"))
                || trimmed.contains(char::is_whitespace)
            {
                return Err(ConfigError::InvalidBaseUrl(base_url));
            }
            config.postal_lookup.base_url = trimmed.to_string();
        }
        if let Some(timeout) = lookup.timeout_secs {
            if timeout == 0 || timeout > MAX_POSTAL_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.postal_lookup.timeout_secs = timeout;
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        load, load_at_path, merge_config, ConfigError, ConfigFile, PostalLookupFile,
        DEFAULT_POSTAL_BASE_URL,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            practitioner: Some(" DrSilva ".to_string()),
            postal_lookup: Some(PostalLookupFile {
                enabled: Some(false),
                base_url: Some("http://localhost:8080/ws/".to_string()),
                timeout_secs: Some(3),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.practitioner.as_deref(), Some("drsilva"));
        assert!(!merged.postal_lookup.enabled);
        assert_eq!(merged.postal_lookup.base_url, "http://localhost:8080/ws");
        assert_eq!(merged.postal_lookup.timeout_secs, 3);
    }

    #[test]
    fn merge_config_rejects_bad_values() {
        let parsed = ConfigFile {
            practitioner: Some("dr silva".to_string()),
            postal_lookup: None,
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidPractitioner(_))
        ));

        let parsed = ConfigFile {
            practitioner: None,
            postal_lookup: Some(PostalLookupFile {
                enabled: None,
                base_url: Some("viacep.com.br".to_string()),
                timeout_secs: None,
            }),
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let parsed = ConfigFile {
            practitioner: None,
            postal_lookup: Some(PostalLookupFile {
                enabled: None,
                base_url: None,
                timeout_secs: Some(0),
            }),
        };
        assert!(matches!(
            merge_config(parsed),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
        assert!(load_at_path(&missing, false).expect("optional").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "practitioner = \"drsilva\"\n[postal_lookup]\ntimeout_secs = 5\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load(Some(path)).expect("load");
        assert_eq!(config.practitioner.as_deref(), Some("drsilva"));
        assert!(config.postal_lookup.enabled);
        assert_eq!(config.postal_lookup.base_url, DEFAULT_POSTAL_BASE_URL);
        assert_eq!(config.postal_lookup.timeout_secs, 5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "practitioner = \"drsilva\"\ntheme = \"dark\"\n").expect("write");
        restrict_permissions(&path);
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn world_readable_config_is_refused() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "practitioner = \"drsilva\"\n").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
