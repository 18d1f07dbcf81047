use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use panelcount_core::delivery::DEFAULT_ORIGIN;
use panelcount_core::{CollectorEndpoint, CoreError};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "panelcount";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_USER_AGENT: &str = "panelcount";

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub dispatch: DispatchConfig,
    pub collectors: Vec<CollectorEndpoint>,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub origin: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl AppConfig {
    pub fn collector(&self, name: &str) -> Option<&CollectorEndpoint> {
        self.collectors
            .iter()
            .find(|collector| collector.name == name)
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
    #[error("invalid dispatch timeout_secs value: {0}")]
    InvalidTimeout(u64),
    #[error("invalid dispatch {field}: value cannot be empty")]
    EmptyDispatchField { field: &'static str },
    #[error("invalid collector name: {0}")]
    InvalidCollectorName(String),
    #[error("duplicate collector name: {0}")]
    DuplicateCollectorName(String),
    #[error("invalid collector {name} url: {url}")]
    InvalidCollectorUrl { name: String, url: String },
    #[error("invalid collector {name} path: {path}")]
    InvalidCollectorPath { name: String, path: String },
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
    dispatch: Option<DispatchFile>,
    #[serde(default)]
    collectors: Vec<CollectorFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DispatchFile {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    origin: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectorFile {
    name: String,
    url: String,
    path: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
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

    if let Some(dispatch) = parsed.dispatch {
        if let Some(timeout) = dispatch.timeout_secs {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(timeout));
            }
            config.dispatch.timeout = Duration::from_secs(timeout);
        }
        if let Some(user_agent) = dispatch.user_agent {
            config.dispatch.user_agent = non_empty(user_agent, "user_agent")?;
        }
        if let Some(origin) = dispatch.origin {
            config.dispatch.origin = non_empty(origin, "origin")?;
        }
    }

    let mut seen = HashSet::new();
    for collector in parsed.collectors {
        let endpoint = parse_collector(collector)?;
        if !seen.insert(endpoint.name.clone()) {
            return Err(ConfigError::DuplicateCollectorName(endpoint.name));
        }
        config.collectors.push(endpoint);
    }

    Ok(config)
}

fn parse_collector(collector: CollectorFile) -> Result<CollectorEndpoint> {
    let CollectorFile { name, url, path } = collector;
    let url = url.trim().to_string();
    let valid_url = Url::parse(&url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
        .unwrap_or(false);
    if !valid_url {
        return Err(ConfigError::InvalidCollectorUrl {
            name: name.trim().to_string(),
            url,
        });
    }

    CollectorEndpoint::new(name.clone(), url, path).map_err(|err| match err {
        CoreError::InvalidCollectorPath(path) => ConfigError::InvalidCollectorPath {
            name: name.trim().to_string(),
            path,
        },
        _ => ConfigError::InvalidCollectorName(name),
    })
}

fn non_empty(value: String, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyDispatchField { field });
    }
    Ok(trimmed.to_string())
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
