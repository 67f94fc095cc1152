//! Config resolution: CLI path → `XRT_CONFIG` → XDG config dir → defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::pipeline::{ConfigError, PipelineConfig};
use crate::validate::validate;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "XRT_CONFIG";

/// Directory under the user config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "xrt-timing";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(p) => write!(f, "--config {}", p.display()),
            ConfigSource::Env(p) => write!(f, "{CONFIG_ENV_VAR}={}", p.display()),
            ConfigSource::Xdg(p) => write!(f, "{}", p.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// A validated configuration and its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: PipelineConfig,
    pub source: ConfigSource,
}

/// Load a config file, picking the format from its extension.
///
/// `.json` is parsed as JSON, anything else as TOML.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve the configuration from the process environment.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let xdg = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME));
    resolve_config_from(explicit, env.as_deref(), xdg.as_deref())
}

/// Resolve with the environment lookups supplied by the caller.
///
/// An explicit path must exist. Implicit locations that do not exist are
/// skipped.
pub fn resolve_config_from(
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    xdg_dir: Option<&Path>,
) -> Result<ResolvedConfig, ConfigError> {
    let (config, source) = if let Some(path) = explicit {
        (load_config_file(path)?, ConfigSource::Explicit(path.to_path_buf()))
    } else if let Some(path) = env_path.filter(|p| p.is_file()) {
        (load_config_file(path)?, ConfigSource::Env(path.to_path_buf()))
    } else if let Some(path) = xdg_dir.map(|d| d.join(CONFIG_FILE_NAME)).filter(|p| p.is_file())
    {
        let config = load_config_file(&path)?;
        (config, ConfigSource::Xdg(path))
    } else {
        (PipelineConfig::default(), ConfigSource::Defaults)
    };

    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(ResolvedConfig { config, source })
}
