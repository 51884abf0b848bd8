//! TOML-based configuration for quill.
//!
//! Supports a config file (quill.toml) with environment variable expansion
//! in paths.
//!
//! Example configuration:
//! ```toml
//! # Entity definitions, see `metadata::Catalog`
//! catalog = "${APP_ROOT}/entities.toml"
//!
//! [query]
//! strict = true
//! root_alias = "u"
//! alias_prefix = "j"
//! parameter_prefix = "arg"
//! dialect = "postgres"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::metadata::{Catalog, CatalogError};
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid entity catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Path to an entity catalog TOML file (supports ${ENV_VAR} expansion).
    pub catalog: Option<String>,

    /// Defaults for every query built from these settings.
    pub query: QueryOptions,
}

/// Per-query behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Record the first unmodeled access or misuse and fail the next
    /// terminal operation with it. Off by default: such accesses are no-ops.
    pub strict: bool,

    /// Alias of the root entity.
    pub root_alias: String,

    /// Prefix for generated join aliases (`t1`, `t2`, …).
    pub alias_prefix: String,

    /// Prefix for generated parameter names (`p0`, `p1`, …).
    pub parameter_prefix: String,

    /// Dialect used for rendering.
    pub dialect: Dialect,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            strict: false,
            root_alias: "t0".to_string(),
            alias_prefix: "t".to_string(),
            parameter_prefix: "p".to_string(),
            dialect: Dialect::Generic,
        }
    }
}

impl QueryOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn root_alias(mut self, alias: &str) -> Self {
        self.root_alias = alias.into();
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `QUILL_CONFIG`
    /// 2. `./quill.toml`
    /// 3. `~/.config/quill/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("QUILL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("quill.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("quill").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Load the configured entity catalog, if any.
    pub fn load_catalog(&self) -> Result<Option<Catalog>, SettingsError> {
        let Some(path) = &self.catalog else {
            return Ok(None);
        };
        let path = PathBuf::from(expand_env_vars(path)?);
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path));
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(Catalog::from_toml_str(&content)?))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
