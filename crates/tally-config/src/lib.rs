// crates/tally-config/src/lib.rs
// ============================================================================
// Module: Tally Configuration
// Description: Canonical configuration model and validation for Tally.
// Purpose: Load, validate, and expose runtime configuration.
// Dependencies: tally-core, tally-store-sqlite, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! `tally-config` defines the TOML configuration surface for a Tally
//! deployment: the store backend, the write-role gate, and the bill
//! generator. Loading is strict and fail-closed: unknown top-level fields,
//! oversized files, and invalid values are rejected before any store opens.
//!
//! Security posture: configuration files are untrusted input; all limits are
//! enforced before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use serde::Deserialize;
use tally_core::DEFAULT_WRITE_ROLES;
use tally_core::RoleName;
use tally_store_sqlite::SqliteStoreConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration file path when none is supplied.
const DEFAULT_CONFIG_PATH: &str = "tally.toml";
/// Maximum accepted configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum length of a single config path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default generation backfill horizon in days.
const DEFAULT_HORIZON_DAYS: u32 = 365;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Messages identify the offending field without echoing file contents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file could not be parsed as TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config contents failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Top-level Tally configuration.
///
/// # Invariants
/// - Unknown top-level fields are rejected at parse time.
/// - `validate` passes before the configuration is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Store backend configuration.
    pub store: SqliteStoreConfig,
    /// Write-role gate configuration.
    #[serde(default)]
    pub authz: AuthzConfig,
    /// Bill generator configuration.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Write-role gate configuration.
///
/// # Invariants
/// - `write_roles` is non-empty after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfig {
    /// Role names that qualify a caller for mutating operations.
    #[serde(default = "default_write_roles")]
    pub write_roles: Vec<String>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            write_roles: default_write_roles(),
        }
    }
}

impl AuthzConfig {
    /// Returns the configured qualifying roles as domain names.
    #[must_use]
    pub fn role_names(&self) -> Vec<RoleName> {
        self.write_roles.iter().map(|name| RoleName::new(name.as_str())).collect()
    }
}

/// Returns the default qualifying write roles.
fn default_write_roles() -> Vec<String> {
    DEFAULT_WRITE_ROLES.iter().map(|name| (*name).to_string()).collect()
}

/// Bill generator configuration.
///
/// # Invariants
/// - `horizon_days` is greater than zero after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Backfill window length in days for each generation run.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

/// Returns the default backfill horizon.
const fn default_horizon_days() -> u32 {
    DEFAULT_HORIZON_DAYS
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl TallyConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// `path` defaults to `tally.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path fails safety limits, the file
    /// cannot be read, the TOML does not parse, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        validate_config_path(path)?;
        let metadata =
            std::fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid(format!(
                "config file exceeds size limit: {} bytes (max {MAX_CONFIG_BYTES})",
                metadata.len()
            )));
        }
        let bytes = std::fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(&text)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the TOML does not parse or validation
    /// fails.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field-level invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        if self.authz.write_roles.is_empty() {
            return Err(ConfigError::Invalid(
                "authz.write_roles must not be empty".to_string(),
            ));
        }
        if self.authz.write_roles.iter().any(|role| role.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "authz.write_roles must not contain blank names".to_string(),
            ));
        }
        if self.generator.horizon_days == 0 {
            return Err(ConfigError::Invalid(
                "generator.horizon_days must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validates config paths for safety limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
