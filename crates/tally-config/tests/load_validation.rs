//! Config load validation tests for tally-config.
// crates/tally-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use tally_config::ConfigError;
use tally_config::TallyConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<TallyConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(TallyConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(TallyConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(TallyConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(TallyConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn from_toml_rejects_empty_write_roles() -> TestResult {
    let text = "[store]\npath = \"/tmp/tally.db\"\n[authz]\nwrite_roles = []\n";
    assert_invalid(TallyConfig::from_toml(text), "authz.write_roles must not be empty")?;
    Ok(())
}

#[test]
fn from_toml_rejects_blank_role_name() -> TestResult {
    let text = "[store]\npath = \"/tmp/tally.db\"\n[authz]\nwrite_roles = [\"Admin\", \" \"]\n";
    assert_invalid(
        TallyConfig::from_toml(text),
        "authz.write_roles must not contain blank names",
    )?;
    Ok(())
}

#[test]
fn from_toml_rejects_zero_horizon() -> TestResult {
    let text = "[store]\npath = \"/tmp/tally.db\"\n[generator]\nhorizon_days = 0\n";
    assert_invalid(
        TallyConfig::from_toml(text),
        "generator.horizon_days must be greater than zero",
    )?;
    Ok(())
}

#[test]
fn from_toml_rejects_unknown_field() -> TestResult {
    let text = "[store]\npath = \"/tmp/tally.db\"\nunexpected = true\n";
    assert_invalid(TallyConfig::from_toml(text), "config parse error")?;
    Ok(())
}

#[test]
fn from_toml_rejects_empty_store_path() -> TestResult {
    let text = "[store]\npath = \"\"\n";
    assert_invalid(TallyConfig::from_toml(text), "store.path must not be empty")?;
    Ok(())
}

#[test]
fn load_accepts_minimal_config() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[store]\npath = \"/tmp/tally.db\"\n")
        .map_err(|err| err.to_string())?;
    let config = TallyConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.authz.write_roles != vec!["Admin".to_string(), "Manager".to_string()] {
        return Err("expected default write roles".to_string());
    }
    if config.generator.horizon_days != 365 {
        return Err("expected default horizon".to_string());
    }
    Ok(())
}
