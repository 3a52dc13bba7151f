use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, StoreBackend, SyncConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_value::<usize>(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let defaults = SyncConfig::default();

    let max_requests_per_minute = parse_usize("PROFSYNC_MAX_REQUESTS_PER_MINUTE", "50")?;
    if max_requests_per_minute == 0 {
        return Err(invalid("PROFSYNC_MAX_REQUESTS_PER_MINUTE", "must be at least 1"));
    }
    let rate_headroom = parse_usize("PROFSYNC_RATE_HEADROOM", "0")?;
    if rate_headroom >= max_requests_per_minute {
        return Err(invalid(
            "PROFSYNC_RATE_HEADROOM",
            "must be smaller than PROFSYNC_MAX_REQUESTS_PER_MINUTE",
        ));
    }
    let batch_size = parse_usize("PROFSYNC_BATCH_SIZE", "3")?;
    if batch_size == 0 {
        return Err(invalid("PROFSYNC_BATCH_SIZE", "must be at least 1"));
    }

    let sync = SyncConfig {
        max_requests_per_minute,
        rate_headroom,
        rate_pause_secs: parse_u64("PROFSYNC_RATE_PAUSE_SECS", "65")?,
        batch_size,
        request_delay_ms: parse_u64("PROFSYNC_REQUEST_DELAY_MS", "1200")?,
        throttle_backoff_secs: parse_u64("PROFSYNC_THROTTLE_BACKOFF_SECS", "65")?,
        layout: parse_value("PROFSYNC_LAYOUT", &or_default("PROFSYNC_LAYOUT", "a"))?,
        insertion: parse_value("PROFSYNC_INSERTION", &or_default("PROFSYNC_INSERTION", "top"))?,
        update_mode: parse_value(
            "PROFSYNC_UPDATE_MODE",
            &or_default("PROFSYNC_UPDATE_MODE", "row"),
        )?,
        profiles_sheet: optional("PROFSYNC_PROFILES_SHEET").unwrap_or(defaults.profiles_sheet),
        tags_sheet: optional("PROFSYNC_TAGS_SHEET").unwrap_or(defaults.tags_sheet),
        target_sheet: optional("PROFSYNC_TARGET_SHEET").unwrap_or(defaults.target_sheet),
    };

    let store = parse_store(&or_default("PROFSYNC_STORE", "file"))?;
    let spreadsheet_id = optional("PROFSYNC_SPREADSHEET_ID");
    let sheets_access_token = optional("PROFSYNC_SHEETS_ACCESS_TOKEN");
    if store == StoreBackend::Sheets {
        if spreadsheet_id.is_none() {
            return Err(ConfigError::MissingEnvVar("PROFSYNC_SPREADSHEET_ID".to_owned()));
        }
        if sheets_access_token.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "PROFSYNC_SHEETS_ACCESS_TOKEN".to_owned(),
            ));
        }
    }

    Ok(AppConfig {
        log_level: or_default("PROFSYNC_LOG_LEVEL", "info"),
        store,
        workbook_path: PathBuf::from(or_default(
            "PROFSYNC_WORKBOOK_PATH",
            "./data/workbook.json",
        )),
        spreadsheet_id,
        sheets_access_token,
        sheets_api_base: or_default("PROFSYNC_SHEETS_API_BASE", "https://sheets.googleapis.com"),
        request_timeout_secs: parse_u64("PROFSYNC_REQUEST_TIMEOUT_SECS", "30")?,
        tag_labels_path: optional("PROFSYNC_TAG_LABELS_PATH").map(PathBuf::from),
        sync,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, e))
}

fn invalid(var: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse the `PROFSYNC_STORE` value into a [`StoreBackend`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than `file` or `sheets`.
fn parse_store(s: &str) -> Result<StoreBackend, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "file" => Ok(StoreBackend::File),
        "sheets" => Ok(StoreBackend::Sheets),
        other => Err(invalid(
            "PROFSYNC_STORE",
            format!("'{other}' (expected 'file' or 'sheets')"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
