use std::collections::HashMap;
use std::env::VarError;

use super::*;
use crate::app_config::{InsertionPolicy, UpdateMode};
use crate::layout::SheetLayout;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with everything needed for the sheets backend.
fn sheets_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("PROFSYNC_STORE", "sheets");
    m.insert("PROFSYNC_SPREADSHEET_ID", "sheet-123");
    m.insert("PROFSYNC_SHEETS_ACCESS_TOKEN", "ya29.secret");
    m
}

#[test]
fn parse_store_file() {
    assert_eq!(parse_store("file").unwrap(), StoreBackend::File);
}

#[test]
fn parse_store_sheets_is_case_insensitive() {
    assert_eq!(parse_store("Sheets").unwrap(), StoreBackend::Sheets);
}

#[test]
fn parse_store_unknown_fails() {
    let err = parse_store("postgres").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PROFSYNC_STORE"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.store, StoreBackend::File);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.workbook_path, PathBuf::from("./data/workbook.json"));
    assert_eq!(cfg.sheets_api_base, "https://sheets.googleapis.com");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert!(cfg.tag_labels_path.is_none());
    assert_eq!(cfg.sync, SyncConfig::default());
    assert_eq!(cfg.sync.max_requests_per_minute, 50);
    assert_eq!(cfg.sync.rate_pause_secs, 65);
    assert_eq!(cfg.sync.batch_size, 3);
    assert_eq!(cfg.sync.request_delay_ms, 1200);
    assert_eq!(cfg.sync.throttle_backoff_secs, 65);
    assert_eq!(cfg.sync.layout, SheetLayout::A);
    assert_eq!(cfg.sync.insertion, InsertionPolicy::Top);
    assert_eq!(cfg.sync.update_mode, UpdateMode::FullRow);
    assert_eq!(cfg.sync.profiles_sheet, "Online");
    assert_eq!(cfg.sync.tags_sheet, "Tags");
    assert_eq!(cfg.sync.target_sheet, "Target");
}

#[test]
fn build_app_config_sheets_requires_spreadsheet_id() {
    let mut map = sheets_env();
    map.remove("PROFSYNC_SPREADSHEET_ID");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PROFSYNC_SPREADSHEET_ID"),
        "expected MissingEnvVar(PROFSYNC_SPREADSHEET_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_sheets_requires_access_token() {
    let mut map = sheets_env();
    map.insert("PROFSYNC_SHEETS_ACCESS_TOKEN", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PROFSYNC_SHEETS_ACCESS_TOKEN"),
        "expected MissingEnvVar(PROFSYNC_SHEETS_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_sheets_succeeds() {
    let map = sheets_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.store, StoreBackend::Sheets);
    assert_eq!(cfg.spreadsheet_id.as_deref(), Some("sheet-123"));
    assert_eq!(cfg.sheets_access_token.as_deref(), Some("ya29.secret"));
}

#[test]
fn debug_output_redacts_access_token() {
    let map = sheets_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let printed = format!("{cfg:?}");
    assert!(!printed.contains("ya29.secret"), "token leaked: {printed}");
    assert!(printed.contains("[redacted]"));
}

#[test]
fn build_app_config_overrides_engine_settings() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_MAX_REQUESTS_PER_MINUTE", "60");
    map.insert("PROFSYNC_RATE_HEADROOM", "10");
    map.insert("PROFSYNC_BATCH_SIZE", "5");
    map.insert("PROFSYNC_REQUEST_DELAY_MS", "0");
    map.insert("PROFSYNC_LAYOUT", "B");
    map.insert("PROFSYNC_INSERTION", "append");
    map.insert("PROFSYNC_UPDATE_MODE", "cells");
    map.insert("PROFSYNC_PROFILES_SHEET", "Profiles");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.sync.max_requests_per_minute, 60);
    assert_eq!(cfg.sync.rate_headroom, 10);
    assert_eq!(cfg.sync.effective_quota(), 50);
    assert_eq!(cfg.sync.batch_size, 5);
    assert_eq!(cfg.sync.request_delay_ms, 0);
    assert_eq!(cfg.sync.layout, SheetLayout::B);
    assert_eq!(cfg.sync.insertion, InsertionPolicy::Append);
    assert_eq!(cfg.sync.update_mode, UpdateMode::CellPatch);
    assert_eq!(cfg.sync.profiles_sheet, "Profiles");
}

#[test]
fn build_app_config_rejects_zero_batch_size() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROFSYNC_BATCH_SIZE"),
        "expected InvalidEnvVar(PROFSYNC_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_quota() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_MAX_REQUESTS_PER_MINUTE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROFSYNC_MAX_REQUESTS_PER_MINUTE"),
        "expected InvalidEnvVar(PROFSYNC_MAX_REQUESTS_PER_MINUTE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_headroom_at_quota() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_MAX_REQUESTS_PER_MINUTE", "10");
    map.insert("PROFSYNC_RATE_HEADROOM", "10");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROFSYNC_RATE_HEADROOM"),
        "expected InvalidEnvVar(PROFSYNC_RATE_HEADROOM), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_delay() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_REQUEST_DELAY_MS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROFSYNC_REQUEST_DELAY_MS"),
        "expected InvalidEnvVar(PROFSYNC_REQUEST_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_unknown_layout() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_LAYOUT", "c");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROFSYNC_LAYOUT"),
        "expected InvalidEnvVar(PROFSYNC_LAYOUT), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_tag_labels_path() {
    let mut map = HashMap::new();
    map.insert("PROFSYNC_TAG_LABELS_PATH", "./config/tags.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.tag_labels_path,
        Some(PathBuf::from("./config/tags.yaml"))
    );
}
