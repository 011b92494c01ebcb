use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::HassSnapshot;

pub const SETTINGS_FILE: &str = "tilectl.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub snapshot_path: PathBuf,
    pub log_filter: String,
    pub use_area_icons: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("snapshot.json"),
            log_filter: "warn".into(),
            use_area_icons: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    snapshot: Option<PathBuf>,
    log_filter: Option<String>,
    use_area_icons: Option<bool>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.snapshot {
        settings.snapshot_path = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.use_area_icons {
        settings.use_area_icons = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TILECTL_SNAPSHOT") {
        settings.snapshot_path = PathBuf::from(v);
    }
    if let Some(v) = var("TILECTL__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("TILECTL__USE_AREA_ICONS") {
        if let Some(parsed) = parse_flag(&v) {
            settings.use_area_icons = parsed;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<HassSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("snapshot '{}' is not valid dashboard JSON", path.display()))
}

pub fn load_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("'{}' is not valid JSON", path.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
