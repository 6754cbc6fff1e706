use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use uploader_core::UploaderConfig;

pub const DEFAULT_CONFIG_FILE: &str = "uploader.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub require_race_selection: bool,
    pub save_delay_ms: u64,
    pub catalog_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            require_race_selection: false,
            save_delay_ms: 1500,
            catalog_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn uploader_config(&self) -> UploaderConfig {
        UploaderConfig {
            require_race_selection: self.require_race_selection,
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    require_race_selection: Option<bool>,
    save_delay_ms: Option<u64>,
    catalog_path: Option<PathBuf>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicitly named file must exist; the default `uploader.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            apply_file_settings(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.require_race_selection {
        settings.require_race_selection = v;
    }
    if let Some(v) = file_cfg.save_delay_ms {
        settings.save_delay_ms = v;
    }
    if let Some(v) = file_cfg.catalog_path {
        settings.catalog_path = Some(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    for key in ["UPLOADER_REQUIRE_RACE", "APP__REQUIRE_RACE_SELECTION"] {
        if let Some(v) = lookup(key) {
            settings.require_race_selection = parse_flag(key, &v)?;
        }
    }

    for key in ["UPLOADER_SAVE_DELAY_MS", "APP__SAVE_DELAY_MS"] {
        if let Some(v) = lookup(key) {
            settings.save_delay_ms = v
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
        }
    }

    for key in ["UPLOADER_CATALOG", "APP__CATALOG_PATH"] {
        if let Some(v) = lookup(key) {
            settings.catalog_path = (!v.trim().is_empty()).then(|| PathBuf::from(v.trim()));
        }
    }

    if let Some(v) = lookup("UPLOADER_LOG") {
        settings.log_filter = v;
    }

    Ok(())
}

fn parse_flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got '{other}'"),
    }
}
