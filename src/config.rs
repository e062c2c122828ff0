use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::links::{BackendPreference, ThumbnailPreference};
use crate::publish::PublicationStrings;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/viewtube-listing-env";
pub const DEFAULT_INVIDIOUS_INSTANCE: &str = "https://invidious.snopyta.org";

/// Raw values read from the env-style settings file.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub backend_preference: Option<String>,
    pub thumbnail_preference: Option<String>,
    pub invidious_instance: Option<String>,
    pub publication_strings: Option<PathBuf>,
    pub local_upload_placeholder: Option<bool>,
}

/// Settings with every default applied.
#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub backend: BackendPreference,
    pub thumbnails: ThumbnailPreference,
    pub invidious_instance: String,
    pub strings: PublicationStrings,
    pub local_upload_placeholder: bool,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            backend: BackendPreference::default(),
            thumbnails: ThumbnailPreference::default(),
            invidious_instance: DEFAULT_INVIDIOUS_INSTANCE.to_string(),
            strings: PublicationStrings::default(),
            local_upload_placeholder: false,
        }
    }
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value_raw)) = trimmed.split_once('=') {
            let value = value_raw.trim().trim_matches('"');
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "BACKEND_PREFERENCE" => cfg.backend_preference = Some(value.to_string()),
                "THUMBNAIL_PREFERENCE" => cfg.thumbnail_preference = Some(value.to_string()),
                "INVIDIOUS_INSTANCE" => cfg.invidious_instance = Some(value.to_string()),
                "PUBLICATION_STRINGS" => cfg.publication_strings = Some(PathBuf::from(value)),
                "LOCAL_UPLOAD_PLACEHOLDER" => {
                    let enabled = parse_flag(value).with_context(|| {
                        format!("Parsing LOCAL_UPLOAD_PLACEHOLDER from {}", path.display())
                    })?;
                    cfg.local_upload_placeholder = Some(enabled);
                }
                _ => {}
            }
        }
    }
    Ok(Some(cfg))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(anyhow!("expected true/false, got {other:?}")),
    }
}

/// Loads the TOML label file used for publish-time text. Missing keys keep
/// the English defaults.
pub fn load_publication_strings(path: &Path) -> Result<PublicationStrings> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Parsing {}", path.display()))
}

pub fn load_listing_settings() -> Result<ListingSettings> {
    load_listing_settings_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Every key is optional, so a missing file just yields the defaults.
pub fn load_listing_settings_from(path: impl AsRef<Path>) -> Result<ListingSettings> {
    let path = path.as_ref();
    let Some(cfg) = read_env_config(path)? else {
        return Ok(ListingSettings::default());
    };

    let strings = match &cfg.publication_strings {
        Some(strings_path) => load_publication_strings(strings_path)?,
        None => PublicationStrings::default(),
    };

    Ok(ListingSettings {
        backend: cfg
            .backend_preference
            .as_deref()
            .map(BackendPreference::from_setting)
            .unwrap_or_default(),
        thumbnails: cfg
            .thumbnail_preference
            .as_deref()
            .map(ThumbnailPreference::from_setting)
            .unwrap_or_default(),
        invidious_instance: cfg
            .invidious_instance
            .map(|instance| instance.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_INVIDIOUS_INSTANCE.to_string()),
        strings,
        local_upload_placeholder: cfg.local_upload_placeholder.unwrap_or(false),
    })
}
