use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::{OwnerId, OwnerIdError, Session};

pub const HOME_ENV: &str = "NOTELY_HOME";
pub const USER_ENV: &str = "NOTELY_USER";
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "NOTELY_IMAGE_MODEL";
pub const API_URL_ENV: &str = "NOTELY_IMAGE_API_URL";

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image-preview";
pub const DEFAULT_IMAGE_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_TITLE: &str = "Notely";

/// Resolve the data directory: `$NOTELY_HOME`, else `~/.notely/`.
pub fn data_dir() -> PathBuf {
    match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".notely"),
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_IMAGE_API_URL.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_url: default_api_url(),
            referer: None,
            title: default_title(),
        }
    }
}

impl ImageSettings {
    pub fn configured(&self) -> bool {
        !self.api_key.is_empty() && !self.model.is_empty() && !self.api_url.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Caller identity used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub image: ImageSettings,
}

impl Settings {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    /// Read `settings.json`; a missing or unreadable file yields defaults.
    pub fn read(dir: &Path) -> Settings {
        let path = Self::path(dir);
        if !path.exists() {
            return Settings::default();
        }
        match fs::read_to_string(&path)
            .map_err(SettingsError::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(SettingsError::from))
        {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Settings::default()
            }
        }
    }

    /// Settings file plus environment overrides.
    pub fn load(dir: &Path) -> Settings {
        let mut settings = Self::read(dir);
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(user) = var(USER_ENV) {
            info!("{USER_ENV} set, overriding configured user");
            self.user = Some(user);
        }
        if let Some(key) = var(API_KEY_ENV) {
            info!("{API_KEY_ENV} set, overriding configured image API key");
            self.image.api_key = key;
        }
        if let Some(model) = var(MODEL_ENV) {
            info!("{MODEL_ENV} set, using image model {model}");
            self.image.model = model;
        }
        if let Some(url) = var(API_URL_ENV) {
            info!("{API_URL_ENV} set, using image endpoint {url}");
            self.image.api_url = url;
        }
    }

    /// Write atomically (temp file + rename).
    pub fn write(&self, dir: &Path) -> Result<(), SettingsError> {
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        let tmp = dir.join(format!(".{SETTINGS_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, Self::path(dir))?;
        Ok(())
    }

    pub fn session(&self) -> Result<Session, OwnerIdError> {
        match &self.user {
            Some(user) => Ok(Session::authenticated(OwnerId::try_new(user.clone())?)),
            None => Ok(Session::anonymous()),
        }
    }
}
