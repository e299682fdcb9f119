//! Layered settings
//!
//! Settings are loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `HOLO_LANG`, `HOLO_TRANSLATIONS_DIR`, `HOLO_LOG`
//! 2. Project-local: `.holo/config.toml`
//! 3. Global: `~/.holo/config.toml`

use holo_core::{HoloError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_LANG: &str = "HOLO_LANG";
pub const ENV_TRANSLATIONS_DIR: &str = "HOLO_TRANSLATIONS_DIR";
pub const ENV_LOG: &str = "HOLO_LOG";

/// Where catalogs come from and which language to force
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nSettings {
    #[serde(default = "default_translations_dir")]
    pub translations_dir: PathBuf,
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            translations_dir: default_translations_dir(),
            language: None,
        }
    }
}

fn default_translations_dir() -> PathBuf {
    PathBuf::from("translations")
}

/// Target of crash issue reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_issue_url")]
    pub issue_url: String,
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            issue_url: default_issue_url(),
            template: default_template(),
        }
    }
}

fn default_issue_url() -> String {
    "https://github.com/Holo-Lab/holo/issues/new".to_string()
}

fn default_template() -> String {
    "1-pack-creation-error.yml".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Top-level settings file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoloSettingsFile {
    #[serde(default)]
    pub i18n: I18nSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Resolved settings with environment overrides applied
#[derive(Debug, Clone, Default)]
pub struct HoloSettings {
    pub i18n: I18nSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

impl HoloSettings {
    /// Load settings with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut settings = HoloSettingsFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut settings, global);
            }
        }

        let local_path = PathBuf::from(".holo/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut settings, local);
        }

        Self::apply_env_overrides(&mut settings);
        Ok(settings.into())
    }

    /// Load settings from one file plus env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut settings = Self::load_file(path)?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings.into())
    }

    pub fn translations_dir(&self) -> &Path {
        &self.i18n.translations_dir
    }

    /// Language forced by configuration, skipping host negotiation
    pub fn forced_language(&self) -> Option<&str> {
        self.i18n.language.as_deref()
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".holo").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<HoloSettingsFile> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            HoloError::TomlParseError(format!("Failed to parse settings {}: {}", path.display(), e))
        })
    }

    fn merge_into(base: &mut HoloSettingsFile, overlay: HoloSettingsFile) {
        if overlay.i18n.translations_dir != default_translations_dir() {
            base.i18n.translations_dir = overlay.i18n.translations_dir;
        }
        if overlay.i18n.language.is_some() {
            base.i18n.language = overlay.i18n.language;
        }
        if overlay.report.issue_url != default_issue_url() {
            base.report.issue_url = overlay.report.issue_url;
        }
        if overlay.report.template != default_template() {
            base.report.template = overlay.report.template;
        }
        if overlay.logging.level != default_level() {
            base.logging.level = overlay.logging.level;
        }
    }

    fn apply_env_overrides(settings: &mut HoloSettingsFile) {
        if let Some(lang) = non_empty_env(ENV_LANG) {
            settings.i18n.language = Some(lang);
        }
        if let Some(dir) = non_empty_env(ENV_TRANSLATIONS_DIR) {
            settings.i18n.translations_dir = PathBuf::from(dir);
        }
        if let Some(level) = non_empty_env(ENV_LOG) {
            settings.logging.level = level;
        }
    }
}

impl From<HoloSettingsFile> for HoloSettings {
    fn from(file: HoloSettingsFile) -> Self {
        Self {
            i18n: file.i18n,
            report: file.report,
            logging: file.logging,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
