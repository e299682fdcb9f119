//! CLI command implementations

pub mod config;
pub mod generate;
pub mod languages;
pub mod translate;

use anyhow::{Context, Result};
use holo_i18n::{DirCatalogLoader, Document, Localizer};
use holo_pack::{FormSnapshot, HoloSettings};
use std::rc::Rc;

/// Locale of the host system, from `LC_ALL` or `LANG` (`pt_BR.UTF-8` -> `pt_BR`)
pub fn host_locale() -> Option<String> {
    ["LC_ALL", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|value| parse_posix_locale(&value))
}

fn parse_posix_locale(value: &str) -> Option<String> {
    let locale = value.split(['.', '@']).next().unwrap_or_default();
    if locale.is_empty() || locale == "C" || locale == "POSIX" {
        None
    } else {
        Some(locale.to_string())
    }
}

/// Localizer over the configured translations directory, initialized
/// with `lang` or the configured language or the host locale
pub async fn open_localizer(settings: &HoloSettings, lang: Option<&str>) -> Rc<Localizer> {
    let loader = DirCatalogLoader::new(settings.translations_dir());
    let localizer = Rc::new(Localizer::new(Box::new(loader), holo_pack::VERSION));
    let mut document = Document::new();
    let forced = lang.or(settings.forced_language());
    let code = localizer
        .initialize(host_locale().as_deref(), forced, &mut document)
        .await;
    tracing::debug!(language = %code, lang_attribute = %document.lang, "Interface language selected");
    localizer
}

/// Form values from a TOML file, or an empty form
pub fn load_form(path: Option<&str>) -> Result<FormSnapshot> {
    let Some(path) = path else {
        return Ok(FormSnapshot::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file '{}'", path))?;
    Ok(FormSnapshot::from_toml_str(&content)?)
}
