//! Translation catalogs and the loaders that fetch them

use async_trait::async_trait;
use holo_core::{HoloError, Result};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Key → template mapping for a single language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationCatalog {
    entries: HashMap<String, String>,
}

impl TranslationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of `"key": "template"` pairs
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| HoloError::CatalogError(format!("Malformed catalog: {}", e)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationCatalog {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Available languages, ordered by display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageList {
    languages: Vec<(String, String)>,
}

impl LanguageList {
    /// Build from `(code, display name)` pairs
    pub fn new<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut languages: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(c, n)| (c.into(), n.into()))
            .collect();
        languages.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Self { languages }
    }

    /// Parse the `languages.json` code → display name map
    pub fn from_json(json: &str) -> Result<Self> {
        let map: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| HoloError::CatalogError(format!("Malformed language list: {}", e)))?;
        Ok(Self::new(map))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.languages.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, n)| n.as_str())
    }

    pub fn first(&self) -> Option<&str> {
        self.languages.first().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Source of catalogs, fetched on demand per language code.
///
/// Loading suspends the caller; a failed load is reported as
/// `HoloError::CatalogError` and may be retried later.
#[async_trait(?Send)]
pub trait CatalogLoader {
    /// Fetch the catalog for one canonical language code (e.g. `en_US`)
    async fn load_catalog(&self, code: &str) -> Result<TranslationCatalog>;

    /// Fetch the list of languages that have a catalog
    async fn load_languages(&self) -> Result<LanguageList>;
}

/// Shared loaders, so a caller can keep a handle to one it gave away
#[async_trait(?Send)]
impl<L: CatalogLoader> CatalogLoader for Rc<L> {
    async fn load_catalog(&self, code: &str) -> Result<TranslationCatalog> {
        self.as_ref().load_catalog(code).await
    }

    async fn load_languages(&self) -> Result<LanguageList> {
        self.as_ref().load_languages().await
    }
}

/// Loads `languages.json` and `<code>.json` files from a directory
pub struct DirCatalogLoader {
    root: PathBuf,
}

impl DirCatalogLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn read(&self, file_name: &str) -> Result<String> {
        let path = self.root.join(file_name);
        std::fs::read_to_string(&path).map_err(|e| {
            HoloError::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })
    }
}

#[async_trait(?Send)]
impl CatalogLoader for DirCatalogLoader {
    async fn load_catalog(&self, code: &str) -> Result<TranslationCatalog> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(HoloError::CatalogError(format!(
                "Invalid language code '{}'",
                code
            )));
        }
        let content = self.read(&format!("{}.json", code))?;
        TranslationCatalog::from_json(&content)
    }

    async fn load_languages(&self) -> Result<LanguageList> {
        let content = self.read("languages.json")?;
        LanguageList::from_json(&content)
    }
}

/// Catalogs held in memory; counts loads so callers can observe caching
#[derive(Default)]
pub struct MemoryCatalogLoader {
    catalogs: HashMap<String, TranslationCatalog>,
    names: HashMap<String, String>,
    loads: Cell<usize>,
}

impl MemoryCatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(
        mut self,
        code: &str,
        name: &str,
        catalog: TranslationCatalog,
    ) -> Self {
        self.catalogs.insert(code.to_string(), catalog);
        self.names.insert(code.to_string(), name.to_string());
        self
    }

    /// Number of successful and failed catalog loads so far
    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

#[async_trait(?Send)]
impl CatalogLoader for MemoryCatalogLoader {
    async fn load_catalog(&self, code: &str) -> Result<TranslationCatalog> {
        self.loads.set(self.loads.get() + 1);
        self.catalogs
            .get(code)
            .cloned()
            .ok_or_else(|| HoloError::CatalogError(format!("No catalog for '{}'", code)))
    }

    async fn load_languages(&self) -> Result<LanguageList> {
        Ok(LanguageList::new(
            self.names.iter().map(|(c, n)| (c.clone(), n.clone())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("holo_catalog_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog =
            TranslationCatalog::from_json(r#"{"metadata.pack_name": "Pack Name"}"#).unwrap();
        assert_eq!(catalog.get("metadata.pack_name"), Some("Pack Name"));
        assert_eq!(catalog.get("missing"), None);
    }

    #[test]
    fn test_malformed_catalog_is_error() {
        let err = TranslationCatalog::from_json("[1, 2").unwrap_err();
        assert!(matches!(err, HoloError::CatalogError(_)));
    }

    #[test]
    fn test_language_list_sorted_by_display_name() {
        let list = LanguageList::new([
            ("pt_BR", "Português (Brasil)"),
            ("en_US", "English (US)"),
            ("de_DE", "Deutsch"),
        ]);
        let codes: Vec<&str> = list.codes().collect();
        assert_eq!(codes, vec!["de_DE", "en_US", "pt_BR"]);
        assert_eq!(list.first(), Some("de_DE"));
        assert_eq!(list.display_name("en_US"), Some("English (US)"));
    }

    #[test]
    fn test_dir_loader_reads_files() {
        let dir = temp_dir();
        write(&dir, "languages.json", r#"{"en_US": "English"}"#);
        write(&dir, "en_US.json", r#"{"a": "A"}"#);
        let loader = DirCatalogLoader::new(&dir);

        let languages = pollster::block_on(loader.load_languages()).unwrap();
        assert_eq!(languages.len(), 1);
        let catalog = pollster::block_on(loader.load_catalog("en_US")).unwrap();
        assert_eq!(catalog.get("a"), Some("A"));
        assert!(pollster::block_on(loader.load_catalog("fr_FR")).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_dir_loader_rejects_path_like_codes() {
        let loader = DirCatalogLoader::new(temp_dir());
        let err = pollster::block_on(loader.load_catalog("../secret")).unwrap_err();
        assert!(matches!(err, HoloError::CatalogError(_)));
    }
}
