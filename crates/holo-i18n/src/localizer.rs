//! The active-language controller
//!
//! `Localizer` owns the process-wide active language and the cache of
//! loaded catalogs. Catalogs are loaded lazily on first use and never
//! change afterwards. Every language change re-runs a full pass over the
//! document; there is no live binding, so elements added later are picked
//! up by the next pass.

use crate::catalog::{CatalogLoader, LanguageList, TranslationCatalog};
use crate::document::Document;
use crate::list::join_with_conjunction;
use crate::locale::{canonical_code, negotiate_language, primary_subtag, FALLBACK_LANGUAGE};
use crate::template;
use holo_core::Result;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Catalog key holding the localized "or" used when joining lists
const LIST_OR_KEY: &str = "list.or";

pub struct Localizer {
    loader: Box<dyn CatalogLoader>,
    catalogs: RefCell<HashMap<String, Rc<TranslationCatalog>>>,
    languages: RefCell<LanguageList>,
    active: RefCell<String>,
    app_version: String,
}

impl Localizer {
    pub fn new(loader: Box<dyn CatalogLoader>, app_version: impl Into<String>) -> Self {
        Self {
            loader,
            catalogs: RefCell::new(HashMap::new()),
            languages: RefCell::new(LanguageList::default()),
            active: RefCell::new(FALLBACK_LANGUAGE.to_string()),
            app_version: app_version.into(),
        }
    }

    /// Load the language list, choose the initial language and translate
    /// the document. `forced` wins over negotiation from `host_locale`.
    ///
    /// Returns the language active after the first pass.
    pub async fn initialize(
        &self,
        host_locale: Option<&str>,
        forced: Option<&str>,
        doc: &mut Document,
    ) -> String {
        let languages = match self.loader.load_languages().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load language list");
                LanguageList::default()
            }
        };
        if languages.is_empty() {
            tracing::warn!("No languages available, defaulting to {}", FALLBACK_LANGUAGE);
        }

        let code = match forced {
            Some(code) => canonical_code(code),
            None if languages.is_empty() => FALLBACK_LANGUAGE.to_string(),
            None => negotiate_language(host_locale, &languages),
        };
        *self.languages.borrow_mut() = languages;

        self.set_language(&code, doc).await;
        self.active_language()
    }

    /// Languages known from the last `initialize`
    pub fn languages(&self) -> LanguageList {
        self.languages.borrow().clone()
    }

    pub fn active_language(&self) -> String {
        self.active.borrow().clone()
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Explicit user selection: switch the active language and re-run the
    /// document pass. Returns the language actually applied, if any.
    /// An aborted pass keeps the previous language active.
    pub async fn set_language(&self, code: &str, doc: &mut Document) -> Option<String> {
        let applied = self.apply_to_document(code, doc).await?;
        *self.active.borrow_mut() = applied.clone();
        tracing::debug!(requested = code, language = %applied, "Active language changed");
        Some(applied)
    }

    /// Load a catalog unless it is already cached
    pub async fn ensure_loaded(&self, code: &str) -> Result<Rc<TranslationCatalog>> {
        let cached = self.catalogs.borrow().get(code).cloned();
        if let Some(catalog) = cached {
            return Ok(catalog);
        }
        let catalog = Rc::new(self.loader.load_catalog(code).await?);
        tracing::debug!(language = code, entries = catalog.len(), "Loaded translation catalog");
        self.catalogs
            .borrow_mut()
            .insert(code.to_string(), Rc::clone(&catalog));
        Ok(catalog)
    }

    pub fn is_loaded(&self, code: &str) -> bool {
        self.catalogs.borrow().contains_key(code)
    }

    /// Look a key up in `code`, then in `en_US`. Only loaded catalogs are
    /// consulted; `None` means the caller keeps its current text.
    pub fn resolve(&self, key: &str, code: &str) -> Option<String> {
        let catalogs = self.catalogs.borrow();
        catalogs
            .get(code)
            .and_then(|c| c.get(key))
            .or_else(|| catalogs.get(FALLBACK_LANGUAGE).and_then(|c| c.get(key)))
            .map(|s| s.to_string())
    }

    /// Resolve against the active language, returning the key itself when
    /// no catalog has it
    pub fn translate_current(&self, key: &str) -> String {
        let active = self.active_language();
        self.resolve(key, &active).unwrap_or_else(|| key.to_string())
    }

    /// `translate_current` followed by placeholder substitution and
    /// pluralization
    pub fn render_current(&self, key: &str, substitutions: &BTreeMap<String, String>) -> String {
        template::render(&self.translate_current(key), substitutions, &self.app_version)
    }

    /// Join items as "A, B or C" using the active language's conjunction
    pub fn join_or<S: AsRef<str>>(&self, items: &[S]) -> String {
        let active = self.active_language();
        let conjunction = self
            .resolve(LIST_OR_KEY, &active)
            .unwrap_or_else(|| "or".to_string());
        join_with_conjunction(items, &conjunction)
    }

    /// Translate every bound element of `doc` into `code`.
    ///
    /// Falls back to `en_US` when `code` cannot be loaded. If that fails
    /// too, the pass is abandoned and the document is left untouched.
    /// Returns the language whose catalog was used.
    pub async fn apply_to_document(&self, code: &str, doc: &mut Document) -> Option<String> {
        let code = match self.ensure_loaded(code).await {
            Ok(_) => code.to_string(),
            Err(e) => {
                tracing::error!(language = code, error = %e, "Failed to load translation catalog");
                if code == FALLBACK_LANGUAGE {
                    return None;
                }
                tracing::warn!("Falling back to {} translations", FALLBACK_LANGUAGE);
                if let Err(e) = self.ensure_loaded(FALLBACK_LANGUAGE).await {
                    tracing::error!(error = %e, "Failed to load fallback translation catalog");
                    return None;
                }
                FALLBACK_LANGUAGE.to_string()
            }
        };

        // Fallback lookups need en_US even when the requested catalog loaded.
        if code != FALLBACK_LANGUAGE {
            if let Err(e) = self.ensure_loaded(FALLBACK_LANGUAGE).await {
                tracing::debug!(error = %e, "Fallback catalog unavailable for this pass");
            }
        }

        doc.lang = primary_subtag(&code).to_string();

        let mut translated = 0usize;
        let mut missing = 0usize;
        doc.for_each_translatable(|el| {
            let Some(binding) = el.binding.clone() else {
                return;
            };
            match self.resolve(&binding.key, &code) {
                Some(tpl) => {
                    let text = template::render(&tpl, &el.substitutions, &self.app_version);
                    el.write_translation(binding.target, text);
                    translated += 1;
                }
                None => missing += 1,
            }
        });
        tracing::debug!(language = %code, translated, missing, "Translated document");

        Some(code)
    }
}
