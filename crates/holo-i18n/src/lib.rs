//! Holo I18n - Localization resolution engine
//!
//! Resolves translation keys against lazily loaded per-language catalogs
//! with an `en_US` fallback, substitutes placeholders, applies the
//! `[s]`/`[es]` pluralization spans, and pushes the results into a
//! document tree of translatable elements.

pub mod catalog;
pub mod document;
pub mod list;
pub mod locale;
pub mod localizer;
pub mod template;

pub use catalog::{CatalogLoader, DirCatalogLoader, LanguageList, MemoryCatalogLoader, TranslationCatalog};
pub use document::{Document, Element, TargetAttribute, TranslationTarget};
pub use locale::{negotiate_language, FALLBACK_LANGUAGE};
pub use localizer::Localizer;
