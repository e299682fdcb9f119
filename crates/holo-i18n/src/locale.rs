//! Language code normalization and negotiation

use crate::catalog::LanguageList;

/// Language used whenever the requested one has no catalog or no entry
pub const FALLBACK_LANGUAGE: &str = "en_US";

/// Normalize a host locale (`pt-BR`, `en_us`) to the underscore form used
/// by catalog codes. Case is preserved; matching is case-insensitive.
pub fn canonical_code(locale: &str) -> String {
    locale.trim().replace('-', "_")
}

/// Primary subtag of a code, used for the document language attribute
/// (`pt_BR` → `pt`)
pub fn primary_subtag(code: &str) -> &str {
    code.split(['_', '-']).next().unwrap_or(code)
}

/// Pick the initial language for a host locale.
///
/// Order: exact (case-insensitive) match, then a code sharing the primary
/// subtag, then the first listed language, then [`FALLBACK_LANGUAGE`].
pub fn negotiate_language(host_locale: Option<&str>, available: &LanguageList) -> String {
    let host = canonical_code(host_locale.unwrap_or(FALLBACK_LANGUAGE));
    let host_primary = primary_subtag(&host).to_ascii_lowercase();

    if let Some(code) = available.codes().find(|c| c.eq_ignore_ascii_case(&host)) {
        return code.to_string();
    }
    if let Some(code) = available
        .codes()
        .find(|c| primary_subtag(c).eq_ignore_ascii_case(&host_primary))
    {
        return code.to_string();
    }
    available
        .first()
        .unwrap_or(FALLBACK_LANGUAGE)
        .to_string()
}
