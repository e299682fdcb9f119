//! Placeholder substitution and pluralization of catalog templates
//!
//! Templates reference substitutions as `{NAME}` where `NAME` is the
//! upper-cased substitution name, and mark plural suffixes with `[s]` or
//! `[es]`:
//!
//! ```text
//! "Extracted {COUNT} structure[s]"  + count=1 -> "Extracted 1 structure"
//!                                   + count=3 -> "Extracted 3 structures"
//! ```

use holo_core::numeric::parse_leading_int;
use std::collections::BTreeMap;

/// Suffix spans recognised inside templates
const PLURAL_SPANS: [(&str, &str); 2] = [("[s]", "s"), ("[es]", "es")];

/// Substitution name that drives pluralization
pub const COUNT: &str = "count";

/// Substitution name filled with the app version when not declared
pub const VERSION: &str = "version";

/// Placeholder token for a substitution name (`count` → `{COUNT}`)
pub fn placeholder(name: &str) -> String {
    format!("{{{}}}", name.to_uppercase())
}

/// Render a template with the given substitutions.
///
/// Every substitution is inserted literally. `{VERSION}` is filled with
/// `app_version` unless a `version` substitution exists. When a `count`
/// substitution exists, plural spans are resolved and any remaining
/// brackets are removed.
pub fn render(template: &str, substitutions: &BTreeMap<String, String>, app_version: &str) -> String {
    let mut text = template.to_string();

    for (name, value) in substitutions {
        text = text.replace(&placeholder(name), value);
    }

    if !has_substitution(substitutions, VERSION) {
        text = text.replace(&placeholder(VERSION), app_version);
    }

    if let Some(raw) = lookup(substitutions, COUNT) {
        if let Some(count) = parse_leading_int(raw) {
            text = pluralize(&text, count);
        }
        text.retain(|c| c != '[' && c != ']');
    }

    text
}

/// Resolve `[s]`/`[es]` spans: dropped entirely for exactly one, kept
/// without brackets for every other count (including zero and negatives).
pub fn pluralize(text: &str, count: i64) -> String {
    let mut out = text.to_string();
    for (span, suffix) in PLURAL_SPANS {
        out = out.replace(span, if count == 1 { "" } else { suffix });
    }
    out
}

fn lookup<'a>(substitutions: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    substitutions
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn has_substitution(substitutions: &BTreeMap<String, String>, name: &str) -> bool {
    lookup(substitutions, name).is_some()
}
