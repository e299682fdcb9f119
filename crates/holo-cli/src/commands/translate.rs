//! Single-key translation command

use super::open_localizer;
use anyhow::Result;
use holo_pack::HoloSettings;
use std::collections::BTreeMap;

pub fn run(
    key: &str,
    count: Option<i64>,
    substitutions: Vec<(String, String)>,
    lang: Option<&str>,
    settings: &HoloSettings,
) -> Result<()> {
    let localizer = pollster::block_on(open_localizer(settings, lang));

    let mut subs: BTreeMap<String, String> = substitutions.into_iter().collect();
    if let Some(count) = count {
        subs.insert("count".to_string(), count.to_string());
    }

    let active = localizer.active_language();
    if localizer.resolve(key, &active).is_none() {
        eprintln!("Warning: '{}' has no translation in {}", key, active);
    }
    println!("{}", localizer.render_current(key, &subs));
    Ok(())
}
