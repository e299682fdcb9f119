//! Language listing command

use super::open_localizer;
use anyhow::Result;
use holo_pack::HoloSettings;

pub fn run(format: &str, lang: Option<&str>, settings: &HoloSettings) -> Result<()> {
    let localizer = pollster::block_on(open_localizer(settings, lang));
    let languages = localizer.languages();
    let active = localizer.active_language();

    if languages.is_empty() {
        println!(
            "No languages found in '{}'",
            settings.translations_dir().display()
        );
        return Ok(());
    }

    match format {
        "json" => {
            let entries: Vec<serde_json::Value> = languages
                .iter()
                .map(|(code, name)| {
                    serde_json::json!({
                        "code": code,
                        "name": name,
                        "active": code == active,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "text" => {
            for (code, name) in languages.iter() {
                let marker = if code == active { "*" } else { " " };
                println!("{} {:<8} {}", marker, code, name);
            }
        }
        other => anyhow::bail!("Unknown format '{}'. Use: text, json", other),
    }
    Ok(())
}
