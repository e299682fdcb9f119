//! Generation config synthesis
//!
//! [`synthesize`] maps a [`FormSnapshot`] onto a fully defaulted
//! [`GenerationConfig`]. Every field has a literal default used when the
//! form value is absent, empty, or not a number. The mapping is pure: the
//! same snapshot and files always produce an identical config.

use crate::form::FormSnapshot;
use holo_core::InputFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Blocks skipped when the form does not name its own list
pub const DEFAULT_IGNORED_BLOCKS: [&str; 4] = [
    "air",
    "piston_arm_collision",
    "sticky_piston_arm_collision",
    "moving_block",
];

/// Form names prefixed with this carry per-control item criteria
pub const CONTROL_PREFIX: &str = "control.";

/// Opacity used in single mode when the `opacity` field is empty
pub const SINGLE_OPACITY: f64 = 0.8;

/// How hologram opacity is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpacityMode {
    /// One opacity for every block, taken from the `opacity` field
    #[default]
    Single,
    /// Per-material opacities chosen by the engine
    Multiple,
}

impl OpacityMode {
    /// Parse the `opacityMode` form value. `None` when absent or unknown.
    pub fn from_form(value: Option<&str>) -> Option<Self> {
        match value? {
            "single" => Some(OpacityMode::Single),
            "multiple" => Some(OpacityMode::Multiple),
            _ => None,
        }
    }
}

/// Configuration handed to the generation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GenerationConfig {
    pub ignored_blocks: Vec<String>,
    pub scale: f64,
    pub tint_color: String,
    pub tint_opacity: f64,
    pub texture_outline_width: f64,
    pub texture_outline_color: String,
    pub texture_outline_opacity: f64,
    pub spawn_animation_enabled: bool,
    pub player_controls_enabled: bool,
    pub material_list_enabled: bool,
    pub opacity: f64,
    pub multiple_opacities: bool,
    pub mini_scale: f64,
    pub spawn_animation_length: f64,
    pub retexture_control_items: bool,
    pub control_item_texture_scale: u32,
    pub rename_control_items: bool,
    pub wrong_block_overlay_color: [f64; 4],
    pub initial_offset: [i64; 3],
    pub backup_slot_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_name: Option<String>,
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub compression_level: u32,
    pub preview_block_limit: u32,
    pub show_preview_skybox: bool,
    pub controls: BTreeMap<String, serde_json::Value>,
    pub ignored_material_list_blocks: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ignored_blocks: DEFAULT_IGNORED_BLOCKS.iter().map(|b| b.to_string()).collect(),
            scale: 0.95,
            tint_color: "#579EFA".to_string(),
            tint_opacity: 0.2,
            texture_outline_width: 0.25,
            texture_outline_color: "#0000FF".to_string(),
            texture_outline_opacity: 0.65,
            spawn_animation_enabled: false,
            player_controls_enabled: false,
            material_list_enabled: false,
            opacity: 0.9,
            multiple_opacities: false,
            mini_scale: 0.125,
            spawn_animation_length: 0.4,
            retexture_control_items: false,
            control_item_texture_scale: 1,
            rename_control_items: false,
            wrong_block_overlay_color: [1.0, 0.0, 0.0, 0.3],
            initial_offset: [0, 0, 0],
            backup_slot_count: 10,
            pack_name: None,
            authors: Vec::new(),
            description: None,
            compression_level: 5,
            preview_block_limit: 500,
            show_preview_skybox: true,
            controls: BTreeMap::new(),
            ignored_material_list_blocks: Vec::new(),
        }
    }
}

impl GenerationConfig {
    pub fn opacity_mode(&self) -> OpacityMode {
        if self.multiple_opacities {
            OpacityMode::Multiple
        } else {
            OpacityMode::Single
        }
    }

    pub fn to_json_pretty(&self) -> holo_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the generation config for a submission.
pub fn synthesize(form: &FormSnapshot, files: &[InputFile]) -> GenerationConfig {
    let defaults = GenerationConfig::default();
    let opacity_mode = OpacityMode::from_form(form.get("opacityMode"));

    let config = GenerationConfig {
        // A present-but-empty field means "ignore nothing"
        ignored_blocks: match form.get("ignoredBlocks") {
            Some(raw) => split_words(raw),
            None => defaults.ignored_blocks,
        },
        scale: percent(form, "scale").unwrap_or(defaults.scale),
        tint_color: text_or(form, "tintColor", defaults.tint_color),
        tint_opacity: percent(form, "tintOpacity").unwrap_or(defaults.tint_opacity),
        texture_outline_width: form
            .number("textureOutlineWidth")
            .unwrap_or(defaults.texture_outline_width),
        texture_outline_color: text_or(form, "textureOutlineColor", defaults.texture_outline_color),
        texture_outline_opacity: percent(form, "textureOutlineOpacity")
            .unwrap_or(defaults.texture_outline_opacity),
        spawn_animation_enabled: form.is_checked("spawnAnimationEnabled"),
        player_controls_enabled: form.is_checked("playerControlsEnabled"),
        material_list_enabled: form.is_checked("materialListEnabled"),
        // Only an explicit single mode reads the opacity field
        opacity: match opacity_mode {
            Some(OpacityMode::Single) => percent(form, "opacity").unwrap_or(SINGLE_OPACITY),
            _ => defaults.opacity,
        },
        multiple_opacities: opacity_mode == Some(OpacityMode::Multiple),
        mini_scale: form.number("miniSize").unwrap_or(defaults.mini_scale),
        spawn_animation_length: defaults.spawn_animation_length,
        retexture_control_items: form.is_checked("retextureControlItems"),
        control_item_texture_scale: unsigned(form, "controlItemTextureScale")
            .unwrap_or(defaults.control_item_texture_scale),
        rename_control_items: form.is_checked("renameControlItems"),
        wrong_block_overlay_color: defaults.wrong_block_overlay_color,
        initial_offset: [
            form.integer("initialOffsetX").unwrap_or(0),
            form.integer("initialOffsetY").unwrap_or(0),
            form.integer("initialOffsetZ").unwrap_or(0),
        ],
        backup_slot_count: unsigned(form, "backupSlotCount").unwrap_or(defaults.backup_slot_count),
        pack_name: form.text("packName").map(str::to_string),
        authors: form.get("author").map(split_words).unwrap_or_default(),
        description: form.text("description").map(str::to_string),
        compression_level: unsigned(form, "compressionLevel").unwrap_or(defaults.compression_level),
        preview_block_limit: defaults.preview_block_limit,
        show_preview_skybox: defaults.show_preview_skybox,
        controls: controls(form),
        ignored_material_list_blocks: defaults.ignored_material_list_blocks,
    };

    debug!(
        files = files.len(),
        opacity_mode = ?opacity_mode,
        controls = config.controls.len(),
        "Synthesized generation config"
    );
    config
}

/// Split on every non-word character, dropping empty segments
fn split_words(raw: &str) -> Vec<String> {
    raw.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn percent(form: &FormSnapshot, name: &str) -> Option<f64> {
    form.number(name).map(|v| v / 100.0)
}

fn unsigned(form: &FormSnapshot, name: &str) -> Option<u32> {
    form.integer(name).and_then(|v| u32::try_from(v).ok())
}

fn text_or(form: &FormSnapshot, name: &str, default: String) -> String {
    form.text(name).map(str::to_string).unwrap_or(default)
}

fn controls(form: &FormSnapshot) -> BTreeMap<String, serde_json::Value> {
    let mut controls = BTreeMap::new();
    for (name, value) in form.entries() {
        let Some(control) = name.strip_prefix(CONTROL_PREFIX) else {
            continue;
        };
        match serde_json::from_str(value) {
            Ok(criteria) => {
                controls.entry(control.to_string()).or_insert(criteria);
            }
            Err(e) => warn!(control, error = %e, "Skipping control with invalid item criteria"),
        }
    }
    controls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> Vec<InputFile> {
        vec![InputFile::new("castle.mcstructure", vec![1, 2, 3])]
    }

    #[test]
    fn test_empty_form_yields_defaults() {
        let config = synthesize(&FormSnapshot::new(), &structure());
        assert_eq!(config, GenerationConfig::default());
        assert_eq!(config.scale, 0.95);
        assert_eq!(config.opacity, 0.9);
        assert!(!config.multiple_opacities);
        assert_eq!(config.initial_offset, [0, 0, 0]);
        assert_eq!(config.compression_level, 5);
        assert!(config.pack_name.is_none());
    }

    #[test]
    fn test_percentages_are_scaled() {
        let form = FormSnapshot::new()
            .with("scale", "80")
            .with("tintOpacity", "50")
            .with("textureOutlineOpacity", "10");
        let config = synthesize(&form, &structure());
        assert_eq!(config.scale, 0.8);
        assert_eq!(config.tint_opacity, 0.5);
        assert_eq!(config.texture_outline_opacity, 0.1);
    }

    #[test]
    fn test_empty_or_unparsable_values_use_defaults() {
        let form = FormSnapshot::new()
            .with("scale", "")
            .with("tintColor", "")
            .with("miniSize", "tiny")
            .with("compressionLevel", "-3");
        let config = synthesize(&form, &structure());
        assert_eq!(config.scale, 0.95);
        assert_eq!(config.tint_color, "#579EFA");
        assert_eq!(config.mini_scale, 0.125);
        assert_eq!(config.compression_level, 5);
    }

    #[test]
    fn test_opacity_modes_are_exclusive() {
        let single = FormSnapshot::new()
            .with("opacityMode", "single")
            .with("opacity", "40");
        let config = synthesize(&single, &structure());
        assert_eq!(config.opacity, 0.4);
        assert!(!config.multiple_opacities);
        assert_eq!(config.opacity_mode(), OpacityMode::Single);

        let multiple = FormSnapshot::new()
            .with("opacityMode", "multiple")
            .with("opacity", "40");
        let config = synthesize(&multiple, &structure());
        assert_eq!(config.opacity, 0.9);
        assert!(config.multiple_opacities);

        let empty_single = FormSnapshot::new().with("opacityMode", "single");
        assert_eq!(synthesize(&empty_single, &structure()).opacity, SINGLE_OPACITY);
    }

    #[test]
    fn test_unknown_opacity_mode_uses_fixed_opacity() {
        for form in [
            FormSnapshot::new().with("opacity", "40"),
            FormSnapshot::new().with("opacityMode", "Single").with("opacity", "40"),
        ] {
            let config = synthesize(&form, &structure());
            assert_eq!(config.opacity, 0.9);
            assert!(!config.multiple_opacities);
        }
        assert_eq!(OpacityMode::from_form(None), None);
        assert_eq!(OpacityMode::from_form(Some("multiple")), Some(OpacityMode::Multiple));
    }

    #[test]
    fn test_lists_split_on_non_word_characters() {
        let form = FormSnapshot::new()
            .with("ignoredBlocks", "minecraft:air, ,barrier;;light_block")
            .with("author", "Alice, Bob");
        let config = synthesize(&form, &structure());
        assert_eq!(
            config.ignored_blocks,
            vec!["minecraft", "air", "barrier", "light_block"]
        );
        assert_eq!(config.authors, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_present_but_empty_ignored_blocks_is_empty_list() {
        let form = FormSnapshot::new().with("ignoredBlocks", "");
        assert!(synthesize(&form, &structure()).ignored_blocks.is_empty());
    }

    #[test]
    fn test_initial_offset_and_checkboxes() {
        let form = FormSnapshot::new()
            .with("initialOffsetX", "3")
            .with("initialOffsetZ", "-7")
            .with("spawnAnimationEnabled", "on")
            .with("materialListEnabled", "on");
        let config = synthesize(&form, &structure());
        assert_eq!(config.initial_offset, [3, 0, -7]);
        assert!(config.spawn_animation_enabled);
        assert!(config.material_list_enabled);
        assert!(!config.player_controls_enabled);
    }

    #[test]
    fn test_controls_skip_invalid_json() {
        let form = FormSnapshot::new()
            .with("control.toggle_rendering", r#"{"names":["stick"]}"#)
            .with("control.broken", "{not json");
        let config = synthesize(&form, &structure());
        assert_eq!(config.controls.len(), 1);
        assert_eq!(
            config.controls["toggle_rendering"]["names"][0],
            serde_json::json!("stick")
        );
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let form = FormSnapshot::new()
            .with("scale", "72.5")
            .with("packName", "Castle")
            .with("author", "Alice")
            .with("control.pick", r#"{"tags":["planks"]}"#);
        let files = structure();
        let a = serde_json::to_vec(&synthesize(&form, &files)).unwrap();
        let b = serde_json::to_vec(&synthesize(&form, &files)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        for key in [
            "IGNORED_BLOCKS",
            "SCALE",
            "TINT_COLOR",
            "INITIAL_OFFSET",
            "COMPRESSION_LEVEL",
            "CONTROLS",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert!(json.get("PACK_NAME").is_none());
    }
}
