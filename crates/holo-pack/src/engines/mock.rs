//! Mock collaborators for tests and the CLI
//!
//! [`MockEngine`] bundles the structure files and config into a JSON
//! document instead of building a real pack, [`MockPackExtractor`] reads
//! such bundles back, and [`BuiltinStackResolver`] resolves resource
//! stacks without any network access.

use crate::config::GenerationConfig;
use crate::engine::{GenerationEngine, PreviewTarget, ResourcePack, ResourceStack, ResourceStackResolver};
use async_trait::async_trait;
use holo_core::{Artifact, ContentHash, HoloError, InputFile, Result};
use holo_intake::accept::{PACK_EXTENSION, STRUCTURE_EXTENSION};
use holo_intake::file_set::default_pack_name;
use holo_intake::PriorOutputExtractor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Format marker written into every mock bundle
pub const BUNDLE_FORMAT: &str = "holo-mock-pack";

/// Suffix of generated pack names
pub const OUTPUT_SUFFIX: &str = ".holoprint.mcpack";

/// Name of the built-in base resource pack
pub const VANILLA_PACK: &str = "vanilla";

/// Contents of a mock-generated pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackBundle {
    pub format: String,
    pub version: String,
    pub pack_name: String,
    pub resource_packs: Vec<String>,
    pub config: GenerationConfig,
    pub structures: Vec<InputFile>,
}

impl PackBundle {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bundle: PackBundle = serde_json::from_slice(bytes)
            .map_err(|e| HoloError::PackFormatError(format!("Not a generated pack: {}", e)))?;
        if bundle.format != BUNDLE_FORMAT {
            return Err(HoloError::PackFormatError(format!(
                "Unknown pack format '{}'",
                bundle.format
            )));
        }
        Ok(bundle)
    }
}

/// An engine that writes a JSON bundle instead of a real pack
#[derive(Default)]
pub struct MockEngine {
    crash: Option<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose every run fails with an unclassified error
    pub fn crashing(message: impl Into<String>) -> Self {
        Self {
            crash: Some(message.into()),
        }
    }
}

#[async_trait(?Send)]
impl GenerationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        files: &[InputFile],
        config: &GenerationConfig,
        stack: &ResourceStack,
        preview: Option<&dyn PreviewTarget>,
    ) -> Result<Artifact> {
        if let Some(message) = &self.crash {
            return Err(HoloError::GenerationError(message.clone()));
        }
        if files.is_empty() {
            return Err(HoloError::UserInput("No structure files were provided".to_string()));
        }
        for file in files {
            if !file.has_extension(STRUCTURE_EXTENSION) {
                return Err(HoloError::UserInput(format!(
                    "'{}' is not a structure file",
                    file.name
                )));
            }
            if file.is_empty() {
                return Err(HoloError::UserInput(format!(
                    "Structure file '{}' is empty",
                    file.name
                )));
            }
        }

        if let Some(target) = preview {
            for file in files {
                target.show_preview(&file.name, stack);
            }
        }

        let pack_name = config
            .pack_name
            .clone()
            .unwrap_or_else(|| default_pack_name(files));
        let bundle = PackBundle {
            format: BUNDLE_FORMAT.to_string(),
            version: crate::VERSION.to_string(),
            pack_name: pack_name.clone(),
            resource_packs: stack.names().into_iter().map(str::to_string).collect(),
            config: config.clone(),
            structures: files.to_vec(),
        };
        let bytes = serde_json::to_vec(&bundle)?;
        debug!(pack = %pack_name, structures = files.len(), bytes = bytes.len(), "Mock pack bundled");

        Ok(Artifact::new(format!("{}{}", pack_name, OUTPUT_SUFFIX), bytes))
    }
}

/// Reads structure files back out of a mock-generated pack
#[derive(Default)]
pub struct MockPackExtractor;

impl MockPackExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl PriorOutputExtractor for MockPackExtractor {
    async fn extract_prior_output_files(&self, archive: &InputFile) -> Result<Vec<InputFile>> {
        if !archive.has_extension(PACK_EXTENSION) {
            return Err(HoloError::PackFormatError(format!(
                "'{}' is not a {} file",
                archive.name, PACK_EXTENSION
            )));
        }
        Ok(PackBundle::from_bytes(&archive.bytes)?.structures)
    }
}

/// Resolves stacks made of local override packs over the vanilla pack
#[derive(Default)]
pub struct BuiltinStackResolver;

impl BuiltinStackResolver {
    pub fn new() -> Self {
        Self
    }

    fn vanilla() -> ResourcePack {
        ResourcePack::new(VANILLA_PACK, ContentHash::of(VANILLA_PACK.as_bytes()))
    }
}

#[async_trait(?Send)]
impl ResourceStackResolver for BuiltinStackResolver {
    async fn resolve(&self, overrides: &[InputFile]) -> Result<ResourceStack> {
        let mut packs = Vec::with_capacity(overrides.len() + 1);
        for file in overrides {
            if file.is_empty() {
                return Err(HoloError::ResourcePackError(format!(
                    "Resource pack '{}' is empty",
                    file.name
                )));
            }
            if !(file.has_extension(PACK_EXTENSION) || file.has_extension(".zip")) {
                return Err(HoloError::ResourcePackError(format!(
                    "'{}' is not a resource pack",
                    file.name
                )));
            }
            packs.push(ResourcePack::new(file.stem(), ContentHash::of(&file.bytes)));
        }
        packs.push(Self::vanilla());
        Ok(ResourceStack::new(packs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn structure(name: &str) -> InputFile {
        InputFile::new(name, b"structure-bytes".to_vec())
    }

    fn default_stack() -> ResourceStack {
        pollster::block_on(BuiltinStackResolver::new().resolve(&[])).unwrap()
    }

    #[derive(Default)]
    struct RecordingPreview {
        shown: RefCell<Vec<String>>,
    }

    impl PreviewTarget for RecordingPreview {
        fn show_preview(&self, structure: &str, stack: &ResourceStack) {
            self.shown.borrow_mut().push(format!("{} {}", structure, stack));
        }
    }

    #[test]
    fn test_mock_generate_bundles_structures() {
        let engine = MockEngine::new();
        let files = vec![structure("castle.mcstructure"), structure("tower.mcstructure")];
        let config = GenerationConfig::default();

        let artifact =
            pollster::block_on(engine.generate(&files, &config, &default_stack(), None)).unwrap();
        assert_eq!(artifact.name, "castle, tower.holoprint.mcpack");

        let bundle = PackBundle::from_bytes(&artifact.bytes).unwrap();
        assert_eq!(bundle.structures, files);
        assert_eq!(bundle.resource_packs, vec![VANILLA_PACK]);
        assert_eq!(bundle.version, crate::VERSION);
    }

    #[test]
    fn test_mock_generate_uses_configured_pack_name() {
        let config = GenerationConfig {
            pack_name: Some("Keep".to_string()),
            ..Default::default()
        };
        let artifact = pollster::block_on(MockEngine::new().generate(
            &[structure("a.mcstructure")],
            &config,
            &default_stack(),
            None,
        ))
        .unwrap();
        assert_eq!(artifact.name, "Keep.holoprint.mcpack");
    }

    #[test]
    fn test_mock_generate_reports_user_errors() {
        let engine = MockEngine::new();
        let config = GenerationConfig::default();
        let stack = default_stack();

        let err = pollster::block_on(engine.generate(&[], &config, &stack, None)).unwrap_err();
        assert!(err.is_user_facing());

        let empty = InputFile::new("empty.mcstructure", Vec::new());
        let err = pollster::block_on(engine.generate(&[empty], &config, &stack, None)).unwrap_err();
        assert!(matches!(err, HoloError::UserInput(msg) if msg.contains("empty.mcstructure")));
    }

    #[test]
    fn test_crashing_engine_is_not_user_facing() {
        let err = pollster::block_on(MockEngine::crashing("boom").generate(
            &[structure("a.mcstructure")],
            &GenerationConfig::default(),
            &default_stack(),
            None,
        ))
        .unwrap_err();
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_preview_receives_each_structure() {
        let preview = RecordingPreview::default();
        let files = vec![structure("a.mcstructure"), structure("b.mcstructure")];
        pollster::block_on(MockEngine::new().generate(
            &files,
            &GenerationConfig::default(),
            &default_stack(),
            Some(&preview),
        ))
        .unwrap();
        assert_eq!(
            *preview.shown.borrow(),
            vec!["a.mcstructure [vanilla]", "b.mcstructure [vanilla]"]
        );
    }

    #[test]
    fn test_extractor_reads_generated_pack() {
        let files = vec![structure("castle.mcstructure")];
        let artifact = pollster::block_on(MockEngine::new().generate(
            &files,
            &GenerationConfig::default(),
            &default_stack(),
            None,
        ))
        .unwrap();

        let pack = InputFile::new(artifact.name.clone(), artifact.bytes.clone());
        let extracted =
            pollster::block_on(MockPackExtractor::new().extract_prior_output_files(&pack)).unwrap();
        assert_eq!(extracted, files);
    }

    #[test]
    fn test_extractor_rejects_foreign_packs() {
        let extractor = MockPackExtractor::new();
        let garbage = InputFile::new("other.mcpack", b"PK\x03\x04".to_vec());
        let err = pollster::block_on(extractor.extract_prior_output_files(&garbage)).unwrap_err();
        assert!(matches!(err, HoloError::PackFormatError(_)));

        let wrong_ext = InputFile::new("world.mcworld", b"{}".to_vec());
        let err = pollster::block_on(extractor.extract_prior_output_files(&wrong_ext)).unwrap_err();
        assert!(matches!(err, HoloError::PackFormatError(_)));
    }

    #[test]
    fn test_resolver_layers_overrides_over_vanilla() {
        let resolver = BuiltinStackResolver::new();
        let overrides = vec![InputFile::new("Faithful.mcpack", b"pack".to_vec())];
        let stack = pollster::block_on(resolver.resolve(&overrides)).unwrap();
        assert_eq!(stack.names(), vec!["Faithful", VANILLA_PACK]);
        assert!(!stack.is_default());
        assert!(default_stack().is_default());
    }

    #[test]
    fn test_resolver_rejects_bad_overrides() {
        let resolver = BuiltinStackResolver::new();
        let err = pollster::block_on(resolver.resolve(&[InputFile::new("notes.txt", b"x".to_vec())]))
            .unwrap_err();
        assert!(matches!(err, HoloError::ResourcePackError(_)));
    }
}
