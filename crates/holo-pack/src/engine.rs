//! Generation engine and resource stack traits
//!
//! The engine that actually builds a pack lives outside this crate. It is
//! reached through [`GenerationEngine`]; the vanilla and override resource
//! packs it textures from come from a [`ResourceStackResolver`].

use crate::config::GenerationConfig;
use async_trait::async_trait;
use holo_core::{Artifact, ContentHash, InputFile, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One resource pack in a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePack {
    pub name: String,
    pub hash: ContentHash,
}

impl ResourcePack {
    pub fn new(name: impl Into<String>, hash: ContentHash) -> Self {
        Self {
            name: name.into(),
            hash,
        }
    }
}

/// Ordered resource packs, highest priority first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStack {
    pub packs: Vec<ResourcePack>,
}

impl ResourceStack {
    pub fn new(packs: Vec<ResourcePack>) -> Self {
        Self { packs }
    }

    pub fn is_default(&self) -> bool {
        self.packs.len() <= 1
    }

    pub fn names(&self) -> Vec<&str> {
        self.packs.iter().map(|p| p.name.as_str()).collect()
    }
}

impl fmt::Display for ResourceStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names().join(" > "))
    }
}

/// Resolves the resource stack used for previews and generation
#[async_trait(?Send)]
pub trait ResourceStackResolver {
    /// Resolve a stack with `overrides` layered over the default packs.
    /// An empty slice resolves the default stack. Fails with
    /// `HoloError::ResourcePackError` when an override cannot be read.
    async fn resolve(&self, overrides: &[InputFile]) -> Result<ResourceStack>;
}

/// Receives preview renders while a pack is generated
pub trait PreviewTarget {
    fn show_preview(&self, structure: &str, stack: &ResourceStack);
}

/// Trait implemented by each generation engine
#[async_trait(?Send)]
pub trait GenerationEngine {
    /// Engine name (e.g. "mock")
    fn name(&self) -> &str;

    /// Build a pack from structure files.
    ///
    /// Fails with `HoloError::UserInput` when the input itself is unusable
    /// (shown to the user as-is); any other error is treated as a crash.
    async fn generate(
        &self,
        files: &[InputFile],
        config: &GenerationConfig,
        stack: &ResourceStack,
        preview: Option<&dyn PreviewTarget>,
    ) -> Result<Artifact>;
}
