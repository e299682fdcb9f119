//! In-memory files flowing into and out of the tool

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A named file held in memory.
///
/// Files are identified by name inside the canonical selection; the bytes
/// are opaque to everything except the generation engine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn read<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self { name, bytes })
    }

    /// Case-insensitive check that the name ends with `suffix` (e.g. `.mcstructure`)
    pub fn has_extension(&self, suffix: &str) -> bool {
        self.name
            .to_ascii_lowercase()
            .ends_with(&suffix.to_ascii_lowercase())
    }

    /// File name with the last extension removed
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(0) | None => &self.name,
            Some(idx) => &self.name[..idx],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputFile({}, {} bytes)", self.name, self.bytes.len())
    }
}

/// The file produced by a successful generation
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
    pub hash: ContentHash,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let hash = ContentHash::of(&bytes);
        Self {
            name: name.into(),
            bytes,
            hash,
        }
    }

    /// Write the artifact into `dir` under its own name
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<std::path::PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Artifact({}, {} bytes, {})",
            self.name,
            self.bytes.len(),
            self.hash
        )
    }
}
