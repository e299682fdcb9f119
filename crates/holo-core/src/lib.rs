//! Holo Core - Foundational types for the Holo pack tooling
//!
//! This crate provides the types that all other Holo crates depend on:
//! - `InputFile` - A named in-memory file entering the tool
//! - `Artifact` - A generated output file
//! - `ContentHash` - SHA-256 based content hashing
//! - `numeric` - Lenient parsing of numbers typed into text fields
//! - Error types and Result alias

mod error;
mod file;
mod hash;
pub mod numeric;

pub use error::{HoloError, Result, ValidationError};
pub use file::{Artifact, InputFile};
pub use hash::ContentHash;
