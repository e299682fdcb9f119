//! Engine registry
//!
//! Maps engine names to concrete implementations.

pub mod mock;

use crate::engine::GenerationEngine;
use holo_core::{HoloError, Result};

/// Create an engine by name
pub fn create_engine(name: &str) -> Result<Box<dyn GenerationEngine>> {
    match name {
        "mock" => Ok(Box::new(mock::MockEngine::new())),
        _ => Err(HoloError::GenerationError(format!(
            "Unknown engine '{}'. Available: {}",
            name,
            available_engines().join(", ")
        ))),
    }
}

/// List all available engine names
pub fn available_engines() -> Vec<&'static str> {
    vec!["mock"]
}
