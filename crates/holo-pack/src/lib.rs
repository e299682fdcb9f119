//! Holo Pack - Configuration synthesis and generation dispatch
//!
//! Turns a form snapshot plus the canonical file selection into a fully
//! defaulted [`GenerationConfig`], drives exactly one generation call per
//! submission through a pluggable [`GenerationEngine`], and classifies
//! the result into a [`GenerationOutcome`].

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod engines;
pub mod form;
pub mod logbuf;
pub mod report;
pub mod settings;

pub use config::{synthesize, GenerationConfig, OpacityMode};
pub use dispatch::{Dispatcher, GenerationOutcome, SubmitControl, SubmitGuard};
pub use engine::{GenerationEngine, PreviewTarget, ResourcePack, ResourceStack, ResourceStackResolver};
pub use engines::mock::{BuiltinStackResolver, MockEngine, MockPackExtractor};
pub use form::FormSnapshot;
pub use logbuf::{LogBuffer, LogEntry};
pub use report::IssueReport;
pub use settings::HoloSettings;

/// Version tag embedded in generated packs and bug reports
pub const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
