//! Archive acquisition channels
//!
//! World archives and previously generated packs are opened by external
//! extractors. Each channel keeps its own extraction state and a
//! selection counter used to discard results that arrive after the user
//! already picked another archive.

use async_trait::async_trait;
use holo_core::{HoloError, InputFile, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Extracts saved structure files from a world archive
#[async_trait(?Send)]
pub trait StructureExtractor {
    /// Fails with `HoloError::ArchiveFormatError` on a malformed archive
    async fn extract_structure_files(&self, archive: &InputFile) -> Result<BTreeMap<String, InputFile>>;
}

/// Extracts the structure files embedded in a previously generated pack
#[async_trait(?Send)]
pub trait PriorOutputExtractor {
    /// Fails with `HoloError::PackFormatError` when the pack is not one of ours
    async fn extract_prior_output_files(&self, archive: &InputFile) -> Result<Vec<InputFile>>;
}

/// World extractor for builds without world-archive support
pub struct UnsupportedWorldExtractor;

#[async_trait(?Send)]
impl StructureExtractor for UnsupportedWorldExtractor {
    async fn extract_structure_files(&self, archive: &InputFile) -> Result<BTreeMap<String, InputFile>> {
        Err(HoloError::ArchiveFormatError(format!(
            "Cannot read world archive '{}': world extraction is not available in this build",
            archive.name
        )))
    }
}

/// UI state of one archive channel. The variants are mutually exclusive;
/// an empty archive and a broken archive are different states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractionState {
    #[default]
    Idle,
    Extracting,
    Extracted { count: usize },
    NothingFound,
    Failed { message: String },
}

impl ExtractionState {
    pub fn is_error(&self) -> bool {
        matches!(self, ExtractionState::NothingFound | ExtractionState::Failed { .. })
    }
}

/// Result of driving a channel to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The extraction result was applied and the channel is in this state
    Applied(ExtractionState),
    /// A newer selection on the same channel started meanwhile; the
    /// result was dropped
    Superseded,
    /// The selection was cleared
    Cleared,
}

/// Per-channel bookkeeping
#[derive(Default)]
pub(crate) struct ChannelSlot {
    state: RefCell<ExtractionState>,
    selection: Cell<u64>,
}

impl ChannelSlot {
    pub(crate) fn state(&self) -> ExtractionState {
        self.state.borrow().clone()
    }

    pub(crate) fn set_state(&self, state: ExtractionState) {
        *self.state.borrow_mut() = state;
    }

    /// Register a new selection and return its ticket
    pub(crate) fn begin(&self) -> u64 {
        let ticket = self.selection.get().wrapping_add(1);
        self.selection.set(ticket);
        ticket
    }

    /// Whether `ticket` still belongs to the latest selection
    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.selection.get() == ticket
    }
}
