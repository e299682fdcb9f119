//! The intake controller
//!
//! `Intake` is the single owner of the canonical selection, the drag
//! overlay state and the per-channel extraction state. Every entry point
//! corresponds to one UI event; all of them run on the same thread and
//! never hold a borrow across an `.await`.

use crate::accept::{AcceptList, FileFamily};
use crate::channel::{
    ChannelOutcome, ChannelSlot, ExtractionState, PriorOutputExtractor, StructureExtractor,
};
use crate::drag::DragState;
use crate::file_set::{CanonicalFileSet, FileSetEvent, FileSetObserver};
use holo_core::{InputFile, ValidationError};
use holo_i18n::Localizer;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// The three acquisition channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Direct,
    World,
    PriorOutput,
}

/// Where files were dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The dedicated structure drop zone; replaces the selection
    Zone,
    /// Anywhere else in the window; routed by file family
    Elsewhere,
}

/// Result of a direct selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionReport {
    /// Set when accepted files were merged
    pub event: Option<FileSetEvent>,
    /// Names of files excluded for having the wrong type
    pub rejected: Vec<String>,
}

/// What a drop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Replaced(FileSetEvent),
    Selected(SelectionReport),
    World(ChannelOutcome),
    PriorOutput(ChannelOutcome),
    /// Nothing recognisable was dropped; the selection is unchanged
    Ignored,
}

pub struct Intake {
    localizer: Rc<Localizer>,
    files: RefCell<CanonicalFileSet>,
    drag: Cell<DragState>,
    structure_accept: AcceptList,
    direct_invalid: Cell<bool>,
    world: ChannelSlot,
    prior_output: ChannelSlot,
    world_extractor: Box<dyn StructureExtractor>,
    prior_output_extractor: Box<dyn PriorOutputExtractor>,
}

impl Intake {
    pub fn new(
        localizer: Rc<Localizer>,
        world_extractor: Box<dyn StructureExtractor>,
        prior_output_extractor: Box<dyn PriorOutputExtractor>,
    ) -> Self {
        Self {
            localizer,
            files: RefCell::new(CanonicalFileSet::new()),
            drag: Cell::new(DragState::new()),
            structure_accept: AcceptList::structures(),
            direct_invalid: Cell::new(false),
            world: ChannelSlot::default(),
            prior_output: ChannelSlot::default(),
            world_extractor,
            prior_output_extractor,
        }
    }

    /// Attach UI to the canonical selection
    pub fn attach(&self, observer: Rc<dyn FileSetObserver>) {
        self.files.borrow_mut().attach(observer);
    }

    /// Snapshot of the canonical selection
    pub fn files(&self) -> Vec<InputFile> {
        self.files.borrow().files().to_vec()
    }

    pub fn file_count(&self) -> usize {
        self.files.borrow().len()
    }

    /// Run `f` against the canonical selection without copying it
    pub fn with_files<R>(&self, f: impl FnOnce(&CanonicalFileSet) -> R) -> R {
        f(&self.files.borrow())
    }

    // ---- direct selection ----

    /// Files picked in the structure file control. Files of the wrong type
    /// are left out and mark the control invalid; the rest are appended.
    pub fn select_files(&self, files: Vec<InputFile>) -> SelectionReport {
        if files.is_empty() {
            return SelectionReport::default();
        }
        let (accepted, rejected) = self.structure_accept.partition(files);
        let rejected: Vec<String> = rejected.into_iter().map(|f| f.name).collect();
        self.direct_invalid.set(!rejected.is_empty());
        if !rejected.is_empty() {
            tracing::warn!(rejected = ?rejected, "Excluded files with the wrong type");
        }

        let event = if accepted.is_empty() {
            None
        } else {
            Some(self.files.borrow_mut().merge(accepted))
        };
        SelectionReport { event, rejected }
    }

    /// The direct control's validation error, if the last pick had
    /// files of the wrong type
    pub fn direct_error(&self) -> Option<ValidationError> {
        self.direct_invalid.get().then(|| ValidationError::WrongFileType {
            accepted: self.accepted_types_label(),
        })
    }

    /// Localized message for the direct control ("Please upload only
    /// .mcstructure files.")
    pub fn direct_error_message(&self) -> Option<String> {
        self.direct_error().map(|err| {
            let mut subs = BTreeMap::new();
            subs.insert("file_type".to_string(), self.accepted_types_label());
            self.localizer.render_current(err.translation_key(), &subs)
        })
    }

    fn accepted_types_label(&self) -> String {
        self.localizer.join_or(&self.structure_accept.labels())
    }

    // ---- archive channels ----

    /// A world archive was picked (or the pick was cleared with `None`)
    pub async fn upload_world(&self, archive: Option<InputFile>) -> ChannelOutcome {
        let ticket = self.world.begin();
        self.world.set_state(ExtractionState::Idle);
        let Some(archive) = archive else {
            return ChannelOutcome::Cleared;
        };

        self.world.set_state(ExtractionState::Extracting);
        tracing::info!(archive = %archive.name, "Extracting structures from world");
        let result = self.world_extractor.extract_structure_files(&archive).await;

        if !self.world.is_current(ticket) {
            tracing::debug!(archive = %archive.name, "Discarding stale world extraction");
            return ChannelOutcome::Superseded;
        }

        let state = match result {
            Err(e) => {
                tracing::warn!(archive = %archive.name, error = %e, "World extraction failed");
                ExtractionState::Failed {
                    message: e.to_string(),
                }
            }
            Ok(found) if found.is_empty() => ExtractionState::NothingFound,
            Ok(found) => {
                let count = found.len();
                self.files.borrow_mut().merge(found.into_values());
                ExtractionState::Extracted { count }
            }
        };
        self.world.set_state(state.clone());
        ChannelOutcome::Applied(state)
    }

    /// A previously generated pack was picked (or cleared with `None`)
    pub async fn upload_prior_output(&self, archive: Option<InputFile>) -> ChannelOutcome {
        let ticket = self.prior_output.begin();
        self.prior_output.set_state(ExtractionState::Idle);
        let Some(archive) = archive else {
            return ChannelOutcome::Cleared;
        };

        self.prior_output.set_state(ExtractionState::Extracting);
        tracing::info!(archive = %archive.name, "Extracting structures from pack");
        let result = self
            .prior_output_extractor
            .extract_prior_output_files(&archive)
            .await;

        if !self.prior_output.is_current(ticket) {
            tracing::debug!(archive = %archive.name, "Discarding stale pack extraction");
            return ChannelOutcome::Superseded;
        }

        let state = match result {
            Err(e) => {
                tracing::warn!(archive = %archive.name, error = %e, "Pack extraction failed");
                ExtractionState::Failed {
                    message: e.to_string(),
                }
            }
            Ok(found) if found.is_empty() => ExtractionState::NothingFound,
            Ok(found) => {
                let count = found.len();
                self.files.borrow_mut().merge(found);
                ExtractionState::Extracted { count }
            }
        };
        self.prior_output.set_state(state.clone());
        ChannelOutcome::Applied(state)
    }

    pub fn channel_state(&self, channel: Channel) -> ExtractionState {
        match channel {
            Channel::Direct => ExtractionState::Idle,
            Channel::World => self.world.state(),
            Channel::PriorOutput => self.prior_output.state(),
        }
    }

    /// Localized notice for a channel's current state
    pub fn channel_message(&self, channel: Channel) -> Option<String> {
        if channel == Channel::Direct {
            return self.direct_error_message();
        }
        let prefix = match channel {
            Channel::World => "extract.world",
            _ => "extract.pack",
        };
        let mut subs = BTreeMap::new();
        let key = match self.channel_state(channel) {
            ExtractionState::Idle => return None,
            ExtractionState::Extracting => format!("{}.in_progress", prefix),
            ExtractionState::Extracted { count } => {
                subs.insert("count".to_string(), count.to_string());
                format!("{}.success", prefix)
            }
            ExtractionState::NothingFound => format!("{}.none_found", prefix),
            ExtractionState::Failed { message } => {
                subs.insert("error".to_string(), message);
                format!("{}.error", prefix)
            }
        };
        Some(self.localizer.render_current(&key, &subs))
    }

    // ---- drag and drop ----

    pub fn drag_enter(&self, carries_files: bool) {
        let mut drag = self.drag.get();
        drag.enter(carries_files);
        self.drag.set(drag);
    }

    pub fn drag_leave(&self, left_viewport: bool) {
        let mut drag = self.drag.get();
        drag.leave(left_viewport);
        self.drag.set(drag);
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.get()
    }

    pub fn overlay_visible(&self) -> bool {
        self.drag.get().overlay_visible()
    }

    /// Files dropped anywhere in the window. Always hides the overlay.
    pub async fn drop_files(&self, files: Vec<InputFile>, target: DropTarget) -> DropOutcome {
        let mut drag = self.drag.get();
        drag.reset();
        self.drag.set(drag);

        match target {
            DropTarget::Zone => {
                let (accepted, rejected) = self.structure_accept.partition(files);
                if !rejected.is_empty() {
                    tracing::debug!(count = rejected.len(), "Filtered dropped files of the wrong type");
                }
                if accepted.is_empty() {
                    return DropOutcome::Ignored;
                }
                DropOutcome::Replaced(self.files.borrow_mut().replace(accepted))
            }
            DropTarget::Elsewhere => self.route_files(files).await,
        }
    }

    /// Hand files to the channel matching their family: structures go to
    /// direct selection, else the first pack, else the first world.
    /// Also used for files the OS opens the app with.
    pub async fn route_files(&self, files: Vec<InputFile>) -> DropOutcome {
        let mut structures = Vec::new();
        let mut pack = None;
        let mut world = None;
        for file in files {
            match FileFamily::of(&file) {
                Some(FileFamily::Structure) => structures.push(file),
                Some(FileFamily::PriorOutput) if pack.is_none() => pack = Some(file),
                Some(FileFamily::World) if world.is_none() => world = Some(file),
                _ => {}
            }
        }

        if !structures.is_empty() {
            DropOutcome::Selected(self.select_files(structures))
        } else if let Some(pack) = pack {
            DropOutcome::PriorOutput(self.upload_prior_output(Some(pack)).await)
        } else if let Some(world) = world {
            DropOutcome::World(self.upload_world(Some(world)).await)
        } else {
            tracing::warn!(
                "No compatible files (.mcstructure, .mcpack, .mcworld, .zip) found in dropped items"
            );
            DropOutcome::Ignored
        }
    }
}
