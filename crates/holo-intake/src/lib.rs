//! Holo Intake - Asset intake and deduplication
//!
//! Files reach the tool through three acquisition channels (direct
//! selection, world-archive extraction and prior-output extraction) plus
//! drag-and-drop. All of them write into one [`CanonicalFileSet`], the
//! single source of truth handed to generation.

pub mod accept;
pub mod channel;
pub mod drag;
pub mod file_set;
pub mod intake;

pub use accept::{AcceptList, FileFamily};
pub use channel::{
    ChannelOutcome, ExtractionState, PriorOutputExtractor, StructureExtractor,
    UnsupportedWorldExtractor,
};
pub use drag::DragState;
pub use file_set::{CanonicalFileSet, FileSetChange, FileSetEvent, FileSetObserver, FileTable, PackNamePlaceholder};
pub use intake::{Channel, DropOutcome, DropTarget, Intake, SelectionReport};
