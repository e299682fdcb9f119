//! The canonical file selection and its observers

use holo_core::InputFile;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Pack name used when the selection is empty
pub const FALLBACK_PACK_NAME: &str = "hologram";

/// What a mutation did to the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSetChange {
    /// Files were appended; names already present were skipped
    Appended { added: usize, duplicates: usize },
    /// The whole selection was overwritten
    Replaced { previous: usize },
}

/// Sent to every observer exactly once per mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSetEvent {
    pub change: FileSetChange,
    pub len: usize,
}

/// UI attached to the canonical selection (file table, pack-name
/// placeholder, preview)
pub trait FileSetObserver {
    fn notify(&self, files: &[InputFile], event: &FileSetEvent);
}

/// Ordered selection of input files, unique by name
#[derive(Default)]
pub struct CanonicalFileSet {
    files: Vec<InputFile>,
    observers: Vec<Rc<dyn FileSetObserver>>,
}

impl CanonicalFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, observer: Rc<dyn FileSetObserver>) {
        self.observers.push(observer);
    }

    /// Append files, skipping any whose name is already selected.
    /// Existing files are never removed or reordered.
    pub fn merge<I: IntoIterator<Item = InputFile>>(&mut self, incoming: I) -> FileSetEvent {
        let mut names: HashSet<String> = self.files.iter().map(|f| f.name.clone()).collect();
        let mut added = 0;
        let mut duplicates = 0;
        for file in incoming {
            if names.insert(file.name.clone()) {
                self.files.push(file);
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::debug!(duplicates, "Skipped files already in the selection");
        }
        self.publish(FileSetChange::Appended { added, duplicates })
    }

    /// Overwrite the selection outright (drop onto the dedicated zone)
    pub fn replace<I: IntoIterator<Item = InputFile>>(&mut self, incoming: I) -> FileSetEvent {
        let previous = self.files.len();
        self.files.clear();
        let mut names = HashSet::new();
        for file in incoming {
            if names.insert(file.name.clone()) {
                self.files.push(file);
            }
        }
        self.publish(FileSetChange::Replaced { previous })
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Name suggested for the pack when the user leaves it blank
    pub fn default_pack_name(&self) -> String {
        default_pack_name(&self.files)
    }

    fn publish(&self, change: FileSetChange) -> FileSetEvent {
        let event = FileSetEvent {
            change,
            len: self.files.len(),
        };
        for observer in &self.observers {
            observer.notify(&self.files, &event);
        }
        event
    }
}

/// File stems joined with ", ", or [`FALLBACK_PACK_NAME`] when empty
pub fn default_pack_name(files: &[InputFile]) -> String {
    if files.is_empty() {
        return FALLBACK_PACK_NAME.to_string();
    }
    files
        .iter()
        .map(|f| f.stem())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows shown in the file table
#[derive(Default)]
pub struct FileTable {
    rows: RefCell<Vec<(String, usize)>>,
    refreshes: RefCell<usize>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(name, size in bytes)` per selected file
    pub fn rows(&self) -> Vec<(String, usize)> {
        self.rows.borrow().clone()
    }

    /// How many times the table was redrawn
    pub fn refreshes(&self) -> usize {
        *self.refreshes.borrow()
    }
}

impl FileSetObserver for FileTable {
    fn notify(&self, files: &[InputFile], _event: &FileSetEvent) {
        *self.rows.borrow_mut() = files.iter().map(|f| (f.name.clone(), f.len())).collect();
        *self.refreshes.borrow_mut() += 1;
    }
}

/// Keeps the pack-name field's placeholder in sync with the selection
pub struct PackNamePlaceholder {
    text: RefCell<String>,
}

impl Default for PackNamePlaceholder {
    fn default() -> Self {
        Self {
            text: RefCell::new(FALLBACK_PACK_NAME.to_string()),
        }
    }
}

impl PackNamePlaceholder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

impl FileSetObserver for PackNamePlaceholder {
    fn notify(&self, files: &[InputFile], _event: &FileSetEvent) {
        *self.text.borrow_mut() = default_pack_name(files);
    }
}
