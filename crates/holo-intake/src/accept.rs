//! Accepted file types and file family classification

use holo_core::InputFile;
use std::fmt;

/// Extension of structure files, the only direct generation input
pub const STRUCTURE_EXTENSION: &str = ".mcstructure";
/// Extension of packs produced by an earlier generation
pub const PACK_EXTENSION: &str = ".mcpack";
/// Extensions of world archives
pub const WORLD_EXTENSIONS: [&str; 2] = [".mcworld", ".zip"];

/// The three file families recognised on a global drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFamily {
    Structure,
    PriorOutput,
    World,
}

impl FileFamily {
    pub fn of(file: &InputFile) -> Option<FileFamily> {
        if file.has_extension(STRUCTURE_EXTENSION) {
            Some(FileFamily::Structure)
        } else if file.has_extension(PACK_EXTENSION) {
            Some(FileFamily::PriorOutput)
        } else if WORLD_EXTENSIONS.iter().any(|ext| file.has_extension(ext)) {
            Some(FileFamily::World)
        } else {
            None
        }
    }
}

impl fmt::Display for FileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFamily::Structure => write!(f, "structure"),
            FileFamily::PriorOutput => write!(f, "prior output"),
            FileFamily::World => write!(f, "world"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptEntry {
    /// `.ext`, matched as a case-insensitive name suffix
    Extension(String),
    /// `image/png` or `image/*`
    Mime(String),
}

/// Parsed `accept` list of a file control (`".mcstructure, image/*"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    entries: Vec<AcceptEntry>,
}

impl AcceptList {
    pub fn parse(accept: &str) -> Self {
        let entries = accept
            .split(',')
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| {
                if e.starts_with('.') {
                    AcceptEntry::Extension(e)
                } else {
                    AcceptEntry::Mime(e)
                }
            })
            .collect();
        Self { entries }
    }

    /// Accept list for the structure controls
    pub fn structures() -> Self {
        Self::parse(STRUCTURE_EXTENSION)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `file` matches any entry. An empty list accepts everything.
    pub fn accepts(&self, file: &InputFile) -> bool {
        if self.entries.is_empty() {
            return true;
        }
        self.entries.iter().any(|entry| match entry {
            AcceptEntry::Extension(ext) => file.has_extension(ext),
            AcceptEntry::Mime(pattern) => match guess_mime(&file.name) {
                Some(mime) => match pattern.strip_suffix("/*") {
                    Some(top) => mime.split('/').next() == Some(top),
                    None => mime == pattern.as_str(),
                },
                None => false,
            },
        })
    }

    /// Entries as written, for messages ("A, B or C")
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| match e {
                AcceptEntry::Extension(s) | AcceptEntry::Mime(s) => s.clone(),
            })
            .collect()
    }

    /// Split files into (accepted, rejected)
    pub fn partition(&self, files: Vec<InputFile>) -> (Vec<InputFile>, Vec<InputFile>) {
        files.into_iter().partition(|f| self.accepts(f))
    }
}

fn guess_mime(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "json" => "application/json",
        "zip" | "mcworld" | "mcpack" => "application/zip",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> InputFile {
        InputFile::new(name, vec![0u8])
    }

    #[test]
    fn test_family_classification() {
        assert_eq!(FileFamily::of(&file("a.mcstructure")), Some(FileFamily::Structure));
        assert_eq!(FileFamily::of(&file("a.MCPACK")), Some(FileFamily::PriorOutput));
        assert_eq!(FileFamily::of(&file("a.mcworld")), Some(FileFamily::World));
        assert_eq!(FileFamily::of(&file("a.zip")), Some(FileFamily::World));
        assert_eq!(FileFamily::of(&file("a.png")), None);
    }

    #[test]
    fn test_extension_entries() {
        let accept = AcceptList::parse(".mcstructure");
        assert!(accept.accepts(&file("castle.mcstructure")));
        assert!(!accept.accepts(&file("castle.png")));
        assert!(!accept.accepts(&file("mcstructure")));
    }

    #[test]
    fn test_mime_wildcards() {
        let accept = AcceptList::parse("image/*, .mcpack");
        assert!(accept.accepts(&file("icon.PNG")));
        assert!(accept.accepts(&file("pack.mcpack")));
        assert!(!accept.accepts(&file("notes.txt")));
        let exact = AcceptList::parse("image/png");
        assert!(exact.accepts(&file("a.png")));
        assert!(!exact.accepts(&file("a.jpg")));
    }

    #[test]
    fn test_empty_list_accepts_everything() {
        assert!(AcceptList::parse(" , ").accepts(&file("anything.bin")));
    }

    #[test]
    fn test_partition_keeps_order() {
        let (ok, bad) = AcceptList::structures().partition(vec![
            file("a.mcstructure"),
            file("b.png"),
            file("c.mcstructure"),
        ]);
        let names: Vec<&str> = ok.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.mcstructure", "c.mcstructure"]);
        assert_eq!(bad.len(), 1);
    }
}
