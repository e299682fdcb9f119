//! Document tree of translatable elements
//!
//! A stand-in for the page the localizer writes into. Elements carry an
//! optional translation binding (key + where the text goes) and the
//! substitution values declared on them.

use std::collections::BTreeMap;
use std::fmt;

/// Attributes that may receive translated text instead of the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetAttribute {
    Placeholder,
    Title,
    Value,
    Alt,
    AriaLabel,
}

impl TargetAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            TargetAttribute::Placeholder => "placeholder",
            TargetAttribute::Title => "title",
            TargetAttribute::Value => "value",
            TargetAttribute::Alt => "alt",
            TargetAttribute::AriaLabel => "aria-label",
        }
    }
}

impl fmt::Display for TargetAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an element's translated text is written. One per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationTarget {
    Content,
    Attribute(TargetAttribute),
}

/// A translation key bound to an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBinding {
    pub key: String,
    pub target: TranslationTarget,
}

/// A node in the document tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub content: String,
    pub attributes: BTreeMap<String, String>,
    pub binding: Option<TranslationBinding>,
    /// Declared substitution values, keyed by name (`count`, `author`, ...)
    pub substitutions: BTreeMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Bind a key whose text goes into the element content
    pub fn translated(mut self, key: impl Into<String>) -> Self {
        self.binding = Some(TranslationBinding {
            key: key.into(),
            target: TranslationTarget::Content,
        });
        self
    }

    /// Bind a key whose text goes into `attribute` instead of the content
    pub fn translated_attr(mut self, key: impl Into<String>, attribute: TargetAttribute) -> Self {
        self.binding = Some(TranslationBinding {
            key: key.into(),
            target: TranslationTarget::Attribute(attribute),
        });
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_sub(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set or replace a substitution value on an existing element
    pub fn set_sub(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.substitutions.insert(name.into(), value.into());
    }

    pub fn attribute(&self, attribute: TargetAttribute) -> Option<&str> {
        self.attributes.get(attribute.name()).map(|s| s.as_str())
    }

    /// Write `text` to this element's bound target
    pub(crate) fn write_translation(&mut self, target: TranslationTarget, text: String) {
        match target {
            TranslationTarget::Content => self.content = text,
            TranslationTarget::Attribute(attr) => {
                self.attributes.insert(attr.name().to_string(), text);
            }
        }
    }
}

/// The document the localizer scans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Language attribute of the root (primary subtag, e.g. `pt`)
    pub lang: String,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Depth-first search by id
    pub fn find(&self, id: &str) -> Option<&Element> {
        fn walk<'a>(elements: &'a [Element], id: &str) -> Option<&'a Element> {
            for el in elements {
                if el.id == id {
                    return Some(el);
                }
                if let Some(found) = walk(&el.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.elements, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        fn walk<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
            for el in elements {
                if el.id == id {
                    return Some(el);
                }
                if let Some(found) = walk(&mut el.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&mut self.elements, id)
    }

    /// Visit every element carrying a translation binding
    pub fn for_each_translatable(&mut self, mut f: impl FnMut(&mut Element)) {
        fn walk(elements: &mut [Element], f: &mut dyn FnMut(&mut Element)) {
            for el in elements {
                if el.binding.is_some() {
                    f(el);
                }
                walk(&mut el.children, f);
            }
        }
        walk(&mut self.elements, &mut f);
    }
}
