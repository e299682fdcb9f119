//! Snapshot of the generation form's named values

use holo_core::numeric::{parse_leading_float, parse_leading_int};
use holo_core::{HoloError, Result};

/// Named form values in document order. A name may repeat; lookups
/// return the first value. Unchecked checkboxes are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    entries: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value submitted under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value under `name`, treating an empty string as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Checkbox state: present with a non-empty value
    pub fn is_checked(&self, name: &str) -> bool {
        self.text(name).is_some()
    }

    /// Leading decimal number of a non-empty value
    pub fn number(&self, name: &str) -> Option<f64> {
        self.text(name).and_then(parse_leading_float)
    }

    /// Leading integer of a non-empty value
    pub fn integer(&self, name: &str) -> Option<i64> {
        self.text(name).and_then(parse_leading_int)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a snapshot from a TOML document.
    ///
    /// Strings and numbers become values, `true` becomes a checked box
    /// (`"on"`), `false` is omitted, arrays submit one value per item and
    /// nested tables flatten into dotted names (`[control] pick = "..."`
    /// submits `control.pick`).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let mut snapshot = Self::new();
        flatten_into(&mut snapshot, "", &toml::Value::Table(table))?;
        Ok(snapshot)
    }
}

fn flatten_into(snapshot: &mut FormSnapshot, name: &str, value: &toml::Value) -> Result<()> {
    match value {
        toml::Value::String(s) => snapshot.push(name, s.as_str()),
        toml::Value::Integer(i) => snapshot.push(name, i.to_string()),
        toml::Value::Float(f) => snapshot.push(name, f.to_string()),
        toml::Value::Boolean(true) => snapshot.push(name, "on"),
        toml::Value::Boolean(false) => {}
        toml::Value::Datetime(d) => snapshot.push(name, d.to_string()),
        toml::Value::Array(items) => {
            for item in items {
                if matches!(item, toml::Value::Table(_) | toml::Value::Array(_)) {
                    return Err(HoloError::TomlParseError(format!(
                        "Form field '{}' cannot hold nested arrays or tables",
                        name
                    )));
                }
                flatten_into(snapshot, name, item)?;
            }
        }
        toml::Value::Table(table) => {
            for (key, child) in table {
                let child_name = if name.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", name, key)
                };
                flatten_into(snapshot, &child_name, child)?;
            }
        }
    }
    Ok(())
}
