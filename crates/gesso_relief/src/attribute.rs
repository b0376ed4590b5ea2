//! Ordered attribute store attached to element nodes.

use std::borrow::Cow;
use std::fmt;

use gesso_carton::{SmallVec, String};

/// A single `key="value"` pair, or a bare `key` for value-less attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    /// Written without `=value`, e.g. `<input disabled>`
    pub key_only: bool,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            key_only: false,
        }
    }

    pub fn key_only(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: String::default(),
            key_only: true,
        }
    }
}

/// `value` with every `"` written as `&quot;`, ready to sit between double quotes
pub fn escape_quotes(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key_only {
            f.write_str(&self.key)
        } else {
            write!(f, "{}=\"{}\"", self.key, escape_quotes(&self.value))
        }
    }
}

/// Attributes of one element, in source order, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[Attribute; 4]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// Index and value of the attribute named `key`
    pub fn find(&self, key: &str) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, attr)| attr.key == key)
            .map(|(idx, attr)| (idx, attr.value.as_str()))
    }

    pub fn has(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).map(|(_, value)| value)
    }

    /// Add an attribute, replacing the value of an existing entry with the same key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if self.has(&key) {
            self.replace(&key, value);
        } else {
            self.entries.push(Attribute::new(key, value));
        }
    }

    /// Add an attribute as parsed, keeping its key-only flag.
    pub fn push(&mut self, attribute: Attribute) {
        match self.entries.iter_mut().find(|a| a.key == attribute.key) {
            Some(existing) => *existing = attribute,
            None => self.entries.push(attribute),
        }
    }

    /// Replace the value of `key` if present. Returns whether anything changed.
    pub fn replace(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|a| a.key == key) {
            Some(attr) => {
                attr.value = value.into();
                attr.key_only = false;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        let (idx, _) = self.find(key)?;
        Some(self.entries.remove(idx))
    }

    /// Copies of every attribute accepted by `predicate`, in order
    pub fn matching(&self, mut predicate: impl FnMut(&Attribute) -> bool) -> Vec<Attribute> {
        self.entries.iter().filter(|a| predicate(a)).cloned().collect()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut attributes = Self::new();
        for attribute in iter {
            attributes.push(attribute);
        }
        attributes
    }
}
