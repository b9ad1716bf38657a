use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Store, StoreError};
use crate::domain::ContactName;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Contact name → phone number mapping.
///
/// Names are unique keys. Numbers may repeat, though the send workflow avoids
/// adding the same number twice.
pub struct ContactBook(BTreeMap<String, String>);

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// `true` when any contact already has this number.
    pub fn contains_number(&self, number: &str) -> bool {
        self.0.values().any(|value| value == number)
    }

    /// Insert or replace an entry, returning the previous number for `name`.
    pub fn insert(&mut self, name: impl Into<String>, number: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), number.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, number)| (name.as_str(), number.as_str()))
    }

    /// Name for the next auto-added contact: `ContactName_<len>`, bumped past names
    /// that are already taken.
    pub fn next_auto_name(&self) -> ContactName {
        (self.len()..)
            .map(ContactName::auto)
            .find(|name| !self.contains_name(name.as_str()))
            .unwrap_or_else(|| ContactName::auto(self.len()))
    }
}

impl FromIterator<(String, String)> for ContactBook {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Store {
    /// Load the contact book; a missing or malformed file yields an empty book.
    pub fn load_contacts(&self) -> ContactBook {
        let path = self.contacts_path();
        let Some(contents) = Self::read_optional(&path) else {
            return ContactBook::new();
        };

        match serde_json::from_str::<ContactBook>(&contents) {
            Ok(book) => {
                debug!(contacts = book.len(), "contacts loaded");
                book
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed contacts file ignored");
                ContactBook::new()
            }
        }
    }

    /// Serialize the whole book and overwrite the contacts file.
    pub fn save_contacts(&self, book: &ContactBook) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(book)?;
        self.write_private(&self.contacts_path(), json.as_bytes())?;
        debug!(contacts = book.len(), "contacts saved");
        Ok(())
    }
}
