use crate::crypto::Envelope;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The vault document: every entry plus the master-password verifier.
#[derive(Serialize, Deserialize, Debug)]
pub struct Store {
    created: DateTime<Utc>,
    next_id: u64,
    verifier: String,
    entries: BTreeMap<String, PasswordEntry>,
}

/// Plaintext metadata stored next to the sealed fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDetails {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PasswordEntry {
    id: u64,
    name: String,
    #[serde(flatten)]
    details: EntryDetails,
    password: Envelope,
    tags: Envelope,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl PasswordEntry {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn details(&self) -> &EntryDetails {
        &self.details
    }

    pub fn password(&self) -> &Envelope {
        &self.password
    }

    pub fn tags(&self) -> &Envelope {
        &self.tags
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    fn matches(&self, needle: &str) -> bool {
        [
            self.name.as_str(),
            self.details.username.as_str(),
            self.details.url.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Store {
    pub fn new(verifier: String) -> Self {
        Store {
            created: Utc::now(),
            next_id: 1,
            verifier,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the entry called `name`.
    ///
    /// A replaced entry keeps its id and creation time. Returns the entry id.
    pub fn upsert(
        &mut self,
        name: &str,
        details: EntryDetails,
        password: Envelope,
        tags: Envelope,
    ) -> u64 {
        let now = Utc::now();

        if let Some(entry) = self.entries.get_mut(name) {
            entry.details = details;
            entry.password = password;
            entry.tags = tags;
            entry.updated = now;
            return entry.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            name.to_string(),
            PasswordEntry {
                id,
                name: name.to_string(),
                details,
                password,
                tags,
                created: now,
                updated: now,
            },
        );
        id
    }

    pub fn get(&self, name: &str) -> Option<&PasswordEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        if self.entries.remove(name).is_some() {
            Ok(())
        } else {
            Err(StoreError::EntryNotFound(name.to_string()))
        }
    }

    /// Entries ordered by name.
    pub fn entries(&self) -> impl Iterator<Item = &PasswordEntry> {
        self.entries.values()
    }

    /// Case-insensitive substring match on name, username and url, ordered by name.
    pub fn search(&self, query: &str) -> impl Iterator<Item = &PasswordEntry> {
        let needle = query.to_lowercase();
        self.entries.values().filter(move |e| e.matches(&needle))
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
