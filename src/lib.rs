pub mod crypto;
pub mod error;
mod format;
pub mod generator;
mod storage;
mod store;

pub use crate::error::{CryptoError, GeneratorError, StoreError};
pub use crate::generator::{GeneratorConfig, generate_password};
pub use crate::storage::Storage;
pub use crate::store::EntryDetails;

use crate::store::{PasswordEntry, Store};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, Utc};
use directories::ProjectDirs;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// An unlocked vault.
///
/// Holds the master password for the lifetime of the session and passes it
/// explicitly to every seal/open call. The password is wiped on drop.
pub struct Vault {
    store: Store,
    storage: Storage,
    master: Zeroizing<String>,
}

/// Input for [`Vault::save_entry`].
#[derive(Debug, Default)]
pub struct NewEntry {
    pub name: String,
    pub details: EntryDetails,
    pub password: Zeroizing<String>,
    pub tags: Vec<String>,
}

/// An entry with its sealed fields opened.
#[derive(Debug)]
pub struct DecryptedEntry {
    pub id: u64,
    pub name: String,
    pub details: EntryDetails,
    pub password: Zeroizing<String>,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug)]
pub struct VaultStats {
    pub total_entries: usize,
    pub file_size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Local>,
}

impl Vault {
    pub fn init(password: Zeroizing<String>) -> Result<Self> {
        Self::init_with_storage(password, default_storage()?)
    }

    pub fn init_with_storage(password: Zeroizing<String>, storage: Storage) -> Result<Self> {
        if storage.exists() {
            bail!("pwvault store already exists");
        }

        let verifier =
            crypto::hash_password(&password).context("failed to hash master password")?;
        let vault = Self {
            store: Store::new(verifier),
            storage,
            master: password,
        };
        vault.save()?;

        debug!(path = %vault.storage.path().display(), "vault initialized");
        Ok(vault)
    }

    pub fn open(password: Zeroizing<String>) -> Result<Self> {
        Self::open_with_storage(password, default_storage()?)
    }

    /// Loads the vault and checks `password` against the stored verifier
    /// before any entry is touched.
    pub fn open_with_storage(password: Zeroizing<String>, storage: Storage) -> Result<Self> {
        if !storage.exists() {
            bail!("pwvault store does not exist; run `pwvault init` first");
        }

        let data = storage.load()?;
        let store = format::parse(&data)?;

        let valid = crypto::verify_password(&password, store.verifier())
            .context("vault verifier is corrupted")?;
        if !valid {
            bail!("invalid master password");
        }

        debug!(entries = store.len(), "vault unlocked");
        Ok(Self {
            store,
            storage,
            master: password,
        })
    }

    /// Seals the password and tags of `entry` and stores it, replacing any
    /// entry with the same name. Call [`Vault::save`] to persist.
    pub fn save_entry(&mut self, entry: NewEntry) -> Result<u64> {
        if entry.name.trim().is_empty() {
            bail!("entry name cannot be empty");
        }

        let password = crypto::seal(entry.password.as_bytes(), &self.master)
            .context("failed to encrypt password")?;

        let tags_json = Zeroizing::new(serde_json::to_vec(&entry.tags)?);
        let tags = crypto::seal(&tags_json, &self.master).context("failed to encrypt tags")?;

        let id = self.store.upsert(&entry.name, entry.details, password, tags);
        debug!(id, name = %entry.name, "entry sealed");
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Result<DecryptedEntry> {
        let entry = self
            .store
            .get(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;
        self.decrypt(entry)
    }

    /// All entries ordered by name. Entries whose password fails to decrypt
    /// are skipped.
    pub fn list(&self) -> Vec<DecryptedEntry> {
        self.decrypt_all(self.store.entries())
    }

    /// Entries whose name, username or url contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<DecryptedEntry> {
        self.decrypt_all(self.store.search(query))
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.store.remove(name)?;
        debug!(name, "entry removed");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.get(name).is_some()
    }

    pub fn stats(&self) -> Result<VaultStats> {
        let (file_size, modified) = self.storage.metadata()?;
        Ok(VaultStats {
            total_entries: self.store.len(),
            file_size,
            created: self.store.created(),
            modified: modified.into(),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn save(&self) -> Result<()> {
        let data = format::serialize(&self.store)?;
        self.storage.save(&data)
    }

    /// Entries whose password cannot be opened are skipped; unreadable tags
    /// degrade to an empty list.
    fn decrypt_all<'a>(
        &self,
        entries: impl Iterator<Item = &'a PasswordEntry>,
    ) -> Vec<DecryptedEntry> {
        entries
            .filter_map(|entry| {
                let password = match self.open_password(entry) {
                    Ok(password) => password,
                    Err(e) => {
                        warn!(
                            name = entry.name(),
                            error = %e,
                            "skipping entry that cannot be decrypted"
                        );
                        return None;
                    }
                };
                let tags = self.open_tags(entry).unwrap_or_else(|e| {
                    warn!(name = entry.name(), error = %e, "listing entry without tags");
                    Vec::new()
                });
                Some(to_decrypted(entry, password, tags))
            })
            .collect()
    }

    fn decrypt(&self, entry: &PasswordEntry) -> Result<DecryptedEntry> {
        let password = self.open_password(entry)?;
        let tags = self.open_tags(entry)?;
        Ok(to_decrypted(entry, password, tags))
    }

    fn open_password(&self, entry: &PasswordEntry) -> Result<Zeroizing<String>> {
        let name = entry.name();

        let plaintext = crypto::open(entry.password(), &self.master)
            .with_context(|| format!("failed to decrypt password '{name}'"))?;
        let password = std::str::from_utf8(&plaintext)
            .map_err(|_| anyhow!("password '{name}' is not valid UTF-8"))?;

        Ok(Zeroizing::new(password.to_owned()))
    }

    fn open_tags(&self, entry: &PasswordEntry) -> Result<Vec<String>> {
        let name = entry.name();

        let tags = crypto::open(entry.tags(), &self.master)
            .with_context(|| format!("failed to decrypt tags of '{name}'"))?;
        serde_json::from_slice(&tags).map_err(|_| anyhow!("tags of '{name}' are corrupted"))
    }
}

fn to_decrypted(
    entry: &PasswordEntry,
    password: Zeroizing<String>,
    tags: Vec<String>,
) -> DecryptedEntry {
    DecryptedEntry {
        id: entry.id(),
        name: entry.name().to_string(),
        details: entry.details().clone(),
        password,
        tags,
        created: entry.created(),
        updated: entry.updated(),
    }
}

/// `<platform data dir>/pwvault/vault.pwv`
pub fn default_storage() -> Result<Storage> {
    let project_dirs =
        ProjectDirs::from("", "", "pwvault").context("could not determine platform directories")?;

    Ok(Storage::new(project_dirs.data_dir().join("vault.pwv")))
}
