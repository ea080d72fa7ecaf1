//! The persistent locomotive roster.
//!
//! [`Roster`] owns the set of known locomotives, loaded from the
//! persisted roster document at startup (with one-shot migration of the
//! legacy format) and exposed through address- and node-id-keyed
//! lookups. Every read and write of the entry collection is serialized
//! behind one mutex, held only for the duration of the scan or
//! mutation - never across storage I/O, so lookups are not blocked by a
//! slow persist.
//!
//! Entries are shared as `Arc<LocoEntry>`: the roster holds one
//! reference and every lookup result is another, so a handle obtained
//! before a removal stays valid until its holder drops it.
//!
//! # Example
//!
//! ```rust
//! use rs_depot::hal::mock::MemStorage;
//! use rs_depot::roster::Roster;
//! use rs_depot::traits::OlcbNodeMap;
//!
//! let mut storage = MemStorage::new();
//! let roster = Roster::open(&mut storage, OlcbNodeMap).unwrap();
//! assert!(roster.is_empty());
//! assert_eq!(roster.roster_json(), "[]");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info};

use crate::cdi;
use crate::loco::{LegacyLocoRecord, LocoConfig, LocoEntry, TransientEntry};
use crate::traits::{NodeIdMap, Storage};

/// Name of the persisted roster document.
pub const TRAIN_DB_FILE: &str = "trains.json";
/// Name of the legacy roster document, consumed once at migration.
pub const LEGACY_ROSTER_FILE: &str = "roster.json";
/// Name of the live configuration descriptor document.
pub const TRAIN_CDI_FILE: &str = "train.xml";
/// Name of the template configuration descriptor document.
pub const TEMP_TRAIN_CDI_FILE: &str = "tmptrain.xml";

/// Concurrently-guarded collection of locomotive roster entries.
pub struct Roster<M: NodeIdMap> {
    entries: Mutex<Vec<Arc<LocoEntry>>>,
    dirty: AtomicBool,
    legacy_entries_found: bool,
    mapper: M,
}

impl<M: NodeIdMap> Roster<M> {
    /// Load the roster from storage.
    ///
    /// Regenerates the two configuration descriptor documents (rewritten
    /// only when their content changed), loads the persisted roster
    /// document if present, then migrates any legacy roster document.
    /// Migrated entries mark the roster dirty; the legacy document is
    /// deliberately left in place (its removal after a successful
    /// persist is still pending).
    ///
    /// A malformed document is reported and contributes no entries;
    /// stored data is never fabricated.
    pub fn open<S: Storage>(storage: &mut S, mapper: M) -> Result<Self, S::Error> {
        cdi::write_if_changed(storage, TRAIN_CDI_FILE, &cdi::train_descriptor())?;
        cdi::write_if_changed(storage, TEMP_TRAIN_CDI_FILE, &cdi::temp_train_descriptor())?;

        info!("[Roster] Initializing...");
        let mut entries: Vec<Arc<LocoEntry>> = Vec::new();
        let mut dirty = false;
        let mut legacy_entries_found = false;

        if let Some(text) = storage.read(TRAIN_DB_FILE)? {
            match serde_json::from_str::<Vec<LocoConfig>>(&text) {
                Ok(configs) => {
                    for config in configs {
                        entries.push(Arc::new(LocoEntry::new(config)));
                    }
                }
                Err(err) => {
                    error!("[Roster] Ignoring malformed {TRAIN_DB_FILE}: {err}");
                }
            }
        }

        if let Some(text) = storage.read(LEGACY_ROSTER_FILE)? {
            info!("[Roster] Loading legacy roster file...");
            match serde_json::from_str::<Vec<LegacyLocoRecord>>(&text) {
                Ok(records) => {
                    for record in records {
                        entries.push(Arc::new(LocoEntry::new(record.into())));
                    }
                    // TODO(migration): remove the legacy file once the
                    // migrated entries have been persisted successfully
                    dirty = true;
                    legacy_entries_found = true;
                }
                Err(err) => {
                    error!("[Roster] Ignoring malformed {LEGACY_ROSTER_FILE}: {err}");
                }
            }
        }

        info!("[Roster] There are {} entries in the database.", entries.len());
        Ok(Self {
            entries: Mutex::new(entries),
            dirty: AtomicBool::new(dirty),
            legacy_entries_found,
            mapper,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<LocoEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up an entry by legacy address. Last match wins when
    /// duplicate addresses exist; `None` means "not found", not an
    /// error.
    pub fn get_entry(&self, address: u16) -> Option<Arc<LocoEntry>> {
        let entries = self.lock();
        let mut found = None;
        for entry in entries.iter() {
            if entry.address() == address {
                found = Some(entry.clone());
            }
        }
        found
    }

    /// Look up an entry by traction node identifier. The `hint` is
    /// accepted for interface compatibility and unused.
    pub fn find_entry(&self, node_id: u64, _hint: u16) -> Option<Arc<LocoEntry>> {
        let entries = self.lock();
        let mut found = None;
        for entry in entries.iter() {
            if entry.traction_node_id(&self.mapper) == node_id {
                found = Some(entry.clone());
            }
        }
        found
    }

    /// Register a dynamically discovered locomotive.
    ///
    /// Extracts address and mode from the candidate and discards it. If
    /// an entry with that address already exists its address is returned
    /// unchanged and nothing mutates; otherwise a default record built
    /// from (address, mode) is inserted. Idempotent under duplicate
    /// registration attempts.
    pub fn add_dynamic_entry<E: TransientEntry>(&self, candidate: E) -> u16 {
        let address = candidate.legacy_address();
        let mode = candidate.drive_mode();
        drop(candidate);

        let mut entries = self.lock();
        let mut found = None;
        for entry in entries.iter() {
            if entry.address() == address {
                found = Some(entry.clone());
            }
        }
        if let Some(existing) = found {
            return existing.address();
        }
        entries.push(Arc::new(LocoEntry::new(LocoConfig::new(address, mode))));
        address
    }

    /// The whole roster as a JSON array, `"[]"` when empty.
    pub fn roster_json(&self) -> String {
        let entries = self.lock();
        if entries.is_empty() {
            return "[]".to_string();
        }
        let configs: Vec<&LocoConfig> = entries.iter().map(|e| e.config()).collect();
        match serde_json::to_string(&configs) {
            Ok(json) => json,
            Err(err) => {
                error!("[Roster] Failed to serialize roster: {err}");
                "[]".to_string()
            }
        }
    }

    /// One entry as a JSON object, `"{}"` when the address is unknown.
    pub fn entry_json(&self, address: u16) -> String {
        let Some(entry) = self.get_entry(address) else {
            return "{}".to_string();
        };
        match serde_json::to_string(entry.config()) {
            Ok(json) => json,
            Err(err) => {
                error!("[Roster] Failed to serialize entry {address}: {err}");
                "{}".to_string()
            }
        }
    }

    /// Write the roster document back to storage and clear the dirty
    /// flag. Returns the number of entries persisted.
    ///
    /// The entry set is snapshotted under the lock; serialization and
    /// the storage write happen after it is released.
    pub fn persist<S: Storage>(&self, storage: &mut S) -> Result<usize, S::Error> {
        let configs: Vec<LocoConfig> = self.lock().iter().map(|e| e.config().clone()).collect();
        let count = configs.len();
        match serde_json::to_string(&configs) {
            Ok(text) => {
                storage.write(TRAIN_DB_FILE, &text)?;
                self.dirty.store(false, Ordering::Release);
                info!("[Roster] Persisted {count} entries");
            }
            Err(err) => error!("[Roster] Failed to serialize roster: {err}"),
        }
        Ok(count)
    }

    /// Number of entries in the roster.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the roster holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether in-memory state has diverged from the persisted
    /// document.
    pub fn dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Whether legacy-format entries were migrated at load time.
    pub fn legacy_entries_found(&self) -> bool {
        self.legacy_entries_found
    }
}
