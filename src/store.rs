//! Mutex-guarded collection of turnouts with persistence and dispatch.
//!
//! The station keeps every defined turnout in one [`TurnoutStore`]. All
//! scanning and mutating operations are serialized behind a single lock
//! so commands may arrive from any task; lookups hand back clones of the
//! small [`Turnout`] value rather than references into the collection.
//!
//! Duplicate IDs and addresses are tolerated: lookups scan the whole
//! list without short-circuiting, so the *last* matching entry wins.
//! That resolution order is part of the observable behavior and is
//! pinned by tests.
//!
//! # Example
//!
//! ```rust
//! use rs_depot::hal::mock::{MemStorage, MockStatus, MockTrack};
//! use rs_depot::store::TurnoutStore;
//! use rs_depot::turnout::TurnoutType;
//!
//! let store = TurnoutStore::new();
//! store.create_or_update(5, 10, -1, TurnoutType::Left);
//!
//! let mut track = MockTrack::new();
//! let mut status = MockStatus::new();
//! assert!(store.toggle_by_id(5, &mut track, &mut status));
//!
//! let mut storage = MemStorage::new();
//! let stored = store.store(&mut storage).unwrap();
//! assert_eq!(stored, 1);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::traits::{PacketSink, StatusSink, Storage};
use crate::turnout::{Turnout, TurnoutConfig, TurnoutType};

/// Name of the persisted turnout document.
pub const TURNOUTS_FILE: &str = "turnouts.json";

/// On-storage layout: entry count plus the turnout records.
#[derive(Serialize, Deserialize)]
struct TurnoutDocument {
    count: u16,
    turnouts: Vec<TurnoutConfig>,
}

/// In-memory collection of [`Turnout`]s keyed by ID.
///
/// Owns its entries exclusively, serializes every operation behind an
/// internal lock, and dispatches "set" operations into packet
/// transmission. Persistence happens only on explicit [`store`](Self::store)
/// / [`load`](Self::load) calls, never automatically on mutation.
#[derive(Default)]
pub struct TurnoutStore {
    turnouts: Mutex<Vec<Turnout>>,
}

impl TurnoutStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Turnout>> {
        // a panicking lock holder must not take the turnout list with it
        self.turnouts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the collection with the contents of the persisted
    /// document. Returns the number of turnouts loaded.
    ///
    /// A missing document loads an empty store; a malformed one is
    /// reported and likewise yields an empty store - stored data is
    /// never fabricated.
    pub fn load<S: Storage>(&self, storage: &S) -> Result<usize, S::Error> {
        info!("[Turnout] Initializing turnout list");
        let Some(text) = storage.read(TURNOUTS_FILE)? else {
            info!("[Turnout] No turnout list found");
            return Ok(0);
        };
        match serde_json::from_str::<TurnoutDocument>(&text) {
            Ok(document) => {
                info!("[Turnout] Found {} turnouts", document.count);
                let mut list = self.lock();
                list.clear();
                for config in document.turnouts {
                    list.push(Turnout::from_config(config));
                }
                Ok(list.len())
            }
            Err(err) => {
                error!("[Turnout] Ignoring malformed {TURNOUTS_FILE}: {err}");
                self.lock().clear();
                Ok(0)
            }
        }
    }

    /// Update the turnout with this ID in place, or create it when
    /// absent. Returns a snapshot of the resulting entry. Never fails.
    pub fn create_or_update(
        &self,
        id: u16,
        address: u16,
        index: i8,
        kind: TurnoutType,
    ) -> Turnout {
        let mut list = self.lock();
        let mut found = None;
        for (pos, turnout) in list.iter().enumerate() {
            if turnout.id() == id {
                found = Some(pos);
            }
        }
        match found {
            Some(pos) => {
                list[pos].update(address, index, kind);
                list[pos].clone()
            }
            None => {
                let turnout = Turnout::new(id, address, index, false, kind);
                list.push(turnout.clone());
                turnout
            }
        }
    }

    /// Remove the turnout with this ID; false when no match exists.
    pub fn remove_by_id(&self, id: u16) -> bool {
        let mut list = self.lock();
        if let Some(pos) = list.iter().position(|t| t.id() == id) {
            debug!("[Turnout {id}] Deleted");
            list.remove(pos);
            return true;
        }
        false
    }

    /// Remove the first turnout using this address; false when no match
    /// exists.
    pub fn remove_by_address(&self, address: u16) -> bool {
        let mut list = self.lock();
        if let Some(pos) = list.iter().position(|t| t.address() == address) {
            let id = list[pos].id();
            debug!("[Turnout {id}] Deleted as it used address {address}");
            list.remove(pos);
            return true;
        }
        false
    }

    /// Look up by ID. Last match wins when duplicates exist.
    pub fn get_by_id(&self, id: u16) -> Option<Turnout> {
        let list = self.lock();
        let mut found = None;
        for turnout in list.iter() {
            if turnout.id() == id {
                found = Some(turnout.clone());
            }
        }
        found
    }

    /// Look up by address. Last match wins when duplicates exist.
    pub fn get_by_address(&self, address: u16) -> Option<Turnout> {
        let list = self.lock();
        let mut found = None;
        for turnout in list.iter() {
            if turnout.address() == address {
                found = Some(turnout.clone());
            }
        }
        found
    }

    /// The turnout at position `index` in iteration order at the time of
    /// the call.
    pub fn get_by_index(&self, index: usize) -> Option<Turnout> {
        self.lock().get(index).cloned()
    }

    /// Command a turnout by ID; false (with a warning) when absent.
    pub fn set_by_id<P: PacketSink, R: StatusSink>(
        &self,
        id: u16,
        thrown: bool,
        packets: &mut P,
        status: &mut R,
    ) -> bool {
        let mut list = self.lock();
        match last_position(&list, |t| t.id() == id) {
            Some(pos) => {
                list[pos].set(thrown, true, packets, status);
                true
            }
            None => {
                warn!("[Turnout {id}] Unable to set state, turnout not found");
                false
            }
        }
    }

    /// Toggle a turnout by ID; false (with a warning) when absent.
    pub fn toggle_by_id<P: PacketSink, R: StatusSink>(
        &self,
        id: u16,
        packets: &mut P,
        status: &mut R,
    ) -> bool {
        let mut list = self.lock();
        match last_position(&list, |t| t.id() == id) {
            Some(pos) => {
                list[pos].toggle(packets, status);
                true
            }
            None => {
                warn!("[Turnout {id}] Unable to set state, turnout not found");
                false
            }
        }
    }

    /// Toggle a turnout by address; false (with a warning) when absent.
    pub fn toggle_by_address<P: PacketSink, R: StatusSink>(
        &self,
        address: u16,
        packets: &mut P,
        status: &mut R,
    ) -> bool {
        let mut list = self.lock();
        match last_position(&list, |t| t.address() == address) {
            Some(pos) => {
                list[pos].toggle(packets, status);
                true
            }
            None => {
                warn!("[Turnout addr:{address}] Unable to set state, turnout not found");
                false
            }
        }
    }

    /// Serialize the full collection plus its count to storage. Returns
    /// the number of turnouts stored.
    ///
    /// The lock is released before the storage call; a snapshot is
    /// written, so a concurrent mutation lands in the next store.
    pub fn store<S: Storage>(&self, storage: &mut S) -> Result<usize, S::Error> {
        let configs: Vec<TurnoutConfig> = self.lock().iter().map(Turnout::to_config).collect();
        let count = configs.len();
        let document = TurnoutDocument {
            count: count as u16,
            turnouts: configs,
        };
        match serde_json::to_string(&document) {
            Ok(text) => storage.write(TURNOUTS_FILE, &text)?,
            Err(err) => error!("[Turnout] Failed to serialize turnout list: {err}"),
        }
        Ok(count)
    }

    /// Empty the collection, then persist the now-empty state.
    pub fn clear<S: Storage>(&self, storage: &mut S) -> Result<(), S::Error> {
        self.lock().clear();
        self.store(storage)?;
        Ok(())
    }

    /// Snapshot of all turnouts for external reporting. With `readable`
    /// the state field renders as `"Thrown"`/`"Closed"`.
    pub fn get_state(&self, readable: bool) -> serde_json::Value {
        let list = self.lock();
        serde_json::Value::Array(list.iter().map(|t| t.to_json(readable)).collect())
    }

    /// Emit one `<H id address index state>` line per turnout.
    pub fn show_status<R: StatusSink>(&self, status: &mut R) {
        let lines: Vec<String> = self.lock().iter().map(Turnout::status_line).collect();
        for line in lines {
            status.announce(&line);
        }
    }

    /// Number of turnouts currently defined.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no turnouts are defined.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// Full scan without early exit: keeps the store's "last match wins"
// duplicate resolution identical across lookup and mutate paths.
fn last_position<F: Fn(&Turnout) -> bool>(list: &[Turnout], matches: F) -> Option<usize> {
    let mut found = None;
    for (pos, turnout) in list.iter().enumerate() {
        if matches(turnout) {
            found = Some(pos);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{MemStorage, MockStatus, MockTrack};

    // =========================================================================
    // CRUD
    // =========================================================================

    #[test]
    fn create_or_update_existing_id_updates_in_place() {
        let store = TurnoutStore::new();
        store.create_or_update(5, 10, -1, TurnoutType::Left);
        let updated = store.create_or_update(5, 20, -1, TurnoutType::Right);

        assert_eq!(store.len(), 1);
        assert_eq!(updated.address(), 20);
        assert_eq!(updated.kind(), TurnoutType::Right);
        assert_eq!(updated.board_address(), 5);
    }

    #[test]
    fn remove_by_id_reports_misses() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 2, -1, TurnoutType::Left);
        assert!(store.remove_by_id(1));
        assert!(!store.remove_by_id(1));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_by_address_takes_first_duplicate() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 10, -1, TurnoutType::Left);
        store.create_or_update(2, 10, -1, TurnoutType::Right);

        assert!(store.remove_by_address(10));
        // id 2 (inserted later) remains
        assert_eq!(store.get_by_address(10).map(|t| t.id()), Some(2));
    }

    // =========================================================================
    // Lookup policy
    // =========================================================================

    #[test]
    fn get_by_address_last_match_wins() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 10, -1, TurnoutType::Left);
        store.create_or_update(2, 10, -1, TurnoutType::Wye);

        let hit = store.get_by_address(10).unwrap();
        assert_eq!(hit.id(), 2);
    }

    #[test]
    fn get_by_id_last_match_wins_for_duplicate_ids() {
        // duplicate ids cannot be created through create_or_update; they
        // only enter via a loaded document
        let mut storage = MemStorage::new();
        storage.seed(
            TURNOUTS_FILE,
            r#"{"count":2,"turnouts":[
                {"id":5,"address":10,"boardAddress":3,"subAddress":-1,"state":false,"type":0},
                {"id":5,"address":20,"boardAddress":5,"subAddress":-1,"state":true,"type":1}
            ]}"#,
        );

        let store = TurnoutStore::new();
        assert_eq!(store.load(&storage).unwrap(), 2);

        let hit = store.get_by_id(5).unwrap();
        assert_eq!(hit.address(), 20);
        assert!(hit.is_thrown());
        assert_eq!(hit.kind(), TurnoutType::Right);
    }

    #[test]
    fn get_by_index_uses_iteration_order() {
        let store = TurnoutStore::new();
        store.create_or_update(3, 1, -1, TurnoutType::Left);
        store.create_or_update(7, 2, -1, TurnoutType::Left);

        assert_eq!(store.get_by_index(0).map(|t| t.id()), Some(3));
        assert_eq!(store.get_by_index(1).map(|t| t.id()), Some(7));
        assert!(store.get_by_index(2).is_none());
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn set_by_id_dispatches_packet() {
        let store = TurnoutStore::new();
        store.create_or_update(5, 10, -1, TurnoutType::Left);

        let mut track = MockTrack::new();
        let mut status = MockStatus::new();
        assert!(store.set_by_id(5, true, &mut track, &mut status));

        assert_eq!(track.packets.len(), 1);
        assert_eq!(status.lines, vec!["<H 5 1>"]);
        assert!(store.get_by_id(5).unwrap().is_thrown());
    }

    #[test]
    fn toggle_miss_returns_false() {
        let store = TurnoutStore::new();
        let mut track = MockTrack::new();
        let mut status = MockStatus::new();

        assert!(!store.toggle_by_id(99, &mut track, &mut status));
        assert!(!store.toggle_by_address(99, &mut track, &mut status));
        assert!(track.packets.is_empty());
    }

    #[test]
    fn show_status_lists_every_turnout() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 2, -1, TurnoutType::Left);
        store.create_or_update(2, 3, -1, TurnoutType::Left);

        let mut status = MockStatus::new();
        store.show_status(&mut status);
        assert_eq!(status.lines.len(), 2);
        assert!(status.lines[0].starts_with("<H 1 "));
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[test]
    fn store_then_load_round_trips() {
        let store = TurnoutStore::new();
        store.create_or_update(5, 10, -1, TurnoutType::Wye);
        store.create_or_update(6, 40, 2, TurnoutType::Right);

        let mut storage = MemStorage::new();
        assert_eq!(store.store(&mut storage).unwrap(), 2);

        let restored = TurnoutStore::new();
        assert_eq!(restored.load(&storage).unwrap(), 2);
        let hit = restored.get_by_id(5).unwrap();
        assert_eq!(hit.board_address(), 3);
        assert_eq!(hit.index(), 1);
        assert_eq!(restored.get_by_id(6).unwrap().index(), 2);
    }

    #[test]
    fn load_missing_document_yields_empty_store() {
        let store = TurnoutStore::new();
        let storage = MemStorage::new();
        assert_eq!(store.load(&storage).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn load_malformed_document_yields_empty_store() {
        let mut storage = MemStorage::new();
        storage.seed(TURNOUTS_FILE, "{not json");

        let store = TurnoutStore::new();
        assert_eq!(store.load(&storage).unwrap(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_persists_empty_state() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 2, -1, TurnoutType::Left);

        let mut storage = MemStorage::new();
        store.clear(&mut storage).unwrap();

        assert!(store.is_empty());
        let text = storage.contents(TURNOUTS_FILE).unwrap();
        assert!(text.contains("\"count\":0"));
    }

    #[test]
    fn get_state_readable_flag() {
        let store = TurnoutStore::new();
        store.create_or_update(1, 2, -1, TurnoutType::Left);
        let mut track = MockTrack::new();
        let mut status = MockStatus::new();
        store.set_by_id(1, true, &mut track, &mut status);

        let snapshot = store.get_state(true);
        assert_eq!(snapshot[0]["state"], "Thrown");
        let snapshot = store.get_state(false);
        assert_eq!(snapshot[0]["state"], true);
    }
}
