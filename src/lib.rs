//! # rs-depot
//!
//! DCC accessory addressing and locomotive roster engine for model
//! railroad command stations.
//!
//! ## Features
//!
//! - **Accessory addressing**: linear turnout addresses mapped onto
//!   board/index decoder pairs, with the two-byte accessory packet codec
//! - **Turnout store**: mutex-guarded CRUD, lookup by ID/address/position,
//!   JSON persistence, and dispatch into packet transmission
//! - **Locomotive roster**: multi-scheme address resolution (14/28/128
//!   speed-step short/long DCC, Marklin, gateway-user node ids), JSON
//!   persistence with legacy-format migration, concurrent-safe lookup and
//!   deduplicating dynamic registration
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without a command
//! station attached:
//!
//! - `traits` - collaborator abstractions (packet sink, status sink,
//!   storage, node-id mapping)
//! - `packet` - address arithmetic and the accessory packet codec
//! - `turnout` / `store` - turnout entity and its owning store
//! - `loco` / `roster` - roster entry and the guarded roster collection
//! - `cdi` - configuration descriptor rendering with diff-before-write
//! - `hal` - mock collaborator implementations for testing
//!
//! ## Example
//!
//! ```rust
//! use rs_depot::{
//!     hal::mock::{MemStorage, MockStatus, MockTrack},
//!     store::TurnoutStore,
//!     turnout::TurnoutType,
//! };
//!
//! let store = TurnoutStore::new();
//!
//! // Define turnout 5 on linear DCC address 10 (board 3, index 1)
//! store.create_or_update(5, 10, -1, TurnoutType::Left);
//!
//! // Throw it: one accessory packet goes out, one <H 5 1> report line
//! let mut track = MockTrack::new();
//! let mut status = MockStatus::new();
//! store.set_by_id(5, true, &mut track, &mut status);
//! assert_eq!(status.lines, vec!["<H 5 1>"]);
//!
//! // Persist the definitions
//! let mut storage = MemStorage::new();
//! assert_eq!(store.store(&mut storage).unwrap(), 1);
//! ```

#![warn(missing_docs)]

/// Configuration descriptor rendering with diff-before-write.
pub mod cdi;
/// Mock collaborator implementations for testing.
pub mod hal;
/// Locomotive roster entries and address-scheme classification.
pub mod loco;
/// Accessory address arithmetic and packet encoding.
pub mod packet;
/// The concurrently-guarded locomotive roster.
pub mod roster;
/// The turnout store: CRUD, lookup, persistence, dispatch.
pub mod store;
/// Collaborator trait definitions.
pub mod traits;
/// The turnout entity.
pub mod turnout;

// Re-exports for convenience
pub use loco::{
    AddressType, DriveMode, FunctionLabel, LocoConfig, LocoEntry, TransientEntry,
    OLCB_USER_NODE_PREFIX,
};
pub use packet::{board_address_and_index, AccessoryPacket};
pub use roster::Roster;
pub use store::TurnoutStore;
pub use traits::{NodeIdMap, OlcbNodeMap, PacketSink, StatusSink, Storage};
pub use turnout::{Turnout, TurnoutConfig, TurnoutType};
