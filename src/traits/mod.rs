//! Trait definitions for the station's external collaborators.
//!
//! The addressing and roster core never touches hardware or a filesystem
//! directly. Everything it needs from the outside world comes in through
//! these traits:
//!
//! - `track`: packet transmission ([`PacketSink`]) and line-oriented
//!   status reporting ([`StatusSink`])
//! - `storage`: named blob persistence for the JSON/XML documents
//!   ([`Storage`])
//! - `mapping`: the legacy-address <-> traction-node-id translation used
//!   by the network side of the roster ([`NodeIdMap`], [`OlcbNodeMap`])
//!
//! Mock implementations for all of them live in [`crate::hal::mock`].

pub mod mapping;
pub mod storage;
pub mod track;

pub use mapping::*;
pub use storage::*;
pub use track::*;
