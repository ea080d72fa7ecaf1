//! Concrete collaborator implementations.
//!
//! Only the mock/test implementations live in-tree; the real signal
//! driver, client transport and flash-backed storage belong to the
//! firmware integrating this crate.

pub mod mock;

pub use mock::{MemStorage, MockStatus, MockTrack};
