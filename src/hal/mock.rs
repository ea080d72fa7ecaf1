//! Mock implementations for testing without hardware.
//!
//! Test doubles for every collaborator trait, enabling development and
//! testing on desktop without a command station attached.
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockTrack`] | [`PacketSink`] | Captures transmitted packets |
//! | [`MockStatus`] | [`StatusSink`] | Captures report lines |
//! | [`MemStorage`] | [`Storage`] | In-memory document store |
//!
//! # Example
//!
//! ```rust
//! use rs_depot::hal::mock::{MockStatus, MockTrack};
//! use rs_depot::store::TurnoutStore;
//! use rs_depot::turnout::TurnoutType;
//!
//! let store = TurnoutStore::new();
//! store.create_or_update(5, 10, -1, TurnoutType::Left);
//!
//! let mut track = MockTrack::new();
//! let mut status = MockStatus::new();
//! store.set_by_id(5, true, &mut track, &mut status);
//!
//! assert_eq!(track.packets.len(), 1);
//! assert_eq!(status.lines, vec!["<H 5 1>"]);
//! ```
//!
//! [`PacketSink`]: crate::traits::PacketSink
//! [`StatusSink`]: crate::traits::StatusSink
//! [`Storage`]: crate::traits::Storage

use std::collections::HashMap;
use std::convert::Infallible;

use crate::packet::AccessoryPacket;
use crate::traits::{PacketSink, StatusSink, Storage};

/// Mock packet sink that records every transmitted accessory packet.
#[derive(Debug, Default)]
pub struct MockTrack {
    /// Packets handed to the sink, with their repeat counts.
    pub packets: Vec<(AccessoryPacket, u8)>,
}

impl MockTrack {
    /// Creates a new mock sink with no captured packets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently transmitted packet, if any.
    pub fn last_packet(&self) -> Option<AccessoryPacket> {
        self.packets.last().map(|(packet, _)| *packet)
    }
}

impl PacketSink for MockTrack {
    fn send_accessory(&mut self, packet: AccessoryPacket, repeats: u8) {
        self.packets.push((packet, repeats));
    }
}

/// Mock status sink that records every report line.
#[derive(Debug, Default)]
pub struct MockStatus {
    /// Lines delivered to the sink, in order.
    pub lines: Vec<String>,
}

impl MockStatus {
    /// Creates a new mock sink with no captured lines.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for MockStatus {
    fn announce(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// In-memory document storage for tests and the desktop demo.
///
/// Tracks the number of writes so tests can verify the
/// diff-before-write descriptor policy.
#[derive(Debug, Default)]
pub struct MemStorage {
    documents: HashMap<String, String>,
    /// Number of times `write` was called.
    pub write_count: usize,
}

impl MemStorage {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a document without counting it as a write.
    pub fn seed(&mut self, name: &str, contents: &str) {
        self.documents.insert(name.to_string(), contents.to_string());
    }

    /// Direct access to a stored document's content.
    pub fn contents(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }
}

impl Storage for MemStorage {
    type Error = Infallible;

    fn exists(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Option<String>, Infallible> {
        Ok(self.documents.get(name).cloned())
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<(), Infallible> {
        self.documents.insert(name.to_string(), contents.to_string());
        self.write_count += 1;
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), Infallible> {
        self.documents.remove(name);
        Ok(())
    }
}
