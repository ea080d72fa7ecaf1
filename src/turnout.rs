//! One addressable track accessory: identity, address mapping and state.
//!
//! A [`Turnout`] couples a stable numeric identity with either a linear
//! DCC accessory address (from which the board/index pair is derived) or
//! an explicit board index supplied by the caller. It knows how to
//! serialize itself into the persisted record format and how to request
//! packet transmission when its state changes.
//!
//! # Example
//!
//! ```rust
//! use rs_depot::hal::mock::{MockStatus, MockTrack};
//! use rs_depot::turnout::{Turnout, TurnoutType};
//!
//! // index -1 means "derive board/index from the linear address"
//! let mut turnout = Turnout::new(5, 10, -1, false, TurnoutType::Left);
//! assert_eq!(turnout.board_address(), 3);
//! assert_eq!(turnout.index(), 1);
//!
//! let mut track = MockTrack::new();
//! let mut status = MockStatus::new();
//! turnout.toggle(&mut track, &mut status);
//! assert!(turnout.is_thrown());
//! assert_eq!(status.lines[0], "<H 5 1>");
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::packet::{board_address_and_index, AccessoryPacket};
use crate::traits::{PacketSink, StatusSink};

/// Readable token for the thrown state in snapshots.
pub const STATE_THROWN: &str = "Thrown";
/// Readable token for the closed state in snapshots.
pub const STATE_CLOSED: &str = "Closed";

fn state_name(thrown: bool) -> &'static str {
    if thrown {
        STATE_THROWN
    } else {
        STATE_CLOSED
    }
}

/// Informational classification of a turnout. Does not affect packet
/// encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnoutType {
    /// Left-hand turnout.
    #[default]
    Left,
    /// Right-hand turnout.
    Right,
    /// Wye (Y) turnout.
    Wye,
    /// Multi-way turnout (three-way and beyond).
    Multi,
}

impl TurnoutType {
    /// Human name used in log lines.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TurnoutType::Left => "LEFT",
            TurnoutType::Right => "RIGHT",
            TurnoutType::Wye => "WYE",
            TurnoutType::Multi => "MULTI",
        }
    }

    /// Numeric code used in the persisted record.
    pub const fn code(&self) -> u8 {
        match self {
            TurnoutType::Left => 0,
            TurnoutType::Right => 1,
            TurnoutType::Wye => 2,
            TurnoutType::Multi => 3,
        }
    }

    /// Decode a persisted type code. Unrecognized codes fall back to
    /// [`TurnoutType::Left`].
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => TurnoutType::Right,
            2 => TurnoutType::Wye,
            3 => TurnoutType::Multi,
            _ => TurnoutType::Left,
        }
    }
}

/// Persisted turnout record: `{id, address, boardAddress, subAddress,
/// state, type}`.
///
/// `subAddress` is `-1` for turnouts whose board mapping is derived from
/// the linear address (signalled by a nonzero `boardAddress`), otherwise
/// the explicit board index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnoutConfig {
    /// Stable primary key.
    pub id: u16,
    /// Linear accessory address.
    pub address: u16,
    /// Derived board address, 0 for explicit-index turnouts.
    #[serde(rename = "boardAddress")]
    pub board_address: u16,
    /// Explicit board index, or -1 when derived from `address`.
    #[serde(rename = "subAddress")]
    pub sub_address: i8,
    /// Commanded state, true = thrown.
    pub state: bool,
    /// Numeric [`TurnoutType`] code.
    #[serde(rename = "type")]
    pub kind: u8,
}

/// One DCC-controlled track switch.
#[derive(Clone, Debug)]
pub struct Turnout {
    id: u16,
    address: u16,
    board_address: u16,
    index: i8,
    thrown: bool,
    kind: TurnoutType,
}

impl Turnout {
    /// Create a turnout.
    ///
    /// With `index == -1` the board address and index are derived from
    /// the linear `address`; any other index is stored as an explicit
    /// board index and the board address stays 0.
    pub fn new(id: u16, address: u16, index: i8, thrown: bool, kind: TurnoutType) -> Self {
        let mut turnout = Self {
            id,
            address,
            board_address: 0,
            index,
            thrown,
            kind,
        };
        if index == -1 {
            let (board, sub) = board_address_and_index(address);
            turnout.board_address = board;
            turnout.index = sub as i8;
            info!(
                "[Turnout {id}] Created using DCC address {address} as type {} and initial state of {}",
                kind.as_str(),
                state_name(thrown)
            );
        } else {
            info!(
                "[Turnout {id}] Created using address {address}:{index} as type {} and initial state of {}",
                kind.as_str(),
                state_name(thrown)
            );
        }
        turnout
    }

    /// Reconstruct a turnout from its persisted record.
    pub fn from_config(config: TurnoutConfig) -> Self {
        let mut turnout = Self {
            id: config.id,
            address: config.address,
            board_address: 0,
            index: config.sub_address,
            thrown: config.state,
            kind: TurnoutType::from_code(config.kind),
        };
        if config.sub_address == -1 {
            let (board, sub) = board_address_and_index(config.address);
            turnout.board_address = board;
            turnout.index = sub as i8;
            debug!(
                "[Turnout {}] Loaded using DCC address {} as type {} and last known state of {}",
                turnout.id,
                turnout.address,
                turnout.kind.as_str(),
                state_name(turnout.thrown)
            );
        } else {
            debug!(
                "[Turnout {}] Loaded using address {}:{} as type {} and last known state of {}",
                turnout.id,
                turnout.address,
                turnout.index,
                turnout.kind.as_str(),
                state_name(turnout.thrown)
            );
        }
        turnout
    }

    /// Re-address the turnout, using the same derivation rules as
    /// construction.
    pub fn update(&mut self, address: u16, index: i8, kind: TurnoutType) {
        self.address = address;
        self.index = index;
        self.kind = kind;
        if index == -1 {
            let (board, sub) = board_address_and_index(address);
            self.board_address = board;
            self.index = sub as i8;
            debug!(
                "[Turnout {}] Updated to use DCC address {} and type {}",
                self.id,
                self.address,
                kind.as_str()
            );
        } else {
            self.board_address = 0;
            debug!(
                "[Turnout {}] Updated to address {}:{} and type {}",
                self.id,
                self.address,
                self.index,
                kind.as_str()
            );
        }
    }

    /// Command the turnout to the given state.
    ///
    /// State is updated unconditionally. When `send_packet` is set, the
    /// accessory packet for the current board mapping goes out on the
    /// command track; the `<H id state>` report line is always emitted.
    pub fn set<P: PacketSink, R: StatusSink>(
        &mut self,
        thrown: bool,
        send_packet: bool,
        packets: &mut P,
        status: &mut R,
    ) {
        self.thrown = thrown;
        if send_packet {
            debug!(
                "[Turnout] DCC Accessory Packet {}:{} state: {}",
                self.board_address, self.index, thrown
            );
            let packet = AccessoryPacket::encode(self.board_address, self.index as u8, thrown);
            packets.send_accessory(packet, 1);
        }
        status.announce(&format!("<H {} {}>", self.id, thrown as u8));
        debug!("[Turnout {}] Set to {}", self.id, state_name(thrown));
    }

    /// Flip the turnout to the opposite state.
    pub fn toggle<P: PacketSink, R: StatusSink>(&mut self, packets: &mut P, status: &mut R) {
        let target = !self.thrown;
        self.set(target, true, packets, status);
    }

    /// Status listing line: `<H id address index state>`.
    pub fn status_line(&self) -> String {
        format!(
            "<H {} {} {} {}>",
            self.id, self.address, self.index, self.thrown as u8
        )
    }

    /// The persisted record for this turnout.
    pub fn to_config(&self) -> TurnoutConfig {
        TurnoutConfig {
            id: self.id,
            address: self.address,
            board_address: self.board_address,
            sub_address: self.effective_sub_address(),
            state: self.thrown,
            kind: self.kind.code(),
        }
    }

    /// JSON snapshot for external reporting. With `readable` the state
    /// renders as `"Thrown"`/`"Closed"` instead of a boolean.
    pub fn to_json(&self, readable: bool) -> serde_json::Value {
        json!({
            "id": self.id,
            "address": self.address,
            "boardAddress": self.board_address,
            "subAddress": self.effective_sub_address(),
            "state": if readable {
                json!(state_name(self.thrown))
            } else {
                json!(self.thrown)
            },
            "type": self.kind.code(),
        })
    }

    // A nonzero board address marks a derived mapping, persisted as the
    // -1 sentinel so the load path re-derives it.
    fn effective_sub_address(&self) -> i8 {
        if self.board_address != 0 {
            -1
        } else {
            self.index
        }
    }

    /// Stable identity.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Linear accessory address.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Board address, derived or 0 for explicit-index turnouts.
    pub fn board_address(&self) -> u16 {
        self.board_address
    }

    /// Board index within the decoder, 0..=3 once derived.
    pub fn index(&self) -> i8 {
        self.index
    }

    /// Current commanded state, true = thrown.
    pub fn is_thrown(&self) -> bool {
        self.thrown
    }

    /// Informational classification.
    pub fn kind(&self) -> TurnoutType {
        self.kind
    }

    /// Reclassify the turnout without re-addressing it.
    pub fn set_kind(&mut self, kind: TurnoutType) {
        self.kind = kind;
    }
}
