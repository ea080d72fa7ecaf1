//! Locomotive roster entries: persistent data and derived identity.
//!
//! A [`LocoEntry`] wraps the persisted [`LocoConfig`] record and derives
//! the two identities the rest of the station needs: the
//! protocol-qualified display identifier (`dcc_128/short_address/3`) and
//! the 48-bit traction node identifier used for network-side lookup.
//!
//! Entries are immutable after construction and shared as
//! `Arc<LocoEntry>` between the roster and lookup callers; a caller's
//! handle stays valid even after the entry leaves the roster.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::traits::NodeIdMap;

/// 48-bit node-id prefix for gateway-user (Olcb-user) locomotives; the
/// locomotive's legacy address is OR'd into the low bits.
pub const OLCB_USER_NODE_PREFIX: u64 = 0x0501_0101_0000;

/// Protocol family and sub-variant of a locomotive's legacy address.
///
/// Serialized by the same name strings as the original roster documents
/// ("DCC (128 speed step)", "Marklin (v2, f0-f4)", ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Protocol-default DCC entry, speed steps unspecified.
    #[serde(rename = "DCC")]
    DccDefault,
    /// Gateway-assigned virtual node; address lives in the Olcb-user
    /// node-id space instead of a track protocol.
    #[serde(rename = "DCC-OlcbUser")]
    OlcbUser,
    /// Marklin/Motorola, protocol default.
    #[serde(rename = "Marklin")]
    Marklin,
    /// Marklin protocol version 1.
    #[serde(rename = "Marklin (v1)")]
    MarklinOld,
    /// Marklin protocol version 2, functions f0-f4.
    #[serde(rename = "Marklin (v2, f0-f4)")]
    MarklinNew,
    /// Marklin protocol version 2 with a second address for f5-f8.
    #[serde(rename = "Marklin (v2, f0-f8)")]
    MarklinTwoAddr,
    /// Marklin MFX.
    #[serde(rename = "Marklin (MFX)")]
    Mfx,
    /// DCC, 14 speed steps, short address.
    #[serde(rename = "DCC (14 speed step)")]
    Dcc14,
    /// DCC, 28 speed steps, short address.
    #[serde(rename = "DCC (28 speed step)")]
    Dcc28,
    /// DCC, 128 speed steps, short address.
    #[default]
    #[serde(rename = "DCC (128 speed step)")]
    Dcc128,
    /// DCC, 14 speed steps, long address.
    #[serde(rename = "DCC (14 speed step, long address)")]
    Dcc14Long,
    /// DCC, 28 speed steps, long address.
    #[serde(rename = "DCC (28 speed step, long address)")]
    Dcc28Long,
    /// DCC, 128 speed steps, long address.
    #[serde(rename = "DCC (128 speed step, long address)")]
    Dcc128Long,
}

/// Address-type classification derived from a [`DriveMode`] and address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    /// Short (7-bit) DCC address.
    DccShort,
    /// Long (14-bit) DCC address.
    DccLong,
    /// Marklin/Motorola address.
    Marklin,
    /// No track-protocol address (gateway-user or unspecified modes).
    Unknown,
}

impl DriveMode {
    /// Whether this is one of the DCC track-protocol modes.
    pub const fn is_dcc(&self) -> bool {
        matches!(
            self,
            DriveMode::Dcc14
                | DriveMode::Dcc28
                | DriveMode::Dcc128
                | DriveMode::Dcc14Long
                | DriveMode::Dcc28Long
                | DriveMode::Dcc128Long
        )
    }

    /// Whether this is one of the Marklin family modes.
    pub const fn is_marklin(&self) -> bool {
        matches!(
            self,
            DriveMode::Marklin
                | DriveMode::MarklinOld
                | DriveMode::MarklinNew
                | DriveMode::MarklinTwoAddr
                | DriveMode::Mfx
        )
    }

    /// Speed-step family name for the display identifier.
    pub const fn speed_step_family(&self) -> &'static str {
        match self {
            DriveMode::Dcc14 | DriveMode::Dcc14Long => "dcc_14",
            DriveMode::Dcc28 | DriveMode::Dcc28Long => "dcc_28",
            _ => "dcc_128",
        }
    }

    /// Classify the legacy address carried by this mode.
    ///
    /// DCC addresses are long when the mode says so or the numeric
    /// address is outside the short range (>= 128). Gateway-user and
    /// protocol-default modes carry no track-protocol address type.
    pub fn address_type(&self, address: u16) -> AddressType {
        if self.is_marklin() {
            return AddressType::Marklin;
        }
        match self {
            DriveMode::Dcc14 | DriveMode::Dcc28 | DriveMode::Dcc128 => {
                if address >= 128 {
                    AddressType::DccLong
                } else {
                    AddressType::DccShort
                }
            }
            DriveMode::Dcc14Long | DriveMode::Dcc28Long | DriveMode::Dcc128Long => {
                AddressType::DccLong
            }
            _ => AddressType::Unknown,
        }
    }
}

/// Semantic label of one locomotive function key.
///
/// The serialized name strings match the original roster documents;
/// [`Nonexistent`](Self::Nonexistent) ("N/A") doubles as the sentinel for
/// queries beyond the configured function count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionLabel {
    /// No function mapped at this position.
    #[default]
    #[serde(rename = "N/A")]
    Nonexistent,
    /// Headlight.
    #[serde(rename = "Light")]
    Light,
    /// Beamer/projector.
    #[serde(rename = "Beamer")]
    Beamer,
    /// Bell.
    #[serde(rename = "Bell")]
    Bell,
    /// Horn.
    #[serde(rename = "Horn")]
    Horn,
    /// Shunting mode.
    #[serde(rename = "Shunting mode")]
    Shunt,
    /// Pantograph.
    #[serde(rename = "Pantograph")]
    Pantograph,
    /// Smoke generator.
    #[serde(rename = "Smoke")]
    Smoke,
    /// Momentum on/off.
    #[serde(rename = "Momentum On/Off")]
    Momentum,
    /// Whistle.
    #[serde(rename = "Whistle")]
    Whistle,
    /// Sound on/off.
    #[serde(rename = "Sound")]
    Sound,
    /// Generic function key.
    #[serde(rename = "Generic Function")]
    Generic,
    /// Station announcement.
    #[serde(rename = "Announce")]
    Announce,
    /// Engine sound.
    #[serde(rename = "Engine")]
    Engine,
    /// Auxiliary light 1.
    #[serde(rename = "Light1")]
    Light1,
    /// Auxiliary light 2.
    #[serde(rename = "Light2")]
    Light2,
    /// Telex coupler.
    #[serde(rename = "Coupler")]
    Coupler,
    /// Mapped but unrecognized function.
    #[serde(rename = "Unknown")]
    Unknown,
    /// Momentary-action flag entry.
    #[serde(rename = "momentary")]
    Momentary,
    /// Momentary generic function.
    #[serde(rename = "fnp")]
    Fnp,
    /// Momentary sound function.
    #[serde(rename = "soundp")]
    Soundp,
    /// Slot exists but was never configured.
    #[serde(rename = "uninit")]
    Uninitialized,
}

/// Persistent locomotive record:
/// `{name, address, automaticIdle, showOnLimitedThrottles, functions, mode}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocoConfig {
    /// Display name.
    pub name: String,
    /// Legacy/protocol address; interpretation depends on `mode`.
    pub address: u16,
    /// Start this locomotive idling when the station boots.
    #[serde(rename = "automaticIdle")]
    pub automatic_idle: bool,
    /// Offer this locomotive on throttles with limited roster space.
    #[serde(rename = "showOnLimitedThrottles")]
    pub show_on_limited_throttles: bool,
    /// Function-label table; index = function number.
    pub functions: Vec<FunctionLabel>,
    /// Protocol family and sub-variant.
    pub mode: DriveMode,
}

impl LocoConfig {
    /// Minimal record for a dynamically discovered locomotive: the
    /// address doubles as the name, no functions mapped, offered on
    /// limited throttles, not auto-idled.
    pub fn new(address: u16, mode: DriveMode) -> Self {
        Self {
            name: address.to_string(),
            address,
            automatic_idle: false,
            show_on_limited_throttles: true,
            functions: Vec::new(),
            mode,
        }
    }
}

/// Record read from the legacy roster document, with its differently
/// named fields and string-typed booleans.
#[derive(Debug, Deserialize)]
pub(crate) struct LegacyLocoRecord {
    address: u16,
    description: String,
    #[serde(rename = "idleOnStartup")]
    idle_on_startup: String,
    #[serde(rename = "defaultOnThrottles")]
    default_on_throttles: String,
}

impl From<LegacyLocoRecord> for LocoConfig {
    fn from(legacy: LegacyLocoRecord) -> Self {
        Self {
            name: legacy.description,
            address: legacy.address,
            automatic_idle: legacy.idle_on_startup == "true",
            show_on_limited_throttles: legacy.default_on_throttles == "true",
            functions: Vec::new(),
            mode: DriveMode::default(),
        }
    }
}

/// One live roster entry.
///
/// Wraps the persistent record and caches the function-table bound; the
/// persistent fields never change after construction (updates are
/// replace-on-write at the roster level).
#[derive(Debug)]
pub struct LocoEntry {
    config: LocoConfig,
    max_fn: usize,
}

impl LocoEntry {
    /// Wrap a persistent record into a live entry.
    pub fn new(config: LocoConfig) -> Self {
        let max_fn = config.functions.len();
        let entry = Self { config, max_fn };
        info!("[Loco:{}] max function: {}", entry.identifier(), entry.max_fn);
        entry
    }

    /// Convenience constructor returning a shared handle.
    pub fn shared(config: LocoConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Protocol-qualified display identifier.
    ///
    /// `dcc_14|dcc_28|dcc_128 / short_address|long_address / <address>`
    /// for DCC entries, `marklin/<address>` for the Marklin family, and
    /// `unknown/<address>` otherwise. Distinct (address, mode) pairs in
    /// the same family collide only on equal address.
    pub fn identifier(&self) -> String {
        let address = self.config.address;
        match self.config.mode.address_type(address) {
            AddressType::DccShort => {
                format!(
                    "{}/short_address/{address}",
                    self.config.mode.speed_step_family()
                )
            }
            AddressType::DccLong => {
                format!(
                    "{}/long_address/{address}",
                    self.config.mode.speed_step_family()
                )
            }
            AddressType::Marklin => format!("marklin/{address}"),
            AddressType::Unknown => format!("unknown/{address}"),
        }
    }

    /// The 48-bit traction node identifier for network-side lookup.
    ///
    /// Gateway-user entries live under a fixed prefix OR'd with the
    /// address; everything else goes through the external mapping.
    pub fn traction_node_id<M: NodeIdMap>(&self, mapper: &M) -> u64 {
        if self.config.mode == DriveMode::OlcbUser {
            OLCB_USER_NODE_PREFIX | self.config.address as u64
        } else {
            let addr_type = self.config.mode.address_type(self.config.address);
            mapper.node_id_for(addr_type, self.config.address)
        }
    }

    /// Label for the given function number.
    ///
    /// Only strictly-greater indices are rejected outright; an admitted
    /// index equal to the table length resolves to the
    /// [`Nonexistent`](FunctionLabel::Nonexistent) sentinel through
    /// checked indexing. Never faults.
    pub fn function_label(&self, fn_id: usize) -> FunctionLabel {
        if fn_id > self.max_fn {
            return FunctionLabel::Nonexistent;
        }
        self.config
            .functions
            .get(fn_id)
            .copied()
            .unwrap_or(FunctionLabel::Nonexistent)
    }

    /// Legacy/protocol address.
    pub fn address(&self) -> u16 {
        self.config.address
    }

    /// Drive mode of this entry.
    pub fn mode(&self) -> DriveMode {
        self.config.mode
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Number of configured function slots.
    pub fn max_fn(&self) -> usize {
        self.max_fn
    }

    /// The persistent record backing this entry.
    pub fn config(&self) -> &LocoConfig {
        &self.config
    }
}

/// An externally supplied candidate roster entry.
///
/// Throttle sessions and network requests hand the roster transient
/// entries of their own types; the roster extracts address and mode and
/// discards the candidate (it is never stored).
pub trait TransientEntry {
    /// Legacy address of the candidate.
    fn legacy_address(&self) -> u16;
    /// Drive mode of the candidate.
    fn drive_mode(&self) -> DriveMode;
}
