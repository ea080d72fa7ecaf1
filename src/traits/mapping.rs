//! Legacy-address to traction-node-identifier mapping.
//!
//! The network-side control protocol addresses each locomotive as a
//! virtual node with a 48-bit identifier. For every drive mode except the
//! gateway-user mode, that identifier is derived from the legacy
//! (protocol address type, address) pair by an external mapping; this
//! trait is the seam for it, and [`OlcbNodeMap`] provides the well-known
//! OpenLCB convention so the crate is usable stand-alone.

use crate::loco::AddressType;

/// 48-bit node-id prefix for DCC locomotives.
pub const NODE_ID_PREFIX_DCC: u64 = 0x0601_0000_0000;

/// 48-bit node-id prefix for Marklin/Motorola locomotives.
pub const NODE_ID_PREFIX_MARKLIN: u64 = 0x0602_0000_0000;

/// Flag bits marking a long DCC address within the low 16 bits of a
/// DCC-prefixed node id.
pub const NODE_ID_LONG_ADDRESS_FLAG: u64 = 0xC000;

/// Bidirectional mapping between legacy addresses and 48-bit traction
/// node identifiers.
///
/// The forward direction must be total over the address/mode space the
/// roster uses; the reverse direction answers `None` for identifiers
/// outside the mapped ranges.
pub trait NodeIdMap {
    /// Node identifier for a legacy (address type, address) pair.
    fn node_id_for(&self, addr_type: AddressType, address: u16) -> u64;

    /// Legacy (address type, address) pair for a node identifier, when
    /// the identifier falls into a mapped range.
    fn legacy_address_for(&self, node_id: u64) -> Option<(AddressType, u16)>;
}

/// The standard OpenLCB traction node-id convention.
///
/// - short DCC: `0x0601_0000_0000 | address`
/// - long DCC: `0x0601_0000_0000 | 0xC000 | address`
/// - Marklin: `0x0602_0000_0000 | address`
///
/// Unknown address types fall through to the bare address, which keeps
/// the forward mapping total as the roster requires.
#[derive(Clone, Copy, Debug, Default)]
pub struct OlcbNodeMap;

impl NodeIdMap for OlcbNodeMap {
    fn node_id_for(&self, addr_type: AddressType, address: u16) -> u64 {
        match addr_type {
            AddressType::DccShort => NODE_ID_PREFIX_DCC | address as u64,
            AddressType::DccLong => {
                NODE_ID_PREFIX_DCC | NODE_ID_LONG_ADDRESS_FLAG | address as u64
            }
            AddressType::Marklin => NODE_ID_PREFIX_MARKLIN | address as u64,
            AddressType::Unknown => address as u64,
        }
    }

    fn legacy_address_for(&self, node_id: u64) -> Option<(AddressType, u16)> {
        let prefix = node_id & 0xFFFF_0000_0000;
        let low = (node_id & 0xFFFF) as u16;
        match prefix {
            NODE_ID_PREFIX_DCC => {
                if low as u64 & NODE_ID_LONG_ADDRESS_FLAG == NODE_ID_LONG_ADDRESS_FLAG {
                    Some((AddressType::DccLong, low & 0x3FFF))
                } else {
                    Some((AddressType::DccShort, low))
                }
            }
            NODE_ID_PREFIX_MARKLIN => Some((AddressType::Marklin, low)),
            _ => None,
        }
    }
}
