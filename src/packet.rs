//! DCC accessory address arithmetic and packet encoding.
//!
//! Stationary accessory decoders (turnout "boards") each control up to four
//! accessories, addressed by a board address plus a 2-bit sub-index. This
//! module maps the station's linear accessory address space onto that
//! (board, index) scheme and encodes the two-byte accessory command packet
//! sent to the rails.
//!
//! Everything here is a pure transformation: out-of-range inputs fold via
//! modulo rather than failing. Range validation (the protocol's legal
//! 0-511 span) belongs at the command-parsing boundary, not here.
//!
//! # Example
//!
//! ```rust
//! use rs_depot::packet::{board_address_and_index, AccessoryPacket};
//!
//! // Linear address 10 lives on board 3, index 1.
//! let (board, index) = board_address_and_index(10);
//! assert_eq!((board, index), (3, 1));
//!
//! let packet = AccessoryPacket::encode(board, index, true);
//! assert_eq!(packet.byte0(), 0x80 | 3);
//! ```

/// Maps a linear accessory address to a (board address, board index) pair.
///
/// Boards hold 4 accessories each: `board = (address + 3) / 4`, and the
/// index is the offset of the address within that board. For addresses
/// 1..=511 the index is always in `0..=3`.
///
/// No bounds check is performed; the arithmetic wraps for out-of-range
/// inputs exactly like the 16-bit decoder math it reproduces.
pub fn board_address_and_index(address: u16) -> (u16, u8) {
    let board = address.wrapping_add(3) / 4;
    let index = address.wrapping_sub(board.wrapping_mul(4)).wrapping_add(3) as u8;
    (board, index)
}

/// An encoded two-byte DCC accessory decoder packet.
///
/// Layout:
/// - byte 0 is `10AAAAAA`: the fixed `10` prefix and the 6 least
///   significant bits of the board address.
/// - byte 1 is `1AAACDDB` after inversion: the next 3 address bits, a
///   fixed control bit, the 2-bit sub-index and the activate flag, all
///   XORed with `0xF8` per protocol convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessoryPacket([u8; 2]);

impl AccessoryPacket {
    /// Encode an activate/deactivate command for the given board and index.
    ///
    /// Pure and total: identical inputs always yield identical bytes, and
    /// out-of-range board/index values wrap via modulo.
    pub fn encode(board_address: u16, board_index: u8, activate: bool) -> Self {
        let byte0 = 0x80 | (board_address % 64) as u8;
        let byte1 = (((((board_address / 64) % 8) as u8) << 4)
            | ((board_index % 4) << 1)
            | activate as u8)
            ^ 0xF8;
        Self([byte0, byte1])
    }

    /// The raw packet bytes, ready for the signal driver.
    pub fn bytes(&self) -> [u8; 2] {
        self.0
    }

    /// First packet byte (`10AAAAAA`).
    pub fn byte0(&self) -> u8 {
        self.0[0]
    }

    /// Second packet byte (inverted address/index/activate field).
    pub fn byte1(&self) -> u8 {
        self.0[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Address arithmetic
    // =========================================================================

    #[test]
    fn board_mapping_formula_holds_over_legal_span() {
        for address in 1u16..=511 {
            let (board, index) = board_address_and_index(address);
            assert_eq!(board, (address + 3) / 4);
            assert_eq!(index as i32, address as i32 - board as i32 * 4 + 3);
            assert!(index <= 3, "address {address} gave index {index}");
        }
    }

    #[test]
    fn board_mapping_is_deterministic() {
        assert_eq!(board_address_and_index(10), board_address_and_index(10));
        assert_eq!(board_address_and_index(10), (3, 1));
    }

    #[test]
    fn boundary_addresses() {
        assert_eq!(board_address_and_index(1), (1, 0));
        assert_eq!(board_address_and_index(4), (1, 3));
        assert_eq!(board_address_and_index(5), (2, 0));
        assert_eq!(board_address_and_index(511), (128, 2));
    }

    #[test]
    fn out_of_range_address_wraps_instead_of_panicking() {
        // u16 wrap on address + 3, same as the original decoder math
        let (board, _) = board_address_and_index(u16::MAX);
        assert_eq!(board, 0);
    }

    // =========================================================================
    // Packet encoding
    // =========================================================================

    #[test]
    fn encode_is_pure() {
        let a = AccessoryPacket::encode(3, 1, true);
        let b = AccessoryPacket::encode(3, 1, true);
        assert_eq!(a, b);
    }

    #[test]
    fn encode_board_three_index_one() {
        // byte0 = 0x80 | 3; byte1 = ((0 << 4) | (1 << 1) | 1) ^ 0xF8
        let packet = AccessoryPacket::encode(3, 1, true);
        assert_eq!(packet.bytes(), [0x83, 0x03 ^ 0xF8]);
    }

    #[test]
    fn activate_flag_changes_only_low_bit_contribution() {
        let on = AccessoryPacket::encode(42, 2, true);
        let off = AccessoryPacket::encode(42, 2, false);
        assert_eq!(on.byte0(), off.byte0());
        assert_eq!(on.byte1() ^ off.byte1(), 0x01);
    }

    #[test]
    fn high_address_bits_land_in_second_byte() {
        // board 64 has no low bits set; its 3 high bits appear in byte1
        let packet = AccessoryPacket::encode(64, 0, false);
        assert_eq!(packet.byte0(), 0x80);
        assert_eq!(packet.byte1(), 0x10 ^ 0xF8);
    }

    #[test]
    fn oversized_inputs_fold_via_modulo() {
        // board 513 % 64 == 1, (513 / 64) % 8 == 0; index 7 % 4 == 3
        let folded = AccessoryPacket::encode(513, 7, true);
        let direct = AccessoryPacket::encode(1, 3, true);
        assert_eq!(folded, direct);
    }
}
