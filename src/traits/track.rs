//! Track-side collaborator traits: packet transmission and status reporting.
//!
//! The signal-generation driver that modulates the rails and the transport
//! that carries status lines to controlling clients are both outside this
//! crate. Turnout operations talk to them through these two traits.

use crate::packet::AccessoryPacket;

/// Receives encoded accessory packets for transmission on the command
/// track.
///
/// Implementations queue the packet for the signal driver. Dispatch is
/// fire-and-forget: transmission failures are owned by the driver, not
/// surfaced through the addressing core, so the method is infallible.
///
/// # Example
///
/// ```rust
/// use rs_depot::packet::AccessoryPacket;
/// use rs_depot::traits::PacketSink;
///
/// struct CountingSink(usize);
///
/// impl PacketSink for CountingSink {
///     fn send_accessory(&mut self, _packet: AccessoryPacket, _repeats: u8) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait PacketSink {
    /// Queue an accessory packet for transmission, repeated `repeats`
    /// times on the command track (never the programming track).
    fn send_accessory(&mut self, packet: AccessoryPacket, repeats: u8);
}

/// Receives human-readable state-change lines for external display.
///
/// Turnout state changes are reported as `<H id state>` lines and the
/// status listing as `<H id address index state>`; the transport and
/// framing beyond that are owned by the excluded protocol layer.
pub trait StatusSink {
    /// Deliver one report line to connected clients.
    fn announce(&mut self, line: &str);
}
