//! Centralized Constants
//!
//! Single source of truth for the magic numbers used throughout the driver.
//!
//! # Organization
//!
//! - **Slot geometry**: DMA frame-slot layout and ring sizing
//! - **Doorbell encoding**: fields of the ring doorbell registers
//! - **Timing**: recommended poll cadence
//! - **Wire literals**: the fixed link-up enabling frame
//!
//! Register window offsets live in [`crate::regs`] next to the accessors
//! that use them.

// =============================================================================
// Slot Geometry
// =============================================================================

/// Byte stride of one DMA frame slot (control header + payload).
pub const SLOT_STRIDE: usize = 2048;

/// Control header at the front of each slot (`sent`, `received`, `length`,
/// reserved word).
pub const SLOT_HEADER_LEN: usize = 16;

/// Maximum payload carried by a single slot.
pub const SLOT_PAYLOAD: usize = SLOT_STRIDE - SLOT_HEADER_LEN;

/// Number of slots per ring on the production attach path.
pub const RING_SLOTS: usize = 64;

/// Descriptor header the hardware prepends inside a received frame's
/// `length` accounting; subtracted before delivery and added back when
/// sizing the transmit doorbell.
pub const FRAME_HEADER_LEN: usize = 20;

// =============================================================================
// Doorbell Encoding
// =============================================================================

/// Fixed byte offset added to the slot address in the transmit doorbell.
pub const TX_DOORBELL_BASE: u32 = 8;

/// Bit position of the quadword frame-length field in the transmit doorbell.
pub const TX_DOORBELL_LEN_SHIFT: u32 = 24;

/// Ownership bit in the receive re-arm doorbell.
pub const RX_REARM_OWNED: u32 = 1 << 31;

/// Byte offset of the ring reset register inside the ring register window.
pub const RING_RESET_OFFSET: usize = 8;

// =============================================================================
// Timing
// =============================================================================

/// Recommended period for the platform's periodic call to
/// [`NetDevice::poll`](crate::NetDevice::poll), in microseconds.
///
/// The controller has no interrupt support; link changes, receive
/// completions and transmit-stall recovery are only discovered here.
pub const POLL_PERIOD_US: u32 = 100;

// =============================================================================
// Wire Literals
// =============================================================================

/// Frame transmitted once per link-up to enable frame forwarding on
/// attached peripherals.
///
/// Byte-exact reproduction is required for interoperability; peripherals
/// expect this exact wake-up frame.
pub const FORWARDING_ENABLE_FRAME: [u8; 30] = [
    0x01, 0x01, 0x05, 0x01, 0x00, 0x00, //
    0x00, 0x1b, 0x21, 0x36, 0x1b, 0xce, //
    0x88, 0xa4, 0x0e, 0x10, //
    0x08, //
    0x00, //
    0x00, 0x00, //
    0x00, 0x01, //
    0x02, 0x00, //
    0x00, 0x00, //
    0x00, 0x00, //
    0x00, 0x00,
];

// =============================================================================
// Frame Sizes
// =============================================================================

/// Maximum Ethernet frame size including VLAN tag (1500 + 14 header + 4 CRC + 4 VLAN)
pub const MAX_FRAME_SIZE: usize = 1522;

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_geometry_is_consistent() {
        assert_eq!(SLOT_HEADER_LEN + SLOT_PAYLOAD, SLOT_STRIDE);
        // A full-size Ethernet frame plus the descriptor header must fit.
        assert!(MAX_FRAME_SIZE + FRAME_HEADER_LEN <= SLOT_PAYLOAD);
    }

    #[test]
    fn enabling_frame_is_thirty_bytes() {
        assert_eq!(FORWARDING_ENABLE_FRAME.len(), 30);
        // Spot-check the EtherType and command bytes peripherals key on.
        assert_eq!(&FORWARDING_ENABLE_FRAME[12..14], &[0x88, 0xa4]);
        assert_eq!(FORWARDING_ENABLE_FRAME[16], 0x08);
    }
}
