//! DMA-resident frame slot layout and volatile accessors.
//!
//! Each ring entry is one [`FrameSlot`]: a 16-byte control header
//! (ownership flags and payload length) followed by a fixed-size payload
//! buffer. The hardware writes `sent`, `received` and `length` directly in
//! this memory, so all access goes through volatile reads/writes on a raw
//! [`SlotPtr`]; plain references into slot memory are never held across a
//! point where the hardware may own the slot.

use core::ptr::{self, addr_of, addr_of_mut};

use crate::constants::{SLOT_HEADER_LEN, SLOT_PAYLOAD, SLOT_STRIDE};

/// Fixed layout of one DMA frame slot.
///
/// Ownership invariant: exactly one of {free-for-tx (`sent` set),
/// owned-by-hardware (both flags clear), filled-awaiting-drain
/// (`received` set)} holds at any time.
#[repr(C)]
pub struct FrameSlot {
    /// Set by hardware when transmission completes; set by software when
    /// arming the slot, cleared when submitting it.
    sent: u32,
    /// Set by hardware when a frame has been deposited; cleared by
    /// software when the slot is re-armed.
    received: u32,
    /// Frame length as accounted by hardware (includes the descriptor
    /// header, see [`FRAME_HEADER_LEN`](crate::constants::FRAME_HEADER_LEN)).
    length: u32,
    _reserved: u32,
    /// Payload bytes.
    data: [u8; SLOT_PAYLOAD],
}

const _: () = assert!(core::mem::size_of::<FrameSlot>() == SLOT_STRIDE);
const _: () = assert!(core::mem::offset_of!(FrameSlot, data) == SLOT_HEADER_LEN);

/// Raw accessor for one slot inside a ring's DMA region.
///
/// Copyable and cheap; performs only volatile field access.
#[derive(Clone, Copy)]
pub(crate) struct SlotPtr {
    slot: *mut FrameSlot,
}

impl SlotPtr {
    /// Build an accessor for slot `index` of the region at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point at a DMA region holding at least `index + 1`
    /// slots of [`SLOT_STRIDE`] bytes, valid for the accessor's lifetime.
    pub(crate) unsafe fn at(base: *mut u8, index: usize) -> Self {
        // SAFETY: caller guarantees the region covers this slot.
        let slot = unsafe { base.add(index * SLOT_STRIDE) }.cast::<FrameSlot>();
        Self { slot }
    }

    #[inline(always)]
    pub(crate) fn sent(&self) -> bool {
        // SAFETY: `slot` is valid per the `at` contract; volatile because
        // hardware writes this flag.
        unsafe { ptr::read_volatile(addr_of!((*self.slot).sent)) & 1 == 1 }
    }

    #[inline(always)]
    pub(crate) fn set_sent(&self, sent: bool) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(addr_of_mut!((*self.slot).sent), u32::from(sent)) }
    }

    #[inline(always)]
    pub(crate) fn received(&self) -> bool {
        // SAFETY: as above.
        unsafe { ptr::read_volatile(addr_of!((*self.slot).received)) & 1 == 1 }
    }

    #[inline(always)]
    pub(crate) fn set_received(&self, received: bool) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(addr_of_mut!((*self.slot).received), u32::from(received)) }
    }

    #[inline(always)]
    pub(crate) fn length(&self) -> u32 {
        // SAFETY: as above.
        unsafe { ptr::read_volatile(addr_of!((*self.slot).length)) }
    }

    #[inline(always)]
    pub(crate) fn set_length(&self, length: u32) {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(addr_of_mut!((*self.slot).length), length) }
    }

    /// Copy `payload` into the slot's data area.
    ///
    /// Caller must have checked `payload.len() <= SLOT_PAYLOAD` and must
    /// own the slot (flags clear or `sent` set).
    pub(crate) fn write_payload(&self, payload: &[u8]) {
        debug_assert!(payload.len() <= SLOT_PAYLOAD);
        // SAFETY: the slot's data area has SLOT_PAYLOAD bytes and the
        // caller owns the slot while this runs.
        unsafe {
            ptr::copy_nonoverlapping(
                payload.as_ptr(),
                addr_of_mut!((*self.slot).data).cast::<u8>(),
                payload.len(),
            );
        }
    }

    /// Pointer to the first payload byte.
    #[inline(always)]
    pub(crate) fn payload_ptr(&self) -> *const u8 {
        // SAFETY: field projection on a valid slot pointer.
        unsafe { addr_of!((*self.slot).data).cast::<u8>() }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::*;

    #[test]
    fn slot_layout_matches_hardware() {
        assert_eq!(core::mem::size_of::<FrameSlot>(), 2048);
        assert_eq!(core::mem::offset_of!(FrameSlot, sent), 0);
        assert_eq!(core::mem::offset_of!(FrameSlot, received), 4);
        assert_eq!(core::mem::offset_of!(FrameSlot, length), 8);
        assert_eq!(core::mem::offset_of!(FrameSlot, data), 16);
    }

    #[test]
    fn slot_ptr_round_trips_flags_and_length() {
        let mut mem = vec![0u64; SLOT_STRIDE * 2 / 8];
        let base = mem.as_mut_ptr().cast::<u8>();

        let slot0 = unsafe { SlotPtr::at(base, 0) };
        let slot1 = unsafe { SlotPtr::at(base, 1) };

        assert!(!slot0.sent());
        slot0.set_sent(true);
        assert!(slot0.sent());
        // Neighbouring slot is untouched.
        assert!(!slot1.sent());

        slot1.set_received(true);
        slot1.set_length(36);
        assert!(slot1.received());
        assert_eq!(slot1.length(), 36);
        assert!(!slot0.received());
    }

    #[test]
    fn slot_ptr_copies_payload() {
        let mut mem = vec![0u64; SLOT_STRIDE / 8];
        let base = mem.as_mut_ptr().cast::<u8>();
        let slot = unsafe { SlotPtr::at(base, 0) };

        let payload = [0xAAu8, 0xBB, 0xCC, 0xDD];
        slot.write_payload(&payload);

        let read = unsafe { core::slice::from_raw_parts(slot.payload_ptr(), 4) };
        assert_eq!(read, &payload);
        // Payload starts right after the 16-byte header.
        assert_eq!(mem[2].to_le_bytes()[..4], payload);
    }
}
