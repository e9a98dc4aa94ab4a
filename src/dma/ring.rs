//! Fixed-size DMA descriptor rings with a wrapping software cursor.
//!
//! A [`DmaRing`] owns one DMA region carved into [`SLOT_STRIDE`]-byte frame
//! slots and the ring's doorbell register window. The hardware walks the
//! ring on its own; software only ever touches the slot under its cursor
//! and advances in submission (or drain) order. Slot ownership is handed
//! over through the per-slot flags and the doorbell writes, with fences
//! ordering payload access against the hand-over.

use core::sync::atomic::{fence, Ordering};

use super::slot::SlotPtr;
use crate::constants::{
    FRAME_HEADER_LEN, RING_RESET_OFFSET, RX_REARM_OWNED, SLOT_PAYLOAD, SLOT_STRIDE,
    TX_DOORBELL_BASE, TX_DOORBELL_LEN_SHIFT,
};
use crate::driver::error::RingFull;
use crate::hal::DmaRegion;

/// Which way frames flow through a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Hardware fills slots, software drains them.
    Receive,
    /// Software fills slots, hardware drains them.
    Transmit,
}

/// One descriptor ring: DMA slot memory plus its doorbell window.
pub struct DmaRing {
    region: DmaRegion,
    /// Ring register window. Doorbell at offset 0, reset at
    /// [`RING_RESET_OFFSET`].
    reg: *mut u8,
    dir: Direction,
    /// Software cursor: next slot to submit (transmit) or drain (receive).
    next: usize,
    slots: usize,
}

// SAFETY: the ring is held behind the device's external serialization; the
// raw pointers are only dereferenced through &mut self volatile accesses.
unsafe impl Send for DmaRing {}

impl DmaRing {
    /// Wrap a DMA region and its register window as a ring.
    ///
    /// Capacity is however many whole slots fit in the region. The ring is
    /// not armed until [`reset`](Self::reset) runs.
    ///
    /// # Safety
    ///
    /// `reg` must point at this ring's register window, valid for volatile
    /// u32 writes at offsets 0 and [`RING_RESET_OFFSET`] for the ring's
    /// lifetime. `region` must be the live mapping the hardware was (or
    /// will be) programmed with.
    pub unsafe fn new(region: DmaRegion, reg: *mut u8, dir: Direction) -> Self {
        let slots = region.len() / SLOT_STRIDE;
        Self {
            region,
            reg,
            dir,
            next: 0,
            slots,
        }
    }

    /// Number of slots in this ring.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots
    }

    /// Current cursor position.
    #[inline(always)]
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Flow direction of this ring.
    #[inline(always)]
    pub fn direction(&self) -> Direction {
        self.dir
    }

    fn slot(&self, index: usize) -> SlotPtr {
        debug_assert!(index < self.slots);
        // SAFETY: `region` covers `slots` whole slots and outlives `self`.
        unsafe { SlotPtr::at(self.region.virt().as_ptr(), index) }
    }

    fn write_reg(&self, offset: usize, value: u32) {
        // SAFETY: `reg` is valid for u32 writes at this offset per `new`.
        unsafe { self.reg.add(offset).cast::<u32>().write_volatile(value) }
    }

    // =========================================================================
    // Transmit path
    // =========================================================================

    /// Whether the slot under the cursor is free for a new submission.
    ///
    /// Used after a successful submit to detect an imminent full ring
    /// before the next frame arrives.
    pub fn next_free(&self) -> bool {
        self.slot(self.next).sent()
    }

    /// Whether transmission of the frame in `index` has completed.
    pub fn slot_sent(&self, index: usize) -> bool {
        self.slot(index).sent()
    }

    /// Queue one frame for transmission.
    ///
    /// Copies `payload` into the cursor slot, hands the slot to hardware
    /// through the doorbell and advances the cursor. Returns the slot
    /// index used. Fails without side effects when the cursor slot is
    /// still in flight.
    ///
    /// The caller bounds `payload` to [`SLOT_PAYLOAD`].
    pub fn submit(&mut self, payload: &[u8]) -> Result<usize, RingFull> {
        debug_assert_eq!(self.dir, Direction::Transmit);
        debug_assert!(payload.len() <= SLOT_PAYLOAD);

        let index = self.next;
        let slot = self.slot(index);
        if !slot.sent() {
            return Err(RingFull);
        }

        slot.set_sent(false);
        slot.set_received(false);
        slot.set_length(payload.len() as u32);
        slot.write_payload(payload);

        // Payload and header must be globally visible before the doorbell.
        fence(Ordering::SeqCst);

        let quadwords = (payload.len() + FRAME_HEADER_LEN).div_ceil(8) as u32;
        let doorbell = TX_DOORBELL_BASE
            + (index * SLOT_STRIDE) as u32
            + (quadwords << TX_DOORBELL_LEN_SHIFT);
        self.write_reg(0, doorbell);

        self.next = (index + 1) % self.slots;
        Ok(index)
    }

    // =========================================================================
    // Receive path
    // =========================================================================

    /// Drain one received frame, if the cursor slot holds one.
    ///
    /// Runs `consume` over the frame bytes (descriptor header already
    /// stripped), then returns the slot to hardware and advances the
    /// cursor. The slice aliases DMA memory and is only valid inside
    /// `consume`.
    pub fn drain_one<R>(&mut self, consume: impl FnOnce(&[u8]) -> R) -> Option<R> {
        debug_assert_eq!(self.dir, Direction::Receive);

        let index = self.next;
        let slot = self.slot(index);
        if !slot.received() {
            return None;
        }

        // Frame bytes must not be read before the flag was observed set.
        fence(Ordering::SeqCst);

        let len = (slot.length() as usize)
            .saturating_sub(FRAME_HEADER_LEN)
            .min(SLOT_PAYLOAD);
        // SAFETY: the slot is software-owned (received flag set) until the
        // re-arm below, and `len` is bounded to the payload area.
        let frame = unsafe { core::slice::from_raw_parts(slot.payload_ptr(), len) };
        let out = consume(frame);

        self.rearm(index);
        self.next = (index + 1) % self.slots;
        Some(out)
    }

    /// Hand a drained slot back to hardware.
    fn rearm(&self, index: usize) {
        let slot = self.slot(index);
        slot.set_received(false);
        fence(Ordering::SeqCst);
        self.write_reg(0, RX_REARM_OWNED | (index * SLOT_STRIDE) as u32);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Reset the ring to its post-attach state.
    ///
    /// Stops the hardware side, then re-arms every slot: receive slots go
    /// back to hardware empty, transmit slots are marked free. Any frames
    /// in flight are discarded. The cursor returns to slot zero.
    pub fn reset(&mut self) {
        self.write_reg(RING_RESET_OFFSET, 0);
        fence(Ordering::SeqCst);

        for index in 0..self.slots {
            match self.dir {
                Direction::Receive => self.rearm(index),
                Direction::Transmit => self.slot(index).set_sent(true),
            }
        }
        self.next = 0;
    }

    /// Stop the hardware side of the ring without re-arming any slots.
    ///
    /// Called during teardown, right before the region is freed.
    pub fn disarm(&mut self) {
        self.write_reg(RING_RESET_OFFSET, 0);
        fence(Ordering::SeqCst);
    }

    /// Consume the ring and return its DMA region for freeing.
    ///
    /// Call [`disarm`](Self::disarm) first.
    pub fn into_region(self) -> DmaRegion {
        self.region
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::constants::SLOT_HEADER_LEN;

    /// Host-memory stand-in for a ring's DMA region and register window.
    struct RingHarness {
        mem: Vec<u64>,
        reg: Vec<u32>,
    }

    impl RingHarness {
        fn new(slots: usize) -> Self {
            Self {
                mem: vec![0u64; slots * SLOT_STRIDE / 8],
                reg: vec![0u32; 4],
            }
        }

        fn ring(&mut self, dir: Direction) -> DmaRing {
            let len = self.mem.len() * 8;
            let virt = core::ptr::NonNull::new(self.mem.as_mut_ptr().cast::<u8>()).unwrap();
            let region = DmaRegion::new(virt, 0x1000, len, 0);
            unsafe { DmaRing::new(region, self.reg.as_mut_ptr().cast::<u8>(), dir) }
        }

        /// Last doorbell value written.
        fn doorbell(&self) -> u32 {
            self.reg[0]
        }

        /// Mark the hardware side of a receive slot as filled.
        fn fill_rx_slot(&mut self, index: usize, frame: &[u8]) {
            let base = index * SLOT_STRIDE;
            let total = frame.len() + FRAME_HEADER_LEN;
            let bytes = unsafe {
                core::slice::from_raw_parts_mut(
                    self.mem.as_mut_ptr().cast::<u8>().add(base),
                    SLOT_STRIDE,
                )
            };
            bytes[4..8].copy_from_slice(&1u32.to_le_bytes()); // received
            bytes[8..12].copy_from_slice(&(total as u32).to_le_bytes()); // length
            bytes[SLOT_HEADER_LEN..SLOT_HEADER_LEN + frame.len()].copy_from_slice(frame);
        }
    }

    #[test]
    fn capacity_comes_from_region_size() {
        let mut h = RingHarness::new(4);
        let ring = h.ring(Direction::Transmit);
        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    fn reset_arms_every_transmit_slot() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.reset();
        for index in 0..4 {
            assert!(ring.slot_sent(index));
        }
        assert_eq!(ring.cursor(), 0);
        // The reset register saw the stop write.
        assert_eq!(h.reg[RING_RESET_OFFSET / 4], 0);
    }

    #[test]
    fn submit_encodes_the_doorbell_and_advances() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.reset();

        let frame = [0x55u8; 60];
        assert_eq!(ring.submit(&frame), Ok(0));
        assert_eq!(ring.cursor(), 1);
        // 60 + 20 header = 80 bytes = 10 quadwords.
        assert_eq!(h.doorbell(), TX_DOORBELL_BASE + (10 << TX_DOORBELL_LEN_SHIFT));
        // The slot left software ownership.
        let ring = h.ring(Direction::Transmit);
        assert!(!ring.slot_sent(0));
    }

    #[test]
    fn submit_rounds_odd_lengths_up_to_whole_quadwords() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.reset();

        // 61 + 20 = 81 bytes; a truncating divide would lose the tail byte.
        assert_eq!(ring.submit(&[0u8; 61]), Ok(0));
        assert_eq!(h.doorbell(), TX_DOORBELL_BASE + (11 << TX_DOORBELL_LEN_SHIFT));
    }

    #[test]
    fn submit_into_a_busy_slot_fails_without_side_effects() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.reset();

        for _ in 0..4 {
            ring.submit(&[0u8; 60]).unwrap();
        }
        let doorbell_before = h.reg[0];
        let mut ring = h.ring(Direction::Transmit);
        // Cursor wrapped to slot 0, still in flight.
        assert_eq!(ring.submit(&[0u8; 60]), Err(RingFull));
        assert_eq!(ring.cursor(), 0);
        assert_eq!(h.doorbell(), doorbell_before);
    }

    #[test]
    fn submit_wraps_around_after_completion() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.reset();

        for _ in 0..4 {
            ring.submit(&[0u8; 60]).unwrap();
        }
        // Hardware finishes slot 0.
        unsafe { SlotPtr::at(ring.region.virt().as_ptr(), 0) }.set_sent(true);
        assert_eq!(ring.submit(&[0u8; 60]), Ok(0));
        assert_eq!(ring.cursor(), 1);
    }

    #[test]
    fn drain_one_strips_the_descriptor_header() {
        let mut h = RingHarness::new(4);
        let frame = [0xA5u8; 16];
        h.fill_rx_slot(0, &frame);

        let mut ring = h.ring(Direction::Receive);
        let seen = ring.drain_one(|bytes| {
            assert_eq!(bytes, &frame);
            bytes.len()
        });
        assert_eq!(seen, Some(16));
        assert_eq!(ring.cursor(), 1);
    }

    #[test]
    fn drain_one_rearms_the_slot() {
        let mut h = RingHarness::new(4);
        h.fill_rx_slot(1, &[0u8; 8]);

        let mut ring = h.ring(Direction::Receive);
        ring.next = 1;
        assert!(ring.drain_one(|_| ()).is_some());
        assert_eq!(h.doorbell(), RX_REARM_OWNED | SLOT_STRIDE as u32);
        // Slot went back to hardware.
        assert!(!unsafe { SlotPtr::at(ring.region.virt().as_ptr(), 1) }.received());
    }

    #[test]
    fn drain_visits_slots_in_ring_order() {
        let mut h = RingHarness::new(4);
        for i in 0..4 {
            h.fill_rx_slot(i, &[i as u8; 8]);
        }
        let mut ring = h.ring(Direction::Receive);
        for i in 0..4u8 {
            assert_eq!(ring.drain_one(|frame| frame[0]), Some(i));
        }
        // A full ring of completions drains exactly capacity frames.
        assert!(ring.drain_one(|_| ()).is_none());
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn drain_one_on_an_empty_slot_is_none() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Receive);
        ring.reset();
        assert!(ring.drain_one(|_| ()).is_none());
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn receive_reset_discards_pending_frames() {
        let mut h = RingHarness::new(4);
        for index in 0..3 {
            h.fill_rx_slot(index, &[0u8; 8]);
        }
        let mut ring = h.ring(Direction::Receive);
        ring.next = 2;
        ring.reset();
        assert_eq!(ring.cursor(), 0);
        assert!(ring.drain_one(|_| ()).is_none());
        // Every slot was re-armed; the last doorbell targets slot 3.
        assert_eq!(h.doorbell(), RX_REARM_OWNED | (3 * SLOT_STRIDE) as u32);
    }

    #[test]
    fn into_region_returns_the_original_mapping() {
        let mut h = RingHarness::new(4);
        let mut ring = h.ring(Direction::Transmit);
        ring.disarm();
        let region = ring.into_region();
        assert_eq!(region.phys(), 0x1000);
        assert_eq!(region.len(), 4 * SLOT_STRIDE);
    }
}
