//! Hardware MAC counter block.

use core::ptr;

/// Fixed layout of the MAC's counter block inside its register window.
///
/// Error counters saturate at one byte; frame counters are free-running
/// 64-bit values.
#[repr(C)]
struct MacCounterBlock {
    frame_len_err: u8,
    rx_err: u8,
    crc_err: u8,
    link_lost_err: u8,
    _reserved1: u32,
    rx_mem_full: u8,
    tx_mem_full: u8,
    _reserved2: [u8; 6],
    _reserved3: [u64; 5],
    tx_frames: u64,
    rx_frames: u64,
    _reserved4: [u64; 2],
    rx_dropped: u64,
    tx_dropped: u64,
}

const _: () = assert!(core::mem::offset_of!(MacCounterBlock, rx_mem_full) == 8);
const _: () = assert!(core::mem::offset_of!(MacCounterBlock, tx_frames) == 56);
const _: () = assert!(core::mem::offset_of!(MacCounterBlock, rx_frames) == 64);
const _: () = assert!(core::mem::offset_of!(MacCounterBlock, rx_dropped) == 88);
const _: () = assert!(core::mem::offset_of!(MacCounterBlock, tx_dropped) == 96);

/// One coherent-enough read of the MAC counters.
///
/// The counters are sampled field by field; hardware keeps counting in
/// between, which is fine for statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacSnapshot {
    /// Frames with an illegal length.
    pub frame_len_err: u8,
    /// General receive errors.
    pub rx_err: u8,
    /// Frames with a bad CRC.
    pub crc_err: u8,
    /// Link-loss events.
    pub link_lost_err: u8,
    /// Receive buffer overflows.
    pub rx_mem_full: u8,
    /// Transmit buffer overflows.
    pub tx_mem_full: u8,
    /// Frames transmitted.
    pub tx_frames: u64,
    /// Frames received.
    pub rx_frames: u64,
    /// Frames dropped by hardware on receive.
    pub rx_dropped: u64,
    /// Frames dropped by hardware on transmit.
    pub tx_dropped: u64,
}

/// Sample the counter block at `base`.
///
/// # Safety
///
/// `base` must point at a live MAC register window covering the whole
/// [`MacCounterBlock`].
pub(crate) unsafe fn snapshot(base: *const u8) -> MacSnapshot {
    let block = base.cast::<MacCounterBlock>();
    // SAFETY: caller guarantees the window covers the block; each field is
    // read volatile, hardware updates them concurrently.
    unsafe {
        MacSnapshot {
            frame_len_err: ptr::read_volatile(ptr::addr_of!((*block).frame_len_err)),
            rx_err: ptr::read_volatile(ptr::addr_of!((*block).rx_err)),
            crc_err: ptr::read_volatile(ptr::addr_of!((*block).crc_err)),
            link_lost_err: ptr::read_volatile(ptr::addr_of!((*block).link_lost_err)),
            rx_mem_full: ptr::read_volatile(ptr::addr_of!((*block).rx_mem_full)),
            tx_mem_full: ptr::read_volatile(ptr::addr_of!((*block).tx_mem_full)),
            tx_frames: ptr::read_volatile(ptr::addr_of!((*block).tx_frames)),
            rx_frames: ptr::read_volatile(ptr::addr_of!((*block).rx_frames)),
            rx_dropped: ptr::read_volatile(ptr::addr_of!((*block).rx_dropped)),
            tx_dropped: ptr::read_volatile(ptr::addr_of!((*block).tx_dropped)),
        }
    }
}
