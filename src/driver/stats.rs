//! Driver-side byte/drop accounting and the merged statistics view.
//!
//! The hardware keeps frame and error counters in its own register block
//! ([`MacSnapshot`]); the driver only has to count what hardware cannot
//! see: payload bytes moved and frames it dropped itself. Both halves are
//! merged on demand into one [`LinkStats`].

use core::sync::atomic::{AtomicU64, Ordering};

use crate::regs::mac::MacSnapshot;

/// Driver-maintained counters.
///
/// Atomics because the transmit path, the poll tick and the stats reader
/// may run on different contexts; relaxed ordering is enough, the values
/// are independent monotone counters.
#[derive(Debug, Default)]
pub struct DevCounters {
    rx_bytes: AtomicU64,
    tx_bytes: AtomicU64,
    rx_dropped: AtomicU64,
    tx_dropped: AtomicU64,
}

impl DevCounters {
    /// Fresh zeroed counters.
    pub const fn new() -> Self {
        Self {
            rx_bytes: AtomicU64::new(0),
            tx_bytes: AtomicU64::new(0),
            rx_dropped: AtomicU64::new(0),
            tx_dropped: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn add_rx_bytes(&self, n: u64) {
        self.rx_bytes.fetch_add(n, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn add_tx_bytes(&self, n: u64) {
        self.tx_bytes.fetch_add(n, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn count_rx_drop(&self) {
        self.rx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn count_tx_drop(&self) {
        self.tx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total payload bytes delivered upward.
    pub fn rx_bytes(&self) -> u64 {
        self.rx_bytes.load(Ordering::Relaxed)
    }

    /// Total payload bytes queued for transmission.
    pub fn tx_bytes(&self) -> u64 {
        self.tx_bytes.load(Ordering::Relaxed)
    }

    /// Received frames the driver dropped (no host buffer).
    pub fn rx_dropped(&self) -> u64 {
        self.rx_dropped.load(Ordering::Relaxed)
    }

    /// Outbound frames the driver dropped (oversized or unreadable).
    pub fn tx_dropped(&self) -> u64 {
        self.tx_dropped.load(Ordering::Relaxed)
    }
}

/// Merged device statistics: hardware MAC counters plus driver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames received by the MAC.
    pub rx_packets: u64,
    /// Frames transmitted by the MAC.
    pub tx_packets: u64,
    /// Payload bytes delivered upward by the driver.
    pub rx_bytes: u64,
    /// Payload bytes queued by the driver.
    pub tx_bytes: u64,
    /// Receive errors seen by the MAC (length, CRC, general, overflow).
    pub rx_errors: u64,
    /// Frames dropped on receive, by hardware or driver.
    pub rx_dropped: u64,
    /// Frames dropped on transmit, by hardware or driver.
    pub tx_dropped: u64,
    /// Transmit buffer overflows inside the MAC.
    pub tx_fifo_errors: u64,
}

impl LinkStats {
    /// Combine a hardware counter snapshot with the driver's counters.
    pub fn merge(hw: &MacSnapshot, sw: &DevCounters) -> Self {
        Self {
            rx_packets: hw.rx_frames,
            tx_packets: hw.tx_frames,
            rx_bytes: sw.rx_bytes(),
            tx_bytes: sw.tx_bytes(),
            rx_errors: u64::from(hw.frame_len_err)
                + u64::from(hw.rx_err)
                + u64::from(hw.crc_err)
                + u64::from(hw.rx_mem_full),
            rx_dropped: hw.rx_dropped + sw.rx_dropped(),
            tx_dropped: hw.tx_dropped + sw.tx_dropped(),
            tx_fifo_errors: u64::from(hw.tx_mem_full),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_monotonically() {
        let c = DevCounters::new();
        c.add_rx_bytes(100);
        c.add_rx_bytes(28);
        c.add_tx_bytes(60);
        c.count_rx_drop();
        c.count_tx_drop();
        c.count_tx_drop();

        assert_eq!(c.rx_bytes(), 128);
        assert_eq!(c.tx_bytes(), 60);
        assert_eq!(c.rx_dropped(), 1);
        assert_eq!(c.tx_dropped(), 2);
    }

    #[test]
    fn merge_combines_both_sources() {
        let hw = MacSnapshot {
            frame_len_err: 1,
            rx_err: 2,
            crc_err: 3,
            link_lost_err: 9,
            rx_mem_full: 4,
            tx_mem_full: 5,
            tx_frames: 1000,
            rx_frames: 2000,
            rx_dropped: 7,
            tx_dropped: 8,
        };
        let sw = DevCounters::new();
        sw.add_rx_bytes(4096);
        sw.add_tx_bytes(2048);
        sw.count_rx_drop();
        sw.count_tx_drop();

        let stats = LinkStats::merge(&hw, &sw);
        assert_eq!(stats.rx_packets, 2000);
        assert_eq!(stats.tx_packets, 1000);
        assert_eq!(stats.rx_bytes, 4096);
        assert_eq!(stats.tx_bytes, 2048);
        assert_eq!(stats.rx_errors, 1 + 2 + 3 + 4);
        assert_eq!(stats.rx_dropped, 7 + 1);
        assert_eq!(stats.tx_dropped, 8 + 1);
        assert_eq!(stats.tx_fifo_errors, 5);
        // Link-lost is a link event, not a frame error.
        assert_eq!(stats.rx_errors + stats.tx_fifo_errors, 15);
    }
}
