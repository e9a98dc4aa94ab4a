//! Attach-time device configuration.

use crate::constants::RING_SLOTS;

/// Tunables fixed at attach.
///
/// The defaults reproduce the production bring-up: 64-slot rings on DMA
/// channels 0 (receive) and 1 (transmit), with a per-poll receive budget
/// of one full ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// DMA channel carrying received frames.
    pub rx_dma_channel: usize,
    /// DMA channel carrying transmitted frames.
    pub tx_dma_channel: usize,
    /// Slots per ring. Both rings share this size.
    pub ring_slots: usize,
    /// Maximum frames drained per poll tick, `None` for one ring's worth.
    ///
    /// Bounds the time spent inside a single tick so a flooded link
    /// cannot starve the poll context.
    pub rx_poll_budget: Option<usize>,
}

impl DeviceConfig {
    /// Production defaults.
    pub const fn new() -> Self {
        Self {
            rx_dma_channel: 0,
            tx_dma_channel: 1,
            ring_slots: RING_SLOTS,
            rx_poll_budget: None,
        }
    }

    /// Override the ring size (mainly for bench and test rigs).
    pub const fn with_ring_slots(mut self, slots: usize) -> Self {
        self.ring_slots = slots;
        self
    }

    /// Override the per-tick receive budget.
    pub const fn with_rx_poll_budget(mut self, budget: usize) -> Self {
        self.rx_poll_budget = Some(budget);
        self
    }

    /// Override the DMA channel pair.
    pub const fn with_dma_channels(mut self, rx: usize, tx: usize) -> Self {
        self.rx_dma_channel = rx;
        self.tx_dma_channel = tx;
        self
    }

    /// Effective receive budget for the configured ring size.
    pub(crate) fn effective_rx_budget(&self) -> usize {
        match self.rx_poll_budget {
            Some(budget) => budget,
            None => self.ring_slots,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_bringup() {
        let config = DeviceConfig::new();
        assert_eq!(config.rx_dma_channel, 0);
        assert_eq!(config.tx_dma_channel, 1);
        assert_eq!(config.ring_slots, 64);
        assert_eq!(config.effective_rx_budget(), 64);
    }

    #[test]
    fn builder_overrides_compose() {
        let config = DeviceConfig::new()
            .with_ring_slots(4)
            .with_rx_poll_budget(2)
            .with_dma_channels(5, 6);
        assert_eq!(config.ring_slots, 4);
        assert_eq!(config.effective_rx_budget(), 2);
        assert_eq!(config.rx_dma_channel, 5);
        assert_eq!(config.tx_dma_channel, 6);
    }
}
