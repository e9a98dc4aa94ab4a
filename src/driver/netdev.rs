//! The network device: rings, register map, personality and poll engine.
//!
//! The controller raises no interrupts. Everything event-shaped (link
//! edges, receive completions, transmit-stall recovery) is discovered by
//! [`NetDevice::poll`], which the platform calls on a fixed cadence
//! ([`POLL_PERIOD_US`](crate::constants::POLL_PERIOD_US) is the
//! production period). All other entry points are the transmit path and
//! the offload-mode ring access for the fieldbus master.

#[cfg(feature = "log")]
use log::{error, info};

use super::config::DeviceConfig;
use super::error::{AttachError, DropReason, RingFull, TxBusy};
use super::stats::{DevCounters, LinkStats};
use crate::constants::{FORWARDING_ENABLE_FRAME, MAC_ADDR_LEN, SLOT_PAYLOAD, SLOT_STRIDE};
use crate::dma::{Direction, DmaRing};
use crate::hal::{DmaAllocator, FieldbusMaster, FrameBuffer};
use crate::personality::{FieldbusOffload, Personality};
use crate::regs::RegisterMap;

/// Outcome of a transmit call that consumed its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxStatus {
    /// Frame handed to hardware.
    Queued,
    /// Frame discarded and counted; the link never saw it.
    Dropped(DropReason),
}

/// One polled network controller bound to one delivery personality.
///
/// Construction via [`attach`](Self::attach) allocates and arms both
/// rings and registers with the delivery world; [`detach`](Self::detach)
/// unwinds in reverse. In between the platform drives
/// [`poll`](Self::poll) periodically and routes outbound frames through
/// [`transmit`](Self::transmit) (or, in offload mode,
/// [`fieldbus_transmit`](Self::fieldbus_transmit)).
///
/// Not internally synchronized; the `critical-section` feature's
/// `SharedDevice` wrapper handles the poll-context/caller-context split.
pub struct NetDevice<P: Personality, A: DmaAllocator> {
    rx: DmaRing,
    tx: DmaRing,
    regs: RegisterMap,
    personality: P,
    allocator: A,
    /// Slot index the transmit path stalled on, if the ring is full.
    /// `Some` implies the queue gate is closed; the poll tick reopens it
    /// once this slot completes.
    stalled_tx: Option<usize>,
    counters: DevCounters,
    mac_addr: [u8; MAC_ADDR_LEN],
    config: DeviceConfig,
}

impl<P: Personality, A: DmaAllocator> NetDevice<P, A> {
    /// Bring the device up.
    ///
    /// Allocates both ring regions, arms the rings, disables the MAC's
    /// address filter, reads the factory MAC address and registers with
    /// the delivery world. On any failure everything already done is
    /// unwound before the error is returned; `personality` and
    /// `allocator` are dropped with it.
    pub fn attach(
        regs: RegisterMap,
        mut personality: P,
        mut allocator: A,
        config: DeviceConfig,
    ) -> Result<Self, AttachError> {
        let ring_len = config.ring_slots * SLOT_STRIDE;

        let rx_region = allocator
            .allocate(config.rx_dma_channel, ring_len)
            .ok_or(AttachError::DmaInit)?;
        let Some(tx_region) = allocator.allocate(config.tx_dma_channel, ring_len) else {
            allocator.free(rx_region);
            return Err(AttachError::DmaInit);
        };

        // SAFETY: the register map resolves live windows and the regions
        // are the mappings the allocator just programmed the channels
        // with.
        let mut rx = unsafe { DmaRing::new(rx_region, regs.rx_ring_window(), Direction::Receive) };
        let mut tx = unsafe { DmaRing::new(tx_region, regs.tx_ring_window(), Direction::Transmit) };
        rx.reset();
        tx.reset();

        regs.disable_mac_filter();
        let mac_addr = regs.mac_address();

        // Link state is unknown until the first poll tick.
        personality.carrier_off();
        if personality.register().is_err() {
            rx.disarm();
            tx.disarm();
            allocator.free(rx.into_region());
            allocator.free(tx.into_region());
            return Err(AttachError::Registration);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("device attached");

        Ok(Self {
            rx,
            tx,
            regs,
            personality,
            allocator,
            stalled_tx: None,
            counters: DevCounters::new(),
            mac_addr,
            config,
        })
    }

    /// Tear the device down and return its collaborators.
    ///
    /// The caller must have stopped the periodic poll (and, in offload
    /// mode, the master's ring access) before calling this.
    pub fn detach(self) -> (P, A) {
        let Self {
            mut rx,
            mut tx,
            mut personality,
            mut allocator,
            ..
        } = self;

        personality.queue_stop();
        personality.carrier_off();
        personality.unregister();

        rx.disarm();
        tx.disarm();
        allocator.free(rx.into_region());
        allocator.free(tx.into_region());

        (personality, allocator)
    }

    // =========================================================================
    // Poll engine
    // =========================================================================

    /// One poll tick: link edge detection, receive service, stall
    /// recovery.
    ///
    /// Call this every [`POLL_PERIOD_US`](crate::constants::POLL_PERIOD_US)
    /// microseconds; nothing else moves frames or notices the link.
    pub fn poll(&mut self) {
        self.poll_link();
        let budget = self.config.effective_rx_budget();
        self.personality
            .service_rx(&mut self.rx, &self.counters, budget);
        self.poll_tx();
    }

    /// Compare the PHY's link bit with the carrier state we last
    /// propagated and handle the edge.
    fn poll_link(&mut self) {
        let link = self.regs.link_up();
        if link == self.personality.carrier_ok() {
            return;
        }
        if link {
            self.link_up();
        } else {
            self.link_down();
        }
    }

    /// Link came up: discard stale ring state, wake the peripherals,
    /// then tell the delivery world.
    fn link_up(&mut self) {
        #[cfg(feature = "log")]
        info!("link up");
        #[cfg(feature = "defmt")]
        defmt::info!("link up");

        self.rx.reset();
        self.tx.reset();
        self.stalled_tx = None;

        // Cannot fail into a freshly reset ring.
        let _ = self.inject_raw(&FORWARDING_ENABLE_FRAME);

        self.personality.carrier_on();
        self.personality.queue_start();
    }

    /// Link went down: gate transmission first, then drop carrier.
    fn link_down(&mut self) {
        #[cfg(feature = "log")]
        info!("link down");
        #[cfg(feature = "defmt")]
        defmt::info!("link down");

        self.personality.queue_stop();
        self.personality.carrier_off();
    }

    /// Reopen the queue gate once the stalled slot completes.
    fn poll_tx(&mut self) {
        if let Some(index) = self.stalled_tx {
            if self.tx.slot_sent(index) {
                self.stalled_tx = None;
                self.personality.queue_start();
            }
        }
    }

    // =========================================================================
    // Transmit path
    // =========================================================================

    /// Queue one outbound frame.
    ///
    /// Undeliverable frames (oversized, unreadable) are dropped, counted
    /// and reported as [`TxStatus::Dropped`]; the buffer is released
    /// either way. A full ring hands the untouched buffer back in
    /// [`TxBusy`] after closing the queue gate; the caller retries once
    /// the gate reopens.
    pub fn transmit(&mut self, buf: P::Buffer) -> Result<TxStatus, TxBusy<P::Buffer>> {
        let len = buf.len();
        if len > SLOT_PAYLOAD {
            self.counters.count_tx_drop();
            self.personality.release(buf);
            return Ok(TxStatus::Dropped(DropReason::Oversized));
        }

        let submitted = buf.payload().map(|payload| self.tx.submit(payload));
        match submitted {
            None => {
                self.counters.count_tx_drop();
                self.personality.release(buf);
                Ok(TxStatus::Dropped(DropReason::NonContiguous))
            }
            Some(Err(RingFull)) => {
                self.on_ring_full();
                Err(TxBusy(buf))
            }
            Some(Ok(_)) => {
                self.counters.add_tx_bytes(len as u64);
                self.personality.release(buf);
                // Gate the queue now if the slot after us is still in
                // flight, instead of bouncing the next frame.
                if self.stalled_tx.is_none() && !self.tx.next_free() {
                    self.stall();
                }
                Ok(TxStatus::Queued)
            }
        }
    }

    /// Submit raw frame bytes, bypassing the buffer seam.
    fn inject_raw(&mut self, frame: &[u8]) -> Result<(), RingFull> {
        debug_assert!(frame.len() <= SLOT_PAYLOAD);
        self.tx.submit(frame)?;
        self.counters.add_tx_bytes(frame.len() as u64);
        Ok(())
    }

    fn stall(&mut self) {
        self.stalled_tx = Some(self.tx.cursor());
        self.personality.queue_stop();
    }

    /// A frame arrived for a full ring. With the gate open that means
    /// the proactive check missed; close it now.
    fn on_ring_full(&mut self) {
        if self.stalled_tx.is_some() {
            return;
        }
        #[cfg(feature = "log")]
        error!("transmit ring full while queue awake");
        #[cfg(feature = "defmt")]
        defmt::error!("transmit ring full while queue awake");
        self.stall();
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Factory MAC address read at attach.
    pub fn mac_address(&self) -> [u8; MAC_ADDR_LEN] {
        self.mac_addr
    }

    /// Merged hardware and driver statistics.
    pub fn stats(&self) -> LinkStats {
        LinkStats::merge(&self.regs.mac_counters(), &self.counters)
    }

    /// Driver-side counters.
    pub fn counters(&self) -> &DevCounters {
        &self.counters
    }

    /// The bound personality.
    pub fn personality(&self) -> &P {
        &self.personality
    }

    /// Mutable access to the bound personality.
    pub fn personality_mut(&mut self) -> &mut P {
        &mut self.personality
    }

    /// Configuration the device was attached with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl<M: FieldbusMaster, A: DmaAllocator> NetDevice<FieldbusOffload<M>, A> {
    /// Drain one received frame to the fieldbus master, if any is
    /// pending. Returns whether a frame was delivered.
    ///
    /// Called from the master's own cyclic task; the poll tick never
    /// touches the receive ring in offload mode. Byte accounting is the
    /// master's business, not ours.
    pub fn fieldbus_poll_rx(&mut self) -> bool {
        let master = self.personality.master_mut();
        self.rx.drain_one(|frame| master.receive(frame)).is_some()
    }

    /// Queue one outbound frame on behalf of the fieldbus master.
    ///
    /// No queue gating here: the master paces itself against the ring
    /// and treats [`RingFull`] as "try next cycle".
    pub fn fieldbus_transmit(&mut self, frame: &[u8]) -> Result<TxStatus, RingFull> {
        if frame.len() > SLOT_PAYLOAD {
            self.counters.count_tx_drop();
            return Ok(TxStatus::Dropped(DropReason::Oversized));
        }
        self.tx.submit(frame)?;
        self.counters.add_tx_bytes(frame.len() as u64);
        Ok(TxStatus::Queued)
    }
}

// =============================================================================
// Tests
// =============================================================================
