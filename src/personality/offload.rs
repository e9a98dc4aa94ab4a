//! Fieldbus-master offload personality.

use super::Personality;
use crate::dma::DmaRing;
use crate::driver::stats::DevCounters;
use crate::hal::{FieldbusMaster, FrameBuffer, RegistrationFailed};

/// Uninhabited transmit buffer.
///
/// In offload mode the host-stack transmit path does not exist; using
/// this as the personality's buffer type makes it uncallable rather than
/// a runtime error.
pub enum NoBuffer {}

impl FrameBuffer for NoBuffer {
    fn len(&self) -> usize {
        match *self {}
    }

    fn payload(&self) -> Option<&[u8]> {
        match *self {}
    }

    fn payload_mut(&mut self) -> Option<&mut [u8]> {
        match *self {}
    }
}

/// Frame delivery offloaded to a real-time fieldbus master.
///
/// The master drains the receive ring from its own cyclic task through
/// [`NetDevice::fieldbus_poll_rx`](crate::NetDevice::fieldbus_poll_rx);
/// the device's poll tick only tracks the link for it. Queue gating and
/// ring-full notifications are no-ops: the master self-paces against the
/// ring.
pub struct FieldbusOffload<M: FieldbusMaster> {
    master: M,
}

impl<M: FieldbusMaster> FieldbusOffload<M> {
    /// Bind the master as this device's delivery world.
    pub const fn new(master: M) -> Self {
        Self { master }
    }

    /// Access the wrapped master.
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Mutable access to the wrapped master.
    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    /// Unwrap the master at teardown.
    pub fn into_master(self) -> M {
        self.master
    }
}

impl<M: FieldbusMaster> Personality for FieldbusOffload<M> {
    type Buffer = NoBuffer;

    fn register(&mut self) -> Result<(), RegistrationFailed> {
        self.master.open()
    }

    fn unregister(&mut self) {
        self.master.close();
        self.master.withdraw();
    }

    fn carrier_on(&mut self) {
        self.master.set_link(true);
    }

    fn carrier_off(&mut self) {
        self.master.set_link(false);
    }

    fn carrier_ok(&self) -> bool {
        self.master.link()
    }

    // The master is never throttled; it paces itself against the ring.
    fn queue_start(&mut self) {}

    fn queue_stop(&mut self) {}

    fn release(&mut self, buf: Self::Buffer) {
        match buf {}
    }

    // Receive is drained from the master's cyclic task, not the poll tick.
    fn service_rx(&mut self, _ring: &mut DmaRing, _counters: &DevCounters, _budget: usize) {}
}
