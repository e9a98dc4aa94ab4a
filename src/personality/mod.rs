//! Delivery personalities.
//!
//! The controller serves exactly one of two worlds, decided at attach and
//! never revisited: frames either go to the generic host networking stack
//! ([`StackDelivery`]) or to a real-time fieldbus master
//! ([`FieldbusOffload`]). The datapath reaches whichever world it got
//! through the [`Personality`] hooks; there is no mode flag and no branch
//! on "which mode am I in" anywhere in the driver core.

pub mod offload;
pub mod stack;

pub use offload::FieldbusOffload;
pub use stack::StackDelivery;

use crate::dma::DmaRing;
use crate::driver::stats::DevCounters;
use crate::hal::{FrameBuffer, RegistrationFailed};

/// Hooks through which the datapath touches its delivery world.
///
/// Implemented by [`StackDelivery`] and [`FieldbusOffload`] only; the
/// driver core calls these and nothing else. Hooks that have no meaning
/// for a personality are explicit no-ops there, which is what makes the
/// branch-free core possible.
pub trait Personality {
    /// Host-side transmit buffer type.
    ///
    /// [`FieldbusOffload`] uses an uninhabited type here, which removes
    /// the buffer-based transmit path from that personality at compile
    /// time.
    type Buffer: FrameBuffer;

    /// Announce the device to the delivery world. Called once during
    /// attach, after the rings are armed.
    fn register(&mut self) -> Result<(), RegistrationFailed>;

    /// Withdraw the device. Called once during teardown.
    fn unregister(&mut self);

    /// Propagate link-up.
    fn carrier_on(&mut self);

    /// Propagate link-down.
    fn carrier_off(&mut self);

    /// Link state as last propagated. The poll tick compares this with
    /// the PHY register to detect edges.
    fn carrier_ok(&self) -> bool;

    /// Reopen the transmit queue gate after a stall clears.
    fn queue_start(&mut self);

    /// Close the transmit queue gate when the ring fills.
    fn queue_stop(&mut self);

    /// Return a transmit buffer whose frame was queued (or dropped).
    fn release(&mut self, buf: Self::Buffer);

    /// Drain up to `budget` received frames from `ring` and deliver them.
    ///
    /// Personalities that are drained externally (offload) leave this a
    /// no-op and pull frames on their own cadence instead.
    fn service_rx(&mut self, ring: &mut DmaRing, counters: &DevCounters, budget: usize);
}
