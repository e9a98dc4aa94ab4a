//! Generic host networking stack seam.

use super::RegistrationFailed;

/// A host frame buffer as seen by the datapath.
///
/// The datapath only ever copies bytes in or out of a buffer; ownership
/// stays with the stack (or master) that produced it. A buffer may be
/// non-contiguous in host memory, in which case [`payload`](Self::payload)
/// returns `None` and the transmit path drops the frame.
pub trait FrameBuffer {
    /// Total frame length in bytes.
    fn len(&self) -> usize;

    /// Whether the buffer holds no payload.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The payload as one contiguous slice, or `None` for fragmented
    /// buffers.
    fn payload(&self) -> Option<&[u8]>;

    /// Mutable access to the payload for the receive fill path, or `None`
    /// for buffers that cannot be written in place.
    fn payload_mut(&mut self) -> Option<&mut [u8]>;
}

/// The generic host networking stack.
///
/// Mirrors the handful of stack operations the datapath needs: a buffer
/// lifecycle (allocate, deliver upward, release), the carrier indication,
/// and the transmit queue gate used for backpressure.
pub trait NetStack {
    /// Host buffer type.
    type Buffer: FrameBuffer;

    /// Announce the device to the stack. Called once during attach.
    fn register(&mut self) -> Result<(), RegistrationFailed>;

    /// Withdraw the device from the stack. Called once during teardown.
    fn unregister(&mut self);

    /// Allocate a buffer able to hold exactly `len` payload bytes.
    ///
    /// `None` signals resource exhaustion; the frame is dropped and
    /// counted, never retried.
    fn alloc(&mut self, len: usize) -> Option<Self::Buffer>;

    /// Hand a filled buffer up to the protocol stack.
    fn deliver(&mut self, buf: Self::Buffer);

    /// Release a buffer without delivering it.
    fn release(&mut self, buf: Self::Buffer);

    /// Report carrier up.
    fn carrier_on(&mut self);

    /// Report carrier down.
    fn carrier_off(&mut self);

    /// Last carrier state reported to the stack.
    fn carrier_ok(&self) -> bool;

    /// Open the transmit queue gate.
    fn queue_start(&mut self);

    /// Close the transmit queue gate (backpressure).
    fn queue_stop(&mut self);
}
