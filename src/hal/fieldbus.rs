//! Real-time fieldbus master seam.

use super::RegistrationFailed;

/// The external fieldbus master that takes over frame delivery when the
/// controller runs in offload mode.
///
/// The master is cooperatively polled from its own cyclic task: it is
/// never blocked by this driver (queue gating and ring-full handling are
/// no-ops in offload mode), and the buffers it sees on receive are views
/// into the DMA ring that remain valid only for the duration of the
/// [`receive`](Self::receive) call.
pub trait FieldbusMaster {
    /// Complete the attach-time registration with the master.
    fn open(&mut self) -> Result<(), RegistrationFailed>;

    /// Stop the master's use of the device before withdrawal.
    fn close(&mut self);

    /// Withdraw the attach-time offer. Called once during teardown, after
    /// [`close`](Self::close).
    fn withdraw(&mut self);

    /// Report the device's link state to the master.
    fn set_link(&mut self, up: bool);

    /// Last link state reported via [`set_link`](Self::set_link).
    fn link(&self) -> bool;

    /// Deliver one received frame to the master.
    ///
    /// Called from [`NetDevice::fieldbus_poll_rx`](crate::NetDevice::fieldbus_poll_rx)
    /// on the master's own cyclic thread. The slice aliases DMA memory and
    /// must be consumed before returning.
    fn receive(&mut self, frame: &[u8]);
}
