//! Driver error types.
//!
//! Everything here is a plain, copyable value: errors cross the FFI-ish
//! seams to platform code and must never drag allocations or lifetimes
//! with them. The one exception is [`TxBusy`], which exists precisely to
//! hand the caller's buffer back.

use core::fmt;

// =============================================================================
// Attach
// =============================================================================

/// Why bringing the device up failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachError {
    /// A ring's DMA region could not be allocated. Any region already
    /// allocated was freed before this was returned.
    DmaInit,
    /// The delivery collaborator (stack or fieldbus master) refused the
    /// device. Both rings were disarmed and freed before this was
    /// returned.
    Registration,
}

impl AttachError {
    /// Stable description for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DmaInit => "DMA ring allocation failed",
            Self::Registration => "delivery registration refused",
        }
    }
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for AttachError {}

// =============================================================================
// Datapath
// =============================================================================

/// The transmit ring had no free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingFull;

impl fmt::Display for RingFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transmit ring full")
    }
}

impl core::error::Error for RingFull {}

/// Why a frame was dropped (and counted) instead of queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropReason {
    /// Frame larger than a slot's payload area.
    Oversized,
    /// Transmit buffer not readable as one contiguous slice.
    NonContiguous,
    /// Receive-side buffer allocation failed.
    NoBuffer,
}

impl DropReason {
    /// Stable description for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oversized => "frame exceeds slot payload",
            Self::NonContiguous => "buffer is not contiguous",
            Self::NoBuffer => "no host buffer available",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transmit backpressure: the ring is full and the caller keeps the
/// frame.
///
/// Carries the untouched buffer back so the stack can requeue it once
/// the queue gate reopens.
pub struct TxBusy<B>(
    /// The rejected frame, untouched.
    pub B,
);

impl<B> fmt::Debug for TxBusy<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TxBusy(..)")
    }
}

impl<B> fmt::Display for TxBusy<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transmit ring busy, frame kept by caller")
    }
}
