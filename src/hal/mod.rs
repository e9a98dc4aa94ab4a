//! Collaborator seams for the platform embedding this driver.
//!
//! The driver core deliberately knows nothing about bus enumeration, DMA
//! mapping, the host networking stack's buffer type, or the fieldbus
//! master's registration machinery. Each of those is reached through one
//! of the traits in this module, implemented by the platform crate:
//!
//! - [`DmaAllocator`]: physically contiguous, device-visible memory
//! - [`NetStack`]: the generic host networking stack (carrier, queue gate,
//!   buffer alloc/deliver/release)
//! - [`FieldbusMaster`]: the real-time fieldbus master that takes over
//!   frame delivery when present
//!
//! Which of [`NetStack`] or [`FieldbusMaster`] is used is decided exactly
//! once, at attach, by wrapping the collaborator in the matching
//! [personality](crate::personality); the datapath never asks again.

pub mod dma_alloc;
pub mod fieldbus;
pub mod stack;

pub use dma_alloc::{DmaAllocator, DmaRegion};
pub use fieldbus::FieldbusMaster;
pub use stack::{FrameBuffer, NetStack};

/// Returned by collaborator registration calls that the outside world
/// rejected (e.g. the stack refused the device, or the master's open
/// failed). Surfaced from attach as
/// [`AttachError::Registration`](crate::AttachError::Registration).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistrationFailed;
