//! Concurrency support for sharing one device between contexts.
//!
//! The driver core is not internally synchronized: the periodic poll,
//! the transmit path and (in offload mode) the master's cyclic task may
//! live on different contexts, and something has to serialize them.
//! [`SharedDevice`] does that with `critical_section`, which is also
//! what makes a `static` device reachable from the platform's timer
//! callback.
//!
//! Everything here is gated on the `critical-section` feature; platforms
//! with their own locking discipline can hold the
//! [`NetDevice`](crate::NetDevice) directly.

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::SharedDevice;
