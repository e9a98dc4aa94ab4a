//! DMA descriptor rings and frame-slot memory layout.

pub mod ring;
pub mod slot;

pub use ring::{Direction, DmaRing};
pub use slot::FrameSlot;
