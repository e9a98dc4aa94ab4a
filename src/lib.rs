//! Polled NIC Driver
//!
//! A `no_std`, `no_alloc` data-path driver for a memory-mapped network
//! controller that moves frames through fixed-size DMA descriptor rings
//! and raises no interrupts: link changes, receive completions and
//! transmit-stall recovery are all discovered by a periodic register
//! poll.
//!
//! # Architecture
//!
//! The driver is organized into four layers:
//!
//! 1. **Device core** ([`driver`]): [`NetDevice`] with the attach/detach
//!    lifecycle, the poll engine and the transmit path
//! 2. **DMA layer** ([`dma`]): frame-slot layout and the descriptor
//!    rings with their doorbell protocol
//! 3. **Register layer** ([`regs`]): info-block discovery and typed
//!    accessors for the MII, ring and MAC-counter windows
//! 4. **HAL layer** ([`hal`]): platform seams for DMA allocation and
//!    frame delivery
//!
//! # Delivery personalities
//!
//! At attach the device binds exactly one of two delivery worlds and the
//! datapath never asks again:
//!
//! - [`StackDelivery`]: frames go to a generic host networking stack
//!   ([`NetStack`]), with carrier indication and queue-gate backpressure
//! - [`FieldbusOffload`]: a real-time fieldbus master
//!   ([`FieldbusMaster`]) owns delivery and drains the receive ring from
//!   its own cyclic task
//!
//! # Features
//!
//! - `defmt`: defmt formatting for error types and diagnostics
//! - `log`: log facade diagnostics for hosted environments
//! - `smoltcp`: smoltcp network stack integration
//! - `critical-section`: `static`-friendly [`sync::SharedDevice`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use polled_nic::{DeviceConfig, NetDevice, StackDelivery};
//! use polled_nic::regs::RegisterMap;
//!
//! // Resolve the register windows from the function's MMIO base.
//! let map = unsafe { RegisterMap::discover(func_base) };
//!
//! // Bind the host stack and bring the device up.
//! let mut dev = NetDevice::attach(
//!     map,
//!     StackDelivery::new(my_stack),
//!     my_allocator,
//!     DeviceConfig::new(),
//! )?;
//!
//! // The platform timer drives everything else.
//! // (POLL_PERIOD_US is the production cadence.)
//! loop {
//!     dev.poll();
//!     delay_us(polled_nic::POLL_PERIOD_US);
//! }
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (64 slots per ring, 2 KiB per slot):
//! 256 KiB of DMA-capable memory, allocated through the platform's
//! [`DmaAllocator`] at attach.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live in Cargo.toml's [lints] tables.

pub mod constants;
pub mod dma;
pub mod driver;
pub mod hal;
pub mod integration;
pub mod personality;
pub mod regs;
#[cfg(feature = "critical-section")]
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use constants::{MAC_ADDR_LEN, MAX_FRAME_SIZE, MTU, POLL_PERIOD_US, RING_SLOTS};
pub use driver::{
    AttachError, DevCounters, DeviceConfig, DropReason, LinkStats, NetDevice, RingFull, TxBusy,
    TxStatus,
};
pub use hal::{
    DmaAllocator, DmaRegion, FieldbusMaster, FrameBuffer, NetStack, RegistrationFailed,
};
pub use personality::{FieldbusOffload, Personality, StackDelivery};
pub use regs::{MacSnapshot, RegisterMap};
#[cfg(feature = "critical-section")]
pub use sync::SharedDevice;
