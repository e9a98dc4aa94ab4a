//! Memory-mapped register windows of the controller function.
//!
//! The controller publishes its register layout at runtime: the first
//! seven words of the function's MMIO block name the offsets of each
//! sub-window. [`RegisterMap::discover`] reads that info block once at
//! attach; everything afterwards goes through typed accessors so offset
//! arithmetic stays in this module.

pub mod mac;
pub mod map;

pub use mac::MacSnapshot;
pub use map::RegisterMap;
