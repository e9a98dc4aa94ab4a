//! Optional host-stack integrations.

#[cfg(feature = "smoltcp")]
pub mod smoltcp;
