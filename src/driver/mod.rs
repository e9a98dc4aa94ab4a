//! Device core: attach/detach lifecycle, poll engine, datapath,
//! configuration and statistics.

pub mod config;
pub mod error;
pub mod netdev;
pub mod stats;

pub use config::DeviceConfig;
pub use error::{AttachError, DropReason, RingFull, TxBusy};
pub use netdev::{NetDevice, TxStatus};
pub use stats::{DevCounters, LinkStats};
