//! Function register map discovery and typed accessors.

use core::ptr;

use super::mac::{self, MacSnapshot};
use crate::constants::MAC_ADDR_LEN;

/// Byte offset of the MII window's MAC address field.
const MII_MAC_ADDR: usize = 0x8;
/// Byte offset of the MII window's link state word.
const MII_LINK_STATE: usize = 0x8 + 4;
/// Byte offset of the MII window's MAC filter enable byte.
const MII_MAC_FILTER: usize = 0x8 + 6;
/// Link-detect bit inside the link state word.
const LINK_UP_BIT: u32 = 1 << 24;
/// The receive ring's register window sits right behind the transmit
/// ring's.
const RX_WINDOW_OFFSET: usize = 0x10;

/// Offsets published in the function's info block, relative to the
/// function base. Read once at attach.
#[repr(C)]
struct InfoBlock {
    _reserved: u32,
    mii: u32,
    tx_ring: u32,
    mac: u32,
    _rx_mem: u32,
    _tx_mem: u32,
    _misc: u32,
}

/// Resolved pointers to the register windows the datapath uses.
///
/// The memory-mode apertures (`rx_mem`, `tx_mem`) from the info block are
/// intentionally not kept; this driver only operates the DMA rings.
pub struct RegisterMap {
    mii: *mut u8,
    tx_ring: *mut u8,
    rx_ring: *mut u8,
    mac: *mut u8,
}

// SAFETY: plain pointers into an MMIO mapping owned by the device; access
// is serialized by the device that owns this map.
unsafe impl Send for RegisterMap {}

impl RegisterMap {
    /// Read the info block at `func_base` and resolve the windows.
    ///
    /// # Safety
    ///
    /// `func_base` must be the function's live MMIO base; the offsets it
    /// publishes must stay valid for the map's lifetime.
    pub unsafe fn discover(func_base: *mut u8) -> Self {
        // SAFETY: the info block occupies the first words of the function
        // window per the discover contract.
        let info = unsafe { ptr::read_volatile(func_base.cast::<InfoBlock>()) };
        // SAFETY: published offsets stay inside the function window.
        unsafe {
            Self {
                mii: func_base.add(info.mii as usize),
                tx_ring: func_base.add(info.tx_ring as usize),
                rx_ring: func_base.add(info.tx_ring as usize + RX_WINDOW_OFFSET),
                mac: func_base.add(info.mac as usize),
            }
        }
    }

    /// Build a map from already-resolved window pointers.
    ///
    /// # Safety
    ///
    /// Every pointer must reference its live register window for the
    /// map's lifetime.
    pub unsafe fn from_parts(mii: *mut u8, tx_ring: *mut u8, rx_ring: *mut u8, mac: *mut u8) -> Self {
        Self {
            mii,
            tx_ring,
            rx_ring,
            mac,
        }
    }

    /// Transmit ring register window (doorbell and reset).
    #[inline(always)]
    pub fn tx_ring_window(&self) -> *mut u8 {
        self.tx_ring
    }

    /// Receive ring register window (doorbell and reset).
    #[inline(always)]
    pub fn rx_ring_window(&self) -> *mut u8 {
        self.rx_ring
    }

    /// Sample the current physical link state.
    pub fn link_up(&self) -> bool {
        // SAFETY: `mii` covers the link state word per the constructor
        // contract; volatile, the PHY updates it asynchronously.
        let state = unsafe { self.mii.add(MII_LINK_STATE).cast::<u32>().read_volatile() };
        state & LINK_UP_BIT != 0
    }

    /// Read the factory MAC address.
    pub fn mac_address(&self) -> [u8; MAC_ADDR_LEN] {
        let mut addr = [0u8; MAC_ADDR_LEN];
        for (i, byte) in addr.iter_mut().enumerate() {
            // SAFETY: the MII window covers the address bytes.
            *byte = unsafe { self.mii.add(MII_MAC_ADDR + i).read_volatile() };
        }
        addr
    }

    /// Disable destination MAC filtering so all link traffic reaches the
    /// rings. Done once at attach; both personalities want promiscuous
    /// reception.
    pub fn disable_mac_filter(&self) {
        // SAFETY: the MII window covers the filter byte.
        unsafe { self.mii.add(MII_MAC_FILTER).write_volatile(0) }
    }

    /// Sample the hardware MAC counters.
    pub fn mac_counters(&self) -> MacSnapshot {
        // SAFETY: `mac` covers the counter block per the constructor
        // contract.
        unsafe { mac::snapshot(self.mac) }
    }
}
