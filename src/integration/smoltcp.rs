//! smoltcp Network Stack Integration
#![cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
//!
//! Binds a [`NetDevice`] to [smoltcp](https://docs.rs/smoltcp) without an
//! operating-system stack in between. [`SmoltcpBridge`] plays the
//! [`NetStack`] role: delivered frames park in a fixed-depth queue until
//! the interface polls them out, and the queue-gate state decides whether
//! transmit tokens are handed out. `smoltcp::phy::Device` is then
//! implemented directly on `NetDevice<StackDelivery<SmoltcpBridge>, _>`.
//!
//! # Example
//!
//! ```ignore
//! let bridge: SmoltcpBridge<8> = SmoltcpBridge::new();
//! let mut dev = NetDevice::attach(
//!     map,
//!     StackDelivery::new(bridge),
//!     allocator,
//!     DeviceConfig::new(),
//! )?;
//!
//! let config = Config::new(ethernet_address(&dev).into());
//! let mut iface = Interface::new(config, &mut dev, Instant::ZERO);
//! ```
//!
//! # Safety Notes
//!
//! The smoltcp `Device` trait requires `receive()` to return both an
//! `RxToken` and a `TxToken` at once. Both tokens carry a raw pointer to
//! the device; this is sound because the tokens are consumed immediately
//! in the same call stack, consume takes the token by value, and the two
//! directions touch separate rings.

use core::marker::PhantomData;

use smoltcp::phy::{ChecksumCapabilities, Device, DeviceCapabilities, Medium};
use smoltcp::time::Instant;

use crate::constants::{MAX_FRAME_SIZE, MTU};
use crate::driver::netdev::NetDevice;
use crate::hal::{DmaAllocator, FrameBuffer, NetStack, RegistrationFailed};
use crate::personality::StackDelivery;

// =============================================================================
// Pool buffer
// =============================================================================

/// Fixed-capacity frame buffer used by the bridge.
pub struct PoolBuffer {
    data: [u8; MAX_FRAME_SIZE],
    len: usize,
}

impl PoolBuffer {
    fn zeroed(len: usize) -> Self {
        debug_assert!(len <= MAX_FRAME_SIZE);
        Self {
            data: [0; MAX_FRAME_SIZE],
            len,
        }
    }

    /// The frame bytes.
    pub fn frame(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl FrameBuffer for PoolBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn payload(&self) -> Option<&[u8]> {
        Some(&self.data[..self.len])
    }

    fn payload_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.data[..self.len])
    }
}

// =============================================================================
// Bridge stack
// =============================================================================

/// Minimal in-crate [`NetStack`] backing a smoltcp interface.
///
/// `DEPTH` bounds how many received frames can wait for the interface;
/// further deliveries are discarded until the interface catches up.
pub struct SmoltcpBridge<const DEPTH: usize> {
    queue: [Option<PoolBuffer>; DEPTH],
    head: usize,
    queued: usize,
    registered: bool,
    carrier: bool,
    queue_open: bool,
}

impl<const DEPTH: usize> SmoltcpBridge<DEPTH> {
    /// Fresh bridge with an empty queue and a closed gate.
    pub const fn new() -> Self {
        Self {
            queue: [const { None }; DEPTH],
            head: 0,
            queued: 0,
            registered: false,
            carrier: false,
            queue_open: false,
        }
    }

    /// Whether a received frame is waiting for the interface.
    pub fn has_frame(&self) -> bool {
        self.queued > 0
    }

    /// Whether the transmit gate is open.
    pub fn queue_open(&self) -> bool {
        self.queue_open
    }

    fn pop_frame(&mut self) -> Option<PoolBuffer> {
        if self.queued == 0 {
            return None;
        }
        let buf = self.queue[self.head].take();
        self.head = (self.head + 1) % DEPTH;
        self.queued -= 1;
        buf
    }
}

impl<const DEPTH: usize> Default for SmoltcpBridge<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> NetStack for SmoltcpBridge<DEPTH> {
    type Buffer = PoolBuffer;

    fn register(&mut self) -> Result<(), RegistrationFailed> {
        self.registered = true;
        Ok(())
    }

    fn unregister(&mut self) {
        self.registered = false;
    }

    fn alloc(&mut self, len: usize) -> Option<PoolBuffer> {
        if len > MAX_FRAME_SIZE || self.queued == DEPTH {
            return None;
        }
        Some(PoolBuffer::zeroed(len))
    }

    fn deliver(&mut self, buf: PoolBuffer) {
        // alloc refuses grants while full, so a slot is free here.
        if self.queued < DEPTH {
            let tail = (self.head + self.queued) % DEPTH;
            self.queue[tail] = Some(buf);
            self.queued += 1;
        }
    }

    fn release(&mut self, _buf: PoolBuffer) {}

    fn carrier_on(&mut self) {
        self.carrier = true;
    }

    fn carrier_off(&mut self) {
        self.carrier = false;
    }

    fn carrier_ok(&self) -> bool {
        self.carrier
    }

    fn queue_start(&mut self) {
        self.queue_open = true;
    }

    fn queue_stop(&mut self) {
        self.queue_open = false;
    }
}

// =============================================================================
// Tokens
// =============================================================================

type BridgeDevice<const DEPTH: usize, A> = NetDevice<StackDelivery<SmoltcpBridge<DEPTH>>, A>;

/// Receive token handed to smoltcp.
///
/// Implementation detail; most users never name it.
pub struct BridgeRxToken<'a, const DEPTH: usize, A: DmaAllocator> {
    dev: *mut BridgeDevice<DEPTH, A>,
    _marker: PhantomData<&'a mut BridgeDevice<DEPTH, A>>,
}

impl<const DEPTH: usize, A: DmaAllocator> smoltcp::phy::RxToken for BridgeRxToken<'_, DEPTH, A> {
    fn consume<R, F>(self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        // SAFETY: valid for 'a; the token is consumed by value in the
        // same call stack that minted it.
        let dev = unsafe { &mut *self.dev };
        match dev.personality_mut().stack_mut().pop_frame() {
            Some(buf) => f(buf.frame()),
            // Token minted against a frame that is gone; hand smoltcp an
            // empty frame, it discards those.
            None => f(&[]),
        }
    }
}

/// Transmit token handed to smoltcp.
///
/// Implementation detail; most users never name it.
pub struct BridgeTxToken<'a, const DEPTH: usize, A: DmaAllocator> {
    dev: *mut BridgeDevice<DEPTH, A>,
    _marker: PhantomData<&'a mut BridgeDevice<DEPTH, A>>,
}

impl<const DEPTH: usize, A: DmaAllocator> smoltcp::phy::TxToken for BridgeTxToken<'_, DEPTH, A> {
    fn consume<R, F>(self, len: usize, f: F) -> R
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let len = len.min(MAX_FRAME_SIZE);
        let mut buf = PoolBuffer::zeroed(len);
        let result = f(&mut buf.data[..len]);

        // SAFETY: as for the receive token.
        let dev = unsafe { &mut *self.dev };
        // A full ring closes the gate; smoltcp retries on its next poll.
        let _ = dev.transmit(buf);
        result
    }
}

// =============================================================================
// Device implementation
// =============================================================================

impl<const DEPTH: usize, A: DmaAllocator> Device for BridgeDevice<DEPTH, A> {
    type RxToken<'a>
        = BridgeRxToken<'a, DEPTH, A>
    where
        Self: 'a;
    type TxToken<'a>
        = BridgeTxToken<'a, DEPTH, A>
    where
        Self: 'a;

    fn receive(&mut self, _timestamp: Instant) -> Option<(Self::RxToken<'_>, Self::TxToken<'_>)> {
        if !self.personality().stack().has_frame() {
            return None;
        }
        // SAFETY: smoltcp wants both tokens at once; both are consumed
        // before any other device access, and the directions use
        // separate rings.
        let dev = self as *mut Self;
        Some((
            BridgeRxToken {
                dev,
                _marker: PhantomData,
            },
            BridgeTxToken {
                dev,
                _marker: PhantomData,
            },
        ))
    }

    fn transmit(&mut self, _timestamp: Instant) -> Option<Self::TxToken<'_>> {
        if !self.personality().stack().queue_open() {
            return None;
        }
        Some(BridgeTxToken {
            dev: self as *mut Self,
            _marker: PhantomData,
        })
    }

    fn capabilities(&self) -> DeviceCapabilities {
        let mut caps = DeviceCapabilities::default();
        caps.medium = Medium::Ethernet;
        caps.max_transmission_unit = MTU;
        caps.max_burst_size = Some(1);
        caps.checksum = ChecksumCapabilities::default();
        caps
    }
}

/// The device's MAC address as a smoltcp `EthernetAddress`.
pub fn ethernet_address<const DEPTH: usize, A: DmaAllocator>(
    dev: &BridgeDevice<DEPTH, A>,
) -> smoltcp::wire::EthernetAddress {
    smoltcp::wire::EthernetAddress(dev.mac_address())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_buffer_exposes_exactly_len_bytes() {
        let mut buf = PoolBuffer::zeroed(60);
        assert_eq!(FrameBuffer::len(&buf), 60);
        assert_eq!(buf.payload().unwrap().len(), 60);
        buf.payload_mut().unwrap()[0] = 0xEE;
        assert_eq!(buf.frame()[0], 0xEE);
    }

    #[test]
    fn bridge_queue_is_fifo() {
        let mut bridge: SmoltcpBridge<4> = SmoltcpBridge::new();
        for i in 0..3u8 {
            let mut buf = bridge.alloc(8).unwrap();
            buf.payload_mut().unwrap()[0] = i;
            bridge.deliver(buf);
        }
        assert!(bridge.has_frame());
        for i in 0..3u8 {
            assert_eq!(bridge.pop_frame().unwrap().frame()[0], i);
        }
        assert!(!bridge.has_frame());
    }

    #[test]
    fn bridge_refuses_grants_while_full() {
        let mut bridge: SmoltcpBridge<2> = SmoltcpBridge::new();
        for _ in 0..2 {
            let buf = bridge.alloc(8).unwrap();
            bridge.deliver(buf);
        }
        assert!(bridge.alloc(8).is_none());
        bridge.pop_frame().unwrap();
        assert!(bridge.alloc(8).is_some());
    }

    #[test]
    fn bridge_refuses_oversized_grants() {
        let mut bridge: SmoltcpBridge<4> = SmoltcpBridge::new();
        assert!(bridge.alloc(MAX_FRAME_SIZE).is_some());
        assert!(bridge.alloc(MAX_FRAME_SIZE + 1).is_none());
    }

    #[test]
    fn bridge_tracks_carrier_and_gate() {
        let mut bridge: SmoltcpBridge<4> = SmoltcpBridge::new();
        assert!(!bridge.carrier_ok());
        assert!(!bridge.queue_open());
        bridge.carrier_on();
        bridge.queue_start();
        assert!(bridge.carrier_ok());
        assert!(bridge.queue_open());
        bridge.queue_stop();
        assert!(!bridge.queue_open());
    }

    #[test]
    fn device_capabilities_default_has_medium_ethernet() {
        let caps = DeviceCapabilities::default();
        assert_eq!(caps.medium, Medium::Ethernet);
        assert_eq!(MTU, 1500);
        assert_eq!(MAX_FRAME_SIZE, 1522);
    }
}
