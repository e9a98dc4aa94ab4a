//! Shared test doubles for the collaborator seams.
//!
//! Every mock records what was done to it so tests assert on call
//! sequences, not just end states.

extern crate std;

use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::hal::{
    DmaAllocator, DmaRegion, FieldbusMaster, FrameBuffer, NetStack, RegistrationFailed,
};

// =============================================================================
// DMA allocator
// =============================================================================

/// One grant handed out by [`MockAllocator`].
pub(crate) struct AllocRecord {
    pub channel: usize,
    pub len: usize,
    pub base: *mut u8,
}

/// Allocator backed by leaked host memory.
///
/// Shares its grant and free logs through `Rc` so tests keep a handle
/// after the allocator moves into the device. Backing memory is leaked
/// on purpose; rings hold raw pointers into it past the allocator's
/// `free`.
pub(crate) struct MockAllocator {
    grants_left: usize,
    pub records: Rc<RefCell<Vec<AllocRecord>>>,
    pub freed: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl MockAllocator {
    pub fn new() -> Self {
        Self {
            grants_left: usize::MAX,
            records: Rc::new(RefCell::new(Vec::new())),
            freed: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Fail every allocation after the first `grants`.
    pub fn with_grants(mut self, grants: usize) -> Self {
        self.grants_left = grants;
        self
    }
}

impl DmaAllocator for MockAllocator {
    fn allocate(&mut self, channel: usize, len: usize) -> Option<DmaRegion> {
        if self.grants_left == 0 {
            return None;
        }
        self.grants_left -= 1;

        let backing = vec![0u64; len.div_ceil(8)].into_boxed_slice();
        let base = Box::leak(backing).as_mut_ptr().cast::<u8>();
        self.records.borrow_mut().push(AllocRecord { channel, len, base });

        let virt = core::ptr::NonNull::new(base).unwrap();
        Some(DmaRegion::new(virt, 0x10_0000 + channel * 0x1_0000, len, channel))
    }

    fn free(&mut self, region: DmaRegion) {
        self.freed.borrow_mut().push((region.channel(), region.len()));
    }
}

// =============================================================================
// Host stack
// =============================================================================

/// Stack calls in the order the driver made them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StackEvent {
    Register,
    Unregister,
    CarrierOn,
    CarrierOff,
    QueueStart,
    QueueStop,
}

/// Vec-backed host buffer; `contiguous: false` models a fragmented one.
pub(crate) struct MockBuffer {
    pub data: Vec<u8>,
    pub contiguous: bool,
}

impl MockBuffer {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            contiguous: true,
        }
    }

    /// A buffer whose payload cannot be read as one slice.
    pub fn fragmented(len: usize) -> Self {
        Self {
            data: vec![0; len],
            contiguous: false,
        }
    }
}

impl FrameBuffer for MockBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn payload(&self) -> Option<&[u8]> {
        self.contiguous.then(|| self.data.as_slice())
    }

    fn payload_mut(&mut self) -> Option<&mut [u8]> {
        if self.contiguous {
            Some(&mut self.data)
        } else {
            None
        }
    }
}

/// Recording host stack.
pub(crate) struct MockStack {
    pub events: Vec<StackEvent>,
    pub carrier: bool,
    pub register_ok: bool,
    alloc_grants: usize,
    pub delivered: Vec<Vec<u8>>,
    pub released: usize,
}

impl MockStack {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            carrier: false,
            register_ok: true,
            alloc_grants: usize::MAX,
            delivered: Vec::new(),
            released: 0,
        }
    }

    pub fn refusing_registration(mut self) -> Self {
        self.register_ok = false;
        self
    }

    /// Fail every buffer allocation after the first `grants`.
    pub fn with_alloc_grants(mut self, grants: usize) -> Self {
        self.alloc_grants = grants;
        self
    }
}

impl NetStack for MockStack {
    type Buffer = MockBuffer;

    fn register(&mut self) -> Result<(), RegistrationFailed> {
        self.events.push(StackEvent::Register);
        if self.register_ok {
            Ok(())
        } else {
            Err(RegistrationFailed)
        }
    }

    fn unregister(&mut self) {
        self.events.push(StackEvent::Unregister);
    }

    fn alloc(&mut self, len: usize) -> Option<Self::Buffer> {
        if self.alloc_grants == 0 {
            return None;
        }
        self.alloc_grants -= 1;
        Some(MockBuffer {
            data: vec![0; len],
            contiguous: true,
        })
    }

    fn deliver(&mut self, buf: Self::Buffer) {
        self.delivered.push(buf.data);
    }

    fn release(&mut self, _buf: Self::Buffer) {
        self.released += 1;
    }

    fn carrier_on(&mut self) {
        self.carrier = true;
        self.events.push(StackEvent::CarrierOn);
    }

    fn carrier_off(&mut self) {
        self.carrier = false;
        self.events.push(StackEvent::CarrierOff);
    }

    fn carrier_ok(&self) -> bool {
        self.carrier
    }

    fn queue_start(&mut self) {
        self.events.push(StackEvent::QueueStart);
    }

    fn queue_stop(&mut self) {
        self.events.push(StackEvent::QueueStop);
    }
}

// =============================================================================
// Fieldbus master
// =============================================================================

/// Recording fieldbus master.
pub(crate) struct MockMaster {
    pub open_ok: bool,
    pub opened: bool,
    pub closed: bool,
    pub withdrawn: bool,
    pub link: bool,
    pub frames: Vec<Vec<u8>>,
}

impl MockMaster {
    pub fn new() -> Self {
        Self {
            open_ok: true,
            opened: false,
            closed: false,
            withdrawn: false,
            link: false,
            frames: Vec::new(),
        }
    }
}

impl FieldbusMaster for MockMaster {
    fn open(&mut self) -> Result<(), RegistrationFailed> {
        self.opened = true;
        if self.open_ok {
            Ok(())
        } else {
            Err(RegistrationFailed)
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn withdraw(&mut self) {
        self.withdrawn = true;
    }

    fn set_link(&mut self, up: bool) {
        self.link = up;
    }

    fn link(&self) -> bool {
        self.link
    }

    fn receive(&mut self, frame: &[u8]) {
        self.frames.push(frame.to_vec());
    }
}
