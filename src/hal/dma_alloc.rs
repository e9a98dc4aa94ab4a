//! DMA memory allocation seam.

use core::ptr::NonNull;

/// One physically contiguous, cache-coherent DMA mapping.
///
/// Produced by [`DmaAllocator::allocate`] and handed back verbatim to
/// [`DmaAllocator::free`] at teardown. The region must be zero-initialized
/// and addressable by both the host and the device's DMA engine for its
/// whole lifetime.
#[derive(Debug)]
pub struct DmaRegion {
    virt: NonNull<u8>,
    phys: usize,
    len: usize,
    channel: usize,
}

impl DmaRegion {
    /// Describe an allocated mapping.
    pub const fn new(virt: NonNull<u8>, phys: usize, len: usize, channel: usize) -> Self {
        Self {
            virt,
            phys,
            len,
            channel,
        }
    }

    /// Host-visible base address.
    #[inline(always)]
    pub fn virt(&self) -> NonNull<u8> {
        self.virt
    }

    /// Device-visible base address.
    #[inline(always)]
    pub fn phys(&self) -> usize {
        self.phys
    }

    /// Length of the mapping in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapping is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// DMA channel this region was allocated for.
    #[inline(always)]
    pub fn channel(&self) -> usize {
        self.channel
    }
}

// SAFETY: a DmaRegion is a plain description of a mapping; the driver
// serializes all access to the memory it names.
unsafe impl Send for DmaRegion {}

/// Platform allocator for DMA-capable ring memory.
pub trait DmaAllocator {
    /// Allocate `len` bytes of zero-initialized, physically contiguous,
    /// cache-coherent memory on the given DMA channel.
    ///
    /// Returns `None` when the platform cannot satisfy the request; attach
    /// treats that as fatal and unwinds.
    fn allocate(&mut self, channel: usize, len: usize) -> Option<DmaRegion>;

    /// Release a region previously returned by [`allocate`](Self::allocate).
    ///
    /// The device must no longer reference the region: the caller resets
    /// the ring doorbells before freeing.
    fn free(&mut self, region: DmaRegion);
}
