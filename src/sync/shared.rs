//! Critical-section protected device wrapper.

use super::primitives::CriticalSectionCell;
use crate::driver::NetDevice;
use crate::hal::DmaAllocator;
use crate::personality::Personality;

/// A `static`-friendly slot for one [`NetDevice`].
///
/// Starts empty (attach is not const); the platform installs the device
/// after bring-up and every context reaches it through
/// [`with`](Self::with). The poll callback should prefer
/// [`try_with`](Self::try_with) so a tick that lands while task context
/// holds the device is skipped instead of deadlocking the borrow.
///
/// # Example
///
/// ```ignore
/// static DEVICE: SharedDevice<StackDelivery<MyStack>, MyAllocator> =
///     SharedDevice::empty();
///
/// fn bring_up() {
///     let dev = NetDevice::attach(map, personality, allocator, config)?;
///     DEVICE.install(dev);
/// }
///
/// fn poll_timer_callback() {
///     DEVICE.try_with(|dev| dev.poll());
/// }
/// ```
pub struct SharedDevice<P: Personality, A: DmaAllocator> {
    inner: CriticalSectionCell<Option<NetDevice<P, A>>>,
}

impl<P: Personality, A: DmaAllocator> SharedDevice<P, A> {
    /// Create an empty slot (const, suitable for static initialization).
    pub const fn empty() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Put an attached device into the slot, returning any previous one.
    pub fn install(&self, device: NetDevice<P, A>) -> Option<NetDevice<P, A>> {
        self.inner.with(|slot| slot.replace(device))
    }

    /// Remove the device from the slot, e.g. to detach it.
    pub fn take(&self) -> Option<NetDevice<P, A>> {
        self.inner.with(Option::take)
    }

    /// Execute a closure with exclusive access to the device.
    ///
    /// Returns `None` if the slot is empty.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut NetDevice<P, A>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Like [`with`](Self::with), but also returns `None` when the slot
    /// is already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut NetDevice<P, A>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }
}

impl<P: Personality, A: DmaAllocator> Default for SharedDevice<P, A> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::personality::StackDelivery;
    use crate::testing::{MockAllocator, MockStack};

    type TestDevice = SharedDevice<StackDelivery<MockStack>, MockAllocator>;

    #[test]
    fn cell_serializes_access() {
        let cell = CriticalSectionCell::new(0u32);
        cell.with(|v| *v += 1);
        cell.with(|v| *v += 2);
        assert_eq!(cell.with(|v| *v), 3);
    }

    #[test]
    fn try_with_refuses_reentrancy() {
        let cell = CriticalSectionCell::new(0u32);
        cell.with(|_outer| {
            // The borrow is held; a nested attempt must bail out.
            assert!(cell.try_with(|_inner| ()).is_none());
        });
        assert!(cell.try_with(|v| *v).is_some());
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let shared = TestDevice::empty();
        assert!(shared.with(|dev| dev.mac_address()).is_none());
        assert!(shared.try_with(|dev| dev.mac_address()).is_none());
        assert!(shared.take().is_none());
    }
}
