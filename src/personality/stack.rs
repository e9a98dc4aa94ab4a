//! Host-stack delivery personality.

use super::Personality;
use crate::dma::DmaRing;
use crate::driver::stats::DevCounters;
use crate::hal::{FrameBuffer, NetStack, RegistrationFailed};

/// Frame delivery through the generic host networking stack.
///
/// Received frames are copied into stack-allocated buffers and handed
/// upward from the poll tick; carrier and queue-gate changes go straight
/// through to the stack.
pub struct StackDelivery<S: NetStack> {
    stack: S,
}

impl<S: NetStack> StackDelivery<S> {
    /// Bind the stack as this device's delivery world.
    pub const fn new(stack: S) -> Self {
        Self { stack }
    }

    /// Access the wrapped stack.
    pub fn stack(&self) -> &S {
        &self.stack
    }

    /// Mutable access to the wrapped stack.
    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    /// Unwrap the stack at teardown.
    pub fn into_stack(self) -> S {
        self.stack
    }
}

impl<S: NetStack> Personality for StackDelivery<S> {
    type Buffer = S::Buffer;

    fn register(&mut self) -> Result<(), RegistrationFailed> {
        self.stack.register()
    }

    fn unregister(&mut self) {
        self.stack.unregister();
    }

    fn carrier_on(&mut self) {
        self.stack.carrier_on();
    }

    fn carrier_off(&mut self) {
        self.stack.carrier_off();
    }

    fn carrier_ok(&self) -> bool {
        self.stack.carrier_ok()
    }

    fn queue_start(&mut self) {
        self.stack.queue_start();
    }

    fn queue_stop(&mut self) {
        self.stack.queue_stop();
    }

    fn release(&mut self, buf: Self::Buffer) {
        self.stack.release(buf);
    }

    fn service_rx(&mut self, ring: &mut DmaRing, counters: &DevCounters, budget: usize) {
        let stack = &mut self.stack;
        for _ in 0..budget {
            let drained = ring.drain_one(|frame| {
                let Some(mut buf) = stack.alloc(frame.len()) else {
                    counters.count_rx_drop();
                    return;
                };
                match buf.payload_mut() {
                    Some(dst) if dst.len() >= frame.len() => {
                        dst[..frame.len()].copy_from_slice(frame);
                        counters.add_rx_bytes(frame.len() as u64);
                        stack.deliver(buf);
                    }
                    _ => {
                        counters.count_rx_drop();
                        stack.release(buf);
                    }
                }
            });
            if drained.is_none() {
                break;
            }
        }
    }
}
