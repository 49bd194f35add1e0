//! Bounds the number of frames the CPU may run ahead of the GPU.

use core::ptr::NonNull;

use block2::RcBlock;
use dispatch2::{DispatchRetained, DispatchSemaphore, DispatchTime};
use objc2::runtime::ProtocolObject;
use objc2_metal::MTLCommandBuffer;

pub struct FramePacer {
    semaphore: DispatchRetained<DispatchSemaphore>,
    slots: u32,
    // Slots taken by `acquire` that no command buffer has been told to return yet.
    held: u32,
}

impl FramePacer {
    pub fn new(slots: u32) -> Self {
        let slots = slots.max(1);
        Self { semaphore: DispatchSemaphore::new(slots as isize), slots, held: 0 }
    }

    pub fn slots(&self) -> u32 {
        self.slots
    }

    pub fn held(&self) -> u32 {
        self.held
    }

    /// Blocks until a frame slot is free and takes it.
    pub fn acquire(&mut self) {
        self.semaphore.wait(DispatchTime::FOREVER);
        self.held += 1;
        log::trace!("frame slot acquired ({} held)", self.held);
    }

    /// Hands one held slot to `command_buffer`; it is freed when the GPU
    /// completes the buffer. Returns false if no slot was held.
    pub fn release_on_completion(&mut self, command_buffer: &ProtocolObject<dyn MTLCommandBuffer>) -> bool {
        if self.held == 0 {
            return false;
        }
        self.held -= 1;
        let semaphore = self.semaphore.clone();
        let handler = RcBlock::new(move |_: NonNull<ProtocolObject<dyn MTLCommandBuffer>>| {
            semaphore.signal();
        });
        unsafe { command_buffer.addCompletedHandler(RcBlock::as_ptr(&handler)) };
        true
    }

    /// Returns abandoned slots and waits for every in-flight frame. The
    /// semaphore ends at its initial value, which libdispatch requires before
    /// it may be released.
    pub fn drain(&mut self) {
        for _ in 0..self.held {
            self.semaphore.signal();
        }
        self.held = 0;
        for _ in 0..self.slots {
            self.semaphore.wait(DispatchTime::FOREVER);
        }
        for _ in 0..self.slots {
            self.semaphore.signal();
        }
        log::debug!("all {} frame slots returned", self.slots);
    }
}

impl Drop for FramePacer {
    fn drop(&mut self) {
        self.drain();
    }
}
