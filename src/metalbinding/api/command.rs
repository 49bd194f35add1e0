use core::ptr;

use objc2_metal::{MTLCommandBuffer, MTLCommandQueue};

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::handle::{self, CommandBufferHandle, ContextHandle};

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_create_command_buffer(context: ContextHandle) -> CommandBufferHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    match ctx.queue.commandBuffer() {
        Some(command_buffer) => handle::into_raw(command_buffer),
        None => {
            ctx.fail(BindingError::Allocation("command buffer"));
            ptr::null_mut()
        }
    }
}

/// Acquires the frame's drawable, then creates a command buffer.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_acquire_command_buffer(context: ContextHandle) -> CommandBufferHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let acquired = ctx.acquire_drawable();
    ctx.check(acquired);
    unsafe { metalbinding_create_command_buffer(context) }
}

/// # Safety
/// `command_buffer` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_command_buffer(command_buffer: CommandBufferHandle) {
    unsafe { handle::release(command_buffer, "command buffer") }
}

/// # Safety
/// `command_buffer` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_commit_command_buffer(command_buffer: CommandBufferHandle) {
    if let Some(command_buffer) = unsafe { handle::get(command_buffer, "commandBuffer") } {
        command_buffer.commit();
    }
}
