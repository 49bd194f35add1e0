use core::ffi::c_void;
use core::ptr;

use objc2_foundation::NSRange;
use objc2_metal::{MTLBuffer, MTLDevice, MTLResourceOptions};

use crate::metalbinding::error::{BindingError, Result};
use crate::metalbinding::metal::handle::{self, BufferHandle, ContextHandle};
use crate::metalbinding::region;

/// Managed-storage buffer of `length` bytes (at least one).
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_buffer(context: ContextHandle, length: u32) -> BufferHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    // Metal will not create buffers of zero size.
    let length = (length as usize).max(1);
    match ctx.device.newBufferWithLength_options(length, MTLResourceOptions::StorageModeManaged) {
        Some(buffer) => handle::into_raw(buffer),
        None => {
            ctx.fail(BindingError::Allocation("buffer"));
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `buffer` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_buffer(buffer: BufferHandle) {
    unsafe { handle::release(buffer, "buffer") }
}

fn copy_into(buffer: &objc2::runtime::ProtocolObject<dyn MTLBuffer>, source: *const u8, offset: usize, size: usize) -> Result<()> {
    let range = region::byte_range(offset, size, buffer.length())?;
    if size == 0 {
        return Ok(());
    }
    if source.is_null() {
        return Err(BindingError::NullHandle("source"));
    }
    let dst = buffer.contents().as_ptr().cast::<u8>();
    unsafe {
        ptr::copy_nonoverlapping(source, dst.add(range.start), size);
        buffer.didModifyRange(NSRange::new(range.start, size));
    }
    Ok(())
}

/// Copies `size` bytes from `source` to `offset` and flushes the range to
/// the GPU. Copies past the end of the buffer are rejected.
///
/// # Safety
/// `source` must be valid for `size` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_copy_to_buffer(buffer: BufferHandle, source: *const c_void, offset: u32, size: u32) {
    let Some(buffer) = (unsafe { handle::get(buffer, "buffer") }) else { return };
    if let Err(err) = copy_into(buffer, source.cast(), offset as usize, size as usize) {
        log::error!("copy_to_buffer: {err}");
    }
}

/// # Safety
/// `buffer` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_buffer_did_modify_range(buffer: BufferHandle, offset: u32, size: u32) {
    let Some(buffer) = (unsafe { handle::get(buffer, "buffer") }) else { return };
    match region::byte_range(offset as usize, size as usize, buffer.length()) {
        Ok(range) => unsafe { buffer.didModifyRange(NSRange::new(range.start, range.len())) },
        Err(err) => log::error!("buffer_did_modify_range: {err}"),
    }
}

/// CPU address of the buffer's storage.
///
/// # Safety
/// `buffer` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_buffer_get_contents(buffer: BufferHandle) -> *mut c_void {
    unsafe { handle::get(buffer, "buffer") }.map_or(ptr::null_mut(), |buffer| buffer.contents().as_ptr())
}
