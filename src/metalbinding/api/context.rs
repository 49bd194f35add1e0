//! Context lifetime, diagnostics and drawable pacing.

use core::ptr;

use objc2::rc::Retained;
use objc2_app_kit::NSWindow;

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::handle::{self, CommandBufferHandle, ContextHandle, TextureHandle};
use crate::metalbinding::metal::Context;

fn into_handle(result: crate::metalbinding::error::Result<Context>) -> ContextHandle {
    match result {
        Ok(ctx) => Box::into_raw(Box::new(ctx)),
        Err(err) => {
            log::error!("context creation failed: {err}");
            ptr::null_mut()
        }
    }
}

/// Creates a context presenting into `window`. Returns null on failure.
///
/// # Safety
/// `window` must be null or a live `NSWindow*`. Call on the main thread.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_create(window: *mut NSWindow, frame_count: u32) -> ContextHandle {
    let Some(window) = (unsafe { handle::get(window, "window") }) else {
        return ptr::null_mut();
    };
    into_handle(Context::with_window(window, frame_count))
}

/// Creates a context with no window or layer.
#[no_mangle]
pub extern "C" fn metalbinding_create_headless(frame_count: u32) -> ContextHandle {
    into_handle(Context::headless(frame_count))
}

/// # Safety
/// `context` must be null or a live context; it is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_destroy(context: ContextHandle) {
    if context.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(context) });
}

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_last_error_length(context: ContextHandle) -> u32 {
    unsafe { handle::context(context) }.map_or(0, |ctx| ctx.last_error().len_u32())
}

/// Copies up to `length` bytes of the last error into `out_utf8_text`.
///
/// # Safety
/// `out_utf8_text` must be valid for `length` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_last_error(context: ContextHandle, out_utf8_text: *mut u8, length: u32) {
    let Some(ctx) = (unsafe { handle::context(context) }) else { return };
    if out_utf8_text.is_null() || length == 0 {
        return;
    }
    let out = unsafe { core::slice::from_raw_parts_mut(out_utf8_text, length as usize) };
    ctx.last_error().copy_to(out);
}

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_capture(context: ContextHandle) {
    let Some(ctx) = (unsafe { handle::context(context) }) else { return };
    let result = ctx.start_capture();
    ctx.check(result);
}

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_stop_capture(context: ContextHandle) {
    if let Some(ctx) = unsafe { handle::context(context) } {
        ctx.stop_capture();
    }
}

/// `drawable_width`/`drawable_height` are in points; the layer's drawable is
/// sized in pixels.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_content_scale(
    context: ContextHandle,
    scale: f32,
    drawable_width: u32,
    drawable_height: u32,
) {
    if let Some(ctx) = unsafe { handle::context(context) } {
        ctx.set_content_scale(scale, drawable_width, drawable_height);
    }
}

/// # Safety
/// Pointers must be null or valid for one `u64` write each.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_memory_info(
    context: ContextHandle,
    ref_current_allocated_size: *mut u64,
    ref_recommended_working_set_size: *mut u64,
    ref_has_unified_memory: *mut u64,
    ref_max_transfer_rate: *mut u64,
) {
    let Some(ctx) = (unsafe { handle::context(context) }) else { return };
    let info = ctx.memory_info();
    for (out, value) in [
        (ref_current_allocated_size, info.current_allocated_size),
        (ref_recommended_working_set_size, info.recommended_working_set_size),
        (ref_has_unified_memory, info.has_unified_memory),
        (ref_max_transfer_rate, info.max_transfer_rate),
    ] {
        if let Some(out) = unsafe { out.as_mut() } {
            *out = value;
        }
    }
}

/// Releases objects autoreleased since the last drain.
///
/// # Safety
/// `context` must be null or a live context. Call on the creating thread.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_arp_drain(context: ContextHandle) {
    if let Some(ctx) = unsafe { handle::context(context) } {
        ctx.drain_autorelease_pool();
    }
}

/// Pops the context's autorelease pool without pushing a new one.
///
/// # Safety
/// `context` must be null or a live context. Call on the creating thread.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_arp_deinit(context: ContextHandle) {
    if let Some(ctx) = unsafe { handle::context(context) } {
        ctx.end_autorelease_pool();
    }
}

/// Blocks while every frame slot is in flight, then takes the next drawable.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_acquire_drawable(context: ContextHandle) {
    let Some(ctx) = (unsafe { handle::context(context) }) else { return };
    let result = ctx.acquire_drawable();
    ctx.check(result);
}

/// Texture of the current drawable, autoreleased. Null when no drawable is
/// held.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_current_frame_drawable_texture(context: ContextHandle) -> TextureHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    match ctx.current_drawable_texture() {
        Some(texture) => Retained::autorelease_ptr(texture),
        None => {
            ctx.fail(BindingError::NoDrawable);
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `context` and `command_buffer` must be null or live handles.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_present_current_frame_after_minimum_duration(
    context: ContextHandle,
    command_buffer: CommandBufferHandle,
    seconds: f64,
) {
    let Some(ctx) = (unsafe { handle::context(context) }) else { return };
    let Some(command_buffer) = (unsafe { handle::get(command_buffer, "commandBuffer") }) else {
        ctx.fail(BindingError::NullHandle("commandBuffer"));
        return;
    };
    let result = ctx.present_after(command_buffer, seconds);
    ctx.check(result);
}
