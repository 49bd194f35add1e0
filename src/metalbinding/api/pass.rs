use core::ptr;

use objc2_metal::{MTLClearColor, MTLLoadAction, MTLRenderPassDescriptor, MTLStoreAction};

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::handle::{self, ContextHandle, RenderPassHandle, TextureHandle};

#[no_mangle]
pub extern "C" fn metalbinding_create_render_pass_descriptor() -> RenderPassHandle {
    handle::into_raw(MTLRenderPassDescriptor::new())
}

/// Pass whose colour attachment 0 is the current drawable.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_create_current_frame_render_pass_descriptor(
    context: ContextHandle,
    clear: bool,
    r: f32,
    g: f32,
    b: f32,
    a: f32,
) -> RenderPassHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let Some(texture) = ctx.current_drawable_texture() else {
        ctx.fail(BindingError::NoDrawable);
        return ptr::null_mut();
    };
    let rpd = MTLRenderPassDescriptor::new();
    unsafe {
        let ca0 = rpd.colorAttachments().objectAtIndexedSubscript(0);
        ca0.setTexture(Some(&texture));
        ca0.setLoadAction(if clear { MTLLoadAction::Clear } else { MTLLoadAction::Load });
        ca0.setStoreAction(MTLStoreAction::Store);
        ca0.setClearColor(MTLClearColor {
            red: f64::from(r),
            green: f64::from(g),
            blue: f64::from(b),
            alpha: f64::from(a),
        });
    }
    handle::into_raw(rpd)
}

/// # Safety
/// Handles must be null or live. A null `texture` detaches the attachment.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_render_pass_descriptor_color_attachment(
    descriptor: RenderPassHandle,
    color_attachment_index: u32,
    texture: TextureHandle,
    load_action: MTLLoadAction,
    store_action: MTLStoreAction,
    clear_r: f64,
    clear_g: f64,
    clear_b: f64,
    clear_a: f64,
) {
    let Some(rpd) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    let texture = unsafe { texture.cast_const().as_ref() };
    unsafe {
        let attachment = rpd.colorAttachments().objectAtIndexedSubscript(color_attachment_index as usize);
        attachment.setTexture(texture);
        attachment.setLoadAction(load_action);
        attachment.setStoreAction(store_action);
        attachment.setClearColor(MTLClearColor { red: clear_r, green: clear_g, blue: clear_b, alpha: clear_a });
    }
}

/// # Safety
/// Handles must be null or live. A null `texture` detaches the attachment.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_render_pass_descriptor_depth_attachment(
    descriptor: RenderPassHandle,
    texture: TextureHandle,
    load_action: MTLLoadAction,
    store_action: MTLStoreAction,
    clear_depth: f64,
) {
    let Some(rpd) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    let texture = unsafe { texture.cast_const().as_ref() };
    unsafe {
        let attachment = rpd.depthAttachment();
        attachment.setTexture(texture);
        attachment.setLoadAction(load_action);
        attachment.setStoreAction(store_action);
        attachment.setClearDepth(clear_depth);
    }
}

/// # Safety
/// Handles must be null or live. A null `texture` detaches the attachment.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_render_pass_descriptor_stencil_attachment(
    descriptor: RenderPassHandle,
    texture: TextureHandle,
    load_action: MTLLoadAction,
    store_action: MTLStoreAction,
    clear_stencil: u32,
) {
    let Some(rpd) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    let texture = unsafe { texture.cast_const().as_ref() };
    unsafe {
        let attachment = rpd.stencilAttachment();
        attachment.setTexture(texture);
        attachment.setLoadAction(load_action);
        attachment.setStoreAction(store_action);
        attachment.setClearStencil(clear_stencil);
    }
}

/// # Safety
/// `rpd` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_render_pass_descriptor(rpd: RenderPassHandle) {
    unsafe { handle::release(rpd, "render pass descriptor") }
}
