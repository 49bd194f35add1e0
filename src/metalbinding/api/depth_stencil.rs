use core::ptr;

use objc2::runtime::Bool;
use objc2_metal::{
    MTLCompareFunction, MTLDepthStencilDescriptor, MTLDevice, MTLStencilDescriptor,
    MTLStencilOperation,
};

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::handle::{
    self, ContextHandle, DepthStencilDescriptorHandle, DepthStencilStateHandle,
    StencilDescriptorHandle,
};

/// Null stencil descriptors leave stencil testing disabled for that face.
///
/// # Safety
/// Stencil handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_dsd(
    depth_compare: MTLCompareFunction,
    depth_write_enabled: Bool,
    back_face_stencil: StencilDescriptorHandle,
    front_face_stencil: StencilDescriptorHandle,
) -> DepthStencilDescriptorHandle {
    let dsd = MTLDepthStencilDescriptor::new();
    unsafe {
        dsd.setDepthCompareFunction(depth_compare);
        dsd.setDepthWriteEnabled(depth_write_enabled.as_bool());
        dsd.setBackFaceStencil(back_face_stencil.cast_const().as_ref());
        dsd.setFrontFaceStencil(front_face_stencil.cast_const().as_ref());
    }
    handle::into_raw(dsd)
}

/// # Safety
/// `descriptor` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_dsd(descriptor: DepthStencilDescriptorHandle) {
    unsafe { handle::release(descriptor, "depth stencil descriptor") }
}

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_stencil_descriptor(
    context: ContextHandle,
    stencil_fail: MTLStencilOperation,
    depth_fail: MTLStencilOperation,
    pass: MTLStencilOperation,
    compare: MTLCompareFunction,
    read_mask: u32,
    write_mask: u32,
) -> StencilDescriptorHandle {
    if unsafe { handle::context(context) }.is_none() {
        return ptr::null_mut();
    }
    let desc = MTLStencilDescriptor::new();
    unsafe {
        desc.setStencilFailureOperation(stencil_fail);
        desc.setDepthFailureOperation(depth_fail);
        desc.setDepthStencilPassOperation(pass);
        desc.setStencilCompareFunction(compare);
        desc.setReadMask(read_mask);
        desc.setWriteMask(write_mask);
    }
    handle::into_raw(desc)
}

/// # Safety
/// `descriptor` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_stencil_descriptor(descriptor: StencilDescriptorHandle) {
    unsafe { handle::release(descriptor, "stencil descriptor") }
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_depth_stencil_state(
    context: ContextHandle,
    descriptor: DepthStencilDescriptorHandle,
) -> DepthStencilStateHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else {
        ctx.fail(BindingError::NullHandle("descriptor"));
        return ptr::null_mut();
    };
    match ctx.device.newDepthStencilStateWithDescriptor(desc) {
        Some(state) => handle::into_raw(state),
        None => {
            ctx.fail(BindingError::Allocation("depth stencil state"));
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `state` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_depth_stencil_state(state: DepthStencilStateHandle) {
    unsafe { handle::release(state, "depth stencil state") }
}
