use core::ptr;

use objc2_metal::{
    MTLDevice, MTLSamplerAddressMode, MTLSamplerDescriptor, MTLSamplerMinMagFilter,
    MTLSamplerMipFilter,
};

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::handle::{self, ContextHandle, SamplerHandle};

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_create_sampler(
    context: ContextHandle,
    min: MTLSamplerMinMagFilter,
    mag: MTLSamplerMinMagFilter,
    mip: MTLSamplerMipFilter,
    r_address_mode: MTLSamplerAddressMode,
    s_address_mode: MTLSamplerAddressMode,
    t_address_mode: MTLSamplerAddressMode,
    normalized_coordinates: bool,
    support_argument_buffers: bool,
) -> SamplerHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let desc = MTLSamplerDescriptor::new();
    unsafe {
        desc.setMinFilter(min);
        desc.setMagFilter(mag);
        desc.setMipFilter(mip);
        desc.setRAddressMode(r_address_mode);
        desc.setSAddressMode(s_address_mode);
        desc.setTAddressMode(t_address_mode);
        desc.setNormalizedCoordinates(normalized_coordinates);
        desc.setSupportArgumentBuffers(support_argument_buffers);
    }
    match ctx.device.newSamplerStateWithDescriptor(&desc) {
        Some(sampler) => handle::into_raw(sampler),
        None => {
            ctx.fail(BindingError::Allocation("sampler"));
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `sampler` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_sampler(sampler: SamplerHandle) {
    unsafe { handle::release(sampler, "sampler") }
}
