//! Argument buffers. Every resource encoded into one is also declared as
//! read-used on the render encoder, otherwise the GPU may not see it resident.

use core::ptr;

use objc2::runtime::ProtocolObject;
use objc2_metal::{
    MTLArgumentEncoder, MTLFunction, MTLRenderCommandEncoder, MTLRenderStages, MTLResource,
    MTLResourceUsage,
};

use crate::metalbinding::metal::handle::{
    self, ArgumentEncoderHandle, BufferHandle, FunctionHandle, RenderEncoderHandle,
    SamplerHandle, TextureHandle,
};

/// Bit 0 is the vertex stage, bit 1 the fragment stage.
fn render_stages(stages: u32) -> MTLRenderStages {
    let mut out = MTLRenderStages::empty();
    if stages & 0b01 != 0 {
        out |= MTLRenderStages::Vertex;
    }
    if stages & 0b10 != 0 {
        out |= MTLRenderStages::Fragment;
    }
    out
}

fn use_for_reading(
    render_encoder: &ProtocolObject<dyn MTLRenderCommandEncoder>,
    resource: &ProtocolObject<dyn MTLResource>,
    stages: u32,
) {
    let stages = render_stages(stages);
    if stages.is_empty() {
        log::warn!("resource encoded without any shader stage");
        return;
    }
    render_encoder.useResource_usage_stages(resource, MTLResourceUsage::Read, stages);
}

/// Encoder for the argument buffer bound at `buffer_index` of `function`.
///
/// # Safety
/// `function` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_argument_encoder(
    function: FunctionHandle,
    buffer_index: u32,
) -> ArgumentEncoderHandle {
    let Some(function) = (unsafe { handle::get(function, "function") }) else {
        return ptr::null_mut();
    };
    handle::into_raw(unsafe { function.newArgumentEncoderWithBufferIndex(buffer_index as usize) })
}

/// # Safety
/// `encoder` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_argument_encoder(encoder: ArgumentEncoderHandle) {
    unsafe { handle::release(encoder, "argument encoder") }
}

/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_argument_buffer_size(encoder: ArgumentEncoderHandle) -> u32 {
    unsafe { handle::get(encoder, "encoder") }
        .map_or(0, |encoder| u32::try_from(encoder.encodedLength()).unwrap_or(u32::MAX))
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_argument_buffer(encoder: ArgumentEncoderHandle, buffer: BufferHandle) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    unsafe { encoder.setArgumentBuffer_offset(buffer.cast_const().as_ref(), 0) };
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_encode_buffer_argument(
    encoder: ArgumentEncoderHandle,
    render_encoder: RenderEncoderHandle,
    buffer: BufferHandle,
    offset: u32,
    index: u32,
    stages: u32,
) {
    let (Some(encoder), Some(render_encoder), Some(buffer)) = (unsafe {
        (
            handle::get(encoder, "encoder"),
            handle::get(render_encoder, "commandEncoder"),
            handle::get(buffer, "buffer"),
        )
    }) else {
        return;
    };
    unsafe { encoder.setBuffer_offset_atIndex(Some(buffer), offset as usize, index as usize) };
    use_for_reading(render_encoder, ProtocolObject::from_ref(buffer), stages);
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_encode_texture_argument(
    encoder: ArgumentEncoderHandle,
    render_encoder: RenderEncoderHandle,
    texture: TextureHandle,
    index: u32,
    stages: u32,
) {
    let (Some(encoder), Some(render_encoder), Some(texture)) = (unsafe {
        (
            handle::get(encoder, "encoder"),
            handle::get(render_encoder, "commandEncoder"),
            handle::get(texture, "texture"),
        )
    }) else {
        return;
    };
    unsafe { encoder.setTexture_atIndex(Some(texture), index as usize) };
    use_for_reading(render_encoder, ProtocolObject::from_ref(texture), stages);
}

/// Samplers need no residency declaration.
///
/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_encode_sampler_argument(
    encoder: ArgumentEncoderHandle,
    sampler: SamplerHandle,
    index: u32,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    unsafe { encoder.setSamplerState_atIndex(sampler.cast_const().as_ref(), index as usize) };
}
