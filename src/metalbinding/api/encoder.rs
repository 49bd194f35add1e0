//! Render command encoders. All draws are triangle lists.

use core::ptr;

use objc2_metal::{
    MTLCommandBuffer, MTLCommandEncoder, MTLCullMode, MTLIndexType, MTLPrimitiveType,
    MTLRenderCommandEncoder, MTLScissorRect, MTLViewport,
};

use crate::metalbinding::metal::handle::{
    self, BufferHandle, CommandBufferHandle, DepthStencilStateHandle, PipelineStateHandle,
    RenderEncoderHandle, RenderPassHandle,
};
use crate::metalbinding::region::Scissor;

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_command_encoder(
    command_buffer: CommandBufferHandle,
    pass_descriptor: RenderPassHandle,
) -> RenderEncoderHandle {
    let (Some(command_buffer), Some(rpd)) = (unsafe {
        (handle::get(command_buffer, "commandBuffer"), handle::get(pass_descriptor, "passDescriptor"))
    }) else {
        return ptr::null_mut();
    };
    let encoder = command_buffer.renderCommandEncoderWithDescriptor(rpd);
    if encoder.is_none() {
        log::error!("command buffer refused a render command encoder");
    }
    handle::into_raw_or_null(encoder)
}

/// # Safety
/// `encoder` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_command_encoder(encoder: RenderEncoderHandle) {
    unsafe { handle::release(encoder, "command encoder") }
}

/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_end_encoding(encoder: RenderEncoderHandle) {
    if let Some(encoder) = unsafe { handle::get(encoder, "encoder") } {
        encoder.endEncoding();
    }
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_pipeline(
    encoder: RenderEncoderHandle,
    pipeline: PipelineStateHandle,
) {
    let (Some(encoder), Some(pipeline)) =
        (unsafe { (handle::get(encoder, "encoder"), handle::get(pipeline, "pipeline")) })
    else {
        return;
    };
    encoder.setRenderPipelineState(pipeline);
}

/// A negative origin clips the rect to the attachment's top-left corner.
///
/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_scissor(
    encoder: RenderEncoderHandle,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    let s = Scissor::clipped(x, y, w, h);
    unsafe {
        encoder.setScissorRect(MTLScissorRect { x: s.x, y: s.y, width: s.width, height: s.height })
    };
}

/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_viewport(
    encoder: RenderEncoderHandle,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    encoder.setViewport(MTLViewport { originX: x, originY: y, width: w, height: h, znear: 0.0, zfar: 1.0 });
}

/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_cull_mode(encoder: RenderEncoderHandle, cull_mode: MTLCullMode) {
    if let Some(encoder) = unsafe { handle::get(encoder, "encoder") } {
        encoder.setCullMode(cull_mode);
    }
}

/// A null `dss` restores the default depth-stencil state.
///
/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_dss(encoder: RenderEncoderHandle, dss: DepthStencilStateHandle) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    encoder.setDepthStencilState(unsafe { dss.cast_const().as_ref() });
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_vertex_buffer(
    encoder: RenderEncoderHandle,
    buffer: BufferHandle,
    offset: u32,
    index: u32,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    let buffer = unsafe { buffer.cast_const().as_ref() };
    unsafe { encoder.setVertexBuffer_offset_atIndex(buffer, offset as usize, index as usize) };
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_set_fragment_buffer(
    encoder: RenderEncoderHandle,
    buffer: BufferHandle,
    offset: u32,
    index: u32,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    let buffer = unsafe { buffer.cast_const().as_ref() };
    unsafe { encoder.setFragmentBuffer_offset_atIndex(buffer, offset as usize, index as usize) };
}

/// # Safety
/// `encoder` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_draw(
    encoder: RenderEncoderHandle,
    vertex_count: u32,
    instance_count: u32,
    first_vertex: u32,
    first_instance: u32,
) {
    let Some(encoder) = (unsafe { handle::get(encoder, "encoder") }) else { return };
    unsafe {
        encoder.drawPrimitives_vertexStart_vertexCount_instanceCount_baseInstance(
            MTLPrimitiveType::Triangle,
            first_vertex as usize,
            vertex_count as usize,
            instance_count as usize,
            first_instance as usize,
        )
    };
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_command_encoder_draw_indexed(
    encoder: RenderEncoderHandle,
    index_type: MTLIndexType,
    index_buffer: BufferHandle,
    index_count: u32,
    instance_count: u32,
    index_buffer_offset: u32,
    vertex_offset: i32,
    first_instance: u32,
) {
    let (Some(encoder), Some(index_buffer)) =
        (unsafe { (handle::get(encoder, "encoder"), handle::get(index_buffer, "indexBuffer")) })
    else {
        return;
    };
    unsafe {
        encoder.drawIndexedPrimitives_indexCount_indexType_indexBuffer_indexBufferOffset_instanceCount_baseVertex_baseInstance(
            MTLPrimitiveType::Triangle,
            index_count as usize,
            index_type,
            index_buffer,
            index_buffer_offset as usize,
            instance_count as usize,
            vertex_offset as isize,
            first_instance as usize,
        )
    };
}
