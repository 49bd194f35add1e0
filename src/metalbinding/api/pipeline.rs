//! Render pipeline descriptors, pipeline states and vertex descriptors.

use core::ptr;

use objc2::rc::Retained;
use objc2::runtime::{Bool, ProtocolObject};
use objc2_metal::{
    MTLBlendFactor, MTLBlendOperation, MTLDevice, MTLRenderPipelineDescriptor,
    MTLRenderPipelineState, MTLVertexDescriptor, MTLVertexFormat, MTLVertexStepFunction,
};

use crate::metalbinding::error::{BindingError, Result};
use crate::metalbinding::metal::format;
use crate::metalbinding::metal::handle::{
    self, ContextHandle, FunctionHandle, PipelineDescriptorHandle, PipelineStateHandle,
    VertexDescriptorHandle,
};

/// Descriptor targeting the context's attachments: colour 0 in the
/// swapchain format, depth and stencil in the configured format.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_rpd(context: ContextHandle) -> PipelineDescriptorHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let desc = MTLRenderPipelineDescriptor::new();
    let (depth, stencil) = format::depth_stencil_pixel_formats(ctx.config.depth_stencil_format);
    unsafe {
        desc.colorAttachments().objectAtIndexedSubscript(0).setPixelFormat(ctx.color_pixel_format());
        desc.setDepthAttachmentPixelFormat(depth);
        desc.setStencilAttachmentPixelFormat(stencil);
    }
    handle::into_raw(desc)
}

/// # Safety
/// `descriptor` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_rpd(descriptor: PipelineDescriptorHandle) {
    unsafe { handle::release(descriptor, "pipeline descriptor") }
}

/// # Safety
/// Handles must be null or live. A null function clears that stage.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_rpd_functions(
    descriptor: PipelineDescriptorHandle,
    vertex: FunctionHandle,
    fragment: FunctionHandle,
) {
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    unsafe {
        desc.setVertexFunction(vertex.cast_const().as_ref());
        desc.setFragmentFunction(fragment.cast_const().as_ref());
    }
}

/// Blend state of colour attachment 0.
///
/// # Safety
/// `descriptor` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_rpd_common(
    descriptor: PipelineDescriptorHandle,
    blend: Bool,
    color_blend_op: MTLBlendOperation,
    alpha_blend_op: MTLBlendOperation,
    source_rgb: MTLBlendFactor,
    dest_rgb: MTLBlendFactor,
    source_alpha: MTLBlendFactor,
    dest_alpha: MTLBlendFactor,
) {
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    unsafe {
        let ca0 = desc.colorAttachments().objectAtIndexedSubscript(0);
        ca0.setBlendingEnabled(blend.as_bool());
        ca0.setRgbBlendOperation(color_blend_op);
        ca0.setAlphaBlendOperation(alpha_blend_op);
        ca0.setSourceRGBBlendFactor(source_rgb);
        ca0.setDestinationRGBBlendFactor(dest_rgb);
        ca0.setSourceAlphaBlendFactor(source_alpha);
        ca0.setDestinationAlphaBlendFactor(dest_alpha);
    }
}

/// # Safety
/// Handles must be null or live. The descriptor copies `vertex_descriptor`.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_rpd_vertex_descriptor(
    descriptor: PipelineDescriptorHandle,
    vertex_descriptor: VertexDescriptorHandle,
) {
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    unsafe { desc.setVertexDescriptor(vertex_descriptor.cast_const().as_ref()) };
}

pub(crate) fn build_pipeline(
    device: &ProtocolObject<dyn MTLDevice>,
    desc: &MTLRenderPipelineDescriptor,
) -> Result<Retained<ProtocolObject<dyn MTLRenderPipelineState>>> {
    device
        .newRenderPipelineStateWithDescriptor_error(desc)
        .map_err(|err| BindingError::Pipeline(err.localizedDescription().to_string()))
}

/// # Safety
/// Handles must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_pipeline_state(
    context: ContextHandle,
    descriptor: PipelineDescriptorHandle,
) -> PipelineStateHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let state = unsafe { descriptor.cast_const().as_ref() }
        .ok_or(BindingError::NullHandle("descriptor"))
        .and_then(|desc| build_pipeline(&ctx.device, desc));
    handle::into_raw_or_null(ctx.check(state))
}

/// # Safety
/// `state` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_pipeline_state(state: PipelineStateHandle) {
    unsafe { handle::release(state, "pipeline state") }
}

/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_vertex_descriptor(context: ContextHandle) -> VertexDescriptorHandle {
    if unsafe { handle::context(context) }.is_none() {
        return ptr::null_mut();
    }
    handle::into_raw(MTLVertexDescriptor::new())
}

/// # Safety
/// `descriptor` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_vertex_descriptor(descriptor: VertexDescriptorHandle) {
    unsafe { handle::release(descriptor, "vertex descriptor") }
}

/// Vertex attribute `index`.
///
/// # Safety
/// `descriptor` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_vertex_descriptor_vad(
    descriptor: VertexDescriptorHandle,
    index: u32,
    format: MTLVertexFormat,
    offset: u32,
    buffer_index: u32,
) {
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    unsafe {
        let attribute = desc.attributes().objectAtIndexedSubscript(index as usize);
        attribute.setFormat(format);
        attribute.setOffset(offset as usize);
        attribute.setBufferIndex(buffer_index as usize);
    }
}

/// Vertex buffer layout `index`, stepping once per vertex or instance.
///
/// # Safety
/// `descriptor` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_vertex_descriptor_vbl(
    descriptor: VertexDescriptorHandle,
    index: u32,
    step_function: MTLVertexStepFunction,
    stride: u32,
) {
    let Some(desc) = (unsafe { handle::get(descriptor, "descriptor") }) else { return };
    unsafe {
        let layout = desc.layouts().objectAtIndexedSubscript(index as usize);
        layout.setStepFunction(step_function);
        layout.setStepRate(1);
        layout.setStride(stride as usize);
    }
}
