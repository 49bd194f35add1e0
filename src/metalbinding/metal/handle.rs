//! Opaque handles handed across the C boundary.
//!
//! A handle is the raw pointer of a `Retained` object. Returning one moves a
//! +1 reference to the caller; the matching release takes it back.

use core::ptr;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::Message;
use objc2_metal::{
    MTLArgumentEncoder, MTLBuffer, MTLCommandBuffer, MTLDepthStencilDescriptor,
    MTLDepthStencilState, MTLFunction, MTLLibrary, MTLRenderCommandEncoder,
    MTLRenderPassDescriptor, MTLRenderPipelineDescriptor, MTLRenderPipelineState,
    MTLSamplerState, MTLStencilDescriptor, MTLTexture, MTLVertexDescriptor,
};

use super::context::Context;

pub type ContextHandle = *mut Context;
pub type CommandBufferHandle = *mut ProtocolObject<dyn MTLCommandBuffer>;
pub type RenderEncoderHandle = *mut ProtocolObject<dyn MTLRenderCommandEncoder>;
pub type RenderPassHandle = *mut MTLRenderPassDescriptor;
pub type BufferHandle = *mut ProtocolObject<dyn MTLBuffer>;
pub type TextureHandle = *mut ProtocolObject<dyn MTLTexture>;
pub type LibraryHandle = *mut ProtocolObject<dyn MTLLibrary>;
pub type FunctionHandle = *mut ProtocolObject<dyn MTLFunction>;
pub type PipelineDescriptorHandle = *mut MTLRenderPipelineDescriptor;
pub type PipelineStateHandle = *mut ProtocolObject<dyn MTLRenderPipelineState>;
pub type VertexDescriptorHandle = *mut MTLVertexDescriptor;
pub type DepthStencilDescriptorHandle = *mut MTLDepthStencilDescriptor;
pub type StencilDescriptorHandle = *mut MTLStencilDescriptor;
pub type DepthStencilStateHandle = *mut ProtocolObject<dyn MTLDepthStencilState>;
pub type ArgumentEncoderHandle = *mut ProtocolObject<dyn MTLArgumentEncoder>;
pub type SamplerHandle = *mut ProtocolObject<dyn MTLSamplerState>;

/// Gives the caller ownership of one reference.
pub fn into_raw<T: Message>(obj: Retained<T>) -> *mut T {
    Retained::into_raw(obj)
}

pub fn into_raw_or_null<T: Message>(obj: Option<Retained<T>>) -> *mut T {
    obj.map_or(ptr::null_mut(), into_raw)
}

/// Takes back a reference previously returned by [`into_raw`] and drops it.
///
/// # Safety
/// `handle` must be null or a live handle owned by the caller.
pub unsafe fn release<T: Message>(handle: *mut T, what: &'static str) {
    match unsafe { Retained::from_raw(handle) } {
        Some(obj) => drop(obj),
        None => log::warn!("release of null {what}"),
    }
}

/// Borrows the object behind a handle for the duration of a call. Null is
/// logged and yields `None`.
///
/// # Safety
/// `handle` must be null or point at a live object for `'a`.
pub unsafe fn get<'a, T>(handle: *mut T, what: &'static str) -> Option<&'a T> {
    let obj = unsafe { handle.cast_const().as_ref() };
    if obj.is_none() {
        log::warn!("null handle passed as `{what}`");
    }
    obj
}

/// # Safety
/// `handle` must be null or come from `metalbinding_create*` and not have
/// been destroyed.
pub unsafe fn context<'a>(handle: ContextHandle) -> Option<&'a mut Context> {
    let ctx = unsafe { handle.as_mut() };
    if ctx.is_none() {
        log::warn!("null context handle");
    }
    ctx
}
