//! Rust-side state and helpers behind the C surface in `api`.

pub mod context;
pub mod format;
pub mod frame;
pub mod handle;
pub mod windowing;

pub use context::{Context, MemoryInfo};
pub use frame::FramePacer;

// Data-only Metal types that cross the boundary by value.
pub use objc2_metal::{
    MTLBlendFactor, MTLBlendOperation, MTLCompareFunction, MTLCullMode, MTLIndexType,
    MTLLoadAction, MTLPixelFormat, MTLSamplerAddressMode, MTLSamplerMinMagFilter,
    MTLSamplerMipFilter, MTLStencilOperation, MTLStoreAction, MTLVertexFormat,
    MTLVertexStepFunction,
};
