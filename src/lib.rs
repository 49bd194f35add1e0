#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc, clippy::too_many_arguments)]

pub mod metalbinding {
    pub mod config;
    pub mod error;
    pub mod logging;
    pub mod region;

    #[cfg(target_os = "macos")]
    pub mod metal;
    #[cfg(target_os = "macos")]
    pub mod api; // the C surface, built on `metal`
}

// Top-level re-exports: `use metalbinding::{config, error};`
pub use crate::metalbinding::{config, error, logging, region};
#[cfg(target_os = "macos")]
pub use crate::metalbinding::{api, metal};

pub use crate::metalbinding::config::{ColorFormat, ColorSpace, DepthStencilFormat, PresentMode, SwapchainConfig};
pub use crate::metalbinding::error::{BindingError, LastError, Result};

// Short, Metal-style aliases for the by-value types crossing the boundary.
#[cfg(target_os = "macos")]
pub mod mtl {
    pub use crate::metalbinding::metal::{Context, FramePacer, MemoryInfo};
    pub use crate::metalbinding::metal::{
        MTLBlendFactor as BlendFactor,
        MTLBlendOperation as BlendOperation,
        MTLCompareFunction as CompareFunction,
        MTLCullMode as CullMode,
        MTLIndexType as IndexType,
        MTLLoadAction as LoadAction,
        MTLPixelFormat as PixelFormat,
        MTLSamplerAddressMode as SamplerAddressMode,
        MTLSamplerMinMagFilter as SamplerMinMagFilter,
        MTLSamplerMipFilter as SamplerMipFilter,
        MTLStencilOperation as StencilOperation,
        MTLStoreAction as StoreAction,
        MTLVertexFormat as VertexFormat,
        MTLVertexStepFunction as VertexStepFunction,
    };
}
