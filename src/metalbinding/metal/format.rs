use objc2_metal::MTLPixelFormat;

use crate::metalbinding::config::{ColorFormat, DepthStencilFormat};

pub fn color_pixel_format(format: ColorFormat) -> MTLPixelFormat {
    match format {
        ColorFormat::Bgra8Unorm => MTLPixelFormat::BGRA8Unorm,
        ColorFormat::Bgra8UnormSrgb => MTLPixelFormat::BGRA8Unorm_sRGB,
        ColorFormat::Rgba16Float => MTLPixelFormat::RGBA16Float,
    }
}

/// (depth, stencil) attachment formats for a pipeline descriptor.
pub fn depth_stencil_pixel_formats(format: DepthStencilFormat) -> (MTLPixelFormat, MTLPixelFormat) {
    match format {
        DepthStencilFormat::None => (MTLPixelFormat::Invalid, MTLPixelFormat::Invalid),
        DepthStencilFormat::Depth32Float => (MTLPixelFormat::Depth32Float, MTLPixelFormat::Invalid),
        DepthStencilFormat::Depth32FloatStencil8 => {
            (MTLPixelFormat::Depth32Float_Stencil8, MTLPixelFormat::Depth32Float_Stencil8)
        }
    }
}

/// Depth and stencil textures cannot live in managed storage.
pub fn is_depth_or_stencil(format: MTLPixelFormat) -> bool {
    format == MTLPixelFormat::Depth16Unorm
        || format == MTLPixelFormat::Depth32Float
        || format == MTLPixelFormat::Stencil8
        || format == MTLPixelFormat::Depth24Unorm_Stencil8
        || format == MTLPixelFormat::Depth32Float_Stencil8
        || format == MTLPixelFormat::X32_Stencil8
        || format == MTLPixelFormat::X24_Stencil8
}
