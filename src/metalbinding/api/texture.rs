use core::ffi::c_void;
use core::ptr::{self, NonNull};

use objc2_metal::{
    MTLDevice, MTLOrigin, MTLPixelFormat, MTLRegion, MTLSize, MTLStorageMode, MTLTexture,
    MTLTextureDescriptor, MTLTextureUsage,
};

use crate::metalbinding::error::BindingError;
use crate::metalbinding::metal::format;
use crate::metalbinding::metal::handle::{self, ContextHandle, TextureHandle};

/// 2D texture without mipmaps, usable for sampling and as a render target.
///
/// # Safety
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_texture(
    context: ContextHandle,
    width: u32,
    height: u32,
    format: MTLPixelFormat,
) -> TextureHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let desc = unsafe {
        MTLTextureDescriptor::texture2DDescriptorWithPixelFormat_width_height_mipmapped(
            format,
            width.max(1) as usize,
            height.max(1) as usize,
            false,
        )
    };
    desc.setUsage(MTLTextureUsage::ShaderRead | MTLTextureUsage::RenderTarget);
    desc.setStorageMode(if format::is_depth_or_stencil(format) {
        MTLStorageMode::Private
    } else {
        MTLStorageMode::Managed
    });
    match ctx.device.newTextureWithDescriptor(&desc) {
        Some(texture) => handle::into_raw(texture),
        None => {
            ctx.fail(BindingError::Allocation("texture"));
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `texture` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_texture(texture: TextureHandle) {
    unsafe { handle::release(texture, "texture") }
}

/// Replaces the `width`x`height` region at the origin of mip level 0.
///
/// # Safety
/// `data` must hold `height` rows of `bytes_per_row` bytes.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_set_texture_data(
    texture: TextureHandle,
    width: u32,
    height: u32,
    data: *mut c_void,
    bytes_per_row: u32,
) {
    let Some(texture) = (unsafe { handle::get(texture, "texture") }) else { return };
    let Some(data) = NonNull::new(data) else {
        log::warn!("set_texture_data with null data");
        return;
    };
    if width as usize > texture.width() || height as usize > texture.height() {
        log::error!(
            "set_texture_data: {width}x{height} exceeds texture {}x{}",
            texture.width(),
            texture.height()
        );
        return;
    }
    let region = MTLRegion {
        origin: MTLOrigin { x: 0, y: 0, z: 0 },
        size: MTLSize { width: width as usize, height: height as usize, depth: 1 },
    };
    unsafe { texture.replaceRegion_mipmapLevel_withBytes_bytesPerRow(region, 0, data, bytes_per_row as usize) };
}

/// # Safety
/// Out pointers must be null or valid for one write each.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_get_texture_info(
    texture: TextureHandle,
    ref_width: *mut u32,
    ref_height: *mut u32,
    ref_format: *mut MTLPixelFormat,
) {
    let Some(texture) = (unsafe { handle::get(texture, "texture") }) else { return };
    unsafe {
        if let Some(out) = ref_width.as_mut() {
            *out = u32::try_from(texture.width()).unwrap_or(u32::MAX);
        }
        if let Some(out) = ref_height.as_mut() {
            *out = u32::try_from(texture.height()).unwrap_or(u32::MAX);
        }
        if let Some(out) = ref_format.as_mut() {
            *out = texture.pixelFormat();
        }
    }
}
