use objc2::rc::Retained;
use objc2::Message;
use objc2::runtime::ProtocolObject;
use objc2_app_kit::{NSView, NSWindow};
use objc2_core_foundation::CGSize;
use objc2_core_graphics::{CGColorSpace, kCGColorSpaceDisplayP3, kCGColorSpaceExtendedSRGB, kCGColorSpaceSRGB};
use objc2_metal::MTLDevice;
use objc2_quartz_core::{CALayer, CAMetalLayer};

use crate::metalbinding::config::{ColorSpace, PresentMode, SwapchainConfig};
use crate::metalbinding::error::{BindingError, Result};

use super::format;

pub fn new_metal_layer(device: &ProtocolObject<dyn MTLDevice>, sc: &SwapchainConfig) -> Retained<CAMetalLayer> {
    let layer = unsafe { CAMetalLayer::layer() };
    unsafe { layer.setDevice(Some(device)) };
    unsafe { apply_swapchain_to_metal_layer(&layer, sc) };
    layer
}

/// # Safety
/// Must run on the thread that owns the layer.
pub unsafe fn apply_swapchain_to_metal_layer(layer: &CAMetalLayer, sc: &SwapchainConfig) {
    unsafe { layer.setPixelFormat(format::color_pixel_format(sc.color_format)); }
    unsafe { layer.setFramebufferOnly(sc.framebuffer_only); }
    unsafe { layer.setMaximumDrawableCount(sc.layer_drawables() as usize); }
    unsafe { layer.setDisplaySyncEnabled(matches!(sc.present_mode, PresentMode::Fifo)); }
    let name = unsafe { match sc.colorspace { ColorSpace::SRGB => kCGColorSpaceSRGB, ColorSpace::DisplayP3 => kCGColorSpaceDisplayP3, ColorSpace::ExtendedSRGB => kCGColorSpaceExtendedSRGB } };
    if let Some(cs) = unsafe { CGColorSpace::with_name(Some(name)) } { unsafe { layer.setColorspace(Some(&*cs)); } }
    unsafe { layer.setWantsExtendedDynamicRangeContent(sc.wants_edr); }
}

/// A `CAMetalLayer` installed as the backing layer of a caller-owned view.
/// Dropping it hands the view back without a layer.
pub struct AttachedLayer {
    layer: Retained<CAMetalLayer>,
    view: Retained<NSView>,
}

impl AttachedLayer {
    pub fn attach(view: &NSView, layer: Retained<CAMetalLayer>) -> Self {
        attach_layer_to_view(view, &layer);
        Self { layer, view: view.retain() }
    }

    /// Attaches to the window's content view.
    pub fn attach_to_window(window: &NSWindow, layer: Retained<CAMetalLayer>) -> Result<Self> {
        let view = window.contentView().ok_or(BindingError::NoContentView)?;
        Ok(Self::attach(&view, layer))
    }

    pub fn layer(&self) -> &CAMetalLayer {
        &self.layer
    }
}

impl Drop for AttachedLayer {
    fn drop(&mut self) {
        detach_layer_from_view(&self.view);
        log::debug!("metal layer detached from view");
    }
}

fn attach_layer_to_view(view: &NSView, layer: &CAMetalLayer) {
    let ca_layer: &CALayer = layer;
    unsafe {
        view.setWantsLayer(true);
        view.setLayer(Some(ca_layer));
    }
}

fn detach_layer_from_view(view: &NSView) {
    unsafe {
        view.setLayer(None);
        view.setWantsLayer(false);
    }
}

pub fn set_content_scale(layer: &CAMetalLayer, scale: f32, width: u32, height: u32) {
    let scale = f64::from(scale);
    unsafe {
        layer.setContentsScale(scale);
        layer.setDrawableSize(CGSize {
            width: f64::from(width) * scale,
            height: f64::from(height) * scale,
        });
    }
}
