//! State behind a `MetalBindingContext*`.

use core::ffi::c_void;
use core::ptr;

use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2_app_kit::NSWindow;
use objc2_metal::{
    MTLCaptureDescriptor, MTLCaptureDestination, MTLCaptureManager, MTLCommandBuffer,
    MTLCommandQueue, MTLCreateSystemDefaultDevice, MTLDevice, MTLPixelFormat, MTLTexture,
};
use objc2_quartz_core::CAMetalDrawable;

use crate::metalbinding::config::SwapchainConfig;
use crate::metalbinding::error::{BindingError, LastError, Result};
use crate::metalbinding::logging;

use super::format;
use super::frame::FramePacer;
use super::windowing::{self, AttachedLayer};

// MTLCreateSystemDefaultDevice requires CoreGraphics to be linked
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {}

/// Snapshot returned by `metalbinding_get_memory_info`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub current_allocated_size: u64,
    pub recommended_working_set_size: u64,
    pub has_unified_memory: u64,
    pub max_transfer_rate: u64,
}

/// Manually managed autorelease pool spanning one frame of caller work.
struct AutoreleasePool {
    token: *mut c_void,
}

impl AutoreleasePool {
    fn push() -> Self {
        Self { token: unsafe { objc2::ffi::objc_autoreleasePoolPush() } }
    }

    fn is_active(&self) -> bool {
        !self.token.is_null()
    }

    fn pop(&mut self) {
        if self.is_active() {
            unsafe { objc2::ffi::objc_autoreleasePoolPop(self.token) };
            self.token = ptr::null_mut();
        }
    }

    fn drain(&mut self) {
        self.pop();
        *self = Self::push();
    }
}

pub struct Context {
    pub(crate) device: Retained<ProtocolObject<dyn MTLDevice>>,
    pub(crate) queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
    pub(crate) config: SwapchainConfig,
    surface: Option<AttachedLayer>,
    drawable: Option<Retained<ProtocolObject<dyn CAMetalDrawable>>>,
    pacer: FramePacer,
    last_error: LastError,
    pool: AutoreleasePool,
}

impl Context {
    /// Context presenting into `window`'s content view.
    pub fn with_window(window: &NSWindow, frame_count: u32) -> Result<Self> {
        let mut ctx = Self::headless(frame_count)?;
        let layer = windowing::new_metal_layer(&ctx.device, &ctx.config);
        ctx.surface = Some(AttachedLayer::attach_to_window(window, layer)?);
        log::info!(
            "attached metal layer ({} drawables, {:?})",
            ctx.config.layer_drawables(),
            ctx.config.present_mode
        );
        Ok(ctx)
    }

    /// Context without a layer: no drawables, everything else works.
    pub fn headless(frame_count: u32) -> Result<Self> {
        logging::init();
        let config = SwapchainConfig::from_env(frame_count);
        let device = MTLCreateSystemDefaultDevice().ok_or(BindingError::NoDevice)?;
        let queue = device.newCommandQueue().ok_or(BindingError::NoCommandQueue)?;
        log::info!("using device {}", device.name());
        Ok(Self {
            device,
            queue,
            pacer: FramePacer::new(config.in_flight_slots()),
            config,
            surface: None,
            drawable: None,
            last_error: LastError::new(),
            pool: AutoreleasePool::push(),
        })
    }

    pub fn device(&self) -> &ProtocolObject<dyn MTLDevice> {
        &self.device
    }

    pub fn config(&self) -> &SwapchainConfig {
        &self.config
    }

    pub fn last_error(&self) -> &LastError {
        &self.last_error
    }

    pub fn has_layer(&self) -> bool {
        self.surface.is_some()
    }

    /// Records `err` for the caller and logs it.
    pub fn fail(&mut self, err: BindingError) {
        log::error!("{err}");
        self.last_error.set(&err);
    }

    /// Unwraps `result`, recording the error on failure.
    pub fn check<T>(&mut self, result: Result<T>) -> Option<T> {
        result.map_err(|err| self.fail(err)).ok()
    }

    pub fn color_pixel_format(&self) -> MTLPixelFormat {
        match &self.surface {
            Some(surface) => unsafe { surface.layer().pixelFormat() },
            None => format::color_pixel_format(self.config.color_format),
        }
    }

    pub fn set_content_scale(&mut self, scale: f32, width: u32, height: u32) {
        if let Some(surface) = &self.surface {
            windowing::set_content_scale(surface.layer(), scale, width, height);
        }
    }

    /// Waits for a free frame slot and takes the layer's next drawable.
    /// A drawable already acquired for this frame is kept.
    pub fn acquire_drawable(&mut self) -> Result<()> {
        if self.drawable.is_some() {
            log::warn!("drawable already acquired for this frame");
            return Ok(());
        }
        let Some(surface) = &self.surface else {
            return Err(BindingError::DrawableUnavailable);
        };
        self.pacer.acquire();
        match unsafe { surface.layer().nextDrawable() } {
            Some(drawable) => {
                log::trace!("drawable acquired");
                self.drawable = Some(drawable);
                Ok(())
            }
            None => Err(BindingError::DrawableUnavailable),
        }
    }

    pub fn current_drawable_texture(&self) -> Option<Retained<ProtocolObject<dyn MTLTexture>>> {
        self.drawable.as_ref().map(|drawable| unsafe { drawable.texture() })
    }

    /// Schedules presentation of the current drawable on `command_buffer` and
    /// ends the frame. The held frame slot is returned when the buffer
    /// completes, with or without a drawable.
    pub fn present_after(&mut self, command_buffer: &ProtocolObject<dyn MTLCommandBuffer>, seconds: f64) -> Result<()> {
        let drawable = self.drawable.take();
        self.pacer.release_on_completion(command_buffer);
        let drawable = drawable.ok_or(BindingError::NoDrawable)?;
        unsafe {
            command_buffer.presentDrawable_afterMinimumDuration(ProtocolObject::from_ref(&*drawable), seconds)
        };
        Ok(())
    }

    pub fn start_capture(&self) -> Result<()> {
        let manager = unsafe { MTLCaptureManager::sharedCaptureManager() };
        let desc = MTLCaptureDescriptor::new();
        let device: &AnyObject = (*self.device).as_ref();
        unsafe {
            desc.setCaptureObject(Some(device));
            desc.setDestination(MTLCaptureDestination::DeveloperTools);
        }
        unsafe { manager.startCaptureWithDescriptor_error(&desc) }
            .map_err(|err| BindingError::Capture(err.localizedDescription().to_string()))?;
        log::info!("GPU capture started");
        Ok(())
    }

    pub fn stop_capture(&self) {
        let manager = unsafe { MTLCaptureManager::sharedCaptureManager() };
        unsafe { manager.stopCapture() };
        log::info!("GPU capture stopped");
    }

    pub fn memory_info(&self) -> MemoryInfo {
        MemoryInfo {
            current_allocated_size: self.device.currentAllocatedSize() as u64,
            recommended_working_set_size: self.device.recommendedMaxWorkingSetSize(),
            has_unified_memory: u64::from(self.device.hasUnifiedMemory()),
            max_transfer_rate: self.device.maxTransferRate(),
        }
    }

    pub fn frame_slots_held(&self) -> u32 {
        self.pacer.held()
    }

    pub fn drain_autorelease_pool(&mut self) {
        self.pool.drain();
    }

    pub fn end_autorelease_pool(&mut self) {
        self.pool.pop();
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.drawable = None;
        self.pool.pop();
        log::info!("context destroyed");
    }
}
