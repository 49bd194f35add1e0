//! Swapchain settings for a binding context.
//!
//! The caller only passes a frame count; everything else has a default that
//! can be overridden through `METALBINDING_*` environment variables.

use core::str::FromStr;

pub const ENV_PRESENT_MODE: &str = "METALBINDING_PRESENT_MODE";
pub const ENV_COLORSPACE: &str = "METALBINDING_COLORSPACE";
pub const ENV_PIXEL_FORMAT: &str = "METALBINDING_PIXEL_FORMAT";
pub const ENV_DEPTH_STENCIL: &str = "METALBINDING_DEPTH_STENCIL";
pub const ENV_EDR: &str = "METALBINDING_EDR";

/// `CAMetalLayer.maximumDrawableCount` only accepts 2 or 3.
pub const MIN_LAYER_DRAWABLES: u32 = 2;
pub const MAX_LAYER_DRAWABLES: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PresentMode { Fifo, Immediate }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace { SRGB, DisplayP3, ExtendedSRGB }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorFormat { Bgra8Unorm, Bgra8UnormSrgb, Rgba16Float }

/// Attachment formats baked into pipeline descriptors made by the context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepthStencilFormat { None, Depth32Float, Depth32FloatStencil8 }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue(pub String);

impl FromStr for PresentMode {
    type Err = UnknownValue;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" | "vsync" => Ok(Self::Fifo),
            "immediate" => Ok(Self::Immediate),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl FromStr for ColorSpace {
    type Err = UnknownValue;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srgb" => Ok(Self::SRGB),
            "display-p3" | "p3" => Ok(Self::DisplayP3),
            "extended-srgb" => Ok(Self::ExtendedSRGB),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl FromStr for ColorFormat {
    type Err = UnknownValue;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bgra8unorm" => Ok(Self::Bgra8Unorm),
            "bgra8unorm_srgb" | "bgra8unorm-srgb" => Ok(Self::Bgra8UnormSrgb),
            "rgba16float" => Ok(Self::Rgba16Float),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl FromStr for DepthStencilFormat {
    type Err = UnknownValue;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "depth32float" => Ok(Self::Depth32Float),
            "depth32float_stencil8" | "depth32float-stencil8" => Ok(Self::Depth32FloatStencil8),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapchainConfig {
    pub color_format: ColorFormat,
    pub depth_stencil_format: DepthStencilFormat,
    pub framebuffer_only: bool,
    /// Frames allowed in flight before `acquire_drawable` blocks.
    pub frame_count: u32,
    pub present_mode: PresentMode,
    pub colorspace: ColorSpace,
    pub wants_edr: bool,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            color_format: ColorFormat::Bgra8Unorm,
            depth_stencil_format: DepthStencilFormat::Depth32FloatStencil8,
            framebuffer_only: true,
            frame_count: 3,
            present_mode: PresentMode::Fifo,
            colorspace: ColorSpace::SRGB,
            wants_edr: false,
        }
    }
}

impl SwapchainConfig {
    pub fn with_frame_count(frame_count: u32) -> Self {
        Self { frame_count: frame_count.max(1), ..Self::default() }
    }

    /// Defaults for `frame_count` with overrides from the process environment.
    pub fn from_env(frame_count: u32) -> Self {
        Self::with_frame_count(frame_count).with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Unparseable values are logged and
    /// leave the current setting alone.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, ENV_PRESENT_MODE, &mut self.present_mode);
        override_from(&lookup, ENV_COLORSPACE, &mut self.colorspace);
        override_from(&lookup, ENV_PIXEL_FORMAT, &mut self.color_format);
        override_from(&lookup, ENV_DEPTH_STENCIL, &mut self.depth_stencil_format);
        if let Some(raw) = lookup(ENV_EDR) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.wants_edr = true,
                "0" | "false" | "no" | "off" => self.wants_edr = false,
                other => log::warn!("ignoring {ENV_EDR}={other:?}"),
            }
        }
        self
    }

    /// Drawable count to request from the layer.
    pub fn layer_drawables(&self) -> u32 {
        self.frame_count.clamp(MIN_LAYER_DRAWABLES, MAX_LAYER_DRAWABLES)
    }

    /// Slots of the in-flight semaphore.
    pub fn in_flight_slots(&self) -> u32 {
        self.frame_count.max(1)
    }
}

fn override_from<T, F>(lookup: &F, key: &str, slot: &mut T)
where
    T: FromStr<Err = UnknownValue>,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else { return };
    match raw.parse() {
        Ok(value) => *slot = value,
        Err(UnknownValue(v)) => log::warn!("ignoring {key}={v:?}"),
    }
}
