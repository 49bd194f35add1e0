//! Bounds arithmetic shared by buffer copies and encoder state.

use core::ops::Range;

use super::error::{BindingError, Result};

/// Validates that `offset..offset + size` lies inside a resource of
/// `length` bytes.
pub fn byte_range(offset: usize, size: usize, length: usize) -> Result<Range<usize>> {
    let out_of_range = || BindingError::OutOfRange { offset, size, length };
    let end = offset.checked_add(size).ok_or_else(out_of_range)?;
    if end > length {
        return Err(out_of_range());
    }
    Ok(offset..end)
}

/// Scissor rect in attachment pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scissor {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Scissor {
    /// Clips a signed origin to zero. The part of the rect left of / above the
    /// attachment is cut off, so the extent shrinks by the same amount.
    pub fn clipped(x: i32, y: i32, width: u32, height: u32) -> Self {
        let (x, width) = clip_axis(x, width);
        let (y, height) = clip_axis(y, height);
        Self { x, y, width, height }
    }
}

fn clip_axis(origin: i32, extent: u32) -> (usize, usize) {
    if origin >= 0 {
        (origin as usize, extent as usize)
    } else {
        let cut = origin.unsigned_abs();
        (0, extent.saturating_sub(cut) as usize)
    }
}
