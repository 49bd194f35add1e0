//! Failures surfaced across the C boundary.
//!
//! Callers never see a Rust error value. Context-aware calls store the
//! rendered message in the context's [`LastError`], everything else is only
//! logged.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("no Metal device is available")]
    NoDevice,

    #[error("failed to create a command queue")]
    NoCommandQueue,

    #[error("window has no content view")]
    NoContentView,

    #[error("null handle passed as `{0}`")]
    NullHandle(&'static str),

    #[error("no drawable has been acquired for the current frame")]
    NoDrawable,

    #[error("the layer did not provide a drawable")]
    DrawableUnavailable,

    #[error("`{0}` is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("failed to create {0}")]
    Allocation(&'static str),

    #[error("shader compilation failed: {0}")]
    Compile(String),

    #[error("render pipeline creation failed: {0}")]
    Pipeline(String),

    #[error("GPU capture failed: {0}")]
    Capture(String),

    #[error("range {offset}+{size} exceeds length {length}")]
    OutOfRange { offset: usize, size: usize, length: usize },
}

pub type Result<T> = std::result::Result<T, BindingError>;

/// UTF-8 bytes of the most recent failure, read back by the caller in two
/// steps (length, then copy).
#[derive(Debug, Default, Clone)]
pub struct LastError {
    bytes: Vec<u8>,
}

impl LastError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, err: &BindingError) {
        self.bytes = err.to_string().into_bytes();
    }

    pub fn set_message(&mut self, message: &str) {
        self.bytes = message.as_bytes().to_vec();
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copies as much of the message as fits in `out` and returns the number
    /// of bytes written. No terminator is appended.
    pub fn copy_to(&self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.bytes.len());
        out[..n].copy_from_slice(&self.bytes[..n]);
        n
    }

    /// Length clamped to the `u32` the C ABI reports.
    pub fn len_u32(&self) -> u32 {
        u32::try_from(self.bytes.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_something_fails() {
        let last = LastError::new();
        assert!(last.is_empty());
        assert_eq!(last.len_u32(), 0);
        let mut out = [0xAAu8; 4];
        assert_eq!(last.copy_to(&mut out), 0);
        assert_eq!(out, [0xAA; 4]);
    }

    #[test]
    fn newer_error_replaces_older() {
        let mut last = LastError::new();
        last.set(&BindingError::Compile("line 3: expected ';'".into()));
        last.set(&BindingError::NoDrawable);
        assert_eq!(
            last.as_bytes(),
            b"no drawable has been acquired for the current frame"
        );
    }

    #[test]
    fn copy_truncates_to_caller_length() {
        let mut last = LastError::new();
        last.set_message("pipeline exploded");
        let mut out = [0u8; 8];
        assert_eq!(last.copy_to(&mut out), 8);
        assert_eq!(&out, b"pipeline");

        let mut big = [0u8; 64];
        let n = last.copy_to(&mut big);
        assert_eq!(n, last.len());
        assert_eq!(&big[..n], b"pipeline exploded");
    }

    #[test]
    fn messages_carry_context() {
        let err = BindingError::OutOfRange { offset: 16, size: 32, length: 40 };
        assert_eq!(err.to_string(), "range 16+32 exceeds length 40");
        assert_eq!(
            BindingError::NullHandle("buffer").to_string(),
            "null handle passed as `buffer`"
        );
    }
}
