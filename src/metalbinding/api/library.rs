//! Shader libraries compiled from MSL source, and the functions inside them.

use core::ffi::{c_char, CStr};
use core::ptr;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::NSString;
use objc2_metal::{MTLDevice, MTLLibrary};

use crate::metalbinding::error::{BindingError, Result};
use crate::metalbinding::metal::handle::{self, ContextHandle, FunctionHandle, LibraryHandle};

unsafe fn utf8<'a>(text: *const c_char, what: &'static str) -> Result<&'a str> {
    if text.is_null() {
        return Err(BindingError::NullHandle(what));
    }
    unsafe { CStr::from_ptr(text) }.to_str().map_err(|_| BindingError::InvalidUtf8(what))
}

pub(crate) fn compile(
    device: &ProtocolObject<dyn MTLDevice>,
    source: &str,
) -> Result<Retained<ProtocolObject<dyn MTLLibrary>>> {
    let source = NSString::from_str(source);
    device
        .newLibraryWithSource_options_error(&source, None)
        .map_err(|err| BindingError::Compile(err.localizedDescription().to_string()))
}

/// Compiles `utf8_source`. On failure returns null and leaves the compiler
/// output as the context's last error.
///
/// # Safety
/// `utf8_source` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_library(context: ContextHandle, utf8_source: *const c_char) -> LibraryHandle {
    let Some(ctx) = (unsafe { handle::context(context) }) else {
        return ptr::null_mut();
    };
    let library = unsafe { utf8(utf8_source, "utf8Source") }.and_then(|source| compile(&ctx.device, source));
    handle::into_raw_or_null(ctx.check(library))
}

/// # Safety
/// `library` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_library(library: LibraryHandle) {
    unsafe { handle::release(library, "library") }
}

/// Null when the library has no function called `utf8_name`.
///
/// # Safety
/// `library` must be null or live; `utf8_name` null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_new_function(library: LibraryHandle, utf8_name: *const c_char) -> FunctionHandle {
    let Some(library) = (unsafe { handle::get(library, "library") }) else {
        return ptr::null_mut();
    };
    let name = match unsafe { utf8(utf8_name, "utf8Name") } {
        Ok(name) => name,
        Err(err) => {
            log::warn!("new_function: {err}");
            return ptr::null_mut();
        }
    };
    let function = library.newFunctionWithName(&NSString::from_str(name));
    if function.is_none() {
        log::warn!("library has no function named {name:?}");
    }
    handle::into_raw_or_null(function)
}

/// # Safety
/// `function` must be null or a handle owned by the caller.
#[no_mangle]
pub unsafe extern "C" fn metalbinding_release_function(function: FunctionHandle) {
    unsafe { handle::release(function, "function") }
}
