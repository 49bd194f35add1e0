//! The exported C surface. Every function here is `#[no_mangle] extern "C"`
//! and mirrors a declaration in `include/metalbinding.h`.
//!
//! Handles returned from `new_*`/`create_*` functions are owned by the
//! caller and go back through the matching `release_*`. All other handle
//! arguments are borrowed for the duration of the call. Null handles are
//! logged and the call does nothing.

pub mod argument;
pub mod buffer;
pub mod command;
pub mod context;
pub mod depth_stencil;
pub mod encoder;
pub mod library;
pub mod pass;
pub mod pipeline;
pub mod sampler;
pub mod texture;
