//! Drives the exported C surface against the system default device. Every
//! test returns early on machines without a Metal device.
#![cfg(target_os = "macos")]

use std::ffi::CString;
use std::ptr;

use objc2::runtime::Bool;

use metalbinding::api::argument::*;
use metalbinding::api::buffer::*;
use metalbinding::api::command::*;
use metalbinding::api::context::*;
use metalbinding::api::depth_stencil::*;
use metalbinding::api::encoder::*;
use metalbinding::api::library::*;
use metalbinding::api::pass::*;
use metalbinding::api::pipeline::*;
use metalbinding::api::sampler::*;
use metalbinding::api::texture::*;
use metalbinding::metal::handle::{
    ContextHandle, FunctionHandle, LibraryHandle, PipelineDescriptorHandle, PipelineStateHandle,
    VertexDescriptorHandle,
};
use metalbinding::mtl::*;
use metalbinding::{ColorFormat, DepthStencilFormat};
use objc2_metal::{MTLCommandBuffer, MTLCommandBufferStatus, MTLDevice};

const SHADERS: &str = r#"
#include <metal_stdlib>
using namespace metal;

struct VertexIn {
    float2 position [[attribute(0)]];
    float2 uv [[attribute(1)]];
};

struct VertexOut {
    float4 position [[position]];
    float2 uv;
};

vertex VertexOut vert(VertexIn in [[stage_in]]) {
    VertexOut out;
    out.position = float4(in.position, 0.0, 1.0);
    out.uv = in.uv;
    return out;
}

struct Material {
    texture2d<float> tex [[id(0)]];
    sampler smp [[id(1)]];
    device const float4* tint [[id(2)]];
};

fragment float4 textured(VertexOut in [[stage_in]], constant Material& material [[buffer(0)]]) {
    return material.tex.sample(material.smp, in.uv) * material.tint[0];
}

fragment float4 solid(VertexOut in [[stage_in]]) {
    return float4(in.uv, 0.0, 1.0);
}
"#;

/// Owns a headless context for the duration of a test.
struct Headless(ContextHandle);

impl Headless {
    fn new() -> Option<Self> {
        let ctx = metalbinding_create_headless(2);
        if ctx.is_null() {
            eprintln!("no Metal device, skipping");
            return None;
        }
        Some(Self(ctx))
    }

    fn last_error(&self) -> String {
        unsafe {
            let len = metalbinding_get_last_error_length(self.0);
            let mut out = vec![0u8; len as usize];
            metalbinding_get_last_error(self.0, out.as_mut_ptr(), len);
            String::from_utf8(out).expect("last error is UTF-8")
        }
    }
}

impl Drop for Headless {
    fn drop(&mut self) {
        unsafe { metalbinding_destroy(self.0) };
    }
}

#[test]
fn buffer_contents_match_copied_bytes() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        let buffer = metalbinding_new_buffer(ctx.0, 16);
        assert!(!buffer.is_null());
        let src: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        metalbinding_copy_to_buffer(buffer, src.as_ptr().cast(), 4, src.len() as u32);
        let contents = metalbinding_buffer_get_contents(buffer).cast::<u8>();
        let view = std::slice::from_raw_parts(contents, 16);
        assert_eq!(&view[4..12], &src);
        metalbinding_buffer_did_modify_range(buffer, 0, 16);
        metalbinding_release_buffer(buffer);
    }
}

#[test]
fn out_of_range_copy_leaves_buffer_untouched() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        let buffer = metalbinding_new_buffer(ctx.0, 8);
        let contents = metalbinding_buffer_get_contents(buffer).cast::<u8>();
        ptr::write_bytes(contents, 0, 8);
        let src = [0xFFu8; 8];
        metalbinding_copy_to_buffer(buffer, src.as_ptr().cast(), 4, 8);
        metalbinding_copy_to_buffer(buffer, src.as_ptr().cast(), u32::MAX, 2);
        assert_eq!(std::slice::from_raw_parts(contents, 8), &[0u8; 8]);
        metalbinding_release_buffer(buffer);
    }
}

#[test]
fn zero_length_buffer_is_still_created() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        let buffer = metalbinding_new_buffer(ctx.0, 0);
        assert!(!buffer.is_null());
        assert!(!metalbinding_buffer_get_contents(buffer).is_null());
        metalbinding_release_buffer(buffer);
    }
}

#[test]
fn texture_info_reports_creation_parameters() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        let texture = metalbinding_new_texture(ctx.0, 4, 2, PixelFormat::RGBA8Unorm);
        assert!(!texture.is_null());
        let pixels = [0x7Fu8; 4 * 2 * 4];
        metalbinding_set_texture_data(texture, 4, 2, pixels.as_ptr().cast_mut().cast(), 16);

        let (mut w, mut h, mut format) = (0u32, 0u32, PixelFormat::Invalid);
        metalbinding_get_texture_info(texture, &mut w, &mut h, &mut format);
        assert_eq!((w, h), (4, 2));
        assert_eq!(format, PixelFormat::RGBA8Unorm);
        metalbinding_release_texture(texture);

        let depth = metalbinding_new_texture(ctx.0, 8, 8, PixelFormat::Depth32Float_Stencil8);
        assert!(!depth.is_null());
        metalbinding_release_texture(depth);
    }
}

#[test]
fn invalid_shader_source_records_compiler_output() {
    let Some(ctx) = Headless::new() else { return };
    let source = CString::new("this is not metal").unwrap();
    unsafe {
        let library = metalbinding_new_library(ctx.0, source.as_ptr());
        assert!(library.is_null());
    }
    assert!(ctx.last_error().starts_with("shader compilation failed"));
}

#[test]
fn last_error_copy_is_truncated_to_caller_buffer() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        // No layer, so there is nothing to acquire.
        metalbinding_acquire_drawable(ctx.0);
        let full = metalbinding_get_last_error_length(ctx.0);
        assert!(full > 4);
        let mut out = [0u8; 4];
        metalbinding_get_last_error(ctx.0, out.as_mut_ptr(), out.len() as u32);
        assert_eq!(&out, &ctx.last_error().as_bytes()[..4]);
        assert_eq!((*ctx.0).frame_slots_held(), 0);
        assert!(metalbinding_get_current_frame_drawable_texture(ctx.0).is_null());
    }
}

#[test]
fn missing_function_yields_null() {
    let Some(ctx) = Headless::new() else { return };
    let source = CString::new(SHADERS).unwrap();
    let name = CString::new("does_not_exist").unwrap();
    unsafe {
        let library = metalbinding_new_library(ctx.0, source.as_ptr());
        assert!(!library.is_null(), "{}", ctx.last_error());
        assert!(metalbinding_new_function(library, name.as_ptr()).is_null());
        metalbinding_release_library(library);
    }
}

#[test]
fn pipeline_and_argument_encoder_build() {
    let Some(ctx) = Headless::new() else { return };
    let source = CString::new(SHADERS).unwrap();
    let vert_name = CString::new("vert").unwrap();
    let frag_name = CString::new("textured").unwrap();
    unsafe {
        let library = metalbinding_new_library(ctx.0, source.as_ptr());
        assert!(!library.is_null(), "{}", ctx.last_error());
        let vert = metalbinding_new_function(library, vert_name.as_ptr());
        let frag = metalbinding_new_function(library, frag_name.as_ptr());
        assert!(!vert.is_null() && !frag.is_null());

        let vd = metalbinding_new_vertex_descriptor(ctx.0);
        metalbinding_set_vertex_descriptor_vad(vd, 0, VertexFormat::Float2, 0, 0);
        metalbinding_set_vertex_descriptor_vad(vd, 1, VertexFormat::Float2, 8, 0);
        metalbinding_set_vertex_descriptor_vbl(vd, 0, VertexStepFunction::PerVertex, 16);

        let rpd = metalbinding_new_rpd(ctx.0);
        metalbinding_set_rpd_functions(rpd, vert, frag);
        metalbinding_set_rpd_common(
            rpd,
            Bool::YES,
            BlendOperation::Add,
            BlendOperation::Add,
            BlendFactor::SourceAlpha,
            BlendFactor::OneMinusSourceAlpha,
            BlendFactor::One,
            BlendFactor::OneMinusSourceAlpha,
        );
        metalbinding_set_rpd_vertex_descriptor(rpd, vd);
        let pipeline = metalbinding_new_pipeline_state(ctx.0, rpd);
        assert!(!pipeline.is_null(), "{}", ctx.last_error());

        let encoder = metalbinding_new_argument_encoder(frag, 0);
        assert!(!encoder.is_null());
        let size = metalbinding_get_argument_buffer_size(encoder);
        assert!(size > 0);
        let argument_buffer = metalbinding_new_buffer(ctx.0, size);
        metalbinding_set_argument_buffer(encoder, argument_buffer);

        let sampler = metalbinding_create_sampler(
            ctx.0,
            SamplerMinMagFilter::Linear,
            SamplerMinMagFilter::Linear,
            SamplerMipFilter::NotMipmapped,
            SamplerAddressMode::ClampToEdge,
            SamplerAddressMode::ClampToEdge,
            SamplerAddressMode::ClampToEdge,
            true,
            true,
        );
        assert!(!sampler.is_null(), "{}", ctx.last_error());
        metalbinding_encode_sampler_argument(encoder, sampler, 1);

        metalbinding_release_sampler(sampler);
        metalbinding_release_buffer(argument_buffer);
        metalbinding_release_argument_encoder(encoder);
        metalbinding_release_pipeline_state(pipeline);
        metalbinding_release_rpd(rpd);
        metalbinding_release_vertex_descriptor(vd);
        metalbinding_release_function(frag);
        metalbinding_release_function(vert);
        metalbinding_release_library(library);
    }
}

#[test]
fn pipeline_from_null_descriptor_records_error() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        assert!(metalbinding_new_pipeline_state(ctx.0, ptr::null_mut()).is_null());
    }
    assert_eq!(ctx.last_error(), "null handle passed as `descriptor`");
}

#[test]
fn depth_stencil_state_from_descriptors() {
    let Some(ctx) = Headless::new() else { return };
    unsafe {
        let stencil = metalbinding_new_stencil_descriptor(
            ctx.0,
            StencilOperation::Keep,
            StencilOperation::Keep,
            StencilOperation::Replace,
            CompareFunction::Always,
            0xFF,
            0xFF,
        );
        assert!(!stencil.is_null());
        let dsd = metalbinding_new_dsd(CompareFunction::LessEqual, Bool::YES, stencil, stencil);
        let state = metalbinding_new_depth_stencil_state(ctx.0, dsd);
        assert!(!state.is_null(), "{}", ctx.last_error());
        metalbinding_release_depth_stencil_state(state);
        metalbinding_release_dsd(dsd);
        metalbinding_release_stencil_descriptor(stencil);

        let no_stencil = metalbinding_new_dsd(CompareFunction::Less, Bool::NO, ptr::null_mut(), ptr::null_mut());
        let state = metalbinding_new_depth_stencil_state(ctx.0, no_stencil);
        assert!(!state.is_null());
        metalbinding_release_depth_stencil_state(state);
        metalbinding_release_dsd(no_stencil);
    }
}

/// Library, functions and pipeline state for the `vert`/`textured` pair.
struct TexturedPipeline {
    library: LibraryHandle,
    vert: FunctionHandle,
    frag: FunctionHandle,
    vertex_descriptor: VertexDescriptorHandle,
    descriptor: PipelineDescriptorHandle,
    state: PipelineStateHandle,
}

impl TexturedPipeline {
    unsafe fn build(ctx: &Headless) -> Self {
        let source = CString::new(SHADERS).unwrap();
        let vert_name = CString::new("vert").unwrap();
        let frag_name = CString::new("textured").unwrap();
        unsafe {
            let library = metalbinding_new_library(ctx.0, source.as_ptr());
            assert!(!library.is_null(), "{}", ctx.last_error());
            let vert = metalbinding_new_function(library, vert_name.as_ptr());
            let frag = metalbinding_new_function(library, frag_name.as_ptr());
            let vertex_descriptor = metalbinding_new_vertex_descriptor(ctx.0);
            metalbinding_set_vertex_descriptor_vad(vertex_descriptor, 0, VertexFormat::Float2, 0, 0);
            metalbinding_set_vertex_descriptor_vad(vertex_descriptor, 1, VertexFormat::Float2, 8, 0);
            metalbinding_set_vertex_descriptor_vbl(vertex_descriptor, 0, VertexStepFunction::PerVertex, 16);
            let descriptor = metalbinding_new_rpd(ctx.0);
            metalbinding_set_rpd_functions(descriptor, vert, frag);
            metalbinding_set_rpd_vertex_descriptor(descriptor, vertex_descriptor);
            let state = metalbinding_new_pipeline_state(ctx.0, descriptor);
            assert!(!state.is_null(), "{}", ctx.last_error());
            Self { library, vert, frag, vertex_descriptor, descriptor, state }
        }
    }

    unsafe fn release(self) {
        unsafe {
            metalbinding_release_pipeline_state(self.state);
            metalbinding_release_rpd(self.descriptor);
            metalbinding_release_vertex_descriptor(self.vertex_descriptor);
            metalbinding_release_function(self.frag);
            metalbinding_release_function(self.vert);
            metalbinding_release_library(self.library);
        }
    }
}

#[test]
fn offscreen_pass_encodes_and_commits() {
    let Some(ctx) = Headless::new() else { return };
    {
        let context = unsafe { &*ctx.0 };
        assert!(!context.has_layer());
        assert_eq!(context.config().frame_count, 2);
        // Pipelines from `new_rpd` expect these attachment formats.
        assert_eq!(context.config().color_format, ColorFormat::Bgra8Unorm);
        assert_eq!(context.config().depth_stencil_format, DepthStencilFormat::Depth32FloatStencil8);
        assert!(!context.device().name().to_string().is_empty());
    }

    unsafe {
        let pipeline = TexturedPipeline::build(&ctx);
        let target = metalbinding_new_texture(ctx.0, 16, 16, PixelFormat::BGRA8Unorm);
        let depth = metalbinding_new_texture(ctx.0, 16, 16, PixelFormat::Depth32Float_Stencil8);
        let rpd = metalbinding_create_render_pass_descriptor();
        metalbinding_set_render_pass_descriptor_color_attachment(
            rpd,
            0,
            target,
            LoadAction::Clear,
            StoreAction::Store,
            0.1,
            0.2,
            0.3,
            1.0,
        );
        metalbinding_set_render_pass_descriptor_depth_attachment(rpd, depth, LoadAction::Clear, StoreAction::DontCare, 1.0);
        metalbinding_set_render_pass_descriptor_stencil_attachment(rpd, depth, LoadAction::Clear, StoreAction::DontCare, 0);

        // Two triangles covering the target, 16-byte position + uv vertices.
        let vertices: [f32; 16] = [
            -1.0, -1.0, 0.0, 1.0, //
            1.0, -1.0, 1.0, 1.0, //
            1.0, 1.0, 1.0, 0.0, //
            -1.0, 1.0, 0.0, 0.0,
        ];
        let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
        let vertex_buffer = metalbinding_new_buffer(ctx.0, 64);
        metalbinding_copy_to_buffer(vertex_buffer, vertices.as_ptr().cast(), 0, 64);
        let index_buffer = metalbinding_new_buffer(ctx.0, 12);
        metalbinding_copy_to_buffer(index_buffer, indices.as_ptr().cast(), 0, 12);
        let tint = [1.0f32, 0.5, 0.25, 1.0];
        let tint_buffer = metalbinding_new_buffer(ctx.0, 16);
        metalbinding_copy_to_buffer(tint_buffer, tint.as_ptr().cast(), 0, 16);
        let albedo = metalbinding_new_texture(ctx.0, 4, 4, PixelFormat::RGBA8Unorm);
        let sampler = metalbinding_create_sampler(
            ctx.0,
            SamplerMinMagFilter::Nearest,
            SamplerMinMagFilter::Nearest,
            SamplerMipFilter::NotMipmapped,
            SamplerAddressMode::Repeat,
            SamplerAddressMode::Repeat,
            SamplerAddressMode::Repeat,
            true,
            true,
        );

        let arguments = metalbinding_new_argument_encoder(pipeline.frag, 0);
        let argument_buffer = metalbinding_new_buffer(ctx.0, metalbinding_get_argument_buffer_size(arguments));
        metalbinding_set_argument_buffer(arguments, argument_buffer);

        let command_buffer = metalbinding_create_command_buffer(ctx.0);
        assert!(!command_buffer.is_null());
        let encoder = metalbinding_new_command_encoder(command_buffer, rpd);
        assert!(!encoder.is_null());
        metalbinding_command_encoder_set_pipeline(encoder, pipeline.state);
        metalbinding_command_encoder_set_viewport(encoder, 0.0, 0.0, 16.0, 16.0);
        metalbinding_command_encoder_set_scissor(encoder, -4, -4, 12, 12);
        metalbinding_command_encoder_set_cull_mode(encoder, CullMode::None);
        metalbinding_command_encoder_set_dss(encoder, ptr::null_mut());

        metalbinding_encode_texture_argument(arguments, encoder, albedo, 0, 0b10);
        metalbinding_encode_sampler_argument(arguments, sampler, 1);
        metalbinding_encode_buffer_argument(arguments, encoder, tint_buffer, 0, 2, 0b10);
        // No stage bits: encoded, but not declared resident.
        metalbinding_encode_buffer_argument(arguments, encoder, tint_buffer, 0, 2, 0);
        metalbinding_encode_buffer_argument(arguments, encoder, tint_buffer, 0, 2, 0b11);

        metalbinding_command_encoder_set_vertex_buffer(encoder, vertex_buffer, 0, 0);
        metalbinding_command_encoder_set_fragment_buffer(encoder, argument_buffer, 0, 0);
        metalbinding_command_encoder_draw(encoder, 3, 1, 0, 0);
        metalbinding_command_encoder_draw_indexed(encoder, IndexType::UInt16, index_buffer, 6, 1, 0, 0, 0);
        metalbinding_command_encoder_end_encoding(encoder);
        metalbinding_commit_command_buffer(command_buffer);
        (*command_buffer).waitUntilCompleted();
        assert_eq!((*command_buffer).status(), MTLCommandBufferStatus::Completed);

        metalbinding_release_command_encoder(encoder);
        metalbinding_release_command_buffer(command_buffer);
        metalbinding_release_buffer(argument_buffer);
        metalbinding_release_argument_encoder(arguments);
        metalbinding_release_sampler(sampler);
        metalbinding_release_texture(albedo);
        metalbinding_release_buffer(tint_buffer);
        metalbinding_release_buffer(index_buffer);
        metalbinding_release_buffer(vertex_buffer);
        metalbinding_release_render_pass_descriptor(rpd);
        metalbinding_release_texture(depth);
        metalbinding_release_texture(target);
        pipeline.release();

        metalbinding_arp_drain(ctx.0);
        // Shutdown order used by hosts: end the pool, then destroy.
        metalbinding_arp_deinit(ctx.0);
    }
    assert_eq!(unsafe { (*ctx.0).frame_slots_held() }, 0);
}

#[test]
fn memory_info_reports_working_set() {
    let Some(ctx) = Headless::new() else { return };
    let (mut allocated, mut working_set, mut unified, mut rate) = (0u64, 0u64, u64::MAX, 0u64);
    unsafe {
        metalbinding_get_memory_info(ctx.0, &mut allocated, &mut working_set, &mut unified, &mut rate);
    }
    assert!(working_set > 0);
    assert!(unified <= 1);
}

#[test]
fn null_handles_are_ignored() {
    unsafe {
        metalbinding_destroy(ptr::null_mut());
        metalbinding_release_buffer(ptr::null_mut());
        metalbinding_release_texture(ptr::null_mut());
        metalbinding_copy_to_buffer(ptr::null_mut(), ptr::null(), 0, 0);
        metalbinding_command_encoder_draw(ptr::null_mut(), 3, 1, 0, 0);
        assert_eq!(metalbinding_get_last_error_length(ptr::null_mut()), 0);
        assert!(metalbinding_new_buffer(ptr::null_mut(), 4).is_null());
        assert!(metalbinding_buffer_get_contents(ptr::null_mut()).is_null());
        assert_eq!(metalbinding_get_argument_buffer_size(ptr::null_mut()), 0);
    }
}
