//! SceneRenderer tests
//!
//! Tests for:
//! - Single opaque triangle: one draw, no optional shader flags
//! - Opaque / blended partition and depth ordering
//! - Skinning defines and joint matrix uploads
//! - Primitives skipped for unreadable data or undecoded textures
//! - Material extensions selecting shader blocks and texture bindings
//! - Render state derivation (culling, blending, mirrored transforms)
//! - Option-driven flags (punctual lights, tone mapping, debug output)
//! - Teardown releasing device objects

mod common;

use anyhow::Result;
use common::{
    RecordingDevice, blended_instances_gltf, mixed_opaque_blended_gltf, skinned_triangle_gltf, textured_triangle_gltf,
    triangle_gltf,
};
use glam::Vec3;
use lumen::renderer::SceneRenderer;
use lumen::resources::texture::Image;
use lumen::renderer::settings::{CameraSelector, DebugOutput, RenderingOptions, ToneMap};
use lumen::scene::{UserCamera, sort_by_depth};
use lumen::{GltfLoader, Viewer};

fn load(json: &str) -> Result<lumen::GltfAsset> {
    common::init_logging();
    Ok(GltfLoader::new().load_slice(json.as_bytes(), None)?)
}

// ============================================================================
// Single primitive
// ============================================================================

#[test]
fn opaque_triangle_issues_exactly_one_draw() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    let draws = device.last_frame();
    assert_eq!(draws.len(), 1);
    assert_eq!(renderer.stats().draws, 1);
    assert_eq!(renderer.stats().skipped, 0);

    let draw = &draws[0];
    assert_eq!(draw.vertex_buffers.len(), 1, "POSITION only");
    assert_eq!(draw.index.map(|i| i.count), Some(3));
    assert!(draw.textures.is_empty());
    assert!(!draw.state.blend);
    assert!(draw.state.cull_back);
    assert!(!draw.state.front_face_cw);

    let (vertex, fragment) = device.program_sources(draw.program);
    for optional in ["a_Normal", "a_Tangent", "a_UV1", "u_jointMatrix", "u_morphWeights"] {
        assert!(!vertex.contains(optional), "vertex stage declares {optional}");
    }
    for optional in ["u_Lights", "u_BaseColorSampler", "u_GGXLUT", "toneMapACES(exposed)"] {
        assert!(!fragment.contains(optional), "fragment stage uses {optional}");
    }
    Ok(())
}

#[test]
fn second_frame_reuses_cached_variants_and_buffers() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions::default();
    let camera = UserCamera::default();

    renderer.render(&mut asset, &mut device, &options, &camera);
    let compiles = device.compile_calls;
    let buffers = device.buffers.len();

    renderer.render(&mut asset, &mut device, &options, &camera);
    assert_eq!(device.frames.len(), 2);
    assert_eq!(device.compile_calls, compiles);
    assert_eq!(device.buffers.len(), buffers);
    assert_eq!(device.last_frame().len(), 1);
    Ok(())
}

#[test]
fn uniform_blocks_match_reflected_sizes() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    let draw = &device.last_frame()[0];
    // view-projection, model and normal matrices
    assert_eq!(draw.vertex_uniforms.len(), 3 * 64);
    assert!(!draw.fragment_uniforms.is_empty());
    Ok(())
}

#[test]
fn unreadable_index_accessor_skips_the_primitive() -> Result<()> {
    let json = triangle_gltf().replace(r#""bufferView": 1, "componentType": 5123"#, r#""bufferView": 9, "componentType": 5123"#);
    let mut asset = load(&json)?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert!(device.last_frame().is_empty());
    assert_eq!(renderer.stats().draws, 0);
    assert_eq!(renderer.stats().skipped, 1);
    Ok(())
}

#[test]
fn undecoded_material_texture_skips_the_primitive() -> Result<()> {
    let mut asset = load(&textured_triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert!(device.last_frame().is_empty());
    assert_eq!(renderer.stats().draws, 0);
    assert_eq!(renderer.stats().skipped, 1);
    assert!(device.textures.is_empty(), "nothing is bound in place of the missing image");
    Ok(())
}

#[test]
fn decoded_material_texture_is_bound_by_sampler_name() -> Result<()> {
    let mut asset = load(&textured_triangle_gltf())?;
    asset.set_image(0, Image::new_rgba8(2, 2, vec![200; 16]).expect("2x2 rgba"))?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert_eq!(renderer.stats().draws, 1);
    let draw = &device.last_frame()[0];
    assert_eq!(draw.textures.len(), 1);
    assert_eq!(draw.textures[0].binding, 6);
    assert_eq!(device.textures.get(draw.textures[0].texture), Some(&(2, 2)));
    let (_, fragment) = device.program_sources(draw.program);
    assert!(fragment.contains("u_BaseColorSampler"));
    Ok(())
}

#[test]
fn extension_materials_drive_shader_and_bindings() -> Result<()> {
    let json = textured_triangle_gltf().replace(
        r#""pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }"#,
        r#""extensions": {
            "KHR_materials_pbrSpecularGlossiness": { "diffuseTexture": { "index": 0 }, "glossinessFactor": 0.5 },
            "KHR_materials_clearcoat": { "clearcoatFactor": 1.0 },
            "KHR_materials_sheen": { "sheenColorFactor": [1, 1, 1] }
        }"#,
    );
    let mut asset = load(&json)?;
    asset.set_image(0, Image::new_rgba8(2, 2, vec![200; 16]).expect("2x2 rgba"))?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert_eq!(renderer.stats().draws, 1);
    let draw = &device.last_frame()[0];
    assert_eq!(draw.textures.len(), 1);
    assert_eq!(draw.textures[0].binding, 16);

    let (_, fragment) = device.program_sources(draw.program);
    assert!(fragment.contains("u_DiffuseSampler"));
    assert!(fragment.contains("u_GlossinessFactor: f32"));
    assert!(fragment.contains("u_ClearcoatFactor: f32"));
    assert!(fragment.contains("fn BRDF_specularSheen"));
    assert!(!fragment.contains("u_BaseColorSampler"));
    Ok(())
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn depth_sort_discards_points_behind_camera() {
    let sorted = sort_by_depth(vec![(-1.0, 'a'), (2.0, 'b'), (5.0, 'c')]);
    let depths: Vec<f32> = sorted.iter().map(|(d, _)| *d).collect();
    assert_eq!(depths, vec![5.0, 2.0]);
}

#[test]
fn blended_primitives_draw_furthest_first() -> Result<()> {
    let mut asset = load(&blended_instances_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    let lists = renderer.render_lists();
    assert!(lists.opaque.is_empty());
    let order: Vec<usize> = lists.transparent.iter().map(|item| item.node).collect();
    assert_eq!(order, vec![1, 0], "far before near, node behind the camera dropped");

    let draws = device.last_frame();
    assert_eq!(draws.len(), 2);
    assert!(draws.iter().all(|d| d.state.blend));
    assert!(draws.iter().all(|d| !d.state.cull_back), "double-sided disables culling");
    Ok(())
}

#[test]
fn opaque_draws_precede_sorted_blended_draws() -> Result<()> {
    let mut asset = load(&mixed_opaque_blended_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    let lists = renderer.render_lists();
    let opaque: Vec<usize> = lists.opaque.iter().map(|item| item.node).collect();
    let transparent: Vec<usize> = lists.transparent.iter().map(|item| item.node).collect();
    assert_eq!(opaque, vec![1]);
    assert_eq!(transparent, vec![2, 0]);

    let blend: Vec<bool> = device.last_frame().iter().map(|d| d.state.blend).collect();
    assert_eq!(blend, vec![false, true, true]);
    Ok(())
}

// ============================================================================
// Skinning
// ============================================================================

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn skinned_primitive_uploads_joint_matrices() -> Result<()> {
    let mut asset = load(&skinned_triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert_eq!(renderer.stats().draws, 1);
    let draw = &device.last_frame()[0];
    assert_eq!(draw.vertex_buffers.len(), 3, "POSITION, JOINTS_0, WEIGHTS_0");

    let (vertex, _) = device.program_sources(draw.program);
    assert!(vertex.contains("u_jointMatrix: array<mat4x4<f32>, 1>"));
    assert!(vertex.contains("a_Joint1: vec4<u32>"));
    assert!(vertex.contains("a_Weight1: vec4<f32>"));

    // three matrices, then one joint matrix and one joint normal matrix
    assert_eq!(draw.vertex_uniforms.len(), 5 * 64);
    let joint = floats(&draw.vertex_uniforms[3 * 64..4 * 64]);
    assert_eq!(&joint[12..16], &[0.0, 1.0, 0.0, 1.0], "joint translation reaches the shader");
    Ok(())
}

#[test]
fn disabled_skinning_drops_the_joint_uniforms() -> Result<()> {
    let mut asset = load(&skinned_triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions {
        skinning: false,
        ..RenderingOptions::default()
    };

    renderer.render(&mut asset, &mut device, &options, &UserCamera::default());

    let draw = &device.last_frame()[0];
    let (vertex, _) = device.program_sources(draw.program);
    assert!(!vertex.contains("u_jointMatrix"));
    assert_eq!(draw.vertex_uniforms.len(), 3 * 64);
    Ok(())
}

#[test]
fn mirrored_node_flips_front_face() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    asset.nodes[0].transform.scale = Vec3::new(-1.0, 1.0, 1.0);
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;

    renderer.render(&mut asset, &mut device, &RenderingOptions::default(), &UserCamera::default());

    assert!(device.last_frame()[0].state.front_face_cw);
    Ok(())
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn punctual_lighting_declares_default_light() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions {
        use_punctual: true,
        tone_map: ToneMap::Aces,
        ..RenderingOptions::default()
    };

    renderer.render(&mut asset, &mut device, &options, &UserCamera::default());

    let draw = &device.last_frame()[0];
    let (_, fragment) = device.program_sources(draw.program);
    assert!(fragment.contains("u_Lights: array<Light, 1>"));
    assert!(fragment.contains("return toneMapACES(exposed);"));
    Ok(())
}

#[test]
fn debug_output_replaces_lit_color() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions {
        debug_output: DebugOutput::Normal,
        ..RenderingOptions::default()
    };

    renderer.render(&mut asset, &mut device, &options, &UserCamera::default());

    let (_, fragment) = device.program_sources(device.last_frame()[0].program);
    assert!(fragment.contains("debugColor = n * 0.5"));
    assert!(!fragment.contains("toneMap(color)"));
    Ok(())
}

#[test]
fn missing_scene_renders_empty_frame() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions {
        scene_index: 4,
        ..RenderingOptions::default()
    };

    renderer.render(&mut asset, &mut device, &options, &UserCamera::default());

    assert_eq!(device.frames.len(), 1);
    assert!(device.last_frame().is_empty());
    Ok(())
}

#[test]
fn unknown_authored_camera_falls_back_to_user_camera() -> Result<()> {
    let mut asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut renderer = SceneRenderer::new()?;
    let options = RenderingOptions {
        camera: CameraSelector::Index(3),
        ..RenderingOptions::default()
    };

    renderer.render(&mut asset, &mut device, &options, &UserCamera::default());
    assert_eq!(device.last_frame().len(), 1);
    Ok(())
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn destroy_releases_every_device_object() -> Result<()> {
    let asset = load(&triangle_gltf())?;
    let mut device = RecordingDevice::new();
    let mut viewer = Viewer::new(asset)?;

    viewer.render(&mut device, &RenderingOptions::default());
    assert!(!device.shaders.is_empty());
    assert!(!device.buffers.is_empty());

    viewer.destroy(&mut device);
    assert!(device.shaders.is_empty());
    assert!(device.programs.is_empty());
    assert!(device.buffers.is_empty());
    assert!(device.textures.is_empty());
    Ok(())
}
