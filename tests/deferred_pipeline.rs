//! CPU-side checks of the deferred pipeline contracts: pass ordering and the
//! shadow projection math the shaders rely on. No GPU device is created.

use glam::{Mat4, Vec2, Vec3};

use wgpu_deferred::renderer::shadow::{light_space_matrix, ShadowMap, ShadowsUniform};
use wgpu_deferred::renderer::timeline::{
    frame_passes, stamp_pass, PassEvent, PassTimeline, TargetId,
};

const EPSILON: f32 = 1e-5;

/// Mirror of the lighting shader's shadow-map UV mapping: clip -> NDC ->
/// texture coordinates with the Y axis flipped.
fn project_shadow_cpu(matrix: Mat4, world_pos: Vec3) -> Vec3 {
    let clip = matrix * world_pos.extend(1.0);
    if clip.w <= 0.0 {
        return Vec3::splat(-1.0);
    }
    let ndc = clip.truncate() / clip.w;
    Vec3::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5, ndc.z)
}

#[test]
fn shadow_projection_lands_in_texture_range_for_scene_points() {
    let direction = Vec3::new(0.4, -1.0, 0.2).normalize();
    let matrix = light_space_matrix(direction, 15.0, 0.1, 60.0);

    let samples = [
        Vec3::new(-3.5, 0.0, -2.0),
        Vec3::new(2.0, 1.0, 4.0),
        Vec3::new(4.5, -0.5, -3.0),
        Vec3::ZERO,
    ];

    for world_pos in samples {
        let projected = project_shadow_cpu(matrix, world_pos);
        assert!(projected.x >= -EPSILON && projected.x <= 1.0 + EPSILON);
        assert!(projected.y >= -EPSILON && projected.y <= 1.0 + EPSILON);
        assert!(projected.z >= -EPSILON && projected.z <= 1.0 + EPSILON);
    }
}

#[test]
fn shadow_texture_axis_is_flipped_from_clip_space() {
    let direction = Vec3::new(0.0, -1.0, 0.0);
    let matrix = light_space_matrix(direction, 15.0, 0.1, 60.0);

    // With a straight-down light the up fallback is +Z.
    let top_world = Vec3::new(0.0, 0.0, 5.0);
    let bottom_world = Vec3::new(0.0, 0.0, -5.0);

    let ndc_top = (matrix * top_world.extend(1.0)).truncate();
    let ndc_bottom = (matrix * bottom_world.extend(1.0)).truncate();
    assert!(ndc_top.y > ndc_bottom.y);

    let tex_top = project_shadow_cpu(matrix, top_world);
    let tex_bottom = project_shadow_cpu(matrix, bottom_world);
    assert!(tex_top.y < tex_bottom.y);
}

#[test]
fn shadow_projection_is_centered_on_the_focus() {
    let direction = Vec3::new(-0.3, -1.0, 0.5).normalize();
    let matrix = light_space_matrix(direction, 20.0, 0.1, 80.0);

    let uv = project_shadow_cpu(matrix, Vec3::ZERO);
    assert!(
        Vec2::new(uv.x, uv.y).abs_diff_eq(Vec2::splat(0.5), 1e-4),
        "focus projected to {:?}",
        uv
    );
}

#[test]
fn points_outside_the_frustum_project_outside_the_map() {
    let direction = Vec3::new(0.0, -1.0, 0.0);
    let size = 10.0;
    let matrix = light_space_matrix(direction, size, 0.1, 60.0);

    let outside = Vec3::new(size * 3.0, 0.0, 0.0);
    let projected = project_shadow_cpu(matrix, outside);
    assert!(projected.x < 0.0 || projected.x > 1.0);
}

#[test]
fn shadows_uniform_indices_match_map_order() {
    let maps = vec![
        ShadowMap::new(0, Vec3::NEG_Y, 10.0, 0.1, 50.0),
        ShadowMap::new(1, Vec3::new(0.5, -1.0, 0.0).normalize(), 30.0, 0.1, 120.0),
    ];
    let uniform = ShadowsUniform::from_maps(&maps);

    assert_eq!(uniform.counts[0], 2);
    for map in &maps {
        assert_eq!(
            uniform.u_light_vp[map.index() as usize],
            map.view_proj().to_cols_array_2d()
        );
    }
}

#[test]
fn frame_pass_order_writes_every_input_before_lighting_reads_it() {
    for shadow_count in 0..4u32 {
        let mut timeline = PassTimeline::new();
        timeline.begin_frame();
        for pass in frame_passes(shadow_count, true) {
            stamp_pass(&mut timeline, pass);
        }

        assert!(timeline.written_before_read(TargetId::GBuffer));
        for index in 0..shadow_count {
            assert!(timeline.written_before_read(TargetId::ShadowMap(index)));
        }
        assert!(timeline.written_before_read(TargetId::SceneColor));
    }
}

#[test]
fn shadow_passes_run_between_geometry_and_lighting() {
    let passes = frame_passes(3, false);

    let geometry_at = passes
        .iter()
        .position(|p| *p == PassEvent::Geometry)
        .unwrap();
    let lighting_at = passes
        .iter()
        .position(|p| *p == PassEvent::Lighting)
        .unwrap();

    for (at, pass) in passes.iter().enumerate() {
        if let PassEvent::Shadow(_) = pass {
            assert!(geometry_at < at && at < lighting_at);
        }
    }
}

#[test]
fn repeated_frames_keep_the_ordering_invariant() {
    let mut timeline = PassTimeline::new();
    for _ in 0..3 {
        timeline.begin_frame();
        for pass in frame_passes(2, true) {
            stamp_pass(&mut timeline, pass);
        }
        assert!(timeline.written_before_read(TargetId::GBuffer));
        assert!(timeline.written_before_read(TargetId::ShadowMap(1)));
    }
}
