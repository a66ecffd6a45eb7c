//! Scene-graph walks exercised through the public API: draw collection under
//! propagated transforms, light bookkeeping, and enable/disable semantics.

use glam::{Mat4, Quat, Vec3};

use wgpu_deferred::asset::{Handle, Material, MeshBatch};
use wgpu_deferred::renderer::{
    DirectionalLight, DrawList, FrameLights, LightColors, LightRegistry, PointLight,
    ShaderId, ShaderRegistry, SpotLight, DEFAULT_ATTENUATION,
};
use wgpu_deferred::scene::{
    DirectionalLightRenderer, ModelRenderer, PointLightRenderer, Scene, SpotLightRenderer,
    Transform,
};

fn colors() -> LightColors {
    LightColors::new(Vec3::splat(0.05), Vec3::splat(0.8), Vec3::ONE)
}

fn model(shaders: &mut ShaderRegistry) -> ModelRenderer {
    let batch = MeshBatch::new(Handle::new(0), Material::default());
    ModelRenderer::new(vec![batch], ShaderId(0), shaders)
}

#[test]
fn draw_collection_uses_propagated_world_matrices() {
    let mut scene = Scene::new();
    let mut shaders = ShaderRegistry::new();

    let parent = scene.spawn_node(
        "parent",
        Transform::from_trs(Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    let child = scene.spawn_node(
        "child",
        Transform::from_trs(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    scene.add_child(parent, child);
    scene.world.insert_one(child, model(&mut shaders)).unwrap();

    scene.propagate_transforms();

    let mut draws = DrawList::new();
    scene.collect_draws(&mut draws);

    assert_eq!(draws.len(), 1);
    let world = draws.items()[0].model;
    let expected = Mat4::from_translation(Vec3::new(7.0, 0.0, 0.0));
    assert!(world.abs_diff_eq(expected, 1e-5));
}

#[test]
fn parents_are_collected_before_children() {
    let mut scene = Scene::new();
    let mut shaders = ShaderRegistry::new();

    let parent = scene.spawn_node(
        "parent",
        Transform::from_trs(Vec3::X, Quat::IDENTITY, Vec3::ONE),
    );
    let child = scene.spawn_node(
        "child",
        Transform::from_trs(Vec3::Y, Quat::IDENTITY, Vec3::ONE),
    );
    scene.add_child(parent, child);
    scene.world.insert_one(parent, model(&mut shaders)).unwrap();
    scene.world.insert_one(child, model(&mut shaders)).unwrap();

    scene.propagate_transforms();

    let mut draws = DrawList::new();
    scene.collect_draws(&mut draws);

    assert_eq!(draws.len(), 2);
    let first = draws.items()[0].model.w_axis.truncate();
    let second = draws.items()[1].model.w_axis.truncate();
    assert!(first.abs_diff_eq(Vec3::X, 1e-5));
    assert!(second.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
}

#[test]
fn stale_nodes_are_skipped_not_drawn() {
    let mut scene = Scene::new();
    let mut shaders = ShaderRegistry::new();

    let node = scene.spawn_node("node", Transform::default());
    scene.world.insert_one(node, model(&mut shaders)).unwrap();

    // No propagation ran yet; the transform is still dirty.
    let mut draws = DrawList::new();
    scene.collect_draws(&mut draws);
    assert!(draws.is_empty());

    scene.propagate_transforms();
    scene.collect_draws(&mut draws);
    assert_eq!(draws.len(), 1);
}

#[test]
fn disabled_model_renderers_contribute_nothing() {
    let mut scene = Scene::new();
    let mut shaders = ShaderRegistry::new();

    let node = scene.spawn_node("node", Transform::default());
    let mut renderer = model(&mut shaders);
    renderer.disable();
    scene.world.insert_one(node, renderer).unwrap();
    scene.propagate_transforms();

    let mut draws = DrawList::new();
    scene.collect_draws(&mut draws);
    assert!(draws.is_empty());
}

#[test]
fn light_walk_fills_slots_by_construction_index() {
    let mut scene = Scene::new();
    let mut lights = LightRegistry::new();

    for i in 0..3 {
        let light = PointLight::new(
            Vec3::new(i as f32, 0.0, 0.0),
            DEFAULT_ATTENUATION,
            colors(),
        );
        let renderer = PointLightRenderer::new(light, &mut lights);
        let node = scene.spawn_node(format!("point {i}"), Transform::default());
        scene.world.insert_one(node, renderer).unwrap();
    }

    let sun_node = scene.spawn_node("sun", Transform::default());
    scene
        .world
        .insert_one(
            sun_node,
            DirectionalLightRenderer::new(DirectionalLight::new(Vec3::NEG_Y, colors())),
        )
        .unwrap();

    let mut frame = FrameLights::new();
    scene.collect_lights(&mut frame);
    frame.set_counts(lights.point_light_count(), lights.spot_light_count());

    assert_eq!(frame.point_count(), 3);
    assert!(frame.directional().is_some());
    for i in 0..3 {
        let slot = frame.point(i).unwrap();
        assert_eq!(slot.position.x, i as f32);
    }
}

#[test]
fn disabling_a_spot_light_zeroes_its_slot_until_reenabled() {
    let mut scene = Scene::new();
    let mut lights = LightRegistry::new();

    let spot = SpotLight::new(
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::NEG_Y,
        12.5f32.to_radians(),
        17.5f32.to_radians(),
        DEFAULT_ATTENUATION,
        colors(),
    );
    let renderer = SpotLightRenderer::new(spot, &mut lights);
    let node = scene.spawn_node("spot", Transform::default());
    scene.world.insert_one(node, renderer).unwrap();

    scene
        .world
        .get::<&mut SpotLightRenderer>(node)
        .unwrap()
        .disable();

    let mut frame = FrameLights::new();
    scene.collect_lights(&mut frame);
    frame.set_counts(0, lights.spot_light_count());

    // The slot still gets pushed, but with zeroed contribution.
    let pushed = frame.spot(0).unwrap();
    assert_eq!(pushed.colors.ambient, Vec3::ZERO);
    assert_eq!(pushed.colors.diffuse, Vec3::ZERO);
    assert_eq!(pushed.colors.specular, Vec3::ZERO);

    scene
        .world
        .get::<&mut SpotLightRenderer>(node)
        .unwrap()
        .enable();

    let mut frame = FrameLights::new();
    scene.collect_lights(&mut frame);
    assert_eq!(frame.spot(0).unwrap().colors, colors());
}

#[test]
fn spot_counter_and_indices_stay_in_sync_across_kinds() {
    let mut lights = LightRegistry::new();
    let mut spot_renderers = Vec::new();
    for _ in 0..4 {
        let spot = SpotLight::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            0.2,
            0.4,
            DEFAULT_ATTENUATION,
            colors(),
        );
        spot_renderers.push(SpotLightRenderer::new(spot, &mut lights));
    }

    let indices: Vec<u32> = spot_renderers.iter().map(|r| r.shader_index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert_eq!(lights.spot_light_count(), 4);
    assert_eq!(lights.point_light_count(), 0);
}
