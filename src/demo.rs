//! Reference scene: a textured cube spinning over a floor plane, lit by a
//! shadow-casting sun, a point light and a spot light.

use glam::{Quat, Vec3};

use crate::asset::{Assets, Material, Mesh, MeshBatch, Texture};
use crate::renderer::{
    Attenuation, DirectionalLight, LightColors, PointLight, Renderer, SpotLight,
    DEFAULT_ATTENUATION,
};
use crate::scene::{
    DirectionalLightRenderer, ModelRenderer, PointLightRenderer, Scene, Spin, SpotLightRenderer,
    Transform,
};

pub fn build_scene(scene: &mut Scene, assets: &mut Assets, renderer: &mut Renderer) {
    let device = renderer.device();

    let (cube_vertices, cube_indices) = crate::renderer::primitives::cube_mesh();
    let cube = assets
        .meshes
        .insert(Mesh::from_vertices(device, &cube_vertices, &cube_indices));

    let (plane_vertices, plane_indices) = crate::renderer::primitives::plane_mesh(20.0);
    let floor = assets
        .meshes
        .insert(Mesh::from_vertices(device, &plane_vertices, &plane_indices));

    let checker = assets.textures.insert(checkerboard_texture(renderer));

    let geometry_shader = renderer.geometry_shader();

    // Floor
    let floor_material = Material::default().with_base_color(Vec3::new(0.55, 0.55, 0.6));
    let floor_node = scene.spawn_node("Floor", Transform::default());
    let floor_renderer = ModelRenderer::new(
        vec![MeshBatch::new(floor, floor_material)],
        geometry_shader,
        renderer.shaders_mut(),
    );
    scene
        .world
        .insert_one(floor_node, floor_renderer)
        .expect("floor node was just spawned");

    // Spinning pivot with a textured cube child, to exercise the hierarchy.
    let pivot = scene.spawn_node(
        "Pivot",
        Transform::from_trs(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    scene
        .world
        .insert_one(
            pivot,
            Spin {
                axis: Vec3::Y,
                speed: 0.6,
            },
        )
        .expect("pivot node was just spawned");

    let cube_material = Material::default().with_diffuse(checker);
    let cube_node = scene.spawn_node(
        "Cube",
        Transform::from_trs(Vec3::new(1.5, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    let cube_renderer = ModelRenderer::new(
        vec![MeshBatch::new(cube, cube_material)],
        geometry_shader,
        renderer.shaders_mut(),
    );
    scene
        .world
        .insert_one(cube_node, cube_renderer)
        .expect("cube node was just spawned");
    scene.add_child(pivot, cube_node);

    // Sun with a shadow map.
    let sun = DirectionalLight::new(
        Vec3::new(-0.4, -1.0, -0.3).normalize(),
        LightColors::new(
            Vec3::splat(0.08),
            Vec3::new(0.9, 0.85, 0.7),
            Vec3::splat(0.6),
        ),
    );
    renderer.add_shadow_map(&sun, 15.0, 0.1, 60.0);
    let sun_node = scene.spawn_node("Sun", Transform::default());
    scene
        .world
        .insert_one(sun_node, DirectionalLightRenderer::new(sun))
        .expect("sun node was just spawned");

    // Warm fill point light.
    let fill = PointLight::new(
        Vec3::new(3.0, 3.0, 2.0),
        DEFAULT_ATTENUATION,
        LightColors::new(
            Vec3::splat(0.02),
            Vec3::new(0.9, 0.5, 0.25),
            Vec3::new(0.9, 0.5, 0.25),
        ),
    );
    let fill_node = scene.spawn_node("Fill Light", Transform::default());
    let fill_renderer = PointLightRenderer::new(fill, renderer.lights_mut());
    scene
        .world
        .insert_one(fill_node, fill_renderer)
        .expect("fill node was just spawned");

    // Cool rim spot aimed at the cube.
    let rim_position = Vec3::new(-3.0, 4.0, -2.0);
    let rim = SpotLight::new(
        rim_position,
        (Vec3::new(0.0, 1.0, 0.0) - rim_position).normalize(),
        12.5f32.to_radians(),
        17.5f32.to_radians(),
        Attenuation {
            constant: 1.0,
            linear: 0.045,
            quadratic: 0.0075,
        },
        LightColors::new(Vec3::ZERO, Vec3::new(0.3, 0.5, 0.9), Vec3::new(0.3, 0.5, 0.9)),
    );
    let rim_node = scene.spawn_node("Rim Light", Transform::default());
    let rim_renderer = SpotLightRenderer::new(rim, renderer.lights_mut());
    scene
        .world
        .insert_one(rim_node, rim_renderer)
        .expect("rim node was just spawned");

    log::info!(
        "Demo scene ready: {} meshes, {} point / {} spot lights",
        assets.meshes.len(),
        renderer.lights().point_light_count(),
        renderer.lights().spot_light_count()
    );
}

fn checkerboard_texture(renderer: &Renderer) -> Texture {
    const SIZE: u32 = 64;
    const CELL: u32 = 8;

    let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let even = ((x / CELL) + (y / CELL)) % 2 == 0;
            let value = if even { 220 } else { 90 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }

    Texture::from_rgba8(
        renderer.device(),
        renderer.queue(),
        &pixels,
        SIZE,
        SIZE,
        wgpu::TextureFormat::Rgba8Unorm,
        Some("Checkerboard"),
    )
}
