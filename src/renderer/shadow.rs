use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::lights::MAX_SHADOW_MAPS;

pub const SHADOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Light-space view-projection for a directional shadow frustum: an
/// orthographic box of half-extent `projection_size` looking along
/// `direction` at the scene origin. wgpu depth range, 0 at near.
pub fn light_space_matrix(direction: Vec3, projection_size: f32, near: f32, far: f32) -> Mat4 {
    let direction = if direction.length_squared() > 1e-8 {
        direction.normalize()
    } else {
        Vec3::NEG_Y
    };

    let focus = Vec3::ZERO;
    let eye = focus - direction * (far * 0.5);
    let up = if direction.abs().dot(Vec3::Y) > 0.95 {
        Vec3::Z
    } else {
        Vec3::Y
    };

    let view = Mat4::look_at_rh(eye, focus, up);
    let projection = Mat4::orthographic_rh(
        -projection_size,
        projection_size,
        -projection_size,
        projection_size,
        near,
        far,
    );
    projection * view
}

/// One depth-only shadow target: a layer of the renderer's shadow texture
/// array plus the light-space matrix the shadow and lighting passes share.
/// Its position in the renderer's list is its layer index, its slot in
/// `u_lightVP[i]`, and its `shadowMaps` array layer, which stay in sync
/// by construction.
#[derive(Clone, Copy, Debug)]
pub struct ShadowMap {
    index: u32,
    direction: Vec3,
    projection_size: f32,
    near: f32,
    far: f32,
    view_proj: Mat4,
}

impl ShadowMap {
    pub fn new(index: u32, direction: Vec3, projection_size: f32, near: f32, far: f32) -> Self {
        Self {
            index,
            direction,
            projection_size,
            near,
            far,
            view_proj: light_space_matrix(direction, projection_size, near, far),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Recompute the matrix for a moved light.
    pub fn relight(&mut self, direction: Vec3) {
        self.direction = direction;
        self.view_proj =
            light_space_matrix(self.direction, self.projection_size, self.near, self.far);
    }

    /// Recompute the matrix for new frustum parameters.
    pub fn set_projection(&mut self, projection_size: f32, near: f32, far: f32) {
        self.projection_size = projection_size;
        self.near = near;
        self.far = far;
        self.view_proj =
            light_space_matrix(self.direction, self.projection_size, self.near, self.far);
    }
}

/// Per-index light-space matrices for the lighting pass, mirroring the WGSL
/// `u_lightVP` array.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ShadowsUniform {
    pub u_light_vp: [[[f32; 4]; 4]; MAX_SHADOW_MAPS],
    /// populated count, unused x3
    pub counts: [u32; 4],
}

impl ShadowsUniform {
    pub fn from_maps(maps: &[ShadowMap]) -> Self {
        let mut uniform = Self::zeroed();
        for map in maps.iter().take(MAX_SHADOW_MAPS) {
            uniform.u_light_vp[map.index() as usize] = map.view_proj().to_cols_array_2d();
        }
        uniform.counts[0] = maps.len().min(MAX_SHADOW_MAPS) as u32;
        uniform
    }
}

/// GPU storage for every shadow map: one Depth32Float texture array with a
/// render view per layer, the comparison sampler, and the matrix uniform the
/// lighting pass binds.
pub struct ShadowAtlas {
    size: u32,
    array_view: wgpu::TextureView,
    layer_views: Vec<wgpu::TextureView>,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShadowAtlas {
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ShadowBindLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ShadowsUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ShadowUniformBuffer"),
            size: std::mem::size_of::<ShadowsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let size = size.max(1);
        let (array_view, layer_views) = Self::create_array(device, size);
        let bind_group = Self::create_bind_group(
            device,
            &bind_layout,
            &array_view,
            &sampler,
            &uniform_buffer,
        );

        Self {
            size,
            array_view,
            layer_views,
            sampler,
            uniform_buffer,
            bind_layout,
            bind_group,
        }
    }

    /// Reallocates the depth array (all layers) at the new resolution and
    /// rebuilds the views and bind group together.
    pub fn resize(&mut self, device: &wgpu::Device, size: u32) {
        let size = size.max(1);
        let (array_view, layer_views) = Self::create_array(device, size);
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_layout,
            &array_view,
            &self.sampler,
            &self.uniform_buffer,
        );
        self.array_view = array_view;
        self.layer_views = layer_views;
        self.size = size;
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layer_view(&self, index: u32) -> &wgpu::TextureView {
        let clamped = (index as usize).min(self.layer_views.len() - 1);
        if clamped != index as usize {
            log::warn!(
                "shadow layer {} clamped to {} (capacity {})",
                index,
                clamped,
                self.layer_views.len()
            );
        }
        &self.layer_views[clamped]
    }

    pub fn bind_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn write_uniform(&self, queue: &wgpu::Queue, maps: &[ShadowMap]) {
        let uniform = ShadowsUniform::from_maps(maps);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    fn create_array(
        device: &wgpu::Device,
        size: u32,
    ) -> (wgpu::TextureView, Vec<wgpu::TextureView>) {
        let layers = MAX_SHADOW_MAPS as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ShadowMapArray"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("ShadowMapArrayView"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            base_array_layer: 0,
            array_layer_count: Some(layers),
            ..Default::default()
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("ShadowMapLayer{layer}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        (array_view, layer_views)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        array_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ShadowBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn light_direction_maps_to_negative_z_in_light_space() {
        let direction = Vec3::new(0.4, -1.0, 0.2).normalize();
        let matrix = light_space_matrix(direction, 15.0, 0.1, 60.0);

        let projection = Mat4::orthographic_rh(-15.0, 15.0, -15.0, 15.0, 0.1, 60.0);
        let view = projection.inverse() * matrix;
        let dir_in_view = view.transform_vector3(direction).normalize();
        assert!(dir_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
    }

    #[test]
    fn depth_spans_wgpu_zero_to_one_range() {
        let direction = Vec3::new(0.0, -1.0, 0.3).normalize();
        let near = 0.1;
        let far = 60.0;
        let matrix = light_space_matrix(direction, 20.0, near, far);

        let eye = -direction * (far * 0.5);
        let near_world = eye + direction * near;
        let far_world = eye + direction * far;

        let ndc_near = matrix.project_point3(near_world);
        let ndc_far = matrix.project_point3(far_world);
        assert!((ndc_near.z - 0.0).abs() < 1e-4, "near depth {}", ndc_near.z);
        assert!((ndc_far.z - 1.0).abs() < 1e-4, "far depth {}", ndc_far.z);
    }

    #[test]
    fn straight_down_light_gets_a_stable_up_vector() {
        let matrix = light_space_matrix(Vec3::NEG_Y, 10.0, 0.1, 50.0);
        let origin = matrix.project_point3(Vec3::ZERO);
        assert!(origin.x.abs() < EPS && origin.y.abs() < EPS);
    }

    #[test]
    fn relight_recomputes_the_matrix() {
        let mut map = ShadowMap::new(0, Vec3::NEG_Y, 10.0, 0.1, 50.0);
        let before = map.view_proj();
        map.relight(Vec3::new(1.0, -1.0, 0.0).normalize());
        assert!(!map.view_proj().abs_diff_eq(before, EPS));
    }

    #[test]
    fn set_projection_recomputes_the_matrix() {
        let mut map = ShadowMap::new(0, Vec3::NEG_Y, 10.0, 0.1, 50.0);
        let before = map.view_proj();
        map.set_projection(20.0, 0.1, 50.0);
        assert!(!map.view_proj().abs_diff_eq(before, EPS));
    }

    #[test]
    fn uniform_places_matrices_by_map_index() {
        let maps = vec![
            ShadowMap::new(0, Vec3::NEG_Y, 10.0, 0.1, 50.0),
            ShadowMap::new(1, Vec3::new(1.0, -1.0, 0.0).normalize(), 25.0, 0.1, 100.0),
        ];
        let uniform = ShadowsUniform::from_maps(&maps);
        assert_eq!(uniform.counts[0], 2);
        assert_eq!(
            uniform.u_light_vp[1],
            maps[1].view_proj().to_cols_array_2d()
        );
        assert_eq!(uniform.u_light_vp[2], [[0.0; 4]; 4]);
    }
}
