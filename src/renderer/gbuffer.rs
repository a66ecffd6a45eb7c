/// Geometry-pass attachment formats. Position and normal need the float
/// range; albedo + specular-strength packs into 8 bits per channel.
pub const GBUFFER_POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_ALBEDO_SPEC_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const GBUFFER_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The multi-attachment geometry buffer: world position, world normal,
/// albedo+specular, and a depth attachment, all sized to the viewport.
/// Written by the geometry pass, read (via `bind_group`) by the lighting
/// pass only.
pub struct GBuffer {
    width: u32,
    height: u32,
    position: wgpu::TextureView,
    normal: wgpu::TextureView,
    albedo_spec: wgpu::TextureView,
    depth: wgpu::TextureView,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let bind_layout = Self::create_bind_layout(device);

        let (width, height) = (width.max(1), height.max(1));
        let (position, normal, albedo_spec, depth) = Self::create_attachments(device, width, height);
        let bind_group =
            Self::create_bind_group(device, &bind_layout, &position, &normal, &albedo_spec);

        Self {
            width,
            height,
            position,
            normal,
            albedo_spec,
            depth,
            bind_layout,
            bind_group,
        }
    }

    /// Reallocates every attachment at the new size with its original format
    /// and rebuilds the lighting-pass bind group. The previous attachments
    /// stay untouched until the whole set is ready, so no caller observes a
    /// half-resized buffer.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        let (position, normal, albedo_spec, depth) = Self::create_attachments(device, width, height);
        self.bind_group =
            Self::create_bind_group(device, &self.bind_layout, &position, &normal, &albedo_spec);
        self.position = position;
        self.normal = normal;
        self.albedo_spec = albedo_spec;
        self.depth = depth;
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn position_view(&self) -> &wgpu::TextureView {
        &self.position
    }

    pub fn normal_view(&self) -> &wgpu::TextureView {
        &self.normal
    }

    pub fn albedo_spec_view(&self) -> &wgpu::TextureView {
        &self.albedo_spec
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    pub fn bind_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    fn create_attachments(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (
        wgpu::TextureView,
        wgpu::TextureView,
        wgpu::TextureView,
        wgpu::TextureView,
    ) {
        let attachment = |label: &str, format: wgpu::TextureFormat| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        (
            attachment("GBufferPosition", GBUFFER_POSITION_FORMAT),
            attachment("GBufferNormal", GBUFFER_NORMAL_FORMAT),
            attachment("GBufferAlbedoSpec", GBUFFER_ALBEDO_SPEC_FORMAT),
            attachment("GBufferDepth", GBUFFER_DEPTH_FORMAT),
        )
    }

    fn create_bind_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        // The lighting pass reads these with textureLoad at the fragment
        // coordinate, so no sampler binding is needed.
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBufferBindLayout"),
            entries: &[texture_entry(0), texture_entry(1), texture_entry(2)],
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        position: &wgpu::TextureView,
        normal: &wgpu::TextureView,
        albedo_spec: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBufferBindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(position),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(albedo_spec),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_formats_are_stable() {
        // The lighting shader depends on these; changing one is a contract
        // break, not a tweak.
        assert_eq!(GBUFFER_POSITION_FORMAT, wgpu::TextureFormat::Rgba16Float);
        assert_eq!(GBUFFER_NORMAL_FORMAT, wgpu::TextureFormat::Rgba16Float);
        assert_eq!(GBUFFER_ALBEDO_SPEC_FORMAT, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(GBUFFER_DEPTH_FORMAT, wgpu::TextureFormat::Depth32Float);
    }
}
