use std::collections::HashMap;

use crate::asset::{Assets, Material, Texture};

/// Key: (diffuse handle index, specular handle index), None = white fallback.
type MaterialKey = (Option<usize>, Option<usize>);

/// Builds and caches the per-material texture bind group (group 2 of the
/// geometry pass). Materials without a texture in a role get the shared 1x1
/// white fallback, so the shader never branches on texture presence.
pub struct MaterialBinder {
    bind_layout: wgpu::BindGroupLayout,
    fallback: Texture,
    cache: HashMap<MaterialKey, wgpu::BindGroup>,
}

impl MaterialBinder {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MaterialBindLayout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });

        Self {
            bind_layout,
            fallback: Texture::white(device, queue),
            cache: HashMap::new(),
        }
    }

    pub fn bind_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_layout
    }

    pub fn bind_group_for(
        &mut self,
        device: &wgpu::Device,
        assets: &Assets,
        material: &Material,
    ) -> &wgpu::BindGroup {
        let key: MaterialKey = (
            material.diffuse_texture.map(|h| h.index()),
            material.specular_texture.map(|h| h.index()),
        );

        if !self.cache.contains_key(&key) {
            let resolve = |handle: Option<crate::asset::Handle<Texture>>| {
                handle
                    .and_then(|h| assets.textures.get(h))
                    .unwrap_or(&self.fallback)
            };
            let diffuse = resolve(material.diffuse_texture);
            let specular = resolve(material.specular_texture);

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("MaterialBindGroup"),
                layout: &self.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&diffuse.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&specular.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&specular.sampler),
                    },
                ],
            });
            self.cache.insert(key, bind_group);
        }

        &self.cache[&key]
    }
}
