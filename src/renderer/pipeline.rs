use crate::renderer::gbuffer::{
    GBUFFER_ALBEDO_SPEC_FORMAT, GBUFFER_DEPTH_FORMAT, GBUFFER_NORMAL_FORMAT,
    GBUFFER_POSITION_FORMAT,
};
use crate::renderer::shaders::ShaderSet;
use crate::renderer::shadow::SHADOW_DEPTH_FORMAT;
use crate::renderer::target::SCENE_COLOR_FORMAT;
use crate::renderer::Vertex;

/// The fixed pipelines of the deferred path, one per pass kind.
pub struct Pipelines {
    pub geometry: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub lighting: wgpu::RenderPipeline,
    pub blit: wgpu::RenderPipeline,
}

pub struct PipelineLayouts<'a> {
    pub globals: &'a wgpu::BindGroupLayout,
    pub objects: &'a wgpu::BindGroupLayout,
    pub material: &'a wgpu::BindGroupLayout,
    pub lights: &'a wgpu::BindGroupLayout,
    pub gbuffer: &'a wgpu::BindGroupLayout,
    pub shadow_atlas: &'a wgpu::BindGroupLayout,
    pub shadow_view: &'a wgpu::BindGroupLayout,
    pub scene_target: &'a wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        layouts: &PipelineLayouts<'_>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            geometry: Self::geometry_pipeline(device, shaders, layouts),
            shadow: Self::shadow_pipeline(device, shaders, layouts),
            lighting: Self::lighting_pipeline(device, shaders, layouts),
            blit: Self::blit_pipeline(device, shaders, layouts, surface_format),
        }
    }

    /// Writes the three G-buffer attachments plus depth. Back-face culling,
    /// as for any opaque geometry.
    fn geometry_pipeline(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        layouts: &PipelineLayouts<'_>,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GeometryPipelineLayout"),
            bind_group_layouts: &[layouts.globals, layouts.objects, layouts.material],
            push_constant_ranges: &[],
        });

        let color_target = |format: wgpu::TextureFormat| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("GeometryPipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shaders.geometry.module(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shaders.geometry.module(),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[
                    color_target(GBUFFER_POSITION_FORMAT),
                    color_target(GBUFFER_NORMAL_FORMAT),
                    color_target(GBUFFER_ALBEDO_SPEC_FORMAT),
                ],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: GBUFFER_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Depth-only into a shadow map layer. Front faces are culled so the
    /// depth test resolves against back faces, which trims self-shadow acne
    /// at the cost of light leaking on thin geometry.
    fn shadow_pipeline(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        layouts: &PipelineLayouts<'_>,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShadowPipelineLayout"),
            bind_group_layouts: &[layouts.shadow_view, layouts.objects],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ShadowPipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shaders.shadow.module(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Full-screen quad over the G-buffer, writing the scene color target.
    fn lighting_pipeline(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        layouts: &PipelineLayouts<'_>,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("LightingPipelineLayout"),
            bind_group_layouts: &[
                layouts.globals,
                layouts.lights,
                layouts.gbuffer,
                layouts.shadow_atlas,
            ],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("LightingPipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shaders.lighting.module(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shaders.lighting.module(),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SCENE_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Scene target to window surface.
    fn blit_pipeline(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        layouts: &PipelineLayouts<'_>,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("BlitPipelineLayout"),
            bind_group_layouts: &[layouts.scene_target],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("BlitPipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shaders.blit.module(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shaders.blit.module(),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}
