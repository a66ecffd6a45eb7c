// renderer/renderer.rs
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::{dpi::PhysicalSize, window::Window};

use crate::asset::Assets;
use crate::renderer::buffers::{
    GlobalsBuffer, LightsBuffer, ObjectsBuffer, ShadowViewBuffer,
};
use crate::renderer::context::{RenderContext, RendererError};
use crate::renderer::draw::{DrawList, ObjectData};
use crate::renderer::gbuffer::GBuffer;
use crate::renderer::lights::{DirectionalLight, FrameLights, LightsUniform, MAX_SHADOW_MAPS};
use crate::renderer::material_binder::MaterialBinder;
use crate::renderer::pipeline::{PipelineLayouts, Pipelines};
use crate::renderer::registry::{LightRegistry, ShaderId, ShaderRegistry};
use crate::renderer::shaders::ShaderSet;
use crate::renderer::shadow::{ShadowAtlas, ShadowMap};
use crate::renderer::target::SceneTarget;
use crate::renderer::timeline::{frame_passes, stamp_pass, PassEvent, PassTimeline, TargetId};
use crate::renderer::uniforms::GlobalsUniform;
use crate::scene::{Camera, Scene};
use crate::settings::RenderSettings;

const INITIAL_OBJECTS_CAPACITY: u32 = 1024;

/// The pipeline orchestrator. Owns every render target, the built-in shader
/// programs, and the per-frame uniform state; drives the fixed pass sequence
/// geometry -> shadows -> lighting each frame.
pub struct Renderer {
    context: RenderContext,
    shaders: ShaderSet,
    shader_registry: ShaderRegistry,
    light_registry: LightRegistry,
    pipelines: Pipelines,
    globals_buffer: GlobalsBuffer,
    objects_buffer: ObjectsBuffer,
    lights_buffer: LightsBuffer,
    shadow_view_buffer: ShadowViewBuffer,
    material_binder: MaterialBinder,
    gbuffer: GBuffer,
    scene_target: SceneTarget,
    shadow_atlas: ShadowAtlas,
    shadow_maps: Vec<ShadowMap>,
    timeline: PassTimeline,
    draw_list: DrawList,
    frame_lights: FrameLights,
    screen_quad_buffer: wgpu::Buffer,
    pending_viewport: Option<(u32, u32)>,
    view: Mat4,
    projection: Mat4,
    camera_position: Vec3,
    delta_time: f32,
    last_frame: Option<Instant>,
    settings: RenderSettings,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        settings: RenderSettings,
    ) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let context = RenderContext::new(window, size, &settings).await?;
        let device = &context.device;

        let mut shader_registry = ShaderRegistry::new();
        let light_registry = LightRegistry::new();
        let shaders = ShaderSet::new(device, &mut shader_registry);

        let screen_quad_buffer = {
            use wgpu::util::DeviceExt;
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ScreenQuad"),
                contents: bytemuck::cast_slice(&crate::renderer::primitives::screen_quad_vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        let globals_buffer = GlobalsBuffer::new(device);
        let objects_buffer = ObjectsBuffer::new(device, INITIAL_OBJECTS_CAPACITY);
        let lights_buffer = LightsBuffer::new(device);
        let shadow_view_buffer = ShadowViewBuffer::new(device, MAX_SHADOW_MAPS as u32);
        let material_binder = MaterialBinder::new(device, &context.queue);

        let (width, height) = (size.width.max(1), size.height.max(1));
        let gbuffer = GBuffer::new(device, width, height);
        let scene_target = SceneTarget::new(device, width, height);
        let shadow_atlas = ShadowAtlas::new(device, settings.shadow_map_size);

        let pipelines = Pipelines::new(
            device,
            &shaders,
            &PipelineLayouts {
                globals: &globals_buffer.bind_layout,
                objects: &objects_buffer.bind_layout,
                material: material_binder.bind_layout(),
                lights: &lights_buffer.bind_layout,
                gbuffer: gbuffer.bind_layout(),
                shadow_atlas: shadow_atlas.bind_layout(),
                shadow_view: &shadow_view_buffer.bind_layout,
                scene_target: scene_target.bind_layout(),
            },
            context.config.format,
        );

        log::info!(
            "Renderer ready: {}x{} viewport, {}px shadow maps",
            width,
            height,
            settings.shadow_map_size
        );

        Ok(Self {
            context,
            shaders,
            shader_registry,
            light_registry,
            pipelines,
            globals_buffer,
            objects_buffer,
            lights_buffer,
            shadow_view_buffer,
            material_binder,
            gbuffer,
            scene_target,
            shadow_atlas,
            shadow_maps: Vec::new(),
            timeline: PassTimeline::new(),
            draw_list: DrawList::new(),
            frame_lights: FrameLights::new(),
            screen_quad_buffer,
            pending_viewport: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            delta_time: 0.0,
            last_frame: None,
            settings,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.context.config.format
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn timeline(&self) -> &PassTimeline {
        &self.timeline
    }

    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        &mut self.light_registry
    }

    pub fn lights(&self) -> &LightRegistry {
        &self.light_registry
    }

    pub fn shaders_mut(&mut self) -> &mut ShaderRegistry {
        &mut self.shader_registry
    }

    /// The shader id model renderers register themselves against.
    pub fn geometry_shader(&self) -> ShaderId {
        self.shaders.geometry.id()
    }

    pub fn add_shader(&mut self, shader: ShaderId) {
        self.shader_registry.add(shader);
    }

    /// Registers a shadow map for `light`. Its list position is its layer in
    /// the shadow texture array and its slot in `u_lightVP`; both stay fixed
    /// for the renderer's lifetime.
    pub fn add_shadow_map(
        &mut self,
        light: &DirectionalLight,
        projection_size: f32,
        near: f32,
        far: f32,
    ) -> u32 {
        let index = self.shadow_maps.len() as u32;
        if index as usize >= MAX_SHADOW_MAPS {
            log::warn!(
                "shadow map {index} exceeds the shader array capacity {MAX_SHADOW_MAPS}; \
                 it will render but never be sampled"
            );
        }
        self.shadow_maps.push(ShadowMap::new(
            index,
            light.direction,
            projection_size,
            near,
            far,
        ));
        index
    }

    pub fn shadow_maps(&self) -> &[ShadowMap] {
        &self.shadow_maps
    }

    pub fn shadow_map_mut(&mut self, index: u32) -> Option<&mut ShadowMap> {
        self.shadow_maps.get_mut(index as usize)
    }

    /// The editor boundary: the composited image and its current size.
    pub fn scene_color_view(&self) -> &wgpu::TextureView {
        self.scene_target.color_view()
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.scene_target.size()
    }

    /// Records a new viewport size. The GPU reallocation is deferred to the
    /// next PreRender so a resize event can never touch a target mid-pass.
    pub fn queue_viewport_resize(&mut self, width: u32, height: u32) {
        self.pending_viewport = Some((width.max(1), height.max(1)));
    }

    /// Window surface resize; safe immediately because the surface is only
    /// touched between frames.
    pub fn resize_surface(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.scene_target.size();
        width as f32 / height.max(1) as f32
    }

    /// PreRender: apply any deferred viewport resize, then recompute the
    /// camera matrices and push the frame globals for every registered
    /// shader.
    pub fn pre_render(&mut self, camera: &Camera) {
        if let Some((width, height)) =
            apply_viewport_request(self.pending_viewport.take(), self.scene_target.size())
        {
            log::debug!("applying deferred viewport resize to {width}x{height}");
            self.gbuffer.resize(&self.context.device, width, height);
            self.scene_target.resize(&self.context.device, width, height);
        }

        self.view = camera.view();
        self.projection = camera.proj(self.aspect_ratio());
        self.camera_position = camera.position();

        let globals = GlobalsUniform::new(
            self.projection * self.view,
            self.camera_position,
            self.light_registry.point_light_count(),
            self.light_registry.spot_light_count(),
            self.shadow_maps.len() as u32,
        );
        self.globals_buffer.update(&self.context.queue, &globals);
        log::trace!(
            "pushed globals to {} active shaders",
            self.shader_registry.len()
        );
    }

    /// Render: scene update, then the fixed offscreen pass sequence.
    pub fn render(&mut self, scene: &mut Scene, assets: &Assets) {
        scene.update(self.delta_time);

        self.draw_list.clear();
        scene.collect_draws(&mut self.draw_list);

        self.frame_lights.clear();
        scene.collect_lights(&mut self.frame_lights);
        self.frame_lights.set_counts(
            self.light_registry.point_light_count(),
            self.light_registry.spot_light_count(),
        );

        // All buffer writes land before the encoder submission below.
        let objects: Vec<ObjectData> = self
            .draw_list
            .items()
            .iter()
            .map(|item| ObjectData::new(item.model, &item.material))
            .collect();
        self.objects_buffer
            .update(&self.context.device, &self.context.queue, &objects);
        self.lights_buffer.update(
            &self.context.queue,
            &LightsUniform::from_frame(&self.frame_lights),
        );
        self.shadow_view_buffer
            .write_maps(&self.context.queue, &self.shadow_maps);
        self.shadow_atlas
            .write_uniform(&self.context.queue, &self.shadow_maps);

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("FrameEncoder"),
                });

        self.timeline.begin_frame();
        for pass in frame_passes(self.shadow_maps.len() as u32, false) {
            match pass {
                PassEvent::Geometry => self.encode_geometry_pass(&mut encoder, assets),
                PassEvent::Shadow(index) => self.encode_shadow_pass(&mut encoder, assets, index),
                PassEvent::Lighting => self.encode_lighting_pass(&mut encoder),
                PassEvent::Blit => unreachable!("blit is driven by draw_to_window"),
            }
            stamp_pass(&mut self.timeline, pass);
        }

        self.context.queue.submit(Some(encoder.finish()));

        debug_assert!(self.timeline.written_before_read(TargetId::GBuffer));
    }

    /// PostRender: inter-frame delta time.
    pub fn post_render(&mut self) {
        let now = Instant::now();
        self.delta_time = match self.last_frame {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);
    }

    /// Present path when no editor panel consumes the scene texture: blit the
    /// scene target onto the window surface.
    pub fn draw_to_window(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("BlitEncoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("BlitPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipelines.blit);
            pass.set_bind_group(0, self.scene_target.bind_group(), &[]);
            pass.set_vertex_buffer(0, self.screen_quad().slice(..));
            pass.draw(0..4, 0..1);
        }
        stamp_pass(&mut self.timeline, PassEvent::Blit);

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn encode_geometry_pass(&mut self, encoder: &mut wgpu::CommandEncoder, assets: &Assets) {
        fn color_attachment(view: &wgpu::TextureView) -> Option<wgpu::RenderPassColorAttachment<'_>> {
            Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GeometryPass"),
            color_attachments: &[
                color_attachment(self.gbuffer.position_view()),
                color_attachment(self.gbuffer.normal_view()),
                color_attachment(self.gbuffer.albedo_spec_view()),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.gbuffer.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipelines.geometry);
        pass.set_bind_group(0, &self.globals_buffer.bind_group, &[]);
        pass.set_bind_group(1, &self.objects_buffer.bind_group, &[]);

        for (instance, item) in self.draw_list.items().iter().enumerate() {
            let Some(mesh) = assets.meshes.get(item.mesh) else {
                log::warn!("skipping draw with invalid mesh handle");
                continue;
            };
            let material_group =
                self.material_binder
                    .bind_group_for(&self.context.device, assets, &item.material);
            pass.set_bind_group(2, material_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
            pass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            let instance = instance as u32;
            pass.draw_indexed(0..mesh.index_count(), 0, instance..instance + 1);
        }
    }

    fn encode_shadow_pass(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        assets: &Assets,
        index: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ShadowPass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.shadow_atlas.layer_view(index),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipelines.shadow);
        pass.set_bind_group(
            0,
            &self.shadow_view_buffer.bind_group,
            &[ShadowViewBuffer::offset_for(index)],
        );
        pass.set_bind_group(1, &self.objects_buffer.bind_group, &[]);

        for (instance, item) in self.draw_list.items().iter().enumerate() {
            let Some(mesh) = assets.meshes.get(item.mesh) else {
                continue;
            };
            pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
            pass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            let instance = instance as u32;
            pass.draw_indexed(0..mesh.index_count(), 0, instance..instance + 1);
        }
    }

    fn encode_lighting_pass(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("LightingPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.scene_target.color_view(),
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.1,
                        g: 0.1,
                        b: 0.1,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipelines.lighting);
        pass.set_bind_group(0, &self.globals_buffer.bind_group, &[]);
        pass.set_bind_group(1, &self.lights_buffer.bind_group, &[]);
        pass.set_bind_group(2, self.gbuffer.bind_group(), &[]);
        pass.set_bind_group(3, self.shadow_atlas.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.screen_quad().slice(..));
        pass.draw(0..4, 0..1);
    }

    fn screen_quad(&self) -> &wgpu::Buffer {
        &self.screen_quad_buffer
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.context.config.width, self.context.config.height)
    }

    /// Present path when the editor overlay owns the window: acquire the
    /// surface and let the caller record its own passes (the scene image is
    /// consumed as a texture inside the editor viewport instead of blitted).
    pub fn present_with<F>(&mut self, record: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("EditorEncoder"),
                });

        record(&self.context.device, &self.context.queue, &mut encoder, &view);
        stamp_pass(&mut self.timeline, PassEvent::Blit);

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Clamps a queued viewport size and drops the request when it already
/// matches the target, so repeated same-size resizes reallocate nothing.
fn apply_viewport_request(
    pending: Option<(u32, u32)>,
    current: (u32, u32),
) -> Option<(u32, u32)> {
    let (width, height) = pending?;
    let clamped = (width.max(1), height.max(1));
    if clamped == current {
        None
    } else {
        Some(clamped)
    }
}
