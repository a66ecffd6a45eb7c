// egui_integration.rs for egui 0.33 + wgpu 27, single-sampled surface pass

use egui_wgpu::ScreenDescriptor;
use winit::event::WindowEvent;
use winit::window::Window;

/// Owns the egui context, the winit state bridge and the egui-wgpu painter.
pub struct EguiContext {
    ctx: egui::Context,
    state: egui_winit::State,
    pub renderer: egui_wgpu::Renderer,
}

impl EguiContext {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let viewport_id = ctx.viewport_id();

        let state = egui_winit::State::new(
            ctx.clone(),
            viewport_id,
            window,
            Some(window.scale_factor() as f32),
            None,       // theme
            Some(2048), // max_texture_side
        );

        let renderer = egui_wgpu::Renderer::new(
            device,
            output_format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                // The overlay resolves directly into the surface, which is
                // always single-sampled.
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            ctx,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) -> egui::FullOutput {
        let output = self.ctx.end_pass();
        self.state
            .handle_platform_output(window, output.platform_output.clone());
        output
    }

    /// Paints the frame's output into `view`, loading whatever is already in
    /// the surface.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        surface_size: [u32; 2],
        output: egui::FullOutput,
    ) {
        if surface_size[0] == 0 || surface_size[1] == 0 {
            return;
        }

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: surface_size,
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);

        self.renderer
            .update_buffers(device, queue, encoder, &primitives, &screen_descriptor);

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("EguiPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.05,
                        g: 0.05,
                        b: 0.06,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // egui-wgpu wants a 'static pass.
        let mut pass_static = pass.forget_lifetime();
        self.renderer
            .render(&mut pass_static, &primitives, &screen_descriptor);
        drop(pass_static);

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }
}
