use winit::event::WindowEvent;
use winit::window::Window;

use super::egui_integration::EguiContext;
use super::scene_panel::ScenePanel;
use crate::renderer::Renderer;
use crate::scene::{Name, Scene};

/// The editor overlay: scene viewport plus a small stats side panel.
pub struct EditorUi {
    egui: EguiContext,
    scene_panel: ScenePanel,
}

impl EditorUi {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        Self {
            egui: EguiContext::new(device, surface_format, window),
            scene_panel: ScenePanel::new(),
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        if matches!(event, WindowEvent::RedrawRequested | WindowEvent::CloseRequested) {
            return false;
        }
        self.egui.handle_event(window, event)
    }

    /// Builds the frame's UI and paints it over the window surface. The scene
    /// image is consumed as a texture inside the viewport panel, so the
    /// window blit is skipped entirely.
    pub fn present(&mut self, window: &Window, renderer: &mut Renderer, scene: &Scene) {
        self.scene_panel.sync_texture(&mut self.egui.renderer, renderer);

        self.egui.begin_frame(window);

        let ctx = self.egui.context().clone();
        egui::SidePanel::right("stats")
            .resizable(false)
            .default_width(180.0)
            .show(&ctx, |ui| {
                ui.heading("Stats");
                ui.label(format!(
                    "frame: {:.2} ms",
                    renderer.delta_time() * 1000.0
                ));
                let (vw, vh) = renderer.viewport_size();
                ui.label(format!("viewport: {vw}x{vh}"));
                ui.label(format!("shadow maps: {}", renderer.shadow_maps().len()));
                ui.separator();
                ui.heading("Nodes");
                for (_entity, name) in scene.world.query::<&Name>().iter() {
                    ui.label(name.0.as_str());
                }
            });
        self.scene_panel.ui(&ctx, renderer);

        let output = self.egui.end_frame(window);
        let surface_size = renderer.surface_size();

        let egui = &mut self.egui;
        let result = renderer.present_with(|device, queue, encoder, view| {
            egui.render(
                device,
                queue,
                encoder,
                window,
                view,
                [surface_size.0, surface_size.1],
                output,
            );
        });

        if let Err(err) = result {
            log::error!("editor present failed: {err}");
        }
    }
}
