use crate::renderer::Renderer;

/// The editor viewport: shows the renderer's composited scene target inside
/// a panel and queues a viewport resize whenever the panel size changes.
pub struct ScenePanel {
    texture_id: Option<egui::TextureId>,
    registered_size: (u32, u32),
    last_panel_size: egui::Vec2,
}

impl ScenePanel {
    pub fn new() -> Self {
        Self {
            texture_id: None,
            registered_size: (0, 0),
            last_panel_size: egui::Vec2::ZERO,
        }
    }

    /// Re-registers the scene texture with egui if the render target was
    /// reallocated since last frame.
    pub fn sync_texture(&mut self, painter: &mut egui_wgpu::Renderer, renderer: &Renderer) {
        let current = renderer.viewport_size();
        if self.texture_id.is_some() && self.registered_size == current {
            return;
        }

        if let Some(id) = self.texture_id.take() {
            painter.free_texture(&id);
        }

        let id = painter.register_native_texture(
            renderer.device(),
            renderer.scene_color_view(),
            wgpu::FilterMode::Linear,
        );
        self.texture_id = Some(id);
        self.registered_size = current;
    }

    pub fn ui(&mut self, ctx: &egui::Context, renderer: &mut Renderer) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_size();

                // Defer the actual target reallocation to the renderer's next
                // PreRender; here we only notice the panel changed size.
                if available != self.last_panel_size
                    && available.x >= 1.0
                    && available.y >= 1.0
                {
                    log::debug!("scene panel resized to {}x{}", available.x, available.y);
                    renderer.queue_viewport_resize(available.x as u32, available.y as u32);
                    self.last_panel_size = available;
                }

                if let Some(id) = self.texture_id {
                    ui.image(egui::load::SizedTexture::new(id, available));
                }
            });
    }
}

impl Default for ScenePanel {
    fn default() -> Self {
        Self::new()
    }
}
