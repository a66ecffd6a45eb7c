// app.rs
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::asset::Assets;
use crate::demo;
use crate::renderer::Renderer;
use crate::scene::{Camera, Scene};
use crate::settings::RenderSettings;

/// Drives the frame loop: Update -> PreRender -> Render -> PostRender ->
/// Present, once per redraw. Resize events only queue the new viewport size;
/// the GPU-side reallocation happens at the next PreRender.
pub struct App {
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    renderer: Option<Renderer>,
    scene: Scene,
    assets: Assets,
    camera: Camera,
    settings: RenderSettings,
    #[cfg(feature = "egui")]
    editor: Option<crate::ui::EditorUi>,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            window: None,
            window_id: None,
            renderer: None,
            scene: Scene::new(),
            assets: Assets::new(),
            camera: Camera::default(),
            settings,
            #[cfg(feature = "egui")]
            editor: None,
        }
    }

    fn redraw(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        renderer.pre_render(&self.camera);
        renderer.render(&mut self.scene, &self.assets);
        renderer.post_render();

        #[cfg(feature = "egui")]
        if let (Some(editor), Some(window)) = (self.editor.as_mut(), self.window.as_ref()) {
            editor.present(window, renderer, &self.scene);
            if let Some(w) = &self.window {
                w.request_redraw();
            }
            return;
        }

        if let Err(err) = renderer.draw_to_window() {
            log::error!("present failed: {err}");
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("wgpu deferred renderer")
            .with_inner_size(PhysicalSize::new(
                self.settings.resolution.width,
                self.settings.resolution.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("window creation failed: {err}");
                event_loop.exit();
                return;
            }
        };
        let id = window.id();

        let mut renderer =
            match pollster::block_on(Renderer::new(window.clone(), self.settings.clone())) {
                Ok(renderer) => renderer,
                Err(err) => {
                    log::error!("renderer setup failed: {err}");
                    event_loop.exit();
                    return;
                }
            };

        demo::build_scene(&mut self.scene, &mut self.assets, &mut renderer);

        #[cfg(feature = "egui")]
        {
            self.editor = Some(crate::ui::EditorUi::new(
                renderer.device(),
                renderer.surface_format(),
                &window,
            ));
        }

        window.request_redraw();
        self.window_id = Some(id);
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id {
            return;
        }

        #[cfg(feature = "egui")]
        if let (Some(editor), Some(window)) = (self.editor.as_mut(), self.window.as_ref()) {
            if editor.handle_event(window, &event) {
                return;
            }
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.resize_surface(size);
                // Without an editor panel the scene viewport tracks the
                // window; with one, the panel drives the viewport size.
                #[cfg(not(feature = "egui"))]
                renderer.queue_viewport_resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(w) = &self.window {
                    renderer.resize_surface(w.inner_size());
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            _ => {}
        }
    }
}
