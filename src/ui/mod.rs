mod editor;
mod egui_integration;
mod scene_panel;

pub use editor::EditorUi;
pub use egui_integration::EguiContext;
pub use scene_panel::ScenePanel;

pub use egui;
