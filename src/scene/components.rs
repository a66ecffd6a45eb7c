// scene/components.rs
// Pure hecs components - no custom entity system

use glam::Vec3;

use crate::asset::MeshBatch;
use crate::renderer::lights::{
    DirectionalLight, FrameLights, LightColors, PointLight, SpotLight,
};
use crate::renderer::registry::{LightRegistry, ShaderId, ShaderRegistry};

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Parent entity reference
#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

/// List of children entities
#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<hecs::Entity>);

/// Continuous rotation about a local axis, applied by the update walk.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    pub axis: Vec3,
    pub speed: f32,
}

/// Draws a set of mesh batches under the owning node's world transform.
#[derive(Debug, Clone)]
pub struct ModelRenderer {
    pub batches: Vec<MeshBatch>,
    enabled: bool,
}

impl ModelRenderer {
    /// Registers `shader` with the active-shader list so the program receives
    /// per-frame globals, mirroring how the geometry shader is shared between
    /// every model in the scene.
    pub fn new(batches: Vec<MeshBatch>, shader: ShaderId, shaders: &mut ShaderRegistry) -> Self {
        shaders.add(shader);
        Self {
            batches,
            enabled: true,
        }
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Pushes a directional light's parameters into the frame bundle.
#[derive(Debug, Clone)]
pub struct DirectionalLightRenderer {
    pub light: DirectionalLight,
    enabled: bool,
    saved_colors: Option<LightColors>,
}

impl DirectionalLightRenderer {
    pub fn new(light: DirectionalLight) -> Self {
        Self {
            light,
            enabled: true,
            saved_colors: None,
        }
    }

    /// Restores the colors captured at disable time.
    pub fn enable(&mut self) {
        if let Some(colors) = self.saved_colors.take() {
            self.light.colors = colors;
        }
        self.enabled = true;
    }

    /// Zeroes the emitted contribution instead of skipping the push: the
    /// shader keeps a single `u_dirLight` slot, so a stale non-zero value
    /// would otherwise keep lighting the scene.
    pub fn disable(&mut self) {
        if self.enabled {
            self.saved_colors = Some(self.light.colors);
            self.light.colors = LightColors::ZERO;
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&self, frame: &mut FrameLights) {
        frame.set_directional(self.light);
    }
}

/// Pushes a point light at the shader index reserved at construction.
#[derive(Debug, Clone)]
pub struct PointLightRenderer {
    pub light: PointLight,
    shader_index: u32,
    enabled: bool,
    saved_colors: Option<LightColors>,
}

impl PointLightRenderer {
    pub fn new(light: PointLight, lights: &mut LightRegistry) -> Self {
        Self {
            light,
            shader_index: lights.add_point_light(),
            enabled: true,
            saved_colors: None,
        }
    }

    pub fn shader_index(&self) -> u32 {
        self.shader_index
    }

    pub fn enable(&mut self) {
        if let Some(colors) = self.saved_colors.take() {
            self.light.colors = colors;
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if self.enabled {
            self.saved_colors = Some(self.light.colors);
            self.light.colors = LightColors::ZERO;
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&self, frame: &mut FrameLights) {
        frame.set_point(self.shader_index, self.light);
    }
}

/// Pushes a spot light at the shader index reserved at construction.
#[derive(Debug, Clone)]
pub struct SpotLightRenderer {
    pub light: SpotLight,
    shader_index: u32,
    enabled: bool,
    saved_colors: Option<LightColors>,
}

impl SpotLightRenderer {
    pub fn new(light: SpotLight, lights: &mut LightRegistry) -> Self {
        Self {
            light,
            shader_index: lights.add_spot_light(),
            enabled: true,
            saved_colors: None,
        }
    }

    pub fn shader_index(&self) -> u32 {
        self.shader_index
    }

    pub fn enable(&mut self) {
        if let Some(colors) = self.saved_colors.take() {
            self.light.colors = colors;
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if self.enabled {
            self.saved_colors = Some(self.light.colors);
            self.light.colors = LightColors::ZERO;
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn push(&self, frame: &mut FrameLights) {
        frame.set_spot(self.shader_index, self.light);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::lights::DEFAULT_ATTENUATION;

    fn colors() -> LightColors {
        LightColors::new(
            Vec3::splat(0.05),
            Vec3::new(0.8, 0.7, 0.6),
            Vec3::splat(1.0),
        )
    }

    fn spot() -> SpotLight {
        SpotLight::new(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::NEG_Y,
            12.5f32.to_radians(),
            17.5f32.to_radians(),
            DEFAULT_ATTENUATION,
            colors(),
        )
    }

    #[test]
    fn construction_order_assigns_sequential_indices() {
        let mut lights = LightRegistry::new();
        let renderers: Vec<SpotLightRenderer> =
            (0..4).map(|_| SpotLightRenderer::new(spot(), &mut lights)).collect();

        for (expected, renderer) in renderers.iter().enumerate() {
            assert_eq!(renderer.shader_index(), expected as u32);
        }
        assert_eq!(lights.spot_light_count(), 4);
    }

    #[test]
    fn disable_zeroes_pushed_contribution() {
        let mut lights = LightRegistry::new();
        let mut renderer = SpotLightRenderer::new(spot(), &mut lights);

        renderer.disable();
        let mut frame = FrameLights::new();
        renderer.push(&mut frame);

        let pushed = frame.spot(0).unwrap();
        assert_eq!(pushed.colors.ambient, Vec3::ZERO);
        assert_eq!(pushed.colors.diffuse, Vec3::ZERO);
        assert_eq!(pushed.colors.specular, Vec3::ZERO);
    }

    #[test]
    fn enable_restores_colors_captured_at_disable() {
        let mut lights = LightRegistry::new();
        let mut renderer = SpotLightRenderer::new(spot(), &mut lights);
        let original = renderer.light.colors;

        renderer.disable();
        renderer.enable();

        let mut frame = FrameLights::new();
        renderer.push(&mut frame);
        assert_eq!(frame.spot(0).unwrap().colors, original);
    }

    #[test]
    fn double_disable_does_not_clobber_saved_colors() {
        let mut lights = LightRegistry::new();
        let mut renderer = PointLightRenderer::new(
            PointLight::new(Vec3::ZERO, DEFAULT_ATTENUATION, colors()),
            &mut lights,
        );
        let original = renderer.light.colors;

        renderer.disable();
        renderer.disable();
        renderer.enable();
        assert_eq!(renderer.light.colors, original);
    }

    #[test]
    fn model_renderer_registers_its_shader_once() {
        let mut shaders = ShaderRegistry::new();
        let _a = ModelRenderer::new(Vec::new(), ShaderId(1), &mut shaders);
        let _b = ModelRenderer::new(Vec::new(), ShaderId(1), &mut shaders);
        assert_eq!(shaders.len(), 1);
    }
}
