use glam::Vec3;

use super::{Handle, Mesh, Texture};

/// Surface parameters for the geometry pass. Texture slots are tagged by
/// role; a missing slot falls back to the 1x1 white texture and the base
/// color / specular scalar below.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub diffuse_texture: Option<Handle<Texture>>,
    pub specular_texture: Option<Handle<Texture>>,
    pub base_color: Vec3,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_texture: None,
            specular_texture: None,
            base_color: Vec3::ONE,
            specular: 0.5,
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn with_diffuse(mut self, texture: Handle<Texture>) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn with_specular(mut self, texture: Handle<Texture>) -> Self {
        self.specular_texture = Some(texture);
        self
    }

    pub fn with_base_color(mut self, color: Vec3) -> Self {
        self.base_color = color;
        self
    }
}

/// One drawable unit from the asset-loader boundary: a mesh plus the material
/// it is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct MeshBatch {
    pub mesh: Handle<Mesh>,
    pub material: Material,
}

impl MeshBatch {
    pub fn new(mesh: Handle<Mesh>, material: Material) -> Self {
        Self { mesh, material }
    }
}
