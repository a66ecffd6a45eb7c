use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::asset::{Handle, Material, Mesh};

/// One draw recorded by the geometry walk: a mesh under a world matrix.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub mesh: Handle<Mesh>,
    pub material: Material,
    pub model: Mat4,
}

/// The frame's draw queue, rebuilt by `Scene::collect_draws` and consumed by
/// the geometry and shadow passes.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, mesh: Handle<Mesh>, material: Material, model: Mat4) {
        self.items.push(DrawItem {
            mesh,
            material,
            model,
        });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-object block in the objects storage buffer, indexed by instance id.
/// Field order matches the `ObjectData` struct in the WGSL sources
/// (`u_model` / `u_modelIT`).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ObjectData {
    pub u_model: [[f32; 4]; 4],
    pub u_model_it: [[f32; 4]; 4],
    /// rgb = base color, a = specular strength
    pub base_color: [f32; 4],
    /// x = shininess, rest unused
    pub params: [f32; 4],
}

impl ObjectData {
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            u_model: model.to_cols_array_2d(),
            u_model_it: model.inverse().transpose().to_cols_array_2d(),
            base_color: material.base_color.extend(material.specular).to_array(),
            params: [material.shininess, 0.0, 0.0, 0.0],
        }
    }

    pub fn from_model(model: Mat4) -> Self {
        Self::new(model, &Material::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn model_it_is_inverse_transpose() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 0.5),
            Quat::from_rotation_y(0.7),
            Vec3::new(3.0, -1.0, 4.0),
        );
        let data = ObjectData::from_model(model);
        let expected = model.inverse().transpose();
        assert!(Mat4::from_cols_array_2d(&data.u_model_it).abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn uniform_scale_keeps_normals_parallel() {
        let model = Mat4::from_scale(Vec3::splat(3.0));
        let data = ObjectData::from_model(model);
        let it = Mat4::from_cols_array_2d(&data.u_model_it);
        let n = it.transform_vector3(Vec3::Y).normalize();
        assert!(n.abs_diff_eq(Vec3::Y, 1e-5));
    }
}
