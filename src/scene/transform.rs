use glam::{Mat4, Quat, Vec3};
use thiserror::Error;

/// Returned when a world matrix is read between a mutation and the next
/// propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("world matrix read before transform propagation ran")]
pub struct StaleTransform;

/// Local position/rotation/scale with a cached world matrix.
///
/// The world matrix is only valid after [`Transform::propagate`] ran for the
/// current frame; every mutator marks it dirty and [`Transform::world_matrix`]
/// refuses to hand out stale data.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    world: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Translate * Rotate * Scale: scale applies first, translation last.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Recompute the cached world matrix from the local TRS and the parent's
    /// world matrix (identity for roots). Clears the dirty flag.
    pub fn propagate(&mut self, parent_world: Option<&Mat4>) {
        let local = self.local_matrix();
        self.world = match parent_world {
            Some(parent) => *parent * local,
            None => local,
        };
        self.dirty = false;
    }

    /// The world matrix computed by the last propagation, or an error if a
    /// mutation happened since.
    pub fn world_matrix(&self) -> Result<&Mat4, StaleTransform> {
        if self.dirty {
            Err(StaleTransform)
        } else {
            Ok(&self.world)
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_propagates_to_identity() {
        let mut t = Transform::default();
        t.propagate(None);
        assert!(t.world_matrix().unwrap().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn local_matrix_is_trs_order() {
        let t = Transform::from_trs(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
            * Mat4::from_scale(Vec3::splat(2.0));
        assert!(t.local_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn propagate_applies_parent_on_the_left() {
        let parent = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let mut t = Transform::from_trs(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE);
        t.propagate(Some(&parent));
        let p = t.world_matrix().unwrap().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(7.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn scale_happens_before_translation() {
        let mut t = Transform::from_trs(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::splat(2.0));
        t.propagate(None);
        let p = t
            .world_matrix()
            .unwrap()
            .transform_point3(Vec3::new(1.0, 0.0, 0.0));
        // (1,0,0) scales to (2,0,0), then translates to (3,2,3)
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn mutation_invalidates_world_matrix() {
        let mut t = Transform::default();
        t.propagate(None);
        assert!(t.world_matrix().is_ok());

        t.set_position(Vec3::X);
        assert_eq!(t.world_matrix(), Err(StaleTransform));
        assert!(t.is_dirty());

        t.propagate(None);
        let p = t.world_matrix().unwrap().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::X, 1e-6));
    }
}
