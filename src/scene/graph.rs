use glam::{Mat4, Quat};
use hecs::{Entity, World};

use crate::renderer::draw::DrawList;
use crate::renderer::lights::FrameLights;
use crate::scene::components::{
    Children, DirectionalLightRenderer, ModelRenderer, Name, Parent, PointLightRenderer, Spin,
    SpotLightRenderer,
};
use crate::scene::Transform;

/// The scene graph: a flat world of nodes addressed by generation-checked
/// entity handles, with parent/child links stored as components. Nodes are
/// created through the factory methods and live until the scene drops.
pub struct Scene {
    pub world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    pub fn spawn_node(&mut self, name: impl Into<String>, transform: Transform) -> Entity {
        self.world.spawn((Name::new(name), transform))
    }

    /// Links `child` under `parent`, keeping both directions of the
    /// relationship consistent. A node has at most one parent; relinking an
    /// already-parented node is rejected.
    pub fn add_child(&mut self, parent: Entity, child: Entity) {
        if self.world.get::<&Parent>(child).is_ok() {
            log::warn!("node {:?} already has a parent, ignoring add_child", child);
            return;
        }
        if self.world.insert_one(child, Parent(parent)).is_err() {
            log::warn!("add_child: child {:?} no longer exists", child);
            return;
        }

        let appended = match self.world.get::<&mut Children>(parent) {
            Ok(mut children) => {
                children.0.push(child);
                true
            }
            Err(_) => false,
        };
        if !appended && self.world.insert_one(parent, Children(vec![child])).is_err() {
            log::warn!("add_child: parent {:?} no longer exists", parent);
        }
    }

    /// Root nodes: everything without a parent link, in spawn order.
    pub fn roots(&self) -> Vec<Entity> {
        self.world
            .query::<&Transform>()
            .without::<&Parent>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Per-frame component update walk followed by transform propagation.
    /// A node's components run before its children's; siblings run in
    /// insertion order.
    pub fn update(&mut self, dt: f32) {
        self.visit_depth_first(|world, entity| {
            let spin = match world.get::<&Spin>(entity) {
                Ok(spin) => *spin,
                Err(_) => return,
            };
            if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
                let step = Quat::from_axis_angle(spin.axis, spin.speed * dt);
                let rotation = step * transform.rotation();
                transform.set_rotation(rotation);
            }
        });

        self.propagate_transforms();
    }

    /// Recomputes every world matrix depth-first from the roots. A parent's
    /// matrix is always final before any of its children read it.
    pub fn propagate_transforms(&mut self) {
        let roots = self.roots();
        log::trace!("propagating transforms from {} roots", roots.len());

        let mut stack: Vec<(Entity, Option<Mat4>)> = Vec::new();
        for root in roots {
            stack.push((root, None));

            while let Some((entity, parent_world)) = stack.pop() {
                let world_matrix = {
                    let Ok(mut transform) = self.world.get::<&mut Transform>(entity) else {
                        continue;
                    };
                    transform.propagate(parent_world.as_ref());
                    *transform
                        .world_matrix()
                        .expect("propagate just cleared the dirty flag")
                };

                if let Ok(children) = self.world.get::<&Children>(entity) {
                    for &child in children.0.iter().rev() {
                        stack.push((child, Some(world_matrix)));
                    }
                }
            }
        }
    }

    /// The geometry walk: every enabled model renderer contributes its mesh
    /// batches under the node's world matrix. Which shader consumes the list
    /// is the pass's choice. Nodes that were mutated after the last
    /// propagation are skipped with a warning rather than drawn stale.
    pub fn collect_draws(&self, out: &mut DrawList) {
        self.visit_depth_first(|world, entity| {
            let Ok(renderer) = world.get::<&ModelRenderer>(entity) else {
                return;
            };
            if !renderer.is_enabled() {
                return;
            }

            let Ok(transform) = world.get::<&Transform>(entity) else {
                return;
            };
            match transform.world_matrix() {
                Ok(model) => {
                    for batch in &renderer.batches {
                        out.push(batch.mesh, batch.material, *model);
                    }
                }
                Err(err) => {
                    log::warn!("skipping draw for node {:?}: {}", entity, err);
                }
            }
        });
    }

    /// The lights walk: every enabled light renderer pushes its parameter
    /// block at its shader index. Disabled lights still push (zeroed) so the
    /// shared shader slots never hold stale values.
    pub fn collect_lights(&self, out: &mut FrameLights) {
        self.visit_depth_first(|world, entity| {
            if let Ok(light) = world.get::<&DirectionalLightRenderer>(entity) {
                light.push(out);
            }
            if let Ok(light) = world.get::<&PointLightRenderer>(entity) {
                light.push(out);
            }
            if let Ok(light) = world.get::<&SpotLightRenderer>(entity) {
                light.push(out);
            }
        });
    }

    fn visit_depth_first(&self, mut f: impl FnMut(&World, Entity)) {
        let mut stack: Vec<Entity> = Vec::new();
        for root in self.roots() {
            stack.push(root);

            while let Some(entity) = stack.pop() {
                f(&self.world, entity);

                if let Ok(children) = self.world.get::<&Children>(entity) {
                    for &child in children.0.iter().rev() {
                        stack.push(child);
                    }
                }
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn node_at(scene: &mut Scene, name: &str, position: Vec3) -> Entity {
        scene.spawn_node(
            name,
            Transform::from_trs(position, Quat::IDENTITY, Vec3::ONE),
        )
    }

    fn world_position(scene: &Scene, entity: Entity) -> Vec3 {
        let transform = scene.world.get::<&Transform>(entity).unwrap();
        transform.world_matrix().unwrap().transform_point3(Vec3::ZERO)
    }

    #[test]
    fn child_and_parent_links_stay_consistent() {
        let mut scene = Scene::new();
        let parent = node_at(&mut scene, "parent", Vec3::ZERO);
        let child = node_at(&mut scene, "child", Vec3::X);
        scene.add_child(parent, child);

        assert_eq!(scene.world.get::<&Parent>(child).unwrap().0, parent);
        assert_eq!(scene.world.get::<&Children>(parent).unwrap().0, vec![child]);
        assert_eq!(scene.roots(), vec![parent]);
    }

    #[test]
    fn reparenting_is_rejected() {
        let mut scene = Scene::new();
        let a = node_at(&mut scene, "a", Vec3::ZERO);
        let b = node_at(&mut scene, "b", Vec3::ZERO);
        let child = node_at(&mut scene, "child", Vec3::ZERO);

        scene.add_child(a, child);
        scene.add_child(b, child);

        assert_eq!(scene.world.get::<&Parent>(child).unwrap().0, a);
        assert!(scene.world.get::<&Children>(b).is_err());
    }

    #[test]
    fn propagation_composes_down_a_three_level_chain() {
        let mut scene = Scene::new();
        let root = node_at(&mut scene, "root", Vec3::new(1.0, 0.0, 0.0));
        let a = node_at(&mut scene, "a", Vec3::new(0.0, 2.0, 0.0));
        let b = node_at(&mut scene, "b", Vec3::new(0.0, 0.0, 3.0));
        scene.add_child(root, a);
        scene.add_child(a, b);

        scene.propagate_transforms();
        assert!(world_position(&scene, b).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));

        // Moving the root must be visible at the leaf after re-propagation,
        // with no stale intermediate matrices.
        scene
            .world
            .get::<&mut Transform>(root)
            .unwrap()
            .set_position(Vec3::new(10.0, 0.0, 0.0));
        scene.propagate_transforms();
        assert!(world_position(&scene, b).abs_diff_eq(Vec3::new(10.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn propagation_applies_parent_rotation_to_children() {
        let mut scene = Scene::new();
        let parent = scene.spawn_node(
            "parent",
            Transform::from_trs(
                Vec3::ZERO,
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                Vec3::ONE,
            ),
        );
        let child = node_at(&mut scene, "child", Vec3::X);
        scene.add_child(parent, child);

        scene.propagate_transforms();
        assert!(world_position(&scene, child).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn update_spins_before_propagating() {
        let mut scene = Scene::new();
        let pivot = node_at(&mut scene, "pivot", Vec3::ZERO);
        scene
            .world
            .insert_one(
                pivot,
                Spin {
                    axis: Vec3::Y,
                    speed: std::f32::consts::FRAC_PI_2,
                },
            )
            .unwrap();
        let child = node_at(&mut scene, "child", Vec3::X);
        scene.add_child(pivot, child);

        // One simulated second: a quarter turn about Y.
        scene.update(1.0);
        assert!(world_position(&scene, child).abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn update_leaves_no_dirty_transforms() {
        let mut scene = Scene::new();
        let root = node_at(&mut scene, "root", Vec3::ZERO);
        let child = node_at(&mut scene, "child", Vec3::X);
        scene.add_child(root, child);

        scene
            .world
            .get::<&mut Transform>(child)
            .unwrap()
            .set_position(Vec3::new(2.0, 0.0, 0.0));
        scene.update(0.016);

        for entity in [root, child] {
            let transform = scene.world.get::<&Transform>(entity).unwrap();
            assert!(transform.world_matrix().is_ok());
        }
    }
}
