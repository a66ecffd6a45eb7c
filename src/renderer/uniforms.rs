// renderer/uniforms.rs
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-frame globals pushed to every registered shader at PreRender time.
/// Field order matches the `Globals` struct in the WGSL sources
/// (`u_vp` / `u_viewPos` / light counts).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct GlobalsUniform {
    pub u_vp: [[f32; 4]; 4],
    /// xyz = camera position, w unused
    pub u_view_pos: [f32; 4],
    /// point count, spot count, shadow map count, unused
    pub u_light_counts: [u32; 4],
}

impl GlobalsUniform {
    pub fn new(
        view_proj: Mat4,
        view_pos: Vec3,
        point_lights: u32,
        spot_lights: u32,
        shadow_maps: u32,
    ) -> Self {
        Self {
            u_vp: view_proj.to_cols_array_2d(),
            u_view_pos: view_pos.extend(0.0).to_array(),
            u_light_counts: [point_lights, spot_lights, shadow_maps, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_size_fits_uniform_alignment() {
        // mat4 + vec4 + vec4<u32> = 96 bytes, already 16-aligned.
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 96);
    }
}
