use bytemuck::{Pod, Zeroable};
use glam::Vec3;

pub const MAX_POINT_LIGHTS: usize = 16;
pub const MAX_SPOT_LIGHTS: usize = 8;
pub const MAX_SHADOW_MAPS: usize = 4;

/// Ambient/diffuse/specular color triple shared by every light kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightColors {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColors {
    pub const ZERO: Self = Self {
        ambient: Vec3::ZERO,
        diffuse: Vec3::ZERO,
        specular: Vec3::ZERO,
    };

    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }
}

/// Distance falloff: 1 / (constant + linear*d + quadratic*d^2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// Stock falloff covering roughly a 50-unit radius.
pub const DEFAULT_ATTENUATION: Attenuation = Attenuation {
    constant: 1.0,
    linear: 0.09,
    quadratic: 0.032,
};

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub colors: LightColors,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, colors: LightColors) -> Self {
        Self { direction, colors }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub attenuation: Attenuation,
    pub colors: LightColors,
}

impl PointLight {
    pub fn new(position: Vec3, attenuation: Attenuation, colors: LightColors) -> Self {
        Self {
            position,
            attenuation,
            colors,
        }
    }
}

/// Cone light. Cutoffs are stored as cosines; the inner cosine is always the
/// larger of the two (narrower cone), whatever order the angles arrive in.
#[derive(Clone, Copy, Debug)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    inner_cutoff: f32,
    outer_cutoff: f32,
    pub attenuation: Attenuation,
    pub colors: LightColors,
}

impl SpotLight {
    pub fn new(
        position: Vec3,
        direction: Vec3,
        inner_angle: f32,
        outer_angle: f32,
        attenuation: Attenuation,
        colors: LightColors,
    ) -> Self {
        let mut light = Self {
            position,
            direction,
            inner_cutoff: 1.0,
            outer_cutoff: 1.0,
            attenuation,
            colors,
        };
        light.set_cutoff_angles(inner_angle, outer_angle);
        light
    }

    /// Angles in radians, measured from the cone axis.
    pub fn set_cutoff_angles(&mut self, inner_angle: f32, outer_angle: f32) {
        let a = inner_angle.cos();
        let b = outer_angle.cos();
        self.inner_cutoff = a.max(b);
        self.outer_cutoff = a.min(b);
    }

    pub fn set_inner_angle(&mut self, inner_angle: f32) {
        let cos = inner_angle.cos();
        self.inner_cutoff = cos.max(self.outer_cutoff);
        self.outer_cutoff = cos.min(self.outer_cutoff);
    }

    pub fn set_outer_angle(&mut self, outer_angle: f32) {
        let cos = outer_angle.cos();
        self.outer_cutoff = cos.min(self.inner_cutoff);
        self.inner_cutoff = cos.max(self.inner_cutoff);
    }

    pub fn inner_cutoff(&self) -> f32 {
        self.inner_cutoff
    }

    pub fn outer_cutoff(&self) -> f32 {
        self.outer_cutoff
    }
}

/// Per-frame light bundle built fresh by the RenderLightsOnly walk and packed
/// into the lighting pass uniform. Slots are addressed by the shader index a
/// light renderer was assigned at construction; the counts come from the
/// registry, not from how many slots were filled this frame.
#[derive(Clone, Debug, Default)]
pub struct FrameLights {
    directional: Option<DirectionalLight>,
    point: [Option<PointLight>; MAX_POINT_LIGHTS],
    spot: [Option<SpotLight>; MAX_SPOT_LIGHTS],
    point_count: u32,
    spot_count: u32,
}

impl FrameLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set_directional(&mut self, light: DirectionalLight) {
        self.directional = Some(light);
    }

    pub fn set_point(&mut self, index: u32, light: PointLight) {
        if let Some(slot) = self.point.get_mut(index as usize) {
            *slot = Some(light);
        } else {
            log::warn!("point light index {index} exceeds capacity {MAX_POINT_LIGHTS}");
        }
    }

    pub fn set_spot(&mut self, index: u32, light: SpotLight) {
        if let Some(slot) = self.spot.get_mut(index as usize) {
            *slot = Some(light);
        } else {
            log::warn!("spot light index {index} exceeds capacity {MAX_SPOT_LIGHTS}");
        }
    }

    pub fn set_counts(&mut self, point_count: u32, spot_count: u32) {
        self.point_count = point_count.min(MAX_POINT_LIGHTS as u32);
        self.spot_count = spot_count.min(MAX_SPOT_LIGHTS as u32);
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.directional.as_ref()
    }

    pub fn point(&self, index: u32) -> Option<&PointLight> {
        self.point.get(index as usize).and_then(Option::as_ref)
    }

    pub fn spot(&self, index: u32) -> Option<&SpotLight> {
        self.spot.get(index as usize).and_then(Option::as_ref)
    }

    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    pub fn spot_count(&self) -> u32 {
        self.spot_count
    }
}

// GPU mirrors. Layout matches the WGSL structs in shaders/lighting.wgsl;
// every field is padded out to 16 bytes for uniform-buffer array rules.

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct DirectionalLightRaw {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl DirectionalLightRaw {
    fn from_light(light: &DirectionalLight) -> Self {
        Self {
            direction: light.direction.extend(0.0).to_array(),
            ambient: light.colors.ambient.extend(0.0).to_array(),
            diffuse: light.colors.diffuse.extend(0.0).to_array(),
            specular: light.colors.specular.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic, unused
    pub attenuation: [f32; 4],
}

impl PointLightRaw {
    fn from_light(light: &PointLight) -> Self {
        Self {
            position: light.position.extend(1.0).to_array(),
            ambient: light.colors.ambient.extend(0.0).to_array(),
            diffuse: light.colors.diffuse.extend(0.0).to_array(),
            specular: light.colors.specular.extend(0.0).to_array(),
            attenuation: [
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct SpotLightRaw {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// innerCutOff, outerCutOff, unused, unused
    pub cutoff: [f32; 4],
    pub attenuation: [f32; 4],
}

impl SpotLightRaw {
    fn from_light(light: &SpotLight) -> Self {
        Self {
            position: light.position.extend(1.0).to_array(),
            direction: light.direction.extend(0.0).to_array(),
            ambient: light.colors.ambient.extend(0.0).to_array(),
            diffuse: light.colors.diffuse.extend(0.0).to_array(),
            specular: light.colors.specular.extend(0.0).to_array(),
            cutoff: [light.inner_cutoff, light.outer_cutoff, 0.0, 0.0],
            attenuation: [
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightsUniform {
    pub dir_light: DirectionalLightRaw,
    pub point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    pub spot_lights: [SpotLightRaw; MAX_SPOT_LIGHTS],
    /// point count, spot count, directional present, unused
    pub counts: [u32; 4],
}

impl LightsUniform {
    pub fn from_frame(frame: &FrameLights) -> Self {
        let mut uniform = Self::zeroed();

        if let Some(dir) = frame.directional() {
            uniform.dir_light = DirectionalLightRaw::from_light(dir);
            uniform.counts[2] = 1;
        }

        for index in 0..frame.point_count() {
            if let Some(light) = frame.point(index) {
                uniform.point_lights[index as usize] = PointLightRaw::from_light(light);
            }
        }

        for index in 0..frame.spot_count() {
            if let Some(light) = frame.spot(index) {
                uniform.spot_lights[index as usize] = SpotLightRaw::from_light(light);
            }
        }

        uniform.counts[0] = frame.point_count();
        uniform.counts[1] = frame.spot_count();
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> LightColors {
        LightColors::new(Vec3::splat(0.1), Vec3::splat(0.8), Vec3::ONE)
    }

    #[test]
    fn spot_cutoff_invariant_holds_on_construction() {
        let light = SpotLight::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            12.5f32.to_radians(),
            17.5f32.to_radians(),
            DEFAULT_ATTENUATION,
            white(),
        );
        assert!(light.inner_cutoff() > light.outer_cutoff());
        assert!((light.inner_cutoff() - 12.5f32.to_radians().cos()).abs() < 1e-6);
        assert!((light.outer_cutoff() - 17.5f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn spot_cutoff_invariant_holds_with_swapped_angles() {
        let light = SpotLight::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            17.5f32.to_radians(),
            12.5f32.to_radians(),
            DEFAULT_ATTENUATION,
            white(),
        );
        assert!(light.inner_cutoff() >= light.outer_cutoff());
    }

    #[test]
    fn spot_cutoff_invariant_survives_mutation() {
        let mut light = SpotLight::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            12.5f32.to_radians(),
            17.5f32.to_radians(),
            DEFAULT_ATTENUATION,
            white(),
        );
        // Widening the inner angle past the outer one must not invert the pair.
        light.set_inner_angle(25f32.to_radians());
        assert!(light.inner_cutoff() >= light.outer_cutoff());

        light.set_outer_angle(5f32.to_radians());
        assert!(light.inner_cutoff() >= light.outer_cutoff());
    }

    #[test]
    fn frame_lights_places_slots_by_index() {
        let mut frame = FrameLights::new();
        let light = PointLight::new(Vec3::new(1.0, 2.0, 3.0), DEFAULT_ATTENUATION, white());
        frame.set_point(2, light);
        frame.set_counts(3, 0);

        assert!(frame.point(0).is_none());
        assert!(frame.point(2).is_some());
        assert_eq!(frame.point_count(), 3);
    }

    #[test]
    fn frame_lights_ignores_out_of_range_indices() {
        let mut frame = FrameLights::new();
        let light = PointLight::new(Vec3::ZERO, DEFAULT_ATTENUATION, white());
        frame.set_point(MAX_POINT_LIGHTS as u32, light);
        for i in 0..MAX_POINT_LIGHTS as u32 {
            assert!(frame.point(i).is_none());
        }
    }

    #[test]
    fn uniform_packs_counts_and_slots() {
        let mut frame = FrameLights::new();
        frame.set_directional(DirectionalLight::new(Vec3::NEG_Y, white()));
        frame.set_point(
            0,
            PointLight::new(Vec3::new(4.0, 5.0, 6.0), DEFAULT_ATTENUATION, white()),
        );
        frame.set_spot(
            1,
            SpotLight::new(
                Vec3::ONE,
                Vec3::NEG_Z,
                0.3,
                0.5,
                DEFAULT_ATTENUATION,
                white(),
            ),
        );
        frame.set_counts(1, 2);

        let uniform = LightsUniform::from_frame(&frame);
        assert_eq!(uniform.counts, [1, 2, 1, 0]);
        assert_eq!(uniform.point_lights[0].position, [4.0, 5.0, 6.0, 1.0]);
        // Slot 0 was never pushed this frame; it stays zeroed.
        assert_eq!(uniform.spot_lights[0].position, [0.0; 4]);
        assert_eq!(uniform.spot_lights[1].position, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn counts_clamp_to_capacity() {
        let mut frame = FrameLights::new();
        frame.set_counts(100, 100);
        assert_eq!(frame.point_count(), MAX_POINT_LIGHTS as u32);
        assert_eq!(frame.spot_count(), MAX_SPOT_LIGHTS as u32);
    }
}
