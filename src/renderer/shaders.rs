use crate::renderer::registry::{ShaderId, ShaderRegistry};

/// A compiled shader module plus the identity the active-shader list tracks.
pub struct ShaderProgram {
    id: ShaderId,
    label: &'static str,
    module: wgpu::ShaderModule,
}

impl ShaderProgram {
    fn new(device: &wgpu::Device, label: &'static str, source: &str, id: ShaderId) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        Self { id, label, module }
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

/// The renderer's built-in programs, created once at startup and registered
/// with the active-shader list in construction order.
pub struct ShaderSet {
    pub geometry: ShaderProgram,
    pub shadow: ShaderProgram,
    pub lighting: ShaderProgram,
    pub blit: ShaderProgram,
}

impl ShaderSet {
    pub fn new(device: &wgpu::Device, registry: &mut ShaderRegistry) -> Self {
        let mut next_id = 0u32;
        let mut program = |label: &'static str, source: &str| {
            let id = ShaderId(next_id);
            next_id += 1;
            let program = ShaderProgram::new(device, label, source, id);
            registry.add(program.id());
            program
        };

        let geometry = program("GeometryPassShader", include_str!("../shaders/geometry.wgsl"));
        let shadow = program("ShadowPassShader", include_str!("../shaders/shadow.wgsl"));
        let lighting = program("LightingPassShader", include_str!("../shaders/lighting.wgsl"));
        let blit = program("BlitShader", include_str!("../shaders/blit.wgsl"));

        log::info!("Compiled {} built-in shader programs", next_id);

        Self {
            geometry,
            shadow,
            lighting,
            blit,
        }
    }
}
