pub mod buffers;
pub mod context;
pub mod draw;
pub mod gbuffer;
pub mod lights;
pub mod material_binder;
pub mod pipeline;
pub mod primitives;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod renderer;
pub mod shaders;
pub mod shadow;
pub mod target;
pub mod timeline;
pub mod uniforms;
pub mod vertex;

pub use context::RendererError;
pub use draw::{DrawItem, DrawList};
pub use gbuffer::GBuffer;
pub use lights::{
    Attenuation, DirectionalLight, FrameLights, LightColors, PointLight, SpotLight,
    DEFAULT_ATTENUATION, MAX_POINT_LIGHTS, MAX_SHADOW_MAPS, MAX_SPOT_LIGHTS,
};
pub use registry::{LightRegistry, ShaderId, ShaderRegistry};
pub use renderer::Renderer;
pub use shadow::{ShadowAtlas, ShadowMap};
pub use target::SceneTarget;
pub use timeline::{frame_passes, PassEvent, PassTimeline, TargetId};
pub use vertex::Vertex;
