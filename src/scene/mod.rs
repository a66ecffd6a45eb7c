// scene/mod.rs

pub mod camera;
pub mod components;
pub mod graph;
pub mod transform;

pub use camera::Camera;
pub use graph::Scene;
pub use transform::{StaleTransform, Transform};

pub use components::{
    Children, DirectionalLightRenderer, ModelRenderer, Name, Parent, PointLightRenderer, Spin,
    SpotLightRenderer,
};
