pub mod cache;
pub mod handle;
pub mod material;
pub mod mesh;
pub mod texture;

pub use cache::AssetCache;
pub use handle::Handle;
pub use material::{Material, MeshBatch};
pub use mesh::Mesh;
pub use texture::Texture;

/// All GPU-resident assets the scene can reference through handles.
pub struct Assets {
    pub meshes: AssetCache<Mesh>,
    pub textures: AssetCache<Texture>,
}

impl Assets {
    pub fn new() -> Self {
        Self {
            meshes: AssetCache::new(),
            textures: AssetCache::new(),
        }
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::new()
    }
}
