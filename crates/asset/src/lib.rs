//! Asset loading (textures) and CPU-side geometry.

pub mod geometry;
pub mod loader;
pub mod mesh;
pub mod texture;

pub use loader::{FileSource, LoadingManager, Progress, TextureLoader, TextureRequest, TextureSource};
pub use mesh::{MeshData, MeshVertex};
pub use texture::TextureData;
