//! # Asset Loading
//!
//! Decodes the JPEG/PNG textures and the satellite model from disk into
//! CPU-side data. Uploading is left to [`crate::gfx::resources`].
//!
//! - [`texture`] - image decoding, downscaling and mip generation
//! - [`model`] - glTF/GLB import (OBJ as a fallback format)

pub mod model;
pub mod texture;

pub use model::{load_gltf as load_glb, load_model, ModelData, ModelMaterial, ModelMesh};
pub use texture::{load_texture, TextureData};
