//! # Scene Management Module
//!
//! The scene graph the orrery draws: objects with meshes and transforms,
//! materials, the ambient and point lights, and the background starfield.
//!
//! ## Key Components
//!
//! - [`Scene`] - Container for objects, materials, lights, stars and the camera
//! - [`Object`] - A named group of meshes under one [`Transform`]
//! - [`Starfield`] - Point cloud drawn as screen-facing sprites
//! - [`Vertex3D`] - Vertex with position, normal, and texture coordinates
//!
//! Everything hangs off a root rotated by dragging the mouse, so object world
//! matrices are `root * local`.

pub mod light;
pub mod object;
pub mod scene;
pub mod starfield;
pub mod transform;
pub mod vertex;

// Re-export main types
pub use light::SceneLights;
pub use object::{DrawObject, Mesh, Object, Topology};
pub use scene::Scene;
pub use starfield::Starfield;
pub use transform::Transform;
pub use vertex::Vertex3D;
