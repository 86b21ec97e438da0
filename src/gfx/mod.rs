//! # Graphics Module
//!
//! Everything between the scene description and the window surface.
//!
//! - **Camera** ([`camera`]) - Damped orbit camera and its uniform
//! - **Geometry** ([`geometry`]) - Procedural spheres, rings, tori and cubes
//! - **Assets** ([`assets`]) - Texture and model decoding
//! - **Resources** ([`resources`]) - Textures, materials and global uniforms on the GPU
//! - **Scene** ([`scene`]) - Objects, lights, the starfield and the root rotation
//! - **Rendering** ([`rendering`]) - Pipelines and the per-frame render pass
//!
//! ```no_run
//! use orrery::gfx::{RenderEngine, scene::Scene};
//!
//! // The render engine is created by OrreryApp once the window exists
//! // let render_engine = RenderEngine::new(window, width, height, true).await?;
//! ```

pub mod assets;
pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
