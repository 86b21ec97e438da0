// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, the star sprites and frame rendering.

pub mod pipeline_manager;
pub mod render_engine;
pub mod star_renderer;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use star_renderer::StarRenderer;
