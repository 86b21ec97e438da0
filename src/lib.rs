// src/lib.rs
//! Orrery
//!
//! An animated Earth, Moon and satellite, with the Sun and a few planets on
//! distant orbits, drawn over a starfield with wgpu and winit. Every body's
//! parameters can be tuned live from an imgui panel.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod simulation;
pub mod solar;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::OrreryApp;
pub use config::Config;
pub use error::{OrreryError, Result};
