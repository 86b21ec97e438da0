//! # User Interface
//!
//! Dear ImGui panels drawn over the scene.
//!
//! - [`UiManager`] - imgui context, input capture and the overlay pass
//! - [`panel`] - the "Controls" and "Scene Objects" windows
//!
//! When imgui wants the mouse or keyboard, camera and scene input is held back
//! so dragging a slider never spins the view.

pub mod manager;
pub mod panel;

pub use manager::{InputCapture, UiManager};
pub use panel::{controls_panel, scene_objects_panel};
