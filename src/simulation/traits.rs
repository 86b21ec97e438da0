//! Core animation trait
//!
//! A [`Simulation`] owns the state that drives the scene over time. The
//! [`SimulationManager`](super::manager::SimulationManager) calls it once per
//! frame with a scaled time step and lets it draw its own panel.

use crate::gfx::scene::Scene;
use imgui::Ui;

/// Per-frame scene animation
pub trait Simulation {
    /// Populate the scene
    ///
    /// Called once when the simulation is attached, before the first frame.
    fn initialize(&mut self, scene: &mut Scene);

    /// Advance by `delta_time` seconds and write the new state into the scene
    fn update(&mut self, delta_time: f32, scene: &mut Scene);

    /// Build the simulation's own parameter panel
    ///
    /// Edits take effect on the next [`Simulation::update`].
    fn render_ui(&mut self, ui: &Ui, scene: &mut Scene);

    /// Get simulation name for UI display
    fn name(&self) -> &str;

    /// Seconds of animation time elapsed since the last reset
    fn elapsed(&self) -> f32;

    /// Return to the initial state
    fn reset(&mut self, scene: &mut Scene);
}
