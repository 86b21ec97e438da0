//! Simulation manager
//!
//! Owns the attached [`Simulation`], scales frame time by the time scale and
//! holds it while paused.

use super::traits::Simulation;
use crate::gfx::scene::Scene;
use imgui::Ui;

/// Largest frame step handed to a simulation, so a stalled window
/// (dragging, breakpoints) does not make bodies jump.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Runs a simulation within the frame loop
pub struct SimulationManager {
    simulation: Option<Box<dyn Simulation>>,
    is_paused: bool,
    time_scale: f32,
}

impl SimulationManager {
    pub const TIME_SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=10.0;

    pub fn new() -> Self {
        Self {
            simulation: None,
            is_paused: false,
            time_scale: 1.0,
        }
    }

    /// Attach a simulation and let it populate the scene
    ///
    /// Replaces any simulation attached before it.
    pub fn attach_simulation(&mut self, mut simulation: Box<dyn Simulation>, scene: &mut Scene) {
        simulation.initialize(scene);
        log::info!("Attached simulation '{}'", simulation.name());
        self.simulation = Some(simulation);
        self.is_paused = false;
    }

    /// Update simulation (called every frame)
    ///
    /// `delta_time` is clamped to [`MAX_FRAME_TIME`] before scaling.
    pub fn update(&mut self, delta_time: f32, scene: &mut Scene) {
        if self.is_paused {
            return;
        }

        if let Some(simulation) = &mut self.simulation {
            let scaled_delta = delta_time.clamp(0.0, MAX_FRAME_TIME) * self.time_scale;
            simulation.update(scaled_delta, scene);
        }
    }

    pub fn reset(&mut self, scene: &mut Scene) {
        if let Some(simulation) = &mut self.simulation {
            simulation.reset(scene);
            log::info!("Reset simulation '{}'", simulation.name());
        }
    }

    /// Draws the "Simulation" panel and the simulation's own controls
    pub fn render_ui(&mut self, ui: &Ui, scene: &mut Scene, show_controls: bool, show_panel: bool) {
        let display_size = ui.io().display_size;
        let panel_width = 300.0;
        let panel_x = display_size[0] - panel_width - 20.0;

        let Some(simulation) = &mut self.simulation else {
            return;
        };

        if show_panel {
            let mut reset_requested = false;
            ui.window("Simulation")
                .size([panel_width, 150.0], imgui::Condition::FirstUseEver)
                .position([panel_x, 20.0], imgui::Condition::FirstUseEver)
                .build(|| {
                    ui.text(format!("{}  t = {:.1} s", simulation.name(), simulation.elapsed()));
                    ui.separator();

                    if ui.button(if self.is_paused { "Play" } else { "Pause" }) {
                        self.is_paused = !self.is_paused;
                    }
                    ui.same_line();
                    if ui.button("Reset") {
                        reset_requested = true;
                    }

                    ui.slider(
                        "Time Scale",
                        *Self::TIME_SCALE_RANGE.start(),
                        *Self::TIME_SCALE_RANGE.end(),
                        &mut self.time_scale,
                    );
                });

            if reset_requested {
                simulation.reset(scene);
            }
        }

        if show_controls {
            simulation.render_ui(ui, scene);
        }
    }

    pub fn toggle_paused(&mut self) {
        self.is_paused = !self.is_paused;
        log::debug!("Simulation {}", if self.is_paused { "paused" } else { "resumed" });
    }

}

impl Default for SimulationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Records the time steps it receives
    struct Clock {
        elapsed: Rc<Cell<f32>>,
        initialized: Rc<Cell<bool>>,
    }

    impl Simulation for Clock {
        fn initialize(&mut self, _scene: &mut Scene) {
            self.initialized.set(true);
        }

        fn update(&mut self, delta_time: f32, _scene: &mut Scene) {
            self.elapsed.set(self.elapsed.get() + delta_time);
        }

        fn render_ui(&mut self, _ui: &Ui, _scene: &mut Scene) {}

        fn name(&self) -> &str {
            "Clock"
        }

        fn elapsed(&self) -> f32 {
            self.elapsed.get()
        }

        fn reset(&mut self, _scene: &mut Scene) {
            self.elapsed.set(0.0);
        }
    }

    fn setup() -> (SimulationManager, Scene, Rc<Cell<f32>>, Rc<Cell<bool>>) {
        let config = CameraConfig::default();
        let mut scene = Scene::new(CameraManager::new(
            OrbitCamera::from_config(&config, 1.0),
            CameraController::from_config(&config),
        ));
        let elapsed = Rc::new(Cell::new(0.0));
        let initialized = Rc::new(Cell::new(false));
        let mut manager = SimulationManager::new();
        manager.attach_simulation(
            Box::new(Clock {
                elapsed: elapsed.clone(),
                initialized: initialized.clone(),
            }),
            &mut scene,
        );
        (manager, scene, elapsed, initialized)
    }

    #[test]
    fn test_attach_initializes() {
        let (manager, _scene, _elapsed, initialized) = setup();
        assert!(initialized.get());
        assert!(!manager.is_paused);
        assert_eq!(manager.simulation.as_ref().map(|s| s.name()), Some("Clock"));
    }

    #[test]
    fn test_pause_holds_time() {
        let (mut manager, mut scene, elapsed, _) = setup();
        manager.update(0.1, &mut scene);
        manager.toggle_paused();
        manager.update(0.1, &mut scene);
        assert!((elapsed.get() - 0.1).abs() < 1e-6);
        assert!(manager.is_paused);

        manager.toggle_paused();
        manager.update(0.1, &mut scene);
        assert!((elapsed.get() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale_multiplies_steps() {
        let (mut manager, mut scene, elapsed, _) = setup();
        manager.time_scale = 2.5;
        manager.update(0.1, &mut scene);
        assert!((elapsed.get() - 0.25).abs() < 1e-6);

        manager.time_scale = 0.0;
        manager.update(0.1, &mut scene);
        assert!((elapsed.get() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let (mut manager, mut scene, elapsed, _) = setup();
        manager.update(5.0, &mut scene);
        assert!((elapsed.get() - MAX_FRAME_TIME).abs() < 1e-6);
    }

    #[test]
    fn test_reset_rewinds() {
        let (mut manager, mut scene, elapsed, _) = setup();
        manager.update(0.2, &mut scene);
        manager.reset(&mut scene);
        assert_eq!(elapsed.get(), 0.0);
    }
}
