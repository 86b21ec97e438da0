use std::f32::consts::TAU;

use cgmath::{Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Pixels of trackpad scrolling treated as one wheel notch
const PIXELS_PER_WHEEL_STEP: f32 = 50.0;

/// Damped orbit controls.
///
/// Input accumulates pending rotation and pan; [`CameraController::update`]
/// applies `damping_factor` of what is pending each frame and keeps the rest,
/// so motion eases out after the mouse stops.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vector3<f32>,
    is_shift_held: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.5,
            damping_factor: 0.0,
            enable_pan: true,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vector3::zero(),
            is_shift_held: false,
            is_left_pressed: false,
            is_right_pressed: false,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut controller = Self::new(config.rotate_speed, config.zoom_speed);
        controller.pan_speed = config.pan_speed;
        controller.damping_factor = config.damping_factor;
        controller.enable_pan = config.enable_pan;
        controller
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.is_left_pressed = pressed,
            MouseButton::Right => self.is_right_pressed = pressed,
            _ => (),
        }
    }

    /// Handles wheel and motion input.
    ///
    /// Returns the pixel delta when the motion was a rotating drag.
    pub fn process_events(
        &mut self,
        event: &DeviceEvent,
        window: &Window,
        camera: &mut OrbitCamera,
    ) -> Option<(f32, f32)> {
        match event {
            DeviceEvent::MouseWheel { delta } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_WHEEL_STEP
                    }
                };
                self.zoom(steps, camera);
                window.request_redraw();
                None
            }
            DeviceEvent::MouseMotion { delta } => {
                let delta = (delta.0 as f32, delta.1 as f32);
                let height = window.inner_size().height as f32;
                if self.is_panning() {
                    self.pan(delta, height, camera);
                    window.request_redraw();
                    None
                } else if self.is_rotating() {
                    self.rotate(delta, height);
                    window.request_redraw();
                    Some(delta)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Tracks Shift from the window's modifier state.
    ///
    /// Arrives even while the UI holds the keyboard, so a Shift released over a
    /// panel does not leave left-drag panning.
    pub fn set_shift_held(&mut self, held: bool) {
        self.is_shift_held = held;
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                repeat: false,
                ..
            } => {
                if self.is_shift_held {
                    log::info!("Resetting camera to its starting position");
                    self.stop();
                    camera.reset_to_default();
                }
            }
            _ => (),
        }
    }

    /// Queues a rotation for a mouse drag of `delta` pixels.
    ///
    /// A drag across the full viewport height turns the camera a full circle
    /// at `rotate_speed` 1.
    pub fn rotate(&mut self, delta: (f32, f32), viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_yaw -= TAU * delta.0 / viewport_height * self.rotate_speed;
        self.pending_pitch += TAU * delta.1 / viewport_height * self.rotate_speed;
    }

    /// Queues a pan that keeps the point under the cursor fixed at the target depth.
    pub fn pan(&mut self, delta: (f32, f32), viewport_height: f32, camera: &OrbitCamera) {
        if !self.enable_pan {
            return;
        }
        let scale = camera.world_units_per_pixel(viewport_height) * self.pan_speed;
        let (right, forward) = camera.ground_axes();
        self.pending_pan += right * (-delta.0 * scale) + forward * (delta.1 * scale);
    }

    /// Zooms by `steps` wheel notches. Positive steps move closer.
    pub fn zoom(&mut self, steps: f32, camera: &mut OrbitCamera) {
        let scale = 0.95_f32.powf(self.zoom_speed * steps);
        camera.scale_distance(scale);
    }

    /// Applies pending motion. Call once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let factor = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };

        if self.pending_yaw != 0.0 || self.pending_pitch != 0.0 {
            camera.add_yaw(self.pending_yaw * factor);
            camera.add_pitch(self.pending_pitch * factor);
        }
        if !self.pending_pan.is_zero() {
            let step = self.pending_pan * factor;
            let (right, forward) = camera.ground_axes();
            camera.pan((
                cgmath::dot(step, right),
                cgmath::dot(step, forward),
            ));
        }

        let keep = 1.0 - factor;
        self.pending_yaw *= keep;
        self.pending_pitch *= keep;
        self.pending_pan *= keep;

        // Settle once the remaining motion is imperceptible
        if self.pending_yaw.abs() < 1e-6 && self.pending_pitch.abs() < 1e-6 {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        }
        if self.pending_pan.x.abs() < 1e-6
            && self.pending_pan.y.abs() < 1e-6
            && self.pending_pan.z.abs() < 1e-6
        {
            self.pending_pan = Vector3::zero();
        }
    }

    /// Drops any motion still easing out.
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = Vector3::zero();
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.enable_pan && (self.is_right_pressed || (self.is_left_pressed && self.is_shift_held))
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_left_pressed && !self.is_panning()
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw == 0.0 && self.pending_pitch == 0.0 && self.pending_pan.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 1.5)
    }

    #[test]
    fn test_damping_eases_rotation() {
        let mut camera = camera();
        let mut controller = CameraController::from_config(&CameraConfig::default());
        controller.rotate((100.0, 0.0), 800.0);
        let total = -TAU * 100.0 / 800.0 * 0.5;

        controller.update(&mut camera);
        assert!(approx(camera.yaw, total * 0.05));
        assert!(!controller.is_settled());

        for _ in 0..2000 {
            controller.update(&mut camera);
        }
        assert!(controller.is_settled());
        assert!((camera.yaw - total).abs() < 1e-3);
    }

    #[test]
    fn test_no_damping_applies_immediately() {
        let mut camera = camera();
        let mut controller = CameraController::new(1.0, 1.0);
        controller.rotate((0.0, 80.0), 800.0);
        controller.update(&mut camera);
        assert!(approx(camera.pitch, 0.3 + TAU * 0.1));
        assert!(controller.is_settled());
    }

    #[test]
    fn test_zoom_direction_and_clamp() {
        let mut camera = camera();
        let mut controller = CameraController::from_config(&CameraConfig::default());
        controller.zoom(1.0, &mut camera);
        assert!(approx(camera.distance, 60.0 * 0.95));
        controller.zoom(-2.0, &mut camera);
        assert!(camera.distance > 60.0);
        controller.zoom(-1000.0, &mut camera);
        assert_eq!(camera.distance, 2000.0);
    }

    #[test]
    fn test_pan_moves_target_horizontally() {
        let mut camera = camera();
        let mut controller = CameraController::new(1.0, 1.0);
        controller.pan((50.0, 20.0), 800.0, &camera);
        controller.update(&mut camera);
        assert!(camera.target.x.abs() > 0.0);
        assert!(approx(camera.target.y, 0.0));
    }

    #[test]
    fn test_pan_disabled() {
        let mut camera = camera();
        let mut controller = CameraController::new(1.0, 1.0);
        controller.enable_pan = false;
        controller.pan((50.0, 20.0), 800.0, &camera);
        controller.update(&mut camera);
        assert_eq!(camera.target, Vector3::zero());
    }

    #[test]
    fn test_drag_modes() {
        let mut controller = CameraController::new(1.0, 1.0);
        assert!(!controller.is_rotating());
        controller.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(controller.is_rotating());
        assert!(!controller.is_panning());
        controller.process_mouse_button(MouseButton::Right, ElementState::Pressed);
        assert!(controller.is_panning());
        assert!(!controller.is_rotating());
        controller.process_mouse_button(MouseButton::Right, ElementState::Released);
        controller.process_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(!controller.is_rotating());
        assert!(!controller.is_panning());
    }

    #[test]
    fn test_shift_release_ends_left_drag_pan() {
        let mut controller = CameraController::new(1.0, 1.0);
        controller.set_shift_held(true);
        controller.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(controller.is_panning());

        controller.set_shift_held(false);
        assert!(!controller.is_panning());
        assert!(controller.is_rotating());
    }
}
