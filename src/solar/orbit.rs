//! Orbit placement from elementary trigonometry
//!
//! Every body's position is a pure function of the animation clock and its
//! parameters. Nothing here integrates forces.

use cgmath::Vector3;

use super::params::{MoonParams, OrbitParams, SatelliteParams, REFERENCE_FPS};

/// Position of the Moon on its flat circle around the Earth
pub fn moon_position(time: f32, params: &MoonParams) -> Vector3<f32> {
    let angle = time * params.orbit_speed;
    Vector3::new(
        angle.cos() * params.orbit_radius,
        0.0,
        angle.sin() * params.orbit_radius,
    )
}

/// Position of the satellite, bobbing vertically at half its orbital rate
pub fn satellite_position(time: f32, params: &SatelliteParams) -> Vector3<f32> {
    let angle = time * params.orbit_speed;
    let radius = params.radius;
    Vector3::new(
        angle.cos() * radius,
        (angle * 0.5).sin() * radius * params.vertical_amplitude,
        angle.sin() * radius,
    )
}

/// Direction the satellite faces, along its path
///
/// The horizontal part is the unit tangent of the circle; the vertical part
/// follows the bob without the radius factor.
pub fn satellite_heading(time: f32, params: &SatelliteParams) -> Vector3<f32> {
    let angle = time * params.orbit_speed;
    Vector3::new(
        -angle.sin(),
        (angle * 0.5).cos() * params.vertical_amplitude,
        angle.cos(),
    )
}

/// Circular orbit around the origin, tilted about X by `inclination`
pub fn circular_orbit(time: f32, radius: f32, speed: f32, phase: f32, inclination: f32) -> Vector3<f32> {
    let angle = phase + time * speed;
    let (x, z) = (angle.cos() * radius, angle.sin() * radius);
    Vector3::new(x, -z * inclination.sin(), z * inclination.cos())
}

/// [`circular_orbit`] driven by an [`OrbitParams`] record
pub fn orbit_position(time: f32, orbit: &OrbitParams) -> Vector3<f32> {
    circular_orbit(time, orbit.radius, orbit.speed, orbit.phase, orbit.inclination)
}

/// Converts a per-frame increment tuned at [`REFERENCE_FPS`] to a per-second rate
pub fn per_frame_to_per_second(rate: f32) -> f32 {
    rate * REFERENCE_FPS
}
