//! Live-tunable parameter records for every body in the scene
//!
//! Each record carries the slider range of its numeric fields. The panel edits
//! the records in place and [`SolarSystem`](super::system::SolarSystem) reads
//! them every frame. Values coming from a config file are clamped into range
//! with [`SystemParams::clamp_to_ranges`].

use std::f32::consts::PI;
use std::fmt::Debug;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// RGB colour with components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// Frame rate that per-frame increments were tuned against.
pub const REFERENCE_FPS: f32 = 60.0;

pub const WHITE: Rgb = [1.0, 1.0, 1.0];

/// Clamps `value` into `range`, logging when it had to move.
///
/// Values that compare with nothing (NaN) fall back to the start of the range.
/// Returns `true` when the value was changed.
pub fn clamp_into<T>(label: &str, value: &mut T, range: &RangeInclusive<T>) -> bool
where
    T: PartialOrd + Copy + Debug,
{
    if range.contains(value) {
        return false;
    }
    let clamped = if *value > *range.end() {
        *range.end()
    } else {
        *range.start()
    };

    log::warn!(
        "{} = {:?} is outside {:?}..={:?}, using {:?}",
        label,
        value,
        range.start(),
        range.end(),
        clamped
    );
    *value = clamped;
    true
}

fn clamp_color(label: &str, color: &mut Rgb) -> bool {
    let mut changed = false;
    for channel in color.iter_mut() {
        changed |= clamp_into(label, channel, &(0.0..=1.0));
    }
    changed
}

/// Moon sphere, orbit and surface relief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonParams {
    pub radius: f32,
    /// Width and height segments of the sphere
    pub segments: u32,
    pub orbit_radius: f32,
    /// Angular speed of the orbit in radians per second
    pub orbit_speed: f32,
    /// Spin in radians per frame at [`REFERENCE_FPS`]
    pub rotation_speed: f32,
    pub bump_scale: f32,
    /// Keep the same face turned toward the Earth instead of spinning
    pub tidally_locked: bool,
}

impl MoonParams {
    pub const RADIUS_RANGE: RangeInclusive<f32> = 0.5..=2.0;
    pub const SEGMENTS_RANGE: RangeInclusive<u32> = 10..=50;
    pub const ORBIT_RADIUS_RANGE: RangeInclusive<f32> = 10.0..=30.0;
    pub const ORBIT_SPEED_RANGE: RangeInclusive<f32> = 0.01..=0.5;
    pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.001..=0.01;
    pub const BUMP_SCALE_RANGE: RangeInclusive<f32> = 0.0..=0.5;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into("moon.radius", &mut self.radius, &Self::RADIUS_RANGE);
        changed |= clamp_into("moon.segments", &mut self.segments, &Self::SEGMENTS_RANGE);
        changed |= clamp_into(
            "moon.orbit_radius",
            &mut self.orbit_radius,
            &Self::ORBIT_RADIUS_RANGE,
        );
        changed |= clamp_into(
            "moon.orbit_speed",
            &mut self.orbit_speed,
            &Self::ORBIT_SPEED_RANGE,
        );
        changed |= clamp_into(
            "moon.rotation_speed",
            &mut self.rotation_speed,
            &Self::ROTATION_SPEED_RANGE,
        );
        changed |= clamp_into(
            "moon.bump_scale",
            &mut self.bump_scale,
            &Self::BUMP_SCALE_RANGE,
        );
        changed
    }
}

impl Default for MoonParams {
    fn default() -> Self {
        Self {
            radius: 1.2,
            segments: 20,
            orbit_radius: 20.0,
            orbit_speed: 0.1,
            rotation_speed: 0.005,
            bump_scale: 0.1,
            tidally_locked: true,
        }
    }
}

/// The circle drawn along the moon's path. Its radius follows
/// [`MoonParams::orbit_radius`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonOrbitParams {
    pub color: Rgb,
    pub opacity: f32,
    pub segments: u32,
}

impl MoonOrbitParams {
    pub const OPACITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const SEGMENTS_RANGE: RangeInclusive<u32> = 3..=128;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_color("moon_orbit.color", &mut self.color);
        changed |= clamp_into(
            "moon_orbit.opacity",
            &mut self.opacity,
            &Self::OPACITY_RANGE,
        );
        changed |= clamp_into(
            "moon_orbit.segments",
            &mut self.segments,
            &Self::SEGMENTS_RANGE,
        );
        changed
    }
}

impl Default for MoonOrbitParams {
    fn default() -> Self {
        Self {
            color: WHITE,
            opacity: 0.5,
            segments: 64,
        }
    }
}

/// Communications satellite placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteParams {
    /// Uniform scale applied to the imported model
    pub scale: f32,
    pub radius: f32,
    pub orbit_speed: f32,
    /// Height of the vertical bob as a fraction of the radius
    pub vertical_amplitude: f32,
}

impl SatelliteParams {
    pub const SCALE_RANGE: RangeInclusive<f32> = 0.001..=0.1;
    pub const RADIUS_RANGE: RangeInclusive<f32> = 5.0..=20.0;
    pub const ORBIT_SPEED_RANGE: RangeInclusive<f32> = 0.1..=2.0;
    pub const VERTICAL_AMPLITUDE_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into("satellite.scale", &mut self.scale, &Self::SCALE_RANGE);
        changed |= clamp_into("satellite.radius", &mut self.radius, &Self::RADIUS_RANGE);
        changed |= clamp_into(
            "satellite.orbit_speed",
            &mut self.orbit_speed,
            &Self::ORBIT_SPEED_RANGE,
        );
        changed |= clamp_into(
            "satellite.vertical_amplitude",
            &mut self.vertical_amplitude,
            &Self::VERTICAL_AMPLITUDE_RANGE,
        );
        changed
    }
}

impl Default for SatelliteParams {
    fn default() -> Self {
        Self {
            scale: 0.01,
            radius: 8.0,
            orbit_speed: 0.5,
            vertical_amplitude: 0.5,
        }
    }
}

/// The translucent torus marking the satellite's orbit. Its radius follows
/// [`SatelliteParams::radius`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteOrbitParams {
    /// Rotation about X in radians; a quarter turn lays the torus flat
    pub inclination_x: f32,
    pub inclination_y: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub tube_radius: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

impl SatelliteOrbitParams {
    pub const INCLINATION_RANGE: RangeInclusive<f32> = -PI..=PI;
    /// Slider step of the inclination controls
    pub const INCLINATION_STEP: f32 = PI / 180.0;
    pub const OPACITY_RANGE: RangeInclusive<f32> = 0.1..=1.0;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into(
            "satellite_orbit.inclination_x",
            &mut self.inclination_x,
            &Self::INCLINATION_RANGE,
        );
        changed |= clamp_into(
            "satellite_orbit.inclination_y",
            &mut self.inclination_y,
            &Self::INCLINATION_RANGE,
        );
        changed |= clamp_color("satellite_orbit.color", &mut self.color);
        changed |= clamp_into(
            "satellite_orbit.opacity",
            &mut self.opacity,
            &Self::OPACITY_RANGE,
        );
        changed |= clamp_into(
            "satellite_orbit.tube_radius",
            &mut self.tube_radius,
            &(0.001..=1.0),
        );
        changed |= clamp_into(
            "satellite_orbit.radial_segments",
            &mut self.radial_segments,
            &(3..=64),
        );
        changed |= clamp_into(
            "satellite_orbit.tubular_segments",
            &mut self.tubular_segments,
            &(3..=512),
        );
        changed
    }

    /// Snaps both inclinations to whole degrees.
    pub fn snap_inclinations(&mut self) {
        let step = Self::INCLINATION_STEP;
        self.inclination_x = (self.inclination_x / step).round() * step;
        self.inclination_y = (self.inclination_y / step).round() * step;
    }
}

impl Default for SatelliteOrbitParams {
    fn default() -> Self {
        Self {
            inclination_x: PI / 2.0,
            inclination_y: 0.0,
            color: WHITE,
            opacity: 0.5,
            tube_radius: 0.05,
            radial_segments: 16,
            tubular_segments: 100,
        }
    }
}

/// Earth surface and cloud layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthParams {
    pub radius: f32,
    pub segments: u32,
    pub bump_scale: f32,
    pub specular: Rgb,
    pub shininess: f32,
    /// Brightness of the night-side city lights
    pub night_intensity: f32,
    pub cloud_radius: f32,
    pub cloud_opacity: f32,
    /// Cloud spin in radians per frame at [`REFERENCE_FPS`]
    pub cloud_rotation_speed: f32,
}

impl EarthParams {
    pub const BUMP_SCALE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const SHININESS_RANGE: RangeInclusive<f32> = 1.0..=128.0;
    pub const NIGHT_INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const CLOUD_OPACITY_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const CLOUD_ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.0..=0.005;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into("earth.radius", &mut self.radius, &(0.1..=50.0));
        changed |= clamp_into("earth.segments", &mut self.segments, &(8..=256));
        changed |= clamp_into(
            "earth.bump_scale",
            &mut self.bump_scale,
            &Self::BUMP_SCALE_RANGE,
        );
        changed |= clamp_color("earth.specular", &mut self.specular);
        changed |= clamp_into(
            "earth.shininess",
            &mut self.shininess,
            &Self::SHININESS_RANGE,
        );
        changed |= clamp_into(
            "earth.night_intensity",
            &mut self.night_intensity,
            &Self::NIGHT_INTENSITY_RANGE,
        );
        changed |= clamp_into(
            "earth.cloud_opacity",
            &mut self.cloud_opacity,
            &Self::CLOUD_OPACITY_RANGE,
        );
        changed |= clamp_into(
            "earth.cloud_rotation_speed",
            &mut self.cloud_rotation_speed,
            &Self::CLOUD_ROTATION_SPEED_RANGE,
        );
        if self.cloud_radius < self.radius {
            log::warn!(
                "earth.cloud_radius {} is below the surface, using {}",
                self.cloud_radius,
                self.radius * 1.01
            );
            self.cloud_radius = self.radius * 1.01;
            changed = true;
        }
        changed
    }
}

impl Default for EarthParams {
    fn default() -> Self {
        Self {
            radius: 5.0,
            segments: 64,
            bump_scale: 0.2,
            specular: [0.5, 0.5, 0.5],
            shininess: 30.0,
            night_intensity: 0.5,
            cloud_radius: 5.05,
            cloud_opacity: 0.4,
            cloud_rotation_speed: 0.0003,
        }
    }
}

/// Background point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarParams {
    pub count: u32,
    /// Edge length of the cube the stars are scattered in
    pub spread: f32,
    pub size: f32,
    pub color: Rgb,
    /// Shrink stars with distance, never below one pixel
    pub size_attenuation: bool,
    /// Fixed seed for a reproducible sky
    pub seed: Option<u64>,
}

impl StarParams {
    pub const SIZE_RANGE: RangeInclusive<f32> = 0.1..=3.0;
    pub const COUNT_RANGE: RangeInclusive<u32> = 0..=200_000;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into("stars.size", &mut self.size, &Self::SIZE_RANGE);
        changed |= clamp_into("stars.count", &mut self.count, &Self::COUNT_RANGE);
        changed |= clamp_into("stars.spread", &mut self.spread, &(1.0..=100_000.0));
        changed |= clamp_color("stars.color", &mut self.color);
        changed
    }
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            spread: 2000.0,
            size: 1.0,
            color: WHITE,
            size_attenuation: true,
            seed: None,
        }
    }
}

/// Circular orbit around the scene origin shared by the Sun and the planets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    pub radius: f32,
    /// Radians per second
    pub speed: f32,
    /// Starting angle in radians
    pub phase: f32,
    /// Tilt of the orbital plane about the X axis in radians
    pub inclination: f32,
}

impl OrbitParams {
    pub const RADIUS_RANGE: RangeInclusive<f32> = 10.0..=1500.0;
    pub const SPEED_RANGE: RangeInclusive<f32> = 0.0..=0.5;
    pub const INCLINATION_RANGE: RangeInclusive<f32> = -0.5..=0.5;

    fn clamp_to_ranges(&mut self, label: &str) -> bool {
        let mut changed = clamp_into(
            &format!("{}.orbit.radius", label),
            &mut self.radius,
            &Self::RADIUS_RANGE,
        );
        changed |= clamp_into(
            &format!("{}.orbit.speed", label),
            &mut self.speed,
            &Self::SPEED_RANGE,
        );
        changed |= clamp_into(
            &format!("{}.orbit.inclination", label),
            &mut self.inclination,
            &Self::INCLINATION_RANGE,
        );
        changed
    }
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            radius: 50.0,
            speed: 0.05,
            phase: 0.0,
            inclination: 0.0,
        }
    }
}

/// The Sun: an unlit sphere that can drag the point light along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunParams {
    pub radius: f32,
    pub color: Rgb,
    pub orbit: OrbitParams,
    /// Move the point light to the Sun's position every frame
    pub light_follows_sun: bool,
}

impl SunParams {
    pub const RADIUS_RANGE: RangeInclusive<f32> = 1.0..=60.0;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_into("sun.radius", &mut self.radius, &Self::RADIUS_RANGE);
        changed |= clamp_color("sun.color", &mut self.color);
        changed |= self.orbit.clamp_to_ranges("sun");
        changed
    }
}

impl Default for SunParams {
    fn default() -> Self {
        Self {
            radius: 12.0,
            color: [1.0, 0.85, 0.45],
            orbit: OrbitParams {
                radius: 400.0,
                speed: 0.005,
                phase: 0.6,
                inclination: 0.0,
            },
            light_follows_sun: false,
        }
    }
}

/// A planet on a wide circular orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetParams {
    pub name: String,
    pub radius: f32,
    pub color: Rgb,
    /// Texture file name inside the asset directory
    pub texture: Option<String>,
    pub orbit: OrbitParams,
}

impl PlanetParams {
    pub const RADIUS_RANGE: RangeInclusive<f32> = 0.2..=10.0;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let label = format!("planets.{}", self.name);
        let mut changed = clamp_into(
            &format!("{}.radius", label),
            &mut self.radius,
            &Self::RADIUS_RANGE,
        );
        changed |= clamp_color(&format!("{}.color", label), &mut self.color);
        changed |= self.orbit.clamp_to_ranges(&label);
        changed
    }

    fn new(name: &str, radius: f32, color: Rgb, orbit: OrbitParams) -> Self {
        Self {
            name: name.to_string(),
            radius,
            color,
            texture: None,
            orbit,
        }
    }
}

impl Default for PlanetParams {
    fn default() -> Self {
        Self::new("Planet", 1.0, [0.7, 0.7, 0.7], OrbitParams::default())
    }
}

fn default_planets() -> Vec<PlanetParams> {
    vec![
        PlanetParams::new(
            "Venus",
            1.1,
            [0.93, 0.82, 0.6],
            OrbitParams {
                radius: 45.0,
                speed: 0.08,
                phase: 0.4,
                inclination: 0.06,
            },
        ),
        PlanetParams::new(
            "Mars",
            0.8,
            [0.8, 0.36, 0.22],
            OrbitParams {
                radius: 70.0,
                speed: 0.05,
                phase: 2.1,
                inclination: -0.03,
            },
        ),
        PlanetParams::new(
            "Jupiter",
            3.2,
            [0.85, 0.72, 0.55],
            OrbitParams {
                radius: 115.0,
                speed: 0.03,
                phase: 4.0,
                inclination: 0.02,
            },
        ),
        PlanetParams::new(
            "Saturn",
            2.7,
            [0.9, 0.8, 0.55],
            OrbitParams {
                radius: 160.0,
                speed: 0.02,
                phase: 5.3,
                inclination: 0.04,
            },
        ),
    ]
}

/// Ambient light plus one point light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub point_color: Rgb,
    pub point_intensity: f32,
    pub point_position: [f32; 3],
}

impl LightingParams {
    pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=4.0;

    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = clamp_color("lighting.ambient_color", &mut self.ambient_color);
        changed |= clamp_into(
            "lighting.ambient_intensity",
            &mut self.ambient_intensity,
            &Self::INTENSITY_RANGE,
        );
        changed |= clamp_color("lighting.point_color", &mut self.point_color);
        changed |= clamp_into(
            "lighting.point_intensity",
            &mut self.point_intensity,
            &Self::INTENSITY_RANGE,
        );
        changed
    }
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            ambient_color: WHITE,
            ambient_intensity: 0.6,
            point_color: WHITE,
            point_intensity: 1.0,
            point_position: [5.0, 3.0, 5.0],
        }
    }
}

/// Every tunable value in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemParams {
    pub moon: MoonParams,
    pub moon_orbit: MoonOrbitParams,
    pub satellite: SatelliteParams,
    pub satellite_orbit: SatelliteOrbitParams,
    pub earth: EarthParams,
    pub stars: StarParams,
    pub sun: SunParams,
    pub planets: Vec<PlanetParams>,
    pub lighting: LightingParams,
}

impl SystemParams {
    /// Clamps every field into its slider range. Returns `true` if anything moved.
    pub fn clamp_to_ranges(&mut self) -> bool {
        let mut changed = self.moon.clamp_to_ranges();
        changed |= self.moon_orbit.clamp_to_ranges();
        changed |= self.satellite.clamp_to_ranges();
        changed |= self.satellite_orbit.clamp_to_ranges();
        changed |= self.earth.clamp_to_ranges();
        changed |= self.stars.clamp_to_ranges();
        changed |= self.sun.clamp_to_ranges();
        for planet in &mut self.planets {
            changed |= planet.clamp_to_ranges();
        }
        changed |= self.lighting.clamp_to_ranges();
        changed
    }
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            moon: MoonParams::default(),
            moon_orbit: MoonOrbitParams::default(),
            satellite: SatelliteParams::default(),
            satellite_orbit: SatelliteOrbitParams::default(),
            earth: EarthParams::default(),
            stars: StarParams::default(),
            sun: SunParams::default(),
            planets: default_planets(),
            lighting: LightingParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_within_ranges() {
        let mut params = SystemParams::default();
        assert!(!params.clamp_to_ranges());
        assert_eq!(params, SystemParams::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut moon = MoonParams {
            radius: 5.0,
            segments: 3,
            orbit_speed: -1.0,
            ..Default::default()
        };
        assert!(moon.clamp_to_ranges());
        assert_eq!(moon.radius, 2.0);
        assert_eq!(moon.segments, 10);
        assert_eq!(moon.orbit_speed, 0.01);
        // Untouched fields keep their values
        assert_eq!(moon.orbit_radius, 20.0);
    }

    #[test]
    fn test_nan_falls_back_to_range_start() {
        let mut moon = MoonParams {
            radius: f32::NAN,
            orbit_radius: f32::NAN,
            ..Default::default()
        };
        assert!(moon.clamp_to_ranges());
        assert_eq!(moon.radius, *MoonParams::RADIUS_RANGE.start());
        assert_eq!(moon.orbit_radius, *MoonParams::ORBIT_RADIUS_RANGE.start());

        let mut speed = f32::NAN;
        assert!(clamp_into("speed", &mut speed, &(0.0..=1.0)));
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn test_cloud_layer_stays_above_surface() {
        let mut earth = EarthParams {
            radius: 5.0,
            cloud_radius: 4.0,
            ..Default::default()
        };
        assert!(earth.clamp_to_ranges());
        assert!(earth.cloud_radius > earth.radius);
    }

    #[test]
    fn test_colors_are_clamped_per_channel() {
        let mut orbit = MoonOrbitParams {
            color: [1.5, -0.2, 0.5],
            ..Default::default()
        };
        assert!(orbit.clamp_to_ranges());
        assert_eq!(orbit.color, [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_inclination_snaps_to_whole_degrees() {
        let mut orbit = SatelliteOrbitParams {
            inclination_x: 0.3,
            inclination_y: -1.0001,
            ..Default::default()
        };
        orbit.snap_inclinations();
        let degrees_x = orbit.inclination_x.to_degrees();
        let degrees_y = orbit.inclination_y.to_degrees();
        assert!((degrees_x - degrees_x.round()).abs() < 1e-3);
        assert!((degrees_y - degrees_y.round()).abs() < 1e-3);
    }

    #[test]
    fn test_default_scene_has_planets() {
        let params = SystemParams::default();
        let names: Vec<&str> = params.planets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Venus", "Mars", "Jupiter", "Saturn"]);
        assert!(params
            .planets
            .iter()
            .all(|p| p.orbit.radius > params.moon.orbit_radius));
    }
}
