//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::solar::params::{clamp_into, Rgb, SystemParams};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Orbit camera settings.
    pub camera: CameraConfig,
    /// Texture and model locations.
    pub assets: AssetConfig,
    /// Scene-wide interaction and clear colour.
    pub scene: SceneConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Initial values of every tunable body parameter.
    pub system: SystemParams,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Orbit camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Starting distance from the target.
    pub distance: f32,
    /// Starting elevation in radians.
    pub pitch: f32,
    /// Starting azimuth in radians.
    pub yaw: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the pending motion applied each frame (0 disables damping).
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub enable_pan: bool,
}

/// Asset locations, relative to `directory`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub directory: PathBuf,
    pub moon_map: String,
    pub earth_day_map: String,
    pub earth_cloud_map: String,
    pub earth_night_map: String,
    /// Height map used for the Earth's bump mapping.
    pub earth_bump_map: String,
    pub earth_specular_map: String,
    pub satellite_model: String,
}

/// Scene-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Rotate the whole scene while the left mouse button is held.
    pub drag_rotation: bool,
    /// Radians of scene rotation per pixel of mouse motion.
    pub drag_rotation_speed: f32,
    pub clear_color: Rgb,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (e.g., "debug", "info", "warn"). `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Show the parameter panel.
    pub show_controls: bool,
    /// Show the object list panel.
    pub show_scene_objects: bool,
    /// Show the pause/reset/time-scale panel.
    pub show_simulation: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 25.0,
            near: 0.1,
            far: 4000.0,
            distance: 60.0,
            pitch: 0.3,
            yaw: 0.0,
            min_distance: 1.0,
            max_distance: 2000.0,
            damping_factor: 0.05,
            rotate_speed: 0.5,
            pan_speed: 0.5,
            zoom_speed: 1.0,
            enable_pan: true,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("source"),
            moon_map: "8k_moon_day_map.jpg".to_string(),
            earth_day_map: "8k_earth_day_map.jpg".to_string(),
            earth_cloud_map: "8k_earth_cloud_map.jpg".to_string(),
            earth_night_map: "8k_earth_nightmap.jpg".to_string(),
            earth_bump_map: "8k_earth_normal_map.jpg".to_string(),
            earth_specular_map: "8k_earth_specular_map.jpg".to_string(),
            satellite_model: "satellite.glb".to_string(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            drag_rotation: true,
            drag_rotation_speed: 0.005,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_controls: true,
            show_scene_objects: true,
            show_simulation: true,
        }
    }
}

impl DebugConfig {
    /// `log_level` as a global filter, falling back to info when unrecognised.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.parse() {
            Ok(level) => level,
            Err(_) => {
                log::warn!("Unknown log level '{}', using info", self.log_level);
                log::LevelFilter::Info
            }
        }
    }
}

impl AssetConfig {
    /// Full path of an asset file name.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}

// --- Load / Save / Validate ---

impl Config {
    /// Load config from an explicit file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
            }
        }
        let serialized = self.to_ron_string()?;
        std::fs::write(path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Clamp out-of-range values, logging each correction.
    ///
    /// Returns `true` when anything changed.
    pub fn validate(&mut self) -> bool {
        let mut changed = self.system.clamp_to_ranges();

        let camera = &mut self.camera;
        changed |= clamp_into("camera.fov_y_degrees", &mut camera.fov_y_degrees, &(1.0..=120.0));
        changed |= clamp_into("camera.near", &mut camera.near, &(0.001..=10.0));
        changed |= clamp_into("camera.damping_factor", &mut camera.damping_factor, &(0.0..=1.0));
        changed |= clamp_into("camera.min_distance", &mut camera.min_distance, &(0.01..=100.0));
        if camera.max_distance.is_nan() || camera.max_distance < camera.min_distance {
            log::warn!(
                "camera.max_distance {} is below min_distance, using {}",
                camera.max_distance,
                camera.min_distance
            );
            camera.max_distance = camera.min_distance;
            changed = true;
        }
        if camera.far.is_nan() || camera.far <= camera.near {
            log::warn!(
                "camera.far {} is not beyond near, using {}",
                camera.far,
                camera.near * 10.0
            );
            camera.far = camera.near * 10.0;
            changed = true;
        }
        changed |= clamp_into(
            "camera.distance",
            &mut camera.distance,
            &(camera.min_distance..=camera.max_distance),
        );

        changed |= clamp_into("window.width", &mut self.window.width, &(1..=16384));
        changed |= clamp_into("window.height", &mut self.window.height, &(1..=16384));
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str = config.to_ron_string().unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1200"));
        assert!(ron_str.contains("orbit_radius: 20.0"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (width: 640), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.system, SystemParams::default());
    }

    #[test]
    fn test_partial_system_section() {
        let ron_str = "(system: (moon: (orbit_radius: 25.0), stars: (seed: Some(7))))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.system.moon.orbit_radius, 25.0);
        assert_eq!(config.system.moon.radius, 1.2);
        assert_eq!(config.system.stars.seed, Some(7));
        assert_eq!(config.system.stars.count, 10_000);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orrery.ron");
        let mut config = Config::default();
        config.window.width = 1920;
        config.system.satellite.radius = 12.0;
        config.assets.directory = PathBuf::from("/opt/textures");

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.ron"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        assert!(!config.validate());

        config.system.moon.orbit_radius = 100.0;
        config.camera.distance = 5000.0;
        config.camera.max_distance = 0.5;
        assert!(config.validate());
        assert_eq!(config.system.moon.orbit_radius, 30.0);
        assert_eq!(config.camera.max_distance, config.camera.min_distance);
        assert_eq!(config.camera.distance, config.camera.min_distance);
    }

    #[test]
    fn test_validate_replaces_nan_from_file() {
        let ron_str = "(system: (moon: (radius: NaN, orbit_radius: NaN)), camera: (max_distance: NaN))";
        let mut config: Config = ron::from_str(ron_str).unwrap();
        assert!(config.validate());
        assert!(!config.system.moon.radius.is_nan());
        assert!(!config.system.moon.orbit_radius.is_nan());
        assert_eq!(config.camera.max_distance, config.camera.min_distance);
        assert!(!config.camera.distance.is_nan());
    }

    #[test]
    fn test_log_level_filter() {
        let mut debug = DebugConfig::default();
        assert_eq!(debug.level_filter(), log::LevelFilter::Info);
        debug.log_level = "DEBUG".to_string();
        assert_eq!(debug.level_filter(), log::LevelFilter::Debug);
        debug.log_level = "loud".to_string();
        assert_eq!(debug.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_asset_paths_join_directory() {
        let assets = AssetConfig::default();
        assert_eq!(
            assets.path(&assets.moon_map),
            PathBuf::from("source").join("8k_moon_day_map.jpg")
        );
    }
}
