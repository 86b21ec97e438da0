//! Runtime configuration for the orrery.
//!
//! Settings persist as RON files and can be overridden from the command line
//! through [`CliArgs`]. Every section uses `#[serde(default)]`, so a config file
//! only needs the values it changes.

mod cli;
#[allow(clippy::module_inception)]
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, CameraConfig, Config, DebugConfig, SceneConfig, WindowConfig};
pub use error::ConfigError;
