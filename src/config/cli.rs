//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use super::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated Earth, Moon and satellite scene")]
pub struct CliArgs {
    /// Path to a RON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the textures and the satellite model.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of background stars.
    #[arg(long)]
    pub stars: Option<u32>,

    /// Seed for the starfield.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable vsync.
    #[arg(long)]
    pub vsync: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the default config as RON and exit.
    #[arg(long)]
    pub print_default_config: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.assets {
            self.assets.directory = dir.clone();
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(count) = args.stars {
            self.system.stars.count = count;
        }
        if let Some(seed) = args.seed {
            self.system.stars.seed = Some(seed);
        }
        if let Some(vsync) = args.vsync {
            self.window.vsync = vsync;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            stars: Some(500),
            seed: Some(42),
            assets: Some(PathBuf::from("/data/textures")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.system.stars.count, 500);
        assert_eq!(config.system.stars.seed, Some(42));
        assert_eq!(config.assets.directory, PathBuf::from("/data/textures"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 800);
        assert!(config.window.vsync);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "orrery",
            "--width",
            "800",
            "--vsync",
            "false",
            "--log-level",
            "debug",
            "--print-default-config",
        ]);
        assert_eq!(args.width, Some(800));
        assert_eq!(args.vsync, Some(false));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.print_default_config);
        assert!(args.config.is_none());
    }
}
