use anyhow::Context;
use clap::Parser;

use orrery::config::{CliArgs, Config};
use orrery::OrreryApp;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.print_default_config {
        println!("{}", Config::default().to_ron_string()?);
        return Ok(());
    }

    // Logging starts before the config is read so loading is reported. RUST_LOG
    // wins, then --log-level, then the config's level applied once it is known.
    let level_from_config = std::env::var_os("RUST_LOG").is_none() && args.log_level.is_none();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.as_deref().unwrap_or("trace")),
    )
    .init();

    let mut config = Config::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;
    config.apply_cli_overrides(&args);
    if level_from_config {
        log::set_max_level(config.debug.level_filter());
    }

    if let Some(path) = &args.config {
        log::info!("Using config {}", path.display());
    }
    if config.validate() {
        log::warn!("Some configured values were out of range and have been clamped");
    }
    log::info!("Assets from {}", config.assets.directory.display());

    OrreryApp::new(config).run()?;
    Ok(())
}
