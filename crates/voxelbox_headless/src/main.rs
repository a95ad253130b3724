mod commands;
mod config;
mod player;
mod server;

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;
use tracing_subscriber::EnvFilter;

use config::HeadlessConfig;

fn main() {
    let mut config_path = PathBuf::from("voxelbox.toml");
    let mut tick_limit: Option<u64> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(value) = args.next() else {
                    eprintln!("--config expects a path argument");
                    std::process::exit(2);
                };
                config_path = PathBuf::from(value);
            }
            "--ticks" => {
                let Some(value) = args.next() else {
                    eprintln!("--ticks expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => tick_limit = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid tick count '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--help" | "-h" => {
                println!("Usage: voxelbox_headless [--config <path>] [--ticks <n>]");
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let (mut config, load_error) = match HeadlessConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (HeadlessConfig::default(), Some(err)),
    };
    if tick_limit.is_some() {
        config.max_ticks = tick_limit;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .try_init();

    match load_error {
        Some(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("No config at {}, using defaults", config_path.display());
        }
        Some(err) => {
            warn!("Failed to load config from {}: {err}; using defaults", config_path.display());
        }
        None => {}
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received, stopping simulation...");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl+C handler: {err}");
    }

    if let Err(err) = server::run(config, running) {
        eprintln!("headless host failed: {err}");
        std::process::exit(1);
    }
}
