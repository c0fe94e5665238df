//! conapp command-line entry point.
//!
//! Resolves the process arguments against the demo command groups and runs
//! the matching command. Set `CONAPP_CONFIG` to a TOML file to change the
//! resolver settings.

mod demo;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};

use conapp_core::{Engine, RegistryBuilder};
use conapp_types::config::ResolverConfig;
use conapp_types::error::ConappError;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "CONAPP_CONFIG";

fn main() -> Result<ExitCode> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let loaded = load_config(config_path.as_deref());

    let fallback = ResolverConfig::default();
    let filter = loaded.as_ref().unwrap_or(&fallback).log_filter.clone();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            return Ok(ExitCode::from(failure_code(&e)));
        },
    };
    match &config_path {
        Some(path) => log::debug!("configuration loaded from {}", path.display()),
        None => log::debug!("{CONFIG_ENV} not set, using default configuration"),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    log::debug!("starting with arguments: {}", args.join(" "));

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e:#}");
            return Ok(ExitCode::from(failure_code(&e)));
        },
    };

    let code = match engine.run(&args) {
        Ok(output) => {
            for line in report::output_lines(&output) {
                println!("{line}");
            }
            0
        },
        Err(err) => {
            for line in report::error_lines(&err) {
                eprintln!("{line}");
            }
            report::exit_code(&err)
        },
    };
    log::debug!("exiting with code {code}");
    Ok(ExitCode::from(code))
}

/// Exit code for a failure before any command ran. Anything that is not a
/// conapp error is treated as a defect.
fn failure_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ConappError>().map_or(2, report::exit_code)
}

fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    match path {
        Some(path) => ResolverConfig::load(path)
            .with_context(|| format!("loading {CONFIG_ENV}={}", path.display())),
        None => Ok(ResolverConfig::default()),
    }
}

fn build_engine(config: &ResolverConfig) -> Result<Engine> {
    let mut builder = RegistryBuilder::with_config(config);
    demo::register(&mut builder);
    let registry = builder.build().context("building the command registry")?;
    log::info!("{} command groups registered", registry.groups().len());
    Ok(Engine::new(registry, demo::converters(), config))
}
