use std::process::ExitCode;

use futures::executor::block_on;
use strata_config::ConfigProvider;
use strata_di::Loader;
use tracing_subscriber::EnvFilter;

mod bridge;
mod config;
mod factory;
mod module;
mod observer;

use crate::{config::HardwareConfig, module::MainModule};

/// Logs to stderr, `RUST_LOG` overrides the default `info` level
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let mut configs = ConfigProvider::new();
    let site = std::env::var("HARDWARE_SITE").ok();
    let config = site.map(|site| HardwareConfig { site }).unwrap_or_default();
    if let Err(error) = configs.add_config(config) {
        tracing::error!("{}", error);
        return ExitCode::FAILURE;
    }

    block_on(async {
        let app = match Loader::new().load(MainModule::new(configs)).await {
            Ok(app) => app,
            Err(error) => {
                tracing::error!("{}", error);
                return ExitCode::FAILURE;
            }
        };

        tracing::info!("Loaded modules {:?}", app.module_names());

        match app.shutdown().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                tracing::error!("{}", error);
                ExitCode::FAILURE
            }
        }
    })
}
