use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod browser;
pub mod cli;
pub mod config;
pub mod providers;
pub mod transfer;

use cli::Cli;
use config::AppConfig;
use providers::aws::AwsStore;
use transfer::TransferEngine;

/// Log through `log` macros; `RUST_LOG` overrides the default level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    // Missing credentials are fatal: nothing works without a store
    let config = match AppConfig::load(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let succeeded = runtime.block_on(async move {
        let store = match AwsStore::new(&config) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error: failed to create S3 client: {}", e);
                return false;
            }
        };
        cli::execute(TransferEngine::new(Arc::new(store)), cli.command).await
    });

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
