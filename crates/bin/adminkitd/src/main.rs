//! # adminkitd — adminkit daemon
//!
//! Loads the configuration, initialises logging, builds the engine and serves
//! until Ctrl-C or SIGTERM.
//!
//! The configuration file is the first argument, else `$ADMINKIT_CONFIG`,
//! else `adminkit.toml` in the working directory.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use adminkit_app::Config;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "adminkit.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let path = config_path();
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging.filter);
    tracing::info!(config = %path.display(), "configuration loaded");

    let listen = config.server.listen.clone();
    let engine = match adminkitd::build(config).await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(error = %err, "engine build failed");
            report(&err);
            return ExitCode::FAILURE;
        }
    };

    let running = match engine.start(&listen).await {
        Ok(running) => running,
        Err(err) => {
            tracing::error!(error = %err, "engine start failed");
            report(&err);
            return ExitCode::FAILURE;
        }
    };
    eprintln!(
        "adminkitd listening on http://{}{}",
        running.local_addr(),
        running.config().server.prefix
    );

    running.run_until_interrupt().await;
    ExitCode::SUCCESS
}

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("ADMINKIT_CONFIG"))
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from)
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("adminkitd: invalid log filter {filter:?} ({err}), using \"info\"");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Print `err` and its causes to stderr.
fn report(err: &dyn Error) {
    eprintln!("adminkitd: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
