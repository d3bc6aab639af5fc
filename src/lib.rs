pub mod common;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod worker;

use std::{path, time};

pub use error::{Error, Result};
pub use orchestrator::{multiply, Orchestrator, Phase, Strategy};
pub use worker::{DotProduct, RowKernel};

pub fn measure_time<T>(f: impl FnOnce() -> T) -> (T, time::Duration) {
    let start = time::Instant::now();
    let res = f();
    let duration = start.elapsed();
    (res, duration)
}

/// Reads `rowmul.toml` from the working directory, falling back to the defaults if it is missing
/// or broken.
pub fn get_config() -> config::Config {
    let file = path::Path::new(config::CONFIG_FILE);

    match config::Config::from_file(file) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            // The logger is configured from the config, so it can't report this yet
            eprintln!("warning: ignoring {}: {}", file.display(), e);
            config::Config::default()
        }
    }
}

/// Logs go to stderr so that stdout only ever carries the result.
pub fn init_logging(config: &config::Config) {
    let res = env_logger::Builder::new()
        .parse_filters(&config.log)
        .target(env_logger::Target::Stderr)
        .format_timestamp_micros()
        .try_init();

    match res {
        Ok(()) => log::debug!("{:?}", config),
        Err(e) => eprintln!("warning: logger already initialised: {}", e),
    }
}
