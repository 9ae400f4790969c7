use std::{fs, io, process};

use anyhow::Context;
use tracing::{error, info};

use tacc::config::{DriverConfig, LogFormat, SAMPLE_PROGRAM, SourceOrigin};
use tacc::driver::{self, DriverError};

fn init_logging(config: &DriverConfig) {
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(config.log_level);
    match config.log_format {
        LogFormat::Json => builder.json().with_current_span(false).init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() -> anyhow::Result<()> {
    let config = DriverConfig::from_env();
    init_logging(&config);
    info!(source = %config.source, "starting compilation");

    let source = match &config.source {
        SourceOrigin::File(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        SourceOrigin::BuiltinSample => SAMPLE_PROGRAM.to_string(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match driver::run(&source, &mut out) {
        Ok(_) => Ok(()),
        Err(DriverError::Compile(err)) => {
            error!(category = err.category(), error = %err, "compilation failed");
            eprintln!("{err}");
            process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
