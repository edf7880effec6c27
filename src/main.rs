#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

use log::LevelFilter;
use signal_hook::consts::{SIGINT, SIGTERM};
use smokeshot::configuration::command_line::{LogLevel, Opt};
use smokeshot::configuration::constants::exit_code;
use smokeshot::configuration::manifest::Manifest;
use smokeshot::harness::{Error, Harness, RunOptions};
use smokeshot::reporter;
use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use structopt::StructOpt;

fn main() {
    let options = Opt::from_args();
    if let Err(e) = init_logging(
        options.logging.unwrap_or(LogLevel::Info).into(),
        &options.log_output_file,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
        exit(exit_code::CONFIGURATION);
    }

    let abort = Arc::new(AtomicBool::new(false));
    for signal in &[SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(*signal, Arc::clone(&abort)) {
            warn!("Cannot watch signal {}: {}", signal, e);
        }
    }

    let code = match run(&options, abort) {
        Ok(code) => code,
        Err(e @ Error::Configuration(_)) => {
            error!("{}", e);
            exit_code::CONFIGURATION
        }
        Err(e) => {
            error!("{}", e);
            exit_code::FAILED
        }
    };
    exit(code);
}

fn run(options: &Opt, abort: Arc<AtomicBool>) -> Result<i32, Error> {
    let mut manifest = Manifest::from(&options.file)?;
    options.apply(&mut manifest);
    debug!("Loaded manifest {:#?}", manifest);

    let mut harness = Harness::from_manifest(&manifest, &options.only)?;
    let run_options = RunOptions::from_manifest(&manifest, abort);
    let report = harness.run(&manifest.base_url, &run_options)?;

    let rendered = reporter::render(report, options.format.into())
        .map_err(|e| Error::Resource(format!("cannot render report: {}", e)))?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| {
                Error::Resource(format!("cannot write report to '{}': {}", path.display(), e))
            })?;
            info!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(if report.is_success() {
        exit_code::PASSED
    } else {
        exit_code::FAILED
    })
}

/// Logs go to stderr so that stdout carries nothing but the report.
fn init_logging(level: LevelFilter, output: &Option<PathBuf>) -> Result<(), fern::InitError> {
    let mut dispatcher = fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}:{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record
                    .line()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "".to_owned()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(log_file) = output {
        dispatcher = dispatcher.chain(fern::log_file(log_file)?)
    }
    dispatcher.apply()?;
    info!("Logging level {} enabled", level);
    Ok(())
}
