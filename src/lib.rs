//! dedup-drive - Concurrent Duplicate File Remover
//!
//! Walks a directory tree, hashes every file with a pool of workers and
//! reports all but the first file seen with each content digest as
//! duplicates. Duplicates can optionally be deleted (or moved to the trash).

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;

use crate::actions::{delete_batch, NoCallback};
use crate::cli::{Cli, OutputFormat};
use crate::config::{Config, ConfigError};
use crate::duplicates::{DuplicateFinder, RunState};
use crate::error::ExitCode;
use crate::output::text::DELETE_HINT;
use crate::output::{JsonOutput, TextDeleteReporter, TextOutput};
use crate::progress::Progress;

/// Run the application with parsed arguments, printing to stdout.
///
/// # Errors
///
/// Returns [`ConfigError`] for a missing directory or invalid configuration
/// and [`duplicates::FinderError`] if the directory cannot be enumerated.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    run_with_output(&cli, &mut io::stdout())
}

/// Run the application, writing the report to `out`.
///
/// Logging is left to the caller.
///
/// # Errors
///
/// Same as [`run_app`].
pub fn run_with_output<W: Write + Send>(cli: &Cli, out: &mut W) -> Result<ExitCode> {
    let root = match cli.directory.as_deref() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Err(ConfigError::MissingDirectory.into()),
    };

    let config = Config::load(cli.config.as_deref())?.apply_cli(cli);
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    let quiet = cli.quiet || cli.output == OutputFormat::Json;
    let progress = Arc::new(Progress::new(quiet));
    let finder = DuplicateFinder::new(config.finder_config().with_progress_callback(progress));

    let report = finder.find_duplicates(root)?;

    match cli.output {
        OutputFormat::Text => {
            TextOutput::new(&report).write_to(out)?;
            if cli.delete {
                log::debug!("Run state: {}", RunState::Deleting);
                let reporter = TextDeleteReporter::new(&mut *out);
                delete_batch(
                    &report.duplicate_paths(),
                    &config.delete_config(),
                    Some(&reporter),
                );
            } else {
                writeln!(out, "{}", DELETE_HINT)?;
            }
        }
        OutputFormat::Json => {
            let mut output = JsonOutput::new(&report);
            if cli.delete {
                log::debug!("Run state: {}", RunState::Deleting);
                let result = delete_batch::<NoCallback>(
                    &report.duplicate_paths(),
                    &config.delete_config(),
                    None,
                );
                output = output.with_deletion(&result);
            }
            output.write_to(out, true)?;
        }
    }

    if cli.delete {
        log::debug!("Run state: {}", RunState::Done);
    }
    Ok(ExitCode::Success)
}
