mod batch;
mod config;
mod error;
mod finder;
mod padder;
mod report;

use batch::{PadBatch, PadItem};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use error::{PadError, PadResult};
use padder::{PadOutcome, Padding};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "png-padder")]
#[command(about = "Find PNG files under a directory and pad their canvas by a multiple")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file location
    #[arg(long, env = "PNG_PADDER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List matching files under a directory
    Find {
        #[command(flatten)]
        search: SearchArgs,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pad every matching file in place
    Pad {
        #[command(flatten)]
        search: SearchArgs,

        /// Pad each dimension by its remainder against this value
        #[arg(short, long)]
        multiple: Option<u32>,

        /// Center the original image on the new canvas
        #[arg(short, long)]
        centered: bool,

        /// Keep the original at the top-left even if config says centered
        #[arg(long, conflicts_with = "centered")]
        no_centered: bool,

        /// Leave this file out (absolute or relative to DIR), repeatable
        #[arg(long, value_name = "PATH")]
        skip: Vec<PathBuf>,

        /// Show the resulting sizes without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Store the multiple, centering and pattern as new defaults
        #[arg(long)]
        save_defaults: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recently used directories
    Recent,
}

#[derive(Args)]
struct SearchArgs {
    /// Directory to search (defaults to the most recent one)
    dir: Option<PathBuf>,

    /// File name pattern
    #[arg(long)]
    pattern: Option<String>,
}

/// Exit status when at least one file could not be padded.
const EXIT_FILES_FAILED: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> PadResult<u8> {
    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path).unwrap_or_default();

    match cli.command {
        Commands::Find { search, json } => {
            let batch = discover(&search, &config)?;
            if json {
                println!("{}", report::to_json(&batch)?);
            } else {
                report::print_listing(&batch);
                println!("{}", report::files_found_message(batch.len()));
                if batch.is_empty() {
                    println!("Nothing under {} matched", batch.root().display());
                }
            }
            remember(&mut config, &config_path, batch.root());
            Ok(0)
        }
        Commands::Pad {
            search,
            multiple,
            centered,
            no_centered,
            skip,
            dry_run,
            save_defaults,
            json,
        } => {
            let padding = resolve_padding(multiple, centered, no_centered, &config)?;
            let mut batch = discover(&search, &config)?;
            for path in &skip {
                if !batch.set_selected(path, false) {
                    log::warn!("--skip {} matched no file", path.display());
                }
            }
            if !json {
                println!("{}", report::files_found_message(batch.len()));
            }

            let code = if dry_run {
                let plan = batch.plan(padding);
                if json {
                    println!("{}", report::plan_to_json(&plan)?);
                } else {
                    print_plan(&plan);
                }
                0
            } else {
                pad(&mut batch, padding, json)?
            };

            if save_defaults {
                store_defaults(&mut config, padding, search.pattern);
            }
            remember(&mut config, &config_path, batch.root());
            Ok(code)
        }
        Commands::Recent => {
            if config.recent_directories.is_empty() {
                println!("No recent directories");
            }
            for dir in &config.recent_directories {
                println!("{}", dir);
            }
            Ok(0)
        }
    }
}

/// Command-line values win; `--no-centered` switches off a centered default.
fn resolve_padding(
    multiple: Option<u32>,
    centered: bool,
    no_centered: bool,
    config: &AppConfig,
) -> PadResult<Padding> {
    Padding::new(
        multiple.unwrap_or(config.multiple),
        !no_centered && (centered || config.centered),
    )
}

fn resolve_dir(search: &SearchArgs, config: &AppConfig) -> PadResult<PathBuf> {
    search
        .dir
        .clone()
        .or_else(|| config.last_directory())
        .ok_or(PadError::NoDirectory)
}

fn discover(search: &SearchArgs, config: &AppConfig) -> PadResult<PadBatch> {
    let dir = resolve_dir(search, config)?;
    let pattern = search.pattern.as_deref().unwrap_or(&config.pattern);
    PadBatch::discover(&dir, pattern)
}

fn store_defaults(config: &mut AppConfig, padding: Padding, pattern: Option<String>) {
    config.multiple = padding.multiple();
    config.centered = padding.centered();
    if let Some(pattern) = pattern {
        config.pattern = pattern;
    }
}

fn pad(batch: &mut PadBatch, padding: Padding, json: bool) -> PadResult<u8> {
    let processed = batch.run(padding, |progress| {
        if json {
            return;
        }
        match progress.result {
            Ok(outcome) => println!(
                "[{}/{} {:>3}%] ✅ {} {}x{} -> {}x{}",
                progress.done,
                progress.total,
                progress.percent,
                progress.path.display(),
                outcome.original.0,
                outcome.original.1,
                outcome.padded.0,
                outcome.padded.1
            ),
            Err(e) => println!(
                "[{}/{} {:>3}%] ❌ {}",
                progress.done, progress.total, progress.percent, e
            ),
        }
    });

    if json {
        println!("{}", report::to_json(batch)?);
    } else {
        println!("{}", report::files_processed_message(processed));
    }

    if batch.stats().failed > 0 {
        Ok(EXIT_FILES_FAILED)
    } else {
        Ok(0)
    }
}

fn print_plan(plan: &[(&PadItem, PadResult<PadOutcome>)]) {
    for (item, result) in plan {
        match result {
            Ok(outcome) if outcome.is_resized() => println!(
                "{}: {}x{} -> {}x{} at ({}, {})",
                item.relative_path.display(),
                outcome.original.0,
                outcome.original.1,
                outcome.padded.0,
                outcome.padded.1,
                outcome.offset.0,
                outcome.offset.1
            ),
            Ok(outcome) => println!(
                "{}: {}x{} unchanged",
                item.relative_path.display(),
                outcome.original.0,
                outcome.original.1
            ),
            Err(e) => println!("{}: ⚠ {}", item.relative_path.display(), e),
        }
    }
}

fn remember(config: &mut AppConfig, path: &Path, dir: &Path) {
    config.remember_directory(dir);
    if let Err(e) = config.save(path) {
        log::warn!("{}", e);
    }
}
