use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "papermap")]
#[command(about = "Papermap - tile and label-zone generator for paper maps")]
#[command(version)]
#[command(long_about = "
Papermap indexes a large set of circular paper markers in a quadtree and
generates label zones and raster tiles for every zoom depth in parallel.

Examples:
  papermap generate --input markers.json --out site
  papermap generate --input markers.json --skip-tiles --threads 8
  papermap single --input markers.json --out overview.png --size 4096
  papermap plan --input markers.json
  papermap config > papermap.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of worker threads
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the index and write label zones and tiles for every depth
    Generate {
        /// Marker file (JSON)
        #[arg(short, long, required = true)]
        input: PathBuf,

        /// Output root (overrides general.output_root)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not generate label zones
        #[arg(long)]
        skip_labels: bool,

        /// Do not generate raster tiles
        #[arg(long)]
        skip_tiles: bool,

        /// Only write the manifests
        #[arg(long)]
        skip_cells: bool,

        /// Write grayscale tiles to tiles-bw/
        #[arg(long)]
        grayscale: bool,
    },

    /// Render the whole map into a single image
    Single {
        /// Marker file (JSON)
        #[arg(short, long, required = true)]
        input: PathBuf,

        /// Output image (.png or .jpg)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Edge length in pixels (overrides tiles.overview_size)
        #[arg(long)]
        size: Option<u32>,

        #[arg(long)]
        grayscale: bool,
    },

    /// Print the label and tile schemes for a marker file
    Plan {
        /// Marker file (JSON)
        #[arg(short, long, required = true)]
        input: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        example: bool,

        /// Write it to a file instead of stdout
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(threads) = cli.threads {
        config.general.max_workers = threads;
    }

    match cli.command {
        Commands::Generate {
            input,
            out,
            skip_labels,
            skip_tiles,
            skip_cells,
            grayscale,
        } => {
            if let Some(out) = out {
                config.general.output_root = out;
            }
            config.labels.skip |= skip_labels;
            config.tiles.skip |= skip_tiles;
            config.general.skip_cells |= skip_cells;
            config.tiles.grayscale |= grayscale;
            commands::generate::execute(&config, &input)?;
        }

        Commands::Single {
            input,
            out,
            size,
            grayscale,
        } => {
            if let Some(size) = size {
                config.tiles.overview_size = size;
            }
            config.tiles.grayscale |= grayscale;
            commands::single::execute(&config, &input, &out)?;
        }

        Commands::Plan { input } => {
            commands::plan::execute(&config, &input)?;
        }

        Commands::Config { example, write } => {
            if example {
                config = Config::default();
            }
            match write {
                Some(path) => {
                    config.save_to_file(&path)?;
                    log::info!("Configuration written to {}", path.display());
                }
                None if example => print!("{}", Config::example_toml()?),
                None => print!("{}", toml::to_string_pretty(&config).map_err(CliError::from)?),
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}
