//! Firmware target lookup for network switches.
//!
//! Maps a device model (and its running image) to the target firmware from a
//! static table and prints one JSON result line for the calling playbook.
//! `--map` and `--list` are opt-in operator extras; plain resolution reads
//! no files.
//!
//! Usage:
//!   fw-target -m WS-C2960X-24TS-L -v '15.0(1)SE'
//!   fw-target -m C2960 -v '15.0(2)SE11' -i c2960-lanlitek9-mz.150-2.SE11.bin
//!   fw-target --list --map /etc/fw-target/map.json

mod config;
mod error;
mod license;
mod model_map;
mod resolve;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{debug, info};

use crate::model_map::ModelMap;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "fw-target",
    about = "Map a switch model to its target firmware and report whether an upgrade is required",
    disable_version_flag = true
)]
struct Cli {
    /// Currently running firmware version.
    #[arg(short = 'v', long = "version", required_unless_present = "list")]
    version: Option<String>,

    /// Device model, e.g. WS-C2960X-24TS-L.
    #[arg(short = 'm', long = "model", required_unless_present = "list")]
    model: Option<String>,

    /// Currently running image filename (used to infer the license variant).
    #[arg(short = 'i', long = "image", default_value = "")]
    image: String,

    /// Operator override: load the model map from a JSON file instead of the
    /// built-in table. Without it no file is read.
    #[arg(long = "map")]
    map: Option<PathBuf>,

    /// Print the active model map as JSON and exit. The only mode in which
    /// --version and --model may be omitted.
    #[arg(long)]
    list: bool,

    /// Log resolution steps to stderr.
    #[arg(short = 'd', long)]
    debug: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("fw-target: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let map = match &cli.map {
        Some(path) => {
            let map = config::load_model_map(path)
                .with_context(|| format!("model map {}", path.display()))?;
            info!("loaded {} model families from {}", map.len(), path.display());
            map
        }
        None => {
            let map = ModelMap::builtin();
            map.validate().context("built-in model map")?;
            map
        }
    };

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    let (version, model) = match (cli.version, cli.model) {
        (Some(v), Some(m)) => (v, m),
        _ => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "--version and --model are required")
            .exit(),
    };

    debug!("resolving model={model} version={version} image={}", cli.image);
    let result = resolve::resolve(&map, &version, &model, &cli.image);
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

// ── Logging setup ─────────────────────────────────────────────────────────────

/// Logs go to stderr; stdout carries only the JSON result.
fn setup_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}
