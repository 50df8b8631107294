//! localconf CLI: render devstack local.conf files from job parameters.
//!
//! Usage:
//!   localconf write --params params.yaml [--output local.conf] [--base-dir dir]
//!   localconf order vars --params params.yaml [--json]
//!   localconf order plugins --params params.yaml [--base-dir dir] [--json]
//!   localconf discover <base-dir> [--json]

use clap::{Parser, Subcommand};
use localconf::{
    plugin_sources, LocalConf, LocalConfParams, PluginGraph, PluginRequirements, VarGraph,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "localconf",
    version,
    about = "Dependency-ordered devstack local.conf generator"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a local.conf
    Write {
        /// YAML or JSON parameter file
        #[arg(long)]
        params: PathBuf,
        /// Output path (defaults to `path` in the parameters, else stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Directory holding plugin checkouts
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
    /// Print the resolved order of variables or plugins
    Order {
        #[command(subcommand)]
        target: OrderTarget,
    },
    /// Print plugin requirements declared by checkouts under a directory
    Discover {
        /// Directory holding plugin checkouts
        base_dir: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum OrderTarget {
    /// localrc variables
    Vars {
        /// YAML or JSON parameter file
        #[arg(long)]
        params: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// devstack plugins
    Plugins {
        /// YAML or JSON parameter file
        #[arg(long)]
        params: PathBuf,
        /// Directory holding plugin checkouts
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Failure of a subcommand; a closed stdout is not one
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Output(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}

impl CliError {
    fn failed(err: impl std::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

type CliResult = Result<(), CliError>;

fn load_params(path: &Path) -> Result<LocalConfParams, CliError> {
    LocalConfParams::from_path(path).map_err(CliError::failed)
}

fn print_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> CliResult {
    let text = serde_json::to_string_pretty(value).map_err(CliError::failed)?;
    writeln!(out, "{}", text)?;
    Ok(())
}

fn cmd_write(
    out: &mut impl Write,
    params: &Path,
    output: Option<PathBuf>,
    base_dir: Option<PathBuf>,
) -> CliResult {
    let params = load_params(params)?.with_base_dir(base_dir).with_path(output);
    let conf = LocalConf::new(&params).map_err(CliError::failed)?;
    match &params.path {
        Some(path) => conf.write(path).map_err(CliError::failed),
        None => {
            out.write_all(conf.render().as_bytes())?;
            Ok(())
        }
    }
}

fn cmd_order_vars(out: &mut impl Write, params: &Path, json: bool) -> CliResult {
    let localrc = load_params(params)?.localrc.unwrap_or_default();
    let ordered = VarGraph::new(&localrc)
        .and_then(|graph| graph.ordered_vars())
        .map_err(CliError::failed)?;
    if json {
        return print_json(out, &ordered);
    }
    for (name, value) in ordered {
        writeln!(out, "{}={}", name, value)?;
    }
    Ok(())
}

fn cmd_order_plugins(
    out: &mut impl Write,
    params: &Path,
    base_dir: Option<PathBuf>,
    json: bool,
) -> CliResult {
    let params = load_params(params)?.with_base_dir(base_dir);
    let sources = plugin_sources(&params.plugins.unwrap_or_default());
    let ordered = PluginGraph::discover(params.base_dir.as_deref(), &sources)
        .map_err(CliError::failed)?
        .ordered_plugins()
        .map_err(CliError::failed)?;
    if json {
        return print_json(out, &ordered);
    }
    // Same lines `write` emits: plugins without a location are not enabled
    for (name, source) in ordered {
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            writeln!(out, "enable_plugin {} {}", name, source)?;
        }
    }
    Ok(())
}

fn cmd_discover(out: &mut impl Write, base_dir: &Path, json: bool) -> CliResult {
    let found = PluginRequirements::discover(base_dir).map_err(CliError::failed)?;
    if json {
        return print_json(out, &found);
    }
    if found.is_empty() {
        writeln!(out, "No plugin requirements found.")?;
        return Ok(());
    }
    for (name, requires) in found.iter() {
        let requires: Vec<&str> = requires.iter().map(String::as_str).collect();
        writeln!(out, "{:<32}  {}", name, requires.join(" "))?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Write {
            params,
            output,
            base_dir,
        } => cmd_write(&mut out, &params, output, base_dir),
        Commands::Order { target } => match target {
            OrderTarget::Vars { params, json } => cmd_order_vars(&mut out, &params, json),
            OrderTarget::Plugins {
                params,
                base_dir,
                json,
            } => cmd_order_plugins(&mut out, &params, base_dir, json),
        },
        Commands::Discover { base_dir, json } => cmd_discover(&mut out, &base_dir, json),
    }
    .and_then(|()| out.flush().map_err(CliError::from));

    let code = match result {
        Ok(()) => 0,
        Err(CliError::Output(e)) if e.kind() == io::ErrorKind::BrokenPipe => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };
    std::process::exit(code);
}
