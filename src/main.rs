use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use entrypoint_gen::config::{GeneratorConfig, ResolvedInputs, DEFAULT_CONFIG_FILE};
use entrypoint_gen::output::{self, HashManifest, OutputSet};
use entrypoint_gen::{generate, GeneratorError};

/// Generates ANGLE entry points, validation and capture sources from the
/// GLES, EGL and CL registry models.
#[derive(Debug, Parser)]
#[command(name = "entrypoint-gen", version)]
struct Cli {
    /// Configuration file naming the registry models and tables.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render and write every output file.
    Generate {
        /// Regenerate even when the hash manifest says nothing changed.
        #[arg(long)]
        force: bool,
    },
    /// Render in memory and fail if any output on disk is out of date.
    Check,
    /// Print the comma-separated input files.
    Inputs,
    /// Print the comma-separated output files.
    Outputs,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn join_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    paths
        .into_iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn render(config: &GeneratorConfig, inputs: &ResolvedInputs) -> Result<OutputSet> {
    let loaded = inputs.load().context("loading registry models")?;
    let outputs = generate(
        &config.script_name,
        &loaded.gles,
        &loaded.egl,
        &loaded.cl,
        &loaded.tables,
    )?;
    Ok(outputs)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = GeneratorConfig::load(&cli.config)
        .with_context(|| format!("reading configuration {}", cli.config.display()))?;
    let inputs = config.resolve()?;
    let root = config.output_root();

    match cli.command {
        Command::Inputs => {
            let paths = inputs.paths();
            println!("{}", join_paths(paths.iter().map(PathBuf::as_path)));
        }
        Command::Outputs => {
            let outputs = render(&config, &inputs)?;
            let paths: Vec<PathBuf> = outputs.paths().map(|p| root.join(p)).collect();
            println!("{}", join_paths(paths.iter().map(PathBuf::as_path)));
        }
        Command::Check => {
            let outputs = render(&config, &inputs)?;
            let differing = output::out_of_date(&root, &outputs)?;
            if !differing.is_empty() {
                for path in &differing {
                    eprintln!("out of date: {}", path.display());
                }
                return Ok(ExitCode::FAILURE);
            }
            info!(files = outputs.len(), "all outputs up to date");
        }
        Command::Generate { force } => {
            let mut hashed = inputs.paths();
            hashed.push(config.source().to_path_buf());
            let input_hashes = HashManifest::hash_inputs(&hashed)?;
            let manifest_path = config.manifest_path();

            if !force {
                let fresh = manifest_path
                    .as_deref()
                    .and_then(HashManifest::load)
                    .is_some_and(|manifest| manifest.is_fresh(&input_hashes, &root));
                if fresh {
                    info!("inputs and outputs unchanged, nothing to do");
                    return Ok(ExitCode::SUCCESS);
                }
            }

            let outputs = render(&config, &inputs)?;
            output::write_all(&root, &outputs)
                .with_context(|| format!("writing outputs under {}", root.display()))?;
            output::report_stale(&root, &outputs);
            if let Some(path) = manifest_path {
                HashManifest::new(input_hashes, &outputs).save(&path)?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            if let Some(generator) = err.downcast_ref::<GeneratorError>() {
                eprintln!("  [{}] {}", generator.code(), generator.guarantee());
            }
            ExitCode::FAILURE
        }
    }
}
