//! `yaml2sexp` — convert a YAML (or JSON) document to an s-expression.
//!
//! ## Usage
//!
//! ```sh
//! # Convert ./input.yaml to stdout
//! yaml2sexp
//!
//! # Convert a given file
//! yaml2sexp config.yaml
//!
//! # Read stdin, use a custom key prefix, write to a file
//! cat config.yaml | yaml2sexp - --key-prefix cfg -o config.sexp
//!
//! # Force JSON decoding
//! yaml2sexp --format json data.txt
//!
//! # Debug logging on stderr
//! RUST_LOG=yaml_sexp=trace yaml2sexp config.yaml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use yaml_sexp::{Encoder, InputFormat, SexpError};

#[derive(Parser)]
#[command(
    name = "yaml2sexp",
    version,
    about = "Convert YAML documents to s-expressions"
)]
struct Cli {
    /// Input file (`-` reads from stdin)
    #[arg(default_value = "input.yaml")]
    input: PathBuf,

    /// Prefix written before every mapping key (`<prefix>:<key>`)
    #[arg(long, env = "YAML_SEXP_KEY_PREFIX", default_value = yaml_sexp::DEFAULT_KEY_PREFIX)]
    key_prefix: String,

    /// Input format; `auto` picks JSON for `.json` files and YAML otherwise
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Auto,
    Yaml,
    Json,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Auto => InputFormat::Auto,
            Format::Yaml => InputFormat::Yaml,
            Format::Json => InputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // A missing input gets its own message plus usage; everything
            // else prints the context chain.
            if let Some(SexpError::InputNotFound(path)) = err.downcast_ref::<SexpError>() {
                eprintln!("Error: Input file '{}' not found", path.display());
                eprintln!("Usage: yaml2sexp [INPUT]");
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let value = if cli.input.as_os_str() == "-" {
        let src = read_stdin()?;
        yaml_sexp::load_source(&src, cli.format.into()).context("Failed to load stdin")?
    } else {
        yaml_sexp::load_path(&cli.input, cli.format.into())
            .with_context(|| format!("Failed to load {}", cli.input.display()))?
    };

    let encoder = Encoder::with_key_prefix(cli.key_prefix.as_str());
    let sexp = encoder.encode(&value);
    tracing::info!(
        input = %cli.input.display(),
        root = value.type_name(),
        bytes = sexp.len(),
        "converted document"
    );

    write_output(cli.output.as_deref(), &sexp)
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read from stdin")?;
    Ok(buf)
}

fn write_output(path: Option<&Path>, sexp: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", sexp))
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{}", sexp);
        }
    }
    Ok(())
}
