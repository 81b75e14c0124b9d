//! # Steelframe CLI
//!
//! Runs an editing script against a model without a window. Each script
//! command is played through the same edit controller the GUI uses; the
//! effects of every command are printed as one JSON line, followed by the
//! final model.
//!
//! ```text
//! frame_cli --units m --script frame.txt > session.jsonl
//! ```

mod script;
mod session;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use thiserror::Error;

use frame_core::model::Model;
use frame_core::units::LengthUnit;

use session::{Session, SessionSettings};

#[derive(Parser)]
#[command(name = "frame_cli", version, about = "Scripted steel frame editing")]
struct Cli {
    /// Script file; read from stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Units for a new model (mm, m or in)
    #[arg(short, long, default_value = "in", value_parser = parse_units)]
    units: LengthUnit,

    /// JSON file with `editor`, `appearance` and `grid` sections
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Start from this model JSON instead of an empty model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Pretty-print the final model
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("invalid JSON in {path}: {source}")]
    Json { path: String, source: serde_json::Error },

    #[error("{0}")]
    Model(#[from] frame_core::EditError),

    #[error("cannot write output: {0}")]
    Output(#[from] serde_json::Error),
}

fn parse_units(s: &str) -> Result<LengthUnit, String> {
    LengthUnit::from_label(s).ok_or_else(|| format!("unknown unit '{}', expected mm, m or in", s))
}

fn read_text(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(text)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = read_text(Some(path))?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<bool, CliError> {
    let settings: SessionSettings = match &cli.settings {
        Some(path) => read_json(path)?,
        None => SessionSettings::default(),
    };
    let model = match &cli.model {
        Some(path) => {
            let model: Model = read_json(path)?;
            for section in &model.sections {
                section.validate()?;
            }
            for member in &model.members {
                member.validate()?;
            }
            model
        }
        None => Model::new("Untitled", cli.units),
    };

    let text = read_text(cli.script.as_deref())?;
    let commands = match script::parse_script(&text) {
        Ok(commands) => commands,
        Err(errors) => {
            for e in &errors {
                error!("{}", e);
                eprintln!("{}", e);
            }
            return Ok(false);
        }
    };
    info!("running {} commands in {}", commands.len(), model.units());

    let mut session = Session::new(model, settings);
    for (line, command) in &commands {
        let report = session.run(*line, command);
        println!("{}", serde_json::to_string(&report)?);
    }

    let model = if cli.pretty {
        serde_json::to_string_pretty(session.model())?
    } else {
        serde_json::to_string(session.model())?
    };
    println!("{}", model);
    Ok(true)
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
