// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vista - run a scene authoring script and export the resulting scene.
//!
//! ```text
//! vista <script.ron> [--settings <vista.ron>] [--format ron|json]
//!       [--output <file>] [--keep-going]
//! ```
//!
//! ## Architecture
//!
//! The command loads session settings (next to the script unless given),
//! installs their ambient defaults, runs the script statement by statement
//! against a fresh scene and writes a snapshot of the registry and every
//! embedded node it reaches.

mod config;
mod script;

use config::{ConfigError, ExportFormat, ExportSettings, SessionSettings};
use script::{Runner, Script, ScriptError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vista_scene::Scene;

const DEFAULT_LOG_FILTER: &str = "vista_cli=debug,vista_scene=info";

/// Errors that end a run
#[derive(Debug, Error)]
enum CliError {
    /// Bad command line
    #[error("{0} (usage: vista <script.ron> [--settings <file>] [--format ron|json] [--output <file>] [--keep-going])")]
    Usage(String),

    /// Settings could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Script could not be loaded or was aborted
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Snapshot could not be serialized to RON
    #[error("Failed to export scene: {0}")]
    Ron(#[from] ron::Error),

    /// Snapshot could not be serialized to JSON
    #[error("Failed to export scene: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Some statements failed while the run continued
    #[error("{0} statement(s) failed")]
    Incomplete(usize),
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Cli {
    script: PathBuf,
    settings: Option<PathBuf>,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    keep_going: bool,
}

fn parse_cli(args: &[String]) -> Result<Cli, CliError> {
    let mut cli = Cli::default();
    let mut script = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(CliError::Usage("missing value for --settings".to_string()));
                };
                cli.settings = Some(PathBuf::from(v));
                i += 2;
            }
            "--format" => {
                let format = match args.get(i + 1).map(String::as_str) {
                    Some("ron") => ExportFormat::Ron,
                    Some("json") => ExportFormat::Json,
                    Some(other) => {
                        return Err(CliError::Usage(format!("unknown format: {other}")));
                    }
                    None => {
                        return Err(CliError::Usage("missing value for --format".to_string()));
                    }
                };
                cli.format = Some(format);
                i += 2;
            }
            "--output" | "-o" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(CliError::Usage("missing value for --output".to_string()));
                };
                cli.output = Some(PathBuf::from(v));
                i += 2;
            }
            "--keep-going" => {
                cli.keep_going = true;
                i += 1;
            }
            other if other.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown argument: {other}")));
            }
            other => {
                if script.is_some() {
                    return Err(CliError::Usage(format!("unexpected argument: {other}")));
                }
                script = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }

    cli.script = script.ok_or_else(|| CliError::Usage("missing script path".to_string()))?;
    Ok(cli)
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Vista v{}", env!("CARGO_PKG_VERSION"));

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = parse_cli(&argv).and_then(|cli| run(&cli)) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let script = Script::load(&cli.script)?;

    let settings_path = match &cli.settings {
        Some(path) => path.clone(),
        None => SessionSettings::file_path(cli.script.parent().unwrap_or(Path::new("."))),
    };
    let mut settings = SessionSettings::load_or_default(&settings_path)?;
    if let Some(format) = cli.format {
        settings.export.format = format;
    }
    if cli.output.is_some() {
        settings.export.output = cli.output.clone();
    }
    if cli.keep_going {
        settings.abort_on_error = false;
    }

    let name = script.name.clone().unwrap_or_else(|| settings.scene_name.clone());
    let mut scene = Scene::new(name);
    let report = {
        let mut runner = Runner::new(&mut scene).abort_on_error(settings.abort_on_error);
        runner.apply_defaults(&settings.defaults)?;
        let report = runner.run(&script)?;
        for (name, id) in runner.bindings() {
            tracing::debug!(binding = name, %id, "Bound");
        }
        report
    };

    tracing::info!(
        executed = report.executed,
        failed = report.failed.len(),
        registered = scene.len(),
        nodes = scene.node_count(),
        "Script finished"
    );

    export(&scene, &settings.export)?;

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::Incomplete(report.failed.len()))
    }
}

fn export(scene: &Scene, settings: &ExportSettings) -> Result<(), CliError> {
    let snapshot = scene.snapshot();
    let text = match settings.format {
        ExportFormat::Ron => snapshot.to_ron()?,
        ExportFormat::Json => snapshot.to_json()?,
    };

    match &settings.output {
        Some(path) => {
            let mut path = path.clone();
            if path.extension().is_none() {
                path.set_extension(settings.format.extension());
            }
            std::fs::write(&path, text)?;
            tracing::info!("Exported {} to {}", scene.name(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
