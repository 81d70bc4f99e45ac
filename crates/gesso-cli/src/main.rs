//! gesso CLI: render one chat message from a file or stdin to HTML or a
//! JSON document tree. Useful for previewing tutoring content and for
//! golden-file testing of the pipeline.

mod settings;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

use gesso::{ChemistryDetection, ColorScheme, StyleMap, render};
use settings::{OutputFormat, Settings, SettingsError};

#[derive(Debug, Parser)]
#[command(name = "gesso", version, about = "Render a chat message to HTML or JSON")]
struct CliArgs {
    /// Input file; `-` or omitted reads stdin.
    input: Option<PathBuf>,

    /// Output file; omitted writes stdout.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    #[arg(long, value_enum, env = "GESSO_COLOR_SCHEME")]
    color_scheme: Option<SchemeArg>,

    /// Disable `\ce{…}` chemistry detection.
    #[arg(long)]
    no_chemistry: bool,

    /// Emit restoration diagnostics at debug level.
    #[arg(long)]
    debug: bool,

    /// Optional path to a TOML configuration file.
    #[arg(long = "config-file", env = "GESSO_CONFIG_FILE", value_name = "PATH")]
    config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemeArg {
    User,
    Assistant,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("rendering failed: {0}")]
    Render(#[from] gesso::RenderError),
    #[error("failed to serialise document: {0}")]
    Serialise(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("GESSO_LOG"))
        .with_writer(std::io::stderr)
        .init();

    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "gesso::cli", "{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), CliError> {
    let mut settings = Settings::load(args.config_file.as_deref())?;
    apply_overrides(&mut settings, &args);

    let text = read_input(args.input.as_deref())?;
    let options = settings.render_options();
    let message = render(&text, &options)?;

    let rendered = match settings.format {
        OutputFormat::Html => {
            let styles = StyleMap::for_scheme(options.color_scheme);
            message.document.to_html(styles)
        }
        OutputFormat::Json => serde_json::to_string_pretty(&message)?,
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered).map_err(CliError::Output)?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &CliArgs) {
    if let Some(format) = args.format {
        settings.format = match format {
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Json => OutputFormat::Json,
        };
    }
    if let Some(scheme) = args.color_scheme {
        settings.color_scheme = match scheme {
            SchemeArg::User => ColorScheme::User,
            SchemeArg::Assistant => ColorScheme::Assistant,
        };
    }
    if args.no_chemistry {
        settings.chemistry = ChemistryDetection::Disabled;
    }
    if args.debug {
        settings.debug = true;
    }
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read_to_string(path).map_err(CliError::Input)
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Input)?;
            Ok(buffer)
        }
    }
}
