mod commands;
mod helpers;
mod plot;

use broadspec_core::{
    ConfigError, DatasetLoadError, Diagnostic, ErrorCategory, ExportError, SpectrumError,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV_VAR: &str = "BROADSPEC_LOG";

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            eprintln!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{err}");
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "broadspec",
    version,
    about = "Gaussian-broadened absorption spectra from excitation energies"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Broaden a dataset into a spectrum and export it
    Calculate(commands::CalculateArgs),
    /// Render a broadened spectrum as SVG
    Plot(commands::PlotArgs),
    /// Convert photon energies to wavelengths or back
    Convert(commands::ConvertArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Calculate(args) => commands::run_calculate_command(args),
        CliCommand::Plot(args) => commands::run_plot_command(args),
        CliCommand::Convert(args) => commands::run_convert_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
    #[error(transparent)]
    Dataset(#[from] DatasetLoadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl Diagnostic for CliError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage(_) => ErrorCategory::InputValidationError,
            Self::Spectrum(error) => error.category(),
            Self::Dataset(error) => error.category(),
            Self::Config(error) => error.category(),
            Self::Export(error) => error.category(),
            Self::Internal(_) => ErrorCategory::IoSystemError,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Usage(_) => "INPUT.CLI_USAGE",
            Self::Spectrum(error) => error.placeholder(),
            Self::Dataset(error) => error.placeholder(),
            Self::Config(error) => error.placeholder(),
            Self::Export(error) => error.placeholder(),
            Self::Internal(_) => "IO.CLI",
        }
    }
}
