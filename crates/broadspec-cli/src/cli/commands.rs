use super::CliError;
use super::helpers::{BroadeningSession, parse_unit, parse_units, resolve_export_format};
use super::plot::render_spectrum_svg;
use broadspec_core::numerics::convert_position;
use broadspec_core::{ExportError, Spectrum, write_spectrum};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct BroadeningFlags {
    /// Gaussian width in eV (applies to both units)
    #[arg(long)]
    pub(super) sigma: Option<f64>,

    /// First sample of the axis, in the spectrum unit
    #[arg(long, allow_negative_numbers = true)]
    pub(super) start: Option<f64>,

    /// Last sample of the axis, in the spectrum unit
    #[arg(long, allow_negative_numbers = true)]
    pub(super) stop: Option<f64>,

    /// Number of evenly spaced samples
    #[arg(long)]
    pub(super) points: Option<usize>,

    /// Unit of the line positions in the input (skips unit inference)
    #[arg(long)]
    pub(super) input_unit: Option<String>,

    /// JSON file with broadening defaults
    #[arg(long)]
    pub(super) config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CalculateArgs {
    /// CSV file with alternating strength/position columns
    input: PathBuf,

    /// Unit of the spectrum axis (eV or nm)
    #[arg(long)]
    unit: String,

    /// Export destination; the .dat table goes to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export format (dat or json); defaults to the output extension
    #[arg(long)]
    format: Option<String>,

    #[command(flatten)]
    broadening: BroadeningFlags,
}

#[derive(clap::Args)]
pub(super) struct PlotArgs {
    /// CSV file with alternating strength/position columns
    input: PathBuf,

    /// SVG destination
    #[arg(long)]
    output: PathBuf,

    /// Precompute the spectrum in this unit (repeatable)
    #[arg(long = "calculate")]
    calculate: Vec<String>,

    /// Unit to display; required when both units are computed
    #[arg(long)]
    unit: Option<String>,

    #[command(flatten)]
    broadening: BroadeningFlags,
}

#[derive(clap::Args)]
pub(super) struct ConvertArgs {
    /// Values in the unit opposite to --to
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Target unit (eV or nm)
    #[arg(long)]
    to: String,
}

pub(super) fn run_calculate_command(args: CalculateArgs) -> Result<i32, CliError> {
    let unit = parse_unit(&args.unit)?;
    let format = resolve_export_format(args.format.as_deref(), args.output.as_deref())?;
    let mut session = BroadeningSession::open(&args.input, &args.broadening)?;

    let request = session.request(unit)?;
    let spectrum = session.aggregator.compute_spectrum(request)?.spectrum();
    println!("{}", peak_summary(spectrum));

    match &args.output {
        Some(output) => {
            write_spectrum(output, spectrum, format)?;
            info!("wrote {} export to '{}'", format.as_str(), output.display());
        }
        None => {
            let rendered = format
                .render(spectrum)
                .map_err(|source| ExportError::Encode { source })?;
            print!("{rendered}");
        }
    }
    Ok(0)
}

pub(super) fn run_plot_command(args: PlotArgs) -> Result<i32, CliError> {
    let precompute = parse_units(&args.calculate)?;
    let display_unit = args.unit.as_deref().map(parse_unit).transpose()?;
    let mut session = BroadeningSession::open(&args.input, &args.broadening)?;

    for unit in precompute {
        let request = session.request(unit)?;
        session.aggregator.compute_spectrum(request)?;
    }
    if let Some(unit) = display_unit {
        if session.aggregator.state().cached(unit).is_none() {
            let request = session.request(unit)?;
            session.aggregator.compute_spectrum(request)?;
        }
    }

    let spectrum = session
        .aggregator
        .display_spectrum(display_unit, None)?
        .spectrum();
    println!("{}", peak_summary(spectrum));
    render_spectrum_svg(spectrum, &args.output)?;
    info!("wrote plot to '{}'", args.output.display());
    Ok(0)
}

pub(super) fn run_convert_command(args: ConvertArgs) -> Result<i32, CliError> {
    let to = parse_unit(&args.to)?;
    let from = to.other();
    for value in args.values {
        let converted = convert_position(value, from, to)?;
        println!("{converted:.6}");
    }
    Ok(0)
}

fn peak_summary(spectrum: &Spectrum) -> String {
    match spectrum.peak() {
        Some(peak) => format!(
            "Peak: {:.4} {} (intensity {:.6E})",
            peak.position,
            spectrum.display_unit(),
            peak.intensity
        ),
        None => "Peak: none".to_string(),
    }
}
