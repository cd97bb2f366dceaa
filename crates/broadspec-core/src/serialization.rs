use crate::domain::{Diagnostic, EnergyUnit, ErrorCategory, Peak, SamplingAxis, Spectrum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!("{value:>width$.precision$}")
}

pub fn format_scientific_f64(value: f64) -> String {
    format!("{value:.10E}")
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

const fn axis_column(unit: EnergyUnit) -> &'static str {
    match unit {
        EnergyUnit::Ev => "energy_ev",
        EnergyUnit::Nm => "wavelength_nm",
    }
}

/// Two-column text table: axis position and intensity per sample.
pub fn render_spectrum_dat(spectrum: &Spectrum) -> String {
    let mut lines = Vec::with_capacity(spectrum.len() + 4);
    lines.push("# broadened absorption spectrum".to_string());
    lines.push(format!("# sigma: {}", spectrum.sigma()));
    lines.push(format!("# source unit: {}", spectrum.source_unit()));
    lines.push(format!(
        "# columns: {} intensity",
        axis_column(spectrum.display_unit())
    ));

    let points = spectrum.axis().points();
    for (position, intensity) in points.iter().zip(spectrum.intensities()) {
        lines.push(format!(
            "{} {}",
            format_fixed_f64(*position, 14, 6),
            format_scientific_f64(*intensity)
        ));
    }
    normalize_text_artifact(&lines.join("\n"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpectrumDocument<'a> {
    axis: &'a SamplingAxis,
    intensities: &'a [f64],
    sigma: f64,
    source_unit: EnergyUnit,
    display_unit: EnergyUnit,
    peak: Option<Peak>,
}

pub fn render_spectrum_json(spectrum: &Spectrum) -> Result<String, serde_json::Error> {
    let document = SpectrumDocument {
        axis: spectrum.axis(),
        intensities: spectrum.intensities(),
        sigma: spectrum.sigma(),
        source_unit: spectrum.source_unit(),
        display_unit: spectrum.display_unit(),
        peak: spectrum.peak(),
    };
    let mut content = serde_json::to_string_pretty(&document)?;
    content.push('\n');
    Ok(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Dat,
    Json,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dat => "dat",
            Self::Json => "json",
        }
    }

    /// `.json` exports JSON; every other extension gets the text table.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Dat,
        }
    }

    pub fn render(self, spectrum: &Spectrum) -> Result<String, serde_json::Error> {
        match self {
            Self::Dat => Ok(render_spectrum_dat(spectrum)),
            Self::Json => render_spectrum_json(spectrum),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dat" => Ok(Self::Dat),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unsupported export format '{other}', expected 'dat' or 'json'"
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode spectrum as JSON: {source}")]
    Encode { source: serde_json::Error },
    #[error("failed to write spectrum export '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Diagnostic for ExportError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Encode { .. } | Self::Write { .. } => ErrorCategory::IoSystemError,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Encode { .. } => "IO.EXPORT_ENCODE",
            Self::Write { .. } => "IO.EXPORT_WRITE",
        }
    }
}

pub fn write_spectrum(
    path: &Path,
    spectrum: &Spectrum,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let content = format
        .render(spectrum)
        .map_err(|source| ExportError::Encode { source })?;
    write_text_artifact(path, &content).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
