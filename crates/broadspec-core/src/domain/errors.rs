use super::EnergyUnit;
use std::fmt::Display;

pub type SpectrumResult<T> = Result<T, SpectrumError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
}

impl ErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
        }
    }
}

/// Stable category, placeholder code and rendering shared by every error
/// surfaced to the command line.
pub trait Diagnostic: Display {
    fn category(&self) -> ErrorCategory;

    fn placeholder(&self) -> &'static str;

    fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder(), self)
    }

    fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectrumError {
    #[error("unit must be either \"eV\" or \"nm\", got \"{value}\"")]
    InvalidUnit { value: String },
    #[error(
        "no spectrum computed{}; calculate the spectrum first or specify the unit",
        .unit.map(|unit| format!(" in {unit}")).unwrap_or_default()
    )]
    UncomputedSpectrum { unit: Option<EnergyUnit> },
    #[error("spectra are computed in both eV and nm; specify the unit")]
    AmbiguousUnit,
    #[error("sigma must be finite and > 0, got {value}")]
    InvalidSigma { value: f64 },
    #[error("energy/wavelength conversion requires a finite value > 0, got {value}")]
    InvalidConversionInput { value: f64 },
    #[error("malformed dataset: {detail}")]
    MalformedDataset { detail: String },
    #[error("invalid sampling axis: {detail}")]
    InvalidAxis { detail: String },
}

impl SpectrumError {
    pub fn malformed_dataset(detail: impl Into<String>) -> Self {
        Self::MalformedDataset {
            detail: detail.into(),
        }
    }

    pub fn invalid_axis(detail: impl Into<String>) -> Self {
        Self::InvalidAxis {
            detail: detail.into(),
        }
    }
}

impl Diagnostic for SpectrumError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UncomputedSpectrum { .. } | Self::AmbiguousUnit => {
                ErrorCategory::ComputationError
            }
            _ => ErrorCategory::InputValidationError,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::InvalidUnit { .. } => "INPUT.INVALID_UNIT",
            Self::UncomputedSpectrum { .. } => "RUN.UNCOMPUTED_SPECTRUM",
            Self::AmbiguousUnit => "RUN.AMBIGUOUS_UNIT",
            Self::InvalidSigma { .. } => "INPUT.INVALID_SIGMA",
            Self::InvalidConversionInput { .. } => "INPUT.INVALID_CONVERSION",
            Self::MalformedDataset { .. } => "INPUT.MALFORMED_DATASET",
            Self::InvalidAxis { .. } => "INPUT.INVALID_AXIS",
        }
    }
}
