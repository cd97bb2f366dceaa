use crate::common::constants::{
    DEFAULT_AXIS_POINTS, DEFAULT_ENERGY_AXIS_EV, DEFAULT_WAVELENGTH_AXIS_NM,
};
use crate::domain::{Diagnostic, EnergyUnit, ErrorCategory, SamplingAxis, SpectrumResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Sampling window for one unit. Missing fields fall back to the built-in axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AxisSettings {
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub points: Option<usize>,
}

impl AxisSettings {
    /// Field-wise merge where `self` wins.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            start: self.start.or(fallback.start),
            stop: self.stop.or(fallback.stop),
            points: self.points.or(fallback.points),
        }
    }

    pub fn resolve(self, unit: EnergyUnit) -> SpectrumResult<SamplingAxis> {
        let (default_start, default_stop) = match unit {
            EnergyUnit::Ev => DEFAULT_ENERGY_AXIS_EV,
            EnergyUnit::Nm => DEFAULT_WAVELENGTH_AXIS_NM,
        };
        SamplingAxis::linspace(
            self.start.unwrap_or(default_start),
            self.stop.unwrap_or(default_stop),
            self.points.unwrap_or(DEFAULT_AXIS_POINTS),
            unit,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BroadeningConfig {
    pub sigma: Option<f64>,
    pub input_unit: Option<EnergyUnit>,
    #[serde(default)]
    pub energy_axis: AxisSettings,
    #[serde(default)]
    pub wavelength_axis: AxisSettings,
}

impl BroadeningConfig {
    pub fn axis_settings(&self, unit: EnergyUnit) -> AxisSettings {
        match unit {
            EnergyUnit::Ev => self.energy_axis,
            EnergyUnit::Nm => self.wavelength_axis,
        }
    }

    /// Axis for `unit` with `overrides` applied on top of the file values.
    pub fn axis_for(
        &self,
        unit: EnergyUnit,
        overrides: AxisSettings,
    ) -> SpectrumResult<SamplingAxis> {
        overrides.or(self.axis_settings(unit)).resolve(unit)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read broadening config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse broadening config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Diagnostic for ConfigError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Read { .. } => ErrorCategory::IoSystemError,
            Self::Parse { .. } => ErrorCategory::InputValidationError,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Read { .. } => "IO.CONFIG_READ",
            Self::Parse { .. } => "INPUT.CONFIG_PARSE",
        }
    }
}

pub fn load_broadening_config(
    config_path: impl AsRef<Path>,
) -> Result<BroadeningConfig, ConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
