use super::CliError;
use super::commands::BroadeningFlags;
use broadspec_core::{
    AxisSettings, BroadeningConfig, Dataset, EnergyUnit, ExportFormat, SpectrumAggregator,
    SpectrumRequest, load_broadening_config,
};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Loaded dataset plus the configuration layers used to build requests.
pub(super) struct BroadeningSession {
    pub(super) aggregator: SpectrumAggregator,
    config: BroadeningConfig,
    axis_overrides: AxisSettings,
}

impl BroadeningSession {
    pub(super) fn open(input: &Path, flags: &BroadeningFlags) -> Result<Self, CliError> {
        let config = match &flags.config {
            Some(path) => load_broadening_config(path)?,
            None => BroadeningConfig::default(),
        };

        let input_unit = match &flags.input_unit {
            Some(value) => Some(parse_unit(value)?),
            None => config.input_unit,
        };
        let dataset = Dataset::load(input, input_unit)?;
        debug!(
            "loaded {} calculations from '{}' in {}",
            dataset.len(),
            input.display(),
            dataset.unit()
        );

        let mut aggregator = SpectrumAggregator::new(dataset);
        if let Some(sigma) = flags.sigma.or(config.sigma) {
            aggregator.set_sigma(sigma)?;
        }

        Ok(Self {
            aggregator,
            config,
            axis_overrides: AxisSettings {
                start: flags.start,
                stop: flags.stop,
                points: flags.points,
            },
        })
    }

    pub(super) fn request(&self, unit: EnergyUnit) -> Result<SpectrumRequest, CliError> {
        let axis = self.config.axis_for(unit, self.axis_overrides)?;
        Ok(SpectrumRequest::new(unit).with_axis(axis))
    }
}

pub(super) fn parse_unit(value: &str) -> Result<EnergyUnit, CliError> {
    Ok(EnergyUnit::from_str(value)?)
}

pub(super) fn parse_units(values: &[String]) -> Result<Vec<EnergyUnit>, CliError> {
    values.iter().map(|value| parse_unit(value)).collect()
}

/// Explicit `--format` wins; otherwise the output extension decides.
pub(super) fn resolve_export_format(
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<ExportFormat, CliError> {
    match (format, output) {
        (Some(format), _) => ExportFormat::from_str(format).map_err(CliError::Usage),
        (None, Some(output)) => Ok(ExportFormat::from_path(output)),
        (None, None) => Ok(ExportFormat::Dat),
    }
}
