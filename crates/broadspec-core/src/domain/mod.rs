pub mod errors;

pub use errors::{Diagnostic, ErrorCategory, SpectrumError, SpectrumResult};

use crate::common::constants::{
    DEFAULT_AXIS_POINTS, DEFAULT_ENERGY_AXIS_EV, DEFAULT_WAVELENGTH_AXIS_NM,
};
use crate::numerics::units::convert_position;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "eV")]
    Ev,
    #[serde(rename = "nm")]
    Nm,
}

impl EnergyUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ev => "eV",
            Self::Nm => "nm",
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Ev => Self::Nm,
            Self::Nm => Self::Ev,
        }
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for EnergyUnit {
    type Err = SpectrumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        if normalized.eq_ignore_ascii_case("ev") {
            Ok(Self::Ev)
        } else if normalized.eq_ignore_ascii_case("nm") {
            Ok(Self::Nm)
        } else {
            Err(SpectrumError::InvalidUnit {
                value: value.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralLine {
    pub position: f64,
    pub strength: f64,
}

impl SpectralLine {
    pub const fn new(position: f64, strength: f64) -> Self {
        Self { position, strength }
    }
}

/// Transitions of a single excited-state calculation, all in one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineSet {
    lines: Vec<SpectralLine>,
}

impl LineSet {
    pub fn new(lines: Vec<SpectralLine>) -> Self {
        Self { lines }
    }

    pub fn from_columns(positions: &[f64], strengths: &[f64]) -> SpectrumResult<Self> {
        if positions.len() != strengths.len() {
            return Err(SpectrumError::malformed_dataset(format!(
                "{} positions but {} strengths",
                positions.len(),
                strengths.len()
            )));
        }

        Ok(Self::new(
            positions
                .iter()
                .zip(strengths)
                .map(|(position, strength)| SpectralLine::new(*position, *strength))
                .collect(),
        ))
    }

    pub fn lines(&self) -> &[SpectralLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.lines.iter().map(|line| line.position).collect()
    }

    pub fn strengths(&self) -> Vec<f64> {
        self.lines.iter().map(|line| line.strength).collect()
    }

    /// Positions expressed in `to`; strengths are carried unchanged.
    pub fn converted(&self, from: EnergyUnit, to: EnergyUnit) -> SpectrumResult<Self> {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                convert_position(line.position, from, to)
                    .map(|position| SpectralLine::new(position, line.strength))
            })
            .collect::<SpectrumResult<Vec<_>>>()?;
        Ok(Self::new(lines))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingAxis {
    points: Vec<f64>,
    unit: EnergyUnit,
}

impl SamplingAxis {
    pub fn new(points: Vec<f64>, unit: EnergyUnit) -> SpectrumResult<Self> {
        validate_axis_points(&points, unit)?;
        Ok(Self { points, unit })
    }

    /// `count` evenly spaced points from `start` to `stop`, both included.
    pub fn linspace(start: f64, stop: f64, count: usize, unit: EnergyUnit) -> SpectrumResult<Self> {
        if count < 2 {
            return Err(SpectrumError::invalid_axis(format!(
                "an evenly spaced axis needs at least 2 points, got {count}"
            )));
        }
        if !start.is_finite() || !stop.is_finite() || start >= stop {
            return Err(SpectrumError::invalid_axis(format!(
                "axis bounds must be finite with start < stop, got [{start}, {stop}]"
            )));
        }

        Self::new(linspace_points(start, stop, count), unit)
    }

    /// 1000 points over [1, 5] eV or [200, 800] nm.
    pub fn default_for(unit: EnergyUnit) -> Self {
        let (start, stop) = match unit {
            EnergyUnit::Ev => DEFAULT_ENERGY_AXIS_EV,
            EnergyUnit::Nm => DEFAULT_WAVELENGTH_AXIS_NM,
        };
        Self {
            points: linspace_points(start, stop, DEFAULT_AXIS_POINTS),
            unit,
        }
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub const fn unit(&self) -> EnergyUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.points.last().copied()
    }
}

fn linspace_points(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let last = count - 1;
    let step = (stop - start) / last as f64;
    (0..count)
        .map(|index| {
            if index == last {
                stop
            } else {
                start + step * index as f64
            }
        })
        .collect()
}

fn validate_axis_points(points: &[f64], unit: EnergyUnit) -> SpectrumResult<()> {
    if points.is_empty() {
        return Err(SpectrumError::invalid_axis("axis has no sample points"));
    }

    for (index, value) in points.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(SpectrumError::invalid_axis(format!(
                "sample point {index} must be finite, got {value}"
            )));
        }
        if unit == EnergyUnit::Nm && value <= 0.0 {
            return Err(SpectrumError::invalid_axis(format!(
                "wavelength sample point {index} must be > 0, got {value}"
            )));
        }
        if index > 0 && value <= points[index - 1] {
            return Err(SpectrumError::invalid_axis(format!(
                "axis must be strictly increasing, index {index} has {value} after {}",
                points[index - 1]
            )));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub index: usize,
    pub position: f64,
    pub intensity: f64,
}

/// Broadened intensities over an axis, tagged with the sigma and the unit
/// the line positions were read in.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    axis: SamplingAxis,
    intensities: Vec<f64>,
    sigma: f64,
    source_unit: EnergyUnit,
}

impl Spectrum {
    pub(crate) fn from_parts(
        axis: SamplingAxis,
        intensities: Vec<f64>,
        sigma: f64,
        source_unit: EnergyUnit,
    ) -> Self {
        debug_assert_eq!(axis.len(), intensities.len());
        Self {
            axis,
            intensities,
            sigma,
            source_unit,
        }
    }

    pub fn axis(&self) -> &SamplingAxis {
        &self.axis
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    pub const fn source_unit(&self) -> EnergyUnit {
        self.source_unit
    }

    pub const fn display_unit(&self) -> EnergyUnit {
        self.axis.unit()
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Maximum-intensity sample; ties resolve to the first occurrence.
    pub fn peak(&self) -> Option<Peak> {
        let mut best: Option<(usize, f64)> = None;
        for (index, intensity) in self.intensities.iter().copied().enumerate() {
            match best {
                Some((_, current)) if intensity <= current => {}
                _ if intensity.is_nan() => {}
                _ => best = Some((index, intensity)),
            }
        }

        best.map(|(index, intensity)| Peak {
            index,
            position: self.axis.points[index],
            intensity,
        })
    }
}
