use super::units::energy_to_wavelength_nm;
use crate::common::constants::WAVELENGTH_KERNEL_NORMALIZATION;
use crate::domain::{EnergyUnit, SpectrumError, SpectrumResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadeningInput<'a> {
    pub positions: &'a [f64],
    pub strengths: &'a [f64],
    pub sigma: f64,
    pub axis: &'a [f64],
}

impl<'a> BroadeningInput<'a> {
    pub fn new(positions: &'a [f64], strengths: &'a [f64], sigma: f64, axis: &'a [f64]) -> Self {
        Self {
            positions,
            strengths,
            sigma,
            axis,
        }
    }
}

/// Kernel variant, chosen by the unit of the axis being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadeningKernel {
    Energy,
    Wavelength,
}

impl BroadeningKernel {
    pub const fn for_unit(unit: EnergyUnit) -> Self {
        match unit {
            EnergyUnit::Ev => Self::Energy,
            EnergyUnit::Nm => Self::Wavelength,
        }
    }

    pub fn broaden(self, input: BroadeningInput<'_>) -> SpectrumResult<Vec<f64>> {
        match self {
            Self::Energy => broaden_energy(input),
            Self::Wavelength => broaden_wavelength(input),
        }
    }
}

/// Sum of unnormalized Gaussians `f_j · exp(-((E_j - x_i) / sigma)^2)`.
/// A sample that coincides with a line gets exactly that line's strength.
pub fn broaden_energy(input: BroadeningInput<'_>) -> SpectrumResult<Vec<f64>> {
    validate_input(&input)?;
    let sigma = input.sigma;

    Ok(input
        .axis
        .iter()
        .map(|sample| {
            input
                .positions
                .iter()
                .zip(input.strengths)
                .map(|(position, strength)| {
                    strength * (-((position - sample) / sigma).powi(2)).exp()
                })
                .sum::<f64>()
        })
        .collect())
}

/// Gaussian broadening in inverse wavelength.
///
/// `sigma` stays an energy-domain width in eV. It is mapped through the
/// converter to `sigma_nm` and the Gaussian runs over `1/λ` with width
/// `1/sigma_nm`:
///
/// `I(λ_i) = Σ_j K · f_j / w · exp(-((1/λ_i - 1/λ_j) / w)^2)`, `w = 1/sigma_nm`,
/// `K = 13.06025740`.
pub fn broaden_wavelength(input: BroadeningInput<'_>) -> SpectrumResult<Vec<f64>> {
    validate_input(&input)?;
    for value in input.positions.iter().chain(input.axis).copied() {
        if !value.is_finite() || value <= 0.0 {
            return Err(SpectrumError::InvalidConversionInput { value });
        }
    }

    let width = 1.0 / energy_to_wavelength_nm(input.sigma)?;

    Ok(input
        .axis
        .iter()
        .map(|sample| {
            let inverse_sample = 1.0 / sample;
            input
                .positions
                .iter()
                .zip(input.strengths)
                .map(|(position, strength)| {
                    let offset = (inverse_sample - 1.0 / position) / width;
                    WAVELENGTH_KERNEL_NORMALIZATION * (strength / width) * (-offset.powi(2)).exp()
                })
                .sum::<f64>()
        })
        .collect())
}

fn validate_input(input: &BroadeningInput<'_>) -> SpectrumResult<()> {
    if !input.sigma.is_finite() || input.sigma <= 0.0 {
        return Err(SpectrumError::InvalidSigma { value: input.sigma });
    }
    if input.positions.len() != input.strengths.len() {
        return Err(SpectrumError::malformed_dataset(format!(
            "line positions ({}) and strengths ({}) differ in length",
            input.positions.len(),
            input.strengths.len()
        )));
    }
    Ok(())
}
