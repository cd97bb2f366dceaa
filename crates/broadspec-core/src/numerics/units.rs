//! Photon energy <-> wavelength conversion, `λ[nm] = h·c / (E[eV] · J_per_eV) · 1e9`.
//!
//! The relation is its own inverse, so both directions share one formula.

use crate::common::constants::{JOULES_PER_EV, NM_PER_M, PLANCK_J_S, SPEED_OF_LIGHT_M_S};
use crate::domain::{EnergyUnit, SpectrumError, SpectrumResult};

pub fn energy_to_wavelength_nm(energy_ev: f64) -> SpectrumResult<f64> {
    photon_relation(energy_ev)
}

pub fn wavelength_to_energy_ev(wavelength_nm: f64) -> SpectrumResult<f64> {
    photon_relation(wavelength_nm)
}

pub fn convert_position(value: f64, from: EnergyUnit, to: EnergyUnit) -> SpectrumResult<f64> {
    match (from, to) {
        (EnergyUnit::Ev, EnergyUnit::Nm) => energy_to_wavelength_nm(value),
        (EnergyUnit::Nm, EnergyUnit::Ev) => wavelength_to_energy_ev(value),
        _ => Ok(value),
    }
}

fn photon_relation(value: f64) -> SpectrumResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SpectrumError::InvalidConversionInput { value });
    }
    Ok((PLANCK_J_S * SPEED_OF_LIGHT_M_S) / (value * JOULES_PER_EV) * NM_PER_M)
}
