//! Physical constants and fixed conventions shared by the converter, the
//! broadening kernels and the aggregator.

/// Planck constant in J·s.
pub const PLANCK_J_S: f64 = 6.626_070_15e-34;
/// Speed of light in m/s.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
/// Joules per electronvolt.
pub const JOULES_PER_EV: f64 = 1.602_176_634e-19;
pub const NM_PER_M: f64 = 1.0e9;

/// Prefactor of the wavelength-native kernel that matches its integral to
/// the energy-domain Gaussian.
pub const WAVELENGTH_KERNEL_NORMALIZATION: f64 = 13.060_257_40;

/// Heuristic unit detection: a first position below this value is read as
/// eV, anything else as nm.
pub const UNIT_INFERENCE_THRESHOLD: f64 = 10.0;
/// Relative distance from the threshold inside which unit inference is
/// reported as borderline.
pub const UNIT_INFERENCE_MARGIN: f64 = 0.2;

pub const DEFAULT_SIGMA: f64 = 0.2;
pub const DEFAULT_AXIS_POINTS: usize = 1000;
pub const DEFAULT_ENERGY_AXIS_EV: (f64, f64) = (1.0, 5.0);
pub const DEFAULT_WAVELENGTH_AXIS_NM: (f64, f64) = (200.0, 800.0);
