pub mod broadening;
pub mod units;

pub use broadening::{BroadeningInput, BroadeningKernel, broaden_energy, broaden_wavelength};
pub use units::{convert_position, energy_to_wavelength_nm, wavelength_to_energy_ev};
