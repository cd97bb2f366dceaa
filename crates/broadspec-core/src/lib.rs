pub mod common;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod numerics;
pub mod serialization;
pub mod spectrum;

pub use config::{AxisSettings, BroadeningConfig, ConfigError, load_broadening_config};
pub use dataset::{Dataset, DatasetLoadError};
pub use domain::{
    Diagnostic, EnergyUnit, ErrorCategory, LineSet, Peak, SamplingAxis, SpectralLine, Spectrum,
    SpectrumError, SpectrumResult,
};
pub use serialization::{ExportError, ExportFormat, write_spectrum};
pub use spectrum::{BroadeningState, Computed, SpectrumAggregator, SpectrumRequest};
