mod parser;

use crate::common::constants::{UNIT_INFERENCE_MARGIN, UNIT_INFERENCE_THRESHOLD};
use crate::domain::{
    Diagnostic, EnergyUnit, ErrorCategory, LineSet, SpectrumError, SpectrumResult,
};
use parser::parse_record;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Independent excited-state calculations sharing one position unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<LineSet>,
    unit: EnergyUnit,
}

impl Dataset {
    /// Builds a dataset whose unit is guessed from its first position.
    pub fn from_rows(rows: Vec<LineSet>) -> SpectrumResult<Self> {
        validate_rows(&rows)?;
        let first_position = rows[0].lines()[0].position;
        let unit = infer_unit(first_position);
        if is_borderline(first_position) {
            warn!(
                "first position {first_position} is close to the eV/nm threshold \
                 {UNIT_INFERENCE_THRESHOLD}; reading the dataset as {unit}"
            );
        }
        debug!("inferred dataset unit {unit} from first position {first_position}");

        Ok(Self { rows, unit })
    }

    pub fn with_unit(rows: Vec<LineSet>, unit: EnergyUnit) -> SpectrumResult<Self> {
        validate_rows(&rows)?;
        Ok(Self { rows, unit })
    }

    /// Reads CSV rows after a header line. `unit` bypasses unit inference.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        unit: Option<EnergyUnit>,
    ) -> Result<Self, DatasetLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|source| DatasetLoadError::Csv { source })?;
            let line_number = record
                .position()
                .map(|position| position.line())
                .unwrap_or(index as u64 + 2);
            rows.push(parse_record(&record, line_number)?);
        }

        let dataset = match unit {
            Some(unit) => Self::with_unit(rows, unit)?,
            None => Self::from_rows(rows)?,
        };
        Ok(dataset)
    }

    pub fn load(
        path: impl AsRef<Path>,
        unit: Option<EnergyUnit>,
    ) -> Result<Self, DatasetLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(file, unit)
    }

    pub fn rows(&self) -> &[LineSet] {
        &self.rows
    }

    pub const fn unit(&self) -> EnergyUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Unit heuristic: values below 10 are energies in eV, the rest wavelengths
/// in nm. It does not detect units, it only separates the two usual ranges.
pub fn infer_unit(first_position: f64) -> EnergyUnit {
    if first_position < UNIT_INFERENCE_THRESHOLD {
        EnergyUnit::Ev
    } else {
        EnergyUnit::Nm
    }
}

fn is_borderline(first_position: f64) -> bool {
    let distance = (first_position - UNIT_INFERENCE_THRESHOLD).abs();
    distance <= UNIT_INFERENCE_THRESHOLD * UNIT_INFERENCE_MARGIN
}

fn validate_rows(rows: &[LineSet]) -> SpectrumResult<()> {
    if rows.is_empty() {
        return Err(SpectrumError::malformed_dataset("dataset contains no data rows"));
    }
    if let Some(index) = rows.iter().position(LineSet::is_empty) {
        return Err(SpectrumError::malformed_dataset(format!(
            "dataset row {} has no spectral lines",
            index + 1
        )));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetLoadError {
    #[error("failed to read dataset '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse dataset CSV: {source}")]
    Csv { source: csv::Error },
    #[error(transparent)]
    Dataset(#[from] SpectrumError),
}

impl Diagnostic for DatasetLoadError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Read { .. } => ErrorCategory::IoSystemError,
            Self::Csv { .. } => ErrorCategory::InputValidationError,
            Self::Dataset(error) => error.category(),
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Read { .. } => "IO.DATASET_READ",
            Self::Csv { .. } => "INPUT.DATASET_CSV",
            Self::Dataset(error) => error.placeholder(),
        }
    }
}
