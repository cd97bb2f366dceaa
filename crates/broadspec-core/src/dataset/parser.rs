use crate::domain::{LineSet, SpectrumError, SpectrumResult};
use csv::StringRecord;

/// Splits one `OSC_1,E_1,OSC_2,E_2,...` record into a line set. Even
/// columns hold strengths, odd columns hold positions.
pub(super) fn parse_record(record: &StringRecord, line_number: u64) -> SpectrumResult<LineSet> {
    let mut cells: Vec<&str> = record.iter().map(str::trim).collect();
    while cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }

    if cells.is_empty() {
        return Err(SpectrumError::malformed_dataset(format!(
            "row {line_number} has no spectral lines"
        )));
    }
    if !cells.len().is_multiple_of(2) {
        return Err(SpectrumError::malformed_dataset(format!(
            "row {line_number} has {} values; expected alternating strength/position pairs",
            cells.len()
        )));
    }

    let values = cells
        .iter()
        .enumerate()
        .map(|(column, cell)| parse_cell(cell, line_number, column))
        .collect::<SpectrumResult<Vec<_>>>()?;

    let strengths: Vec<f64> = values.iter().copied().step_by(2).collect();
    let positions: Vec<f64> = values.iter().copied().skip(1).step_by(2).collect();
    LineSet::from_columns(&positions, &strengths)
}

fn parse_cell(cell: &str, line_number: u64, column: usize) -> SpectrumResult<f64> {
    let value = cell.parse::<f64>().map_err(|_| {
        SpectrumError::malformed_dataset(format!(
            "row {line_number}, column {}: '{cell}' is not a number",
            column + 1
        ))
    })?;

    if !value.is_finite() {
        return Err(SpectrumError::malformed_dataset(format!(
            "row {line_number}, column {}: value must be finite, got {value}",
            column + 1
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::parse_record;
    use crate::domain::SpectrumError;
    use csv::StringRecord;

    #[test]
    fn record_columns_alternate_strength_and_position() {
        let record = StringRecord::from(vec!["0.5", "2.1", " 0.25 ", "3.4"]);
        let lines = parse_record(&record, 2).expect("record");

        assert_eq!(lines.strengths(), vec![0.5, 0.25]);
        assert_eq!(lines.positions(), vec![2.1, 3.4]);
    }

    #[test]
    fn trailing_empty_cells_are_dropped() {
        let record = StringRecord::from(vec!["0.5", "2.1", "", ""]);
        let lines = parse_record(&record, 3).expect("record");
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn malformed_records_report_their_row() {
        let odd = StringRecord::from(vec!["0.5", "2.1", "0.3"]);
        match parse_record(&odd, 4) {
            Err(SpectrumError::MalformedDataset { detail }) => {
                assert!(detail.contains("row 4 has 3 values"), "{detail}")
            }
            other => panic!("expected MalformedDataset, got {other:?}"),
        }

        let text = StringRecord::from(vec!["0.5", "abc"]);
        match parse_record(&text, 5) {
            Err(SpectrumError::MalformedDataset { detail }) => {
                assert!(detail.contains("row 5, column 2"), "{detail}")
            }
            other => panic!("expected MalformedDataset, got {other:?}"),
        }

        let empty = StringRecord::from(vec!["", ""]);
        assert!(matches!(
            parse_record(&empty, 6),
            Err(SpectrumError::MalformedDataset { .. })
        ));

        let gap = StringRecord::from(vec!["0.5", "", "0.2", "3.0"]);
        assert!(matches!(
            parse_record(&gap, 7),
            Err(SpectrumError::MalformedDataset { .. })
        ));
    }
}
