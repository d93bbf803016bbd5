//! Export the assembled table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::AssembledTable;
use crate::error::PipelineError;

/// Write the table to a CSV file, one row per period.
///
/// Missing values export as empty cells.
pub fn write_table_csv(path: &Path, table: &AssembledTable) -> Result<(), PipelineError> {
    let mut file = File::create(path).map_err(|e| {
        PipelineError::Persistence(format!("failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "period,{}", table.columns.join(",")).map_err(|e| {
        PipelineError::Persistence(format!("failed to write export CSV header: {e}"))
    })?;

    for (row, period) in table.index.iter().enumerate() {
        let cells: Vec<String> = table
            .values
            .iter()
            .map(|column| column[row].map(|v| format!("{v:.6}")).unwrap_or_default())
            .collect();
        writeln!(file, "{period},{}", cells.join(",")).map_err(|e| {
            PipelineError::Persistence(format!("failed to write export CSV row: {e}"))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    #[test]
    fn csv_has_header_and_empty_cells_for_missing() {
        let table = AssembledTable::new(
            vec![
                Period::from_quarter(2024, 1).unwrap(),
                Period::from_quarter(2024, 2).unwrap(),
            ],
            vec!["gdp".into(), "ipca".into()],
            vec![vec![Some(100.0), None], vec![Some(0.4), Some(0.5)]],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table_csv(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("period,gdp,ipca"));
        assert_eq!(lines.next(), Some("2024-03,100.000000,0.400000"));
        assert_eq!(lines.next(), Some("2024-06,,0.500000"));
    }
}
