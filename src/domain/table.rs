//! The assembled dataset table.
//!
//! `AssembledTable` is the final artifact of a build: every indicator column
//! aligned on one shared period index. It is serde-serializable because the
//! same struct doubles as the persisted JSON artifact schema (`io::store`).

use serde::{Deserialize, Serialize};

use crate::domain::period::Period;
use crate::error::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledTable {
    /// Tool tag for artifact provenance.
    pub tool: String,
    /// Shared period axis, strictly increasing.
    pub index: Vec<Period>,
    /// Column names, in assembly order.
    pub columns: Vec<String>,
    /// Column-major values: `values[c][r]` pairs `columns[c]` with `index[r]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl AssembledTable {
    pub fn new(
        index: Vec<Period>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, PipelineError> {
        for pair in index.windows(2) {
            if pair[1] <= pair[0] {
                return Err(PipelineError::Alignment(format!(
                    "table index: period {} does not follow {}",
                    pair[1], pair[0]
                )));
            }
        }
        if columns.len() != values.len() {
            return Err(PipelineError::Alignment(format!(
                "table has {} column names but {} value columns",
                columns.len(),
                values.len()
            )));
        }
        for (name, column) in columns.iter().zip(&values) {
            if column.len() != index.len() {
                return Err(PipelineError::Alignment(format!(
                    "column '{name}' has {} rows, index has {}",
                    column.len(),
                    index.len()
                )));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::Alignment(format!("duplicate column '{name}'")));
            }
        }
        Ok(Self {
            tool: "mf".to_string(),
            index,
            columns,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Values of a column by name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u32) -> Period {
        Period::from_quarter(year, quarter).unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let index = vec![q(2024, 1), q(2024, 2)];
        let err = AssembledTable::new(index, vec!["gdp".into()], vec![vec![Some(1.0)]]).unwrap_err();
        assert!(matches!(err, PipelineError::Alignment(_)));
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let index = vec![q(2024, 1)];
        let err = AssembledTable::new(
            index,
            vec!["gdp".into(), "gdp".into()],
            vec![vec![Some(1.0)], vec![Some(2.0)]],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Alignment(_)));
    }

    #[test]
    fn column_lookup_by_name() {
        let index = vec![q(2024, 1), q(2024, 2)];
        let table = AssembledTable::new(
            index,
            vec!["gdp".into(), "ipca".into()],
            vec![vec![Some(1.0), None], vec![None, Some(0.4)]],
        )
        .unwrap();
        assert_eq!(table.column("ipca").unwrap()[1], Some(0.4));
        assert!(table.column("selic").is_none());
    }
}
