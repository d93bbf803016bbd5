//! Dataset assembly: align every indicator column onto one period index.
//!
//! The canonical index is the union of all input series' periods — no row is
//! dropped. Each column is left-joined onto that index; periods a column does
//! not cover stay missing. Columns flagged for carry-forward get their
//! trailing gap filled with the last known value (the unemployment rate in
//! practice: the survey stops a quarter or two before the projection horizon
//! and the rate is near-stationary at that range).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::{AssembledTable, Period};
use crate::error::PipelineError;

/// A named, period-keyed column ready for assembly.
///
/// Both `ProjectedSeries` and forecast-extended series reduce to this shape.
#[derive(Debug, Clone)]
pub struct IndicatorColumn {
    pub name: String,
    pub points: Vec<(Period, Option<f64>)>,
    /// Fill the trailing gap of this column with its last known value.
    pub carry_forward: bool,
}

impl IndicatorColumn {
    pub fn new(
        name: impl Into<String>,
        points: Vec<(Period, Option<f64>)>,
        carry_forward: bool,
    ) -> Self {
        Self {
            name: name.into(),
            points,
            carry_forward,
        }
    }
}

/// Join `columns` into a single table on the union of their period axes.
pub fn assemble(columns: &[IndicatorColumn]) -> Result<AssembledTable, PipelineError> {
    if columns.is_empty() {
        return Err(PipelineError::Config("no indicator columns to assemble".to_string()));
    }

    let mut names = HashSet::new();
    for column in columns {
        if !names.insert(column.name.as_str()) {
            return Err(PipelineError::Alignment(format!(
                "duplicate indicator column '{}'",
                column.name
            )));
        }
    }

    // Union of periods across all inputs; BTreeSet keeps it sorted and unique.
    let index: Vec<Period> = columns
        .iter()
        .flat_map(|c| c.points.iter().map(|(p, _)| *p))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut out_names = Vec::with_capacity(columns.len());
    let mut out_values = Vec::with_capacity(columns.len());

    for column in columns {
        let mut by_period: BTreeMap<Period, Option<f64>> = BTreeMap::new();
        for (period, value) in &column.points {
            if by_period.insert(*period, *value).is_some() {
                return Err(PipelineError::Alignment(format!(
                    "column '{}' has duplicate period {period}",
                    column.name
                )));
            }
        }

        let mut values: Vec<Option<f64>> = index
            .iter()
            .map(|p| by_period.get(p).copied().flatten())
            .collect();

        if column.carry_forward {
            carry_forward_trailing(&mut values);
        }

        out_names.push(column.name.clone());
        out_values.push(values);
    }

    AssembledTable::new(index, out_names, out_values)
}

/// Fill trailing missing entries with the last known value.
///
/// Idempotent: entries at or after the last known value become that value;
/// leading/interior gaps are untouched.
fn carry_forward_trailing(values: &mut [Option<f64>]) {
    let Some(last_known) = values.iter().rposition(|v| v.is_some()) else {
        return;
    };
    let fill = values[last_known];
    for value in values.iter_mut().skip(last_known + 1) {
        *value = fill;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cadence;

    fn q(year: i32, quarter: u32) -> Period {
        Period::from_quarter(year, quarter).unwrap()
    }

    fn qn(n: usize) -> Period {
        let mut p = q(2024, 1);
        for _ in 0..n {
            p = p.succ(Cadence::Quarterly);
        }
        p
    }

    #[test]
    fn index_is_exactly_the_union_of_input_periods() {
        let a = IndicatorColumn::new(
            "gdp",
            vec![(qn(0), Some(1.0)), (qn(1), Some(2.0))],
            false,
        );
        let b = IndicatorColumn::new(
            "ipca",
            vec![(qn(1), Some(0.3)), (qn(3), Some(0.5))],
            false,
        );

        let table = assemble(&[a, b]).unwrap();
        assert_eq!(table.index, vec![qn(0), qn(1), qn(3)]);
        // Periods absent from a column are missing for that column.
        assert_eq!(table.column("gdp").unwrap(), &[Some(1.0), Some(2.0), None]);
        assert_eq!(table.column("ipca").unwrap(), &[None, Some(0.3), Some(0.5)]);
    }

    #[test]
    fn carry_forward_fills_trailing_gap_only() {
        let col = IndicatorColumn::new(
            "unemployment",
            vec![
                (qn(0), None),
                (qn(1), Some(8.0)),
                (qn(2), None),
                (qn(3), Some(7.5)),
                (qn(4), None),
                (qn(5), None),
            ],
            true,
        );

        let table = assemble(&[col]).unwrap();
        let values = table.column("unemployment").unwrap();
        // Leading and interior gaps untouched.
        assert_eq!(values[0], None);
        assert_eq!(values[2], None);
        // Trailing gap filled with the last known value.
        assert_eq!(values[4], Some(7.5));
        assert_eq!(values[5], Some(7.5));
    }

    #[test]
    fn carry_forward_is_idempotent() {
        let mut values = vec![None, Some(8.0), None, Some(7.5), None, None];
        carry_forward_trailing(&mut values);
        let once = values.clone();
        carry_forward_trailing(&mut values);
        assert_eq!(values, once);
    }

    #[test]
    fn non_designated_columns_keep_trailing_gaps() {
        let col = IndicatorColumn::new(
            "selic",
            vec![(qn(0), Some(10.5)), (qn(1), None)],
            false,
        );
        let table = assemble(&[col]).unwrap();
        assert_eq!(table.column("selic").unwrap()[1], None);
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let a = IndicatorColumn::new("gdp", vec![(qn(0), Some(1.0))], false);
        let b = IndicatorColumn::new("gdp", vec![(qn(0), Some(2.0))], false);
        assert!(matches!(assemble(&[a, b]), Err(PipelineError::Alignment(_))));
    }

    #[test]
    fn duplicate_periods_within_a_column_are_rejected() {
        let col = IndicatorColumn::new(
            "gdp",
            vec![(qn(0), Some(1.0)), (qn(0), Some(2.0))],
            false,
        );
        assert!(matches!(assemble(&[col]), Err(PipelineError::Alignment(_))));
    }

    #[test]
    fn empty_input_is_a_config_error() {
        assert!(matches!(assemble(&[]), Err(PipelineError::Config(_))));
    }
}
