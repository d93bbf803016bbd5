//! Terminal reporting for build results.

use crate::app::pipeline::{BuildOutcome, Provenance};
use crate::domain::{AssembledTable, BuildConfig};

/// Format the build summary (provenance + table shape + per-column coverage).
pub fn format_build_summary(outcome: &BuildOutcome, config: &BuildConfig) -> String {
    let table = &outcome.table;
    let mut out = String::new();

    out.push_str("=== mf - Macro Dataset Build ===\n");
    let provenance = match outcome.provenance {
        Provenance::Fresh => "fresh build",
        Provenance::Fallback => "fallback (persisted artifact)",
    };
    out.push_str(&format!("Source: {provenance}\n"));
    if let Some(path) = &outcome.saved_to {
        out.push_str(&format!("Saved: {}\n", path.display()));
    }
    out.push_str(&format!("Start cutoff: {}\n", config.start));

    if let (Some(first), Some(last)) = (table.index.first(), table.index.last()) {
        out.push_str(&format!(
            "Periods: n={} | span=[{first}, {last}]\n",
            table.n_rows()
        ));
    }

    out.push_str("\nColumns:\n");
    for (name, values) in table.columns.iter().zip(&table.values) {
        let known = values.iter().filter(|v| v.is_some()).count();
        let last_known = values
            .iter()
            .rposition(|v| v.is_some())
            .map(|i| table.index[i].to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {name:<24} filled {known}/{} | last {last_known}\n",
            table.n_rows()
        ));
    }

    out
}

/// Format the last `n` rows of the table as an aligned text grid.
pub fn format_table_tail(table: &AssembledTable, n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<10}", "period"));
    for name in &table.columns {
        out.push_str(&format!(" {name:>22}"));
    }
    out.push('\n');

    let start = table.n_rows().saturating_sub(n);
    for row in start..table.n_rows() {
        out.push_str(&format!("{:<10}", table.index[row].to_string()));
        for column in &table.values {
            match column[row] {
                Some(v) => out.push_str(&format!(" {v:>22.4}")),
                None => out.push_str(&format!(" {:>22}", "-")),
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    fn table() -> AssembledTable {
        AssembledTable::new(
            vec![
                Period::from_quarter(2024, 1).unwrap(),
                Period::from_quarter(2024, 2).unwrap(),
                Period::from_quarter(2024, 3).unwrap(),
            ],
            vec!["gdp".into(), "selic".into()],
            vec![
                vec![Some(100.0), Some(101.5), None],
                vec![Some(10.5), Some(10.5), Some(10.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn summary_reports_coverage_per_column() {
        let outcome = BuildOutcome {
            table: table(),
            provenance: Provenance::Fresh,
            saved_to: None,
        };
        let config = BuildConfig {
            data_dir: "data".into(),
            table_key: "dataset".into(),
            start: Period::from_month(2013, 12).unwrap(),
            max_attempts: 3,
            retry_delay: std::time::Duration::from_secs(5),
            arima: crate::domain::ArimaOrder { p: 2, d: 1, q: 2 },
            horizon: 8,
            sample_seed: 42,
        };

        let text = format_build_summary(&outcome, &config);
        assert!(text.contains("Source: fresh build"));
        assert!(text.contains("filled 2/3"));
        assert!(text.contains("filled 3/3"));
        assert!(text.contains("span=[2024-03, 2024-09]"));
    }

    #[test]
    fn tail_shows_missing_values_as_dashes() {
        let text = format_table_tail(&table(), 2);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("period"));
        assert!(lines[2].starts_with("2024-09"));
        assert!(lines[2].contains('-'));
    }
}
