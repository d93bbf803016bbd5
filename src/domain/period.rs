//! Calendar periods and cadences.
//!
//! Every time series in the pipeline is keyed by a `Period`: a calendar
//! instant normalized to the first day of a representative month.
//!
//! Conventions (shared with the upstream APIs):
//!
//! - quarterly periods sit on the **last** month of the quarter
//!   (Q1→03, Q2→06, Q3→09, Q4→12), day 1
//! - monthly periods sit on their own month, day 1
//! - annual expectation references are anchored to December of the year
//!
//! Periods are totally ordered by calendar instant, so a `Vec<(Period, _)>`
//! sorted ascending is a valid join axis.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Publication cadence of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Monthly,
    Quarterly,
    Annual,
}

/// A normalized calendar point anchoring one row of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(NaiveDate);

impl Period {
    /// Build a period from an arbitrary date, normalizing to day 1.
    pub fn from_date(date: NaiveDate) -> Self {
        // `with_day(1)` only fails for invalid days, and 1 is always valid.
        Period(date.with_day(1).unwrap_or(date))
    }

    /// Quarterly period, anchored to the last month of the quarter.
    pub fn from_quarter(year: i32, quarter: u32) -> Result<Self, PipelineError> {
        if !(1..=4).contains(&quarter) {
            return Err(PipelineError::Alignment(format!(
                "invalid quarter {quarter} (expected 1..=4)"
            )));
        }
        let month = quarter * 3;
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Period)
            .ok_or_else(|| PipelineError::Alignment(format!("invalid period {year}-Q{quarter}")))
    }

    /// Monthly period.
    pub fn from_month(year: i32, month: u32) -> Result<Self, PipelineError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Period)
            .ok_or_else(|| PipelineError::Alignment(format!("invalid period {year}-{month:02}")))
    }

    /// Annual reference, anchored to December per the expectations convention.
    pub fn from_year(year: i32) -> Result<Self, PipelineError> {
        Self::from_month(year, 12)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Quarter number (1..=4) this period's month falls in.
    pub fn quarter(&self) -> u32 {
        (self.0.month() - 1) / 3 + 1
    }

    /// The next period at the given cadence.
    pub fn succ(&self, cadence: Cadence) -> Period {
        let months = match cadence {
            Cadence::Monthly => 1,
            Cadence::Quarterly => 3,
            Cadence::Annual => 12,
        };
        let total = self.0.year() * 12 + self.0.month() as i32 - 1 + months;
        let year = total.div_euclid(12);
        let month = total.rem_euclid(12) as u32 + 1;
        // Day 1 of any month is always representable.
        Period(NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 is always valid"))
    }

    /// The four quarterly periods covered by an annual reference anchored to
    /// December of `self.year()`.
    pub fn quarters_of_year(&self) -> [Period; 4] {
        let year = self.0.year();
        [3u32, 6, 9, 12].map(|month| {
            Period(NaiveDate::from_ymd_opt(year, month, 1).expect("day 1 is always valid"))
        })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarterly_periods_use_last_month_of_quarter() {
        assert_eq!(Period::from_quarter(2024, 1).unwrap().month(), 3);
        assert_eq!(Period::from_quarter(2024, 2).unwrap().month(), 6);
        assert_eq!(Period::from_quarter(2024, 3).unwrap().month(), 9);
        assert_eq!(Period::from_quarter(2024, 4).unwrap().month(), 12);
        assert!(Period::from_quarter(2024, 5).is_err());
    }

    #[test]
    fn from_date_normalizes_to_day_one() {
        let p = Period::from_date(NaiveDate::from_ymd_opt(2024, 6, 17).unwrap());
        assert_eq!(p.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn ordering_is_calendar_order() {
        let q4_23 = Period::from_quarter(2023, 4).unwrap();
        let q1_24 = Period::from_quarter(2024, 1).unwrap();
        assert!(q4_23 < q1_24);
    }

    #[test]
    fn succ_rolls_over_year_boundaries() {
        let dec = Period::from_month(2023, 12).unwrap();
        assert_eq!(dec.succ(Cadence::Monthly), Period::from_month(2024, 1).unwrap());
        assert_eq!(dec.succ(Cadence::Quarterly), Period::from_quarter(2024, 1).unwrap());
        assert_eq!(dec.succ(Cadence::Annual), Period::from_year(2024).unwrap());
    }

    #[test]
    fn annual_reference_broadcasts_to_four_quarters() {
        let y = Period::from_year(2025).unwrap();
        let quarters = y.quarters_of_year();
        assert_eq!(quarters[0], Period::from_quarter(2025, 1).unwrap());
        assert_eq!(quarters[3], Period::from_quarter(2025, 4).unwrap());
    }

    #[test]
    fn quarter_number_from_month() {
        assert_eq!(Period::from_month(2024, 2).unwrap().quarter(), 1);
        assert_eq!(Period::from_quarter(2024, 3).unwrap().quarter(), 3);
    }
}
