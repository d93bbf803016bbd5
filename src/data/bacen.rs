//! BCB SGS API client (observed Selic).
//!
//! SGS serves `[{"data": "dd/mm/yyyy", "valor": "10.50"}, ...]`. We use the
//! monthly annualized Selic series and keep only quarter-end months so the
//! series joins the quarterly axis directly.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{Cadence, ObservedSeries, Period};
use crate::error::PipelineError;

/// Monthly Selic, annualized (% p.a.).
const SELIC_MONTHLY_SERIES: u32 = 4189;

const BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

#[derive(Debug, Deserialize)]
struct SgsRow {
    data: String,
    valor: String,
}

pub struct BacenClient {
    client: Client,
}

impl BacenClient {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self { client: Client::new() })
    }

    pub fn fetch_selic(&self) -> Result<ObservedSeries, PipelineError> {
        let url = format!("{BASE_URL}/bcdata.sgs.{SELIC_MONTHLY_SERIES}/dados");

        let resp = self
            .client
            .get(&url)
            .query(&[("formato", "json")])
            .send()
            .map_err(|e| PipelineError::Fetch(format!("SGS request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "SGS request failed with status {}",
                resp.status()
            )));
        }

        let rows: Vec<SgsRow> = resp
            .json()
            .map_err(|e| PipelineError::Fetch(format!("invalid SGS response: {e}")))?;

        let mut points = Vec::new();
        for row in &rows {
            let period = parse_sgs_date(&row.data)?;
            // Quarter-end months only: the Selic column lives on the
            // quarterly axis.
            if !matches!(period.month(), 3 | 6 | 9 | 12) {
                continue;
            }
            points.push((period, parse_sgs_value(&row.valor)));
        }
        points.sort_by_key(|(p, _)| *p);

        ObservedSeries::new("selic", Cadence::Quarterly, points)
    }
}

/// Parse an SGS `dd/mm/yyyy` date into its period.
fn parse_sgs_date(raw: &str) -> Result<Period, PipelineError> {
    let mut parts = raw.splitn(3, '/');
    let (Some(_day), Some(month), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PipelineError::Fetch(format!("invalid SGS date '{raw}'")));
    };
    let month: u32 = month
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid SGS date '{raw}'")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid SGS date '{raw}'")))?;
    Period::from_month(year, month)
}

fn parse_sgs_value(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
