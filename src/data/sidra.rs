//! IBGE SIDRA API client (observed indicator series).
//!
//! SIDRA serves table slices as JSON arrays of string-valued records. The
//! first record is a header mapping field codes to labels; the period column
//! is discovered from that header (its label carries a `(Código)` suffix)
//! rather than hard-coded, since the field position depends on the table.
//!
//! Reference codes: quarterly tables use `yyyyqq`, monthly tables `yyyymm`.
//! Unpublished values come back as sentinel strings (`...`, `-`, `X`) and map
//! to missing.

use std::collections::HashMap;

use reqwest::blocking::Client;

use crate::data::ObservedId;
use crate::domain::{Cadence, ObservedSeries, Period};
use crate::error::PipelineError;

const BASE_URL: &str = "https://apisidra.ibge.gov.br/values";

/// SIDRA coordinates of one observed series.
struct TableSpec {
    table: &'static str,
    variable: &'static str,
    /// Optional classification/category pair (national accounts sectors).
    classification: Option<(&'static str, &'static str)>,
}

fn table_spec(id: ObservedId) -> Result<TableSpec, PipelineError> {
    let spec = match id {
        ObservedId::Gdp => TableSpec {
            table: "1621",
            variable: "584",
            classification: Some(("11255", "90707")),
        },
        ObservedId::HouseholdConsumption => TableSpec {
            table: "1621",
            variable: "584",
            classification: Some(("11255", "93404")),
        },
        ObservedId::IndustrialGdp => TableSpec {
            table: "1621",
            variable: "584",
            classification: Some(("11255", "90691")),
        },
        ObservedId::TradeGdp => TableSpec {
            table: "1621",
            variable: "584",
            classification: Some(("11255", "90697")),
        },
        ObservedId::UnemploymentRate => TableSpec {
            table: "4099",
            variable: "4099",
            classification: None,
        },
        ObservedId::Ipca => TableSpec {
            table: "1737",
            variable: "2266",
            classification: None,
        },
        ObservedId::Selic => {
            return Err(PipelineError::Config(
                "Selic is served by the SGS API, not SIDRA".to_string(),
            ));
        }
    };
    Ok(spec)
}

pub struct SidraClient {
    client: Client,
}

impl SidraClient {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self { client: Client::new() })
    }

    pub fn fetch_observed(&self, id: ObservedId) -> Result<ObservedSeries, PipelineError> {
        let spec = table_spec(id)?;
        let mut url = format!(
            "{BASE_URL}/t/{}/n1/all/v/{}/p/all",
            spec.table, spec.variable
        );
        if let Some((classification, category)) = spec.classification {
            url.push_str(&format!("/c{classification}/{category}"));
        }
        url.push_str("?formato=json");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PipelineError::Fetch(format!("SIDRA request for {id:?} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "SIDRA request for {id:?} failed with status {}",
                resp.status()
            )));
        }

        let rows: Vec<HashMap<String, String>> = resp
            .json()
            .map_err(|e| PipelineError::Fetch(format!("invalid SIDRA response for {id:?}: {e}")))?;

        let cadence = id.cadence();
        let mut points = parse_rows(&rows, cadence)
            .map_err(|e| match e {
                PipelineError::Fetch(msg) => {
                    PipelineError::Fetch(format!("SIDRA series {id:?}: {msg}"))
                }
                other => other,
            })?;
        points.sort_by_key(|(p, _)| *p);

        ObservedSeries::new(id.column_name(), cadence, points)
    }
}

/// Extract `(Period, value)` pairs from a SIDRA payload.
///
/// The first record is the header; the period field is the one whose label
/// ends in `(Código)` for the table's time dimension.
fn parse_rows(
    rows: &[HashMap<String, String>],
    cadence: Cadence,
) -> Result<Vec<(Period, Option<f64>)>, PipelineError> {
    let (header, data) = rows
        .split_first()
        .ok_or_else(|| PipelineError::Fetch("empty SIDRA response".to_string()))?;

    let period_field = find_period_field(header)
        .ok_or_else(|| PipelineError::Fetch("no period column in SIDRA header".to_string()))?;

    let mut points = Vec::with_capacity(data.len());
    for row in data {
        let code = row
            .get(period_field)
            .ok_or_else(|| PipelineError::Fetch(format!("row missing period field {period_field}")))?;
        let period = match cadence {
            Cadence::Quarterly => parse_quarter_code(code)?,
            Cadence::Monthly => parse_month_code(code)?,
            Cadence::Annual => {
                return Err(PipelineError::Fetch("annual SIDRA tables are not used".to_string()));
            }
        };
        let value = row.get("V").map(|v| parse_value(v)).unwrap_or(None);
        points.push((period, value));
    }
    Ok(points)
}

fn find_period_field<'a>(header: &'a HashMap<String, String>) -> Option<&'a str> {
    header
        .iter()
        .find(|(_, label)| {
            label.ends_with("(Código)")
                && (label.contains("Trimestre") || label.contains("Mês"))
        })
        .map(|(field, _)| field.as_str())
}

/// Parse a `yyyyqq` quarterly reference code.
fn parse_quarter_code(code: &str) -> Result<Period, PipelineError> {
    if code.len() != 6 {
        return Err(PipelineError::Fetch(format!("invalid quarterly code '{code}'")));
    }
    let year: i32 = code[..4]
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid quarterly code '{code}'")))?;
    let quarter: u32 = code[4..]
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid quarterly code '{code}'")))?;
    Period::from_quarter(year, quarter)
}

/// Parse a `yyyymm` monthly reference code.
fn parse_month_code(code: &str) -> Result<Period, PipelineError> {
    if code.len() != 6 {
        return Err(PipelineError::Fetch(format!("invalid monthly code '{code}'")));
    }
    let year: i32 = code[..4]
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid monthly code '{code}'")))?;
    let month: u32 = code[4..]
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid monthly code '{code}'")))?;
    Period::from_month(year, month)
}

/// Parse a SIDRA value, mapping sentinel strings to missing.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "..." || trimmed == "-" || trimmed == "X" {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
