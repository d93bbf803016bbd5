//! BCB Olinda API client (Focus survey median expectations).
//!
//! Olinda is an OData service; each expectation cadence lives in its own
//! resource. Rows are ordered by survey date descending and may repeat a
//! reference period across survey dates, so we keep the most recent row per
//! period and sort ascending before building the series.
//!
//! Reference date formats, per resource:
//! - quarterly: `q/yyyy` (quarter anchored to its last month)
//! - annual:    `yyyy` (anchored to December)
//! - monthly:   `mm/yyyy`
//! - Selic:     COPOM meeting `Rn/yyyy`; only the even meetings R2/R4/R6/R8
//!   are kept, mapped to months 3/6/9/12 as quarterly observations.

use std::collections::BTreeMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::ExpectationId;
use crate::domain::{ExpectationSeries, Period};
use crate::error::PipelineError;

const BASE_URL: &str = "https://olinda.bcb.gov.br/olinda/servico/Expectativas/versao/v1/odata";

/// OData coordinates of one expectation series.
struct ResourceSpec {
    resource: &'static str,
    top: &'static str,
    filter: &'static str,
    select: &'static str,
}

fn resource_spec(id: ExpectationId) -> ResourceSpec {
    match id {
        ExpectationId::GdpQuarterly => ResourceSpec {
            resource: "ExpectativasMercadoTrimestrais",
            top: "8",
            filter: "Indicador eq 'PIB Total' and baseCalculo eq 0",
            select: "Data,DataReferencia,Mediana",
        },
        ExpectationId::HouseholdConsumptionAnnual => ResourceSpec {
            resource: "ExpectativasMercadoAnuais",
            top: "5",
            filter: "Indicador eq 'PIB Despesa de consumo das famílias' and baseCalculo eq 0",
            select: "Data,DataReferencia,Mediana",
        },
        ExpectationId::IndustrialGdpAnnual => ResourceSpec {
            resource: "ExpectativasMercadoAnuais",
            top: "5",
            filter: "Indicador eq 'PIB Indústria' and baseCalculo eq 0",
            select: "Data,DataReferencia,Mediana",
        },
        ExpectationId::UnemploymentQuarterly => ResourceSpec {
            resource: "ExpectativasMercadoTrimestrais",
            top: "6",
            filter: "Indicador eq 'Taxa de desocupação' and baseCalculo eq 0",
            select: "Data,DataReferencia,Mediana",
        },
        ExpectationId::IpcaMonthly => ResourceSpec {
            resource: "ExpectativaMercadoMensais",
            top: "25",
            filter: "Indicador eq 'IPCA' and baseCalculo eq 0",
            select: "Data,DataReferencia,Mediana",
        },
        ExpectationId::SelicMeetings => ResourceSpec {
            resource: "ExpectativasMercadoSelic",
            top: "16",
            filter: "baseCalculo eq 0",
            select: "Data,Reuniao,Mediana",
        },
    }
}

#[derive(Debug, Deserialize)]
struct OlindaResponse {
    value: Vec<OlindaRow>,
}

#[derive(Debug, Deserialize)]
struct OlindaRow {
    #[serde(rename = "DataReferencia")]
    reference: Option<String>,
    #[serde(rename = "Reuniao")]
    meeting: Option<String>,
    #[serde(rename = "Mediana")]
    median: Option<f64>,
}

pub struct OlindaClient {
    client: Client,
}

impl OlindaClient {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self { client: Client::new() })
    }

    pub fn fetch_expectation(&self, id: ExpectationId) -> Result<ExpectationSeries, PipelineError> {
        let spec = resource_spec(id);
        let url = format!("{BASE_URL}/{}", spec.resource);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("$top", spec.top),
                ("$filter", spec.filter),
                ("$orderby", "Data desc"),
                ("$select", spec.select),
                ("$format", "json"),
            ])
            .send()
            .map_err(|e| PipelineError::Fetch(format!("Olinda request for {id:?} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "Olinda request for {id:?} failed with status {}",
                resp.status()
            )));
        }

        let body: OlindaResponse = resp
            .json()
            .map_err(|e| PipelineError::Fetch(format!("invalid Olinda response for {id:?}: {e}")))?;

        // Latest survey first: keep the first row seen per reference period.
        let mut latest: BTreeMap<Period, f64> = BTreeMap::new();
        for row in &body.value {
            let Some(period) = parse_reference(id, row)? else {
                continue;
            };
            let Some(median) = row.median.filter(|m| m.is_finite()) else {
                continue;
            };
            latest.entry(period).or_insert(median);
        }

        if latest.is_empty() {
            return Err(PipelineError::Fetch(format!(
                "Olinda returned no usable rows for {id:?}"
            )));
        }

        ExpectationSeries::new(
            id.series_name(),
            id.cadence(),
            id.unit(),
            latest.into_iter().collect(),
        )
    }
}

/// Map one row's reference field to a period.
///
/// Returns `Ok(None)` for rows that are filtered by convention (odd COPOM
/// meetings), `Err` for malformed references.
fn parse_reference(id: ExpectationId, row: &OlindaRow) -> Result<Option<Period>, PipelineError> {
    match id {
        ExpectationId::SelicMeetings => {
            let meeting = row
                .meeting
                .as_deref()
                .ok_or_else(|| PipelineError::Fetch("Selic row missing meeting".to_string()))?;
            parse_meeting_reference(meeting)
        }
        _ => {
            let reference = row
                .reference
                .as_deref()
                .ok_or_else(|| PipelineError::Fetch("row missing reference date".to_string()))?;
            match id.cadence() {
                crate::domain::Cadence::Quarterly => parse_quarter_reference(reference).map(Some),
                crate::domain::Cadence::Annual => parse_year_reference(reference).map(Some),
                crate::domain::Cadence::Monthly => parse_month_reference(reference).map(Some),
            }
        }
    }
}

/// `q/yyyy` → quarterly period.
fn parse_quarter_reference(reference: &str) -> Result<Period, PipelineError> {
    let (quarter, year) = reference
        .split_once('/')
        .ok_or_else(|| PipelineError::Fetch(format!("invalid quarterly reference '{reference}'")))?;
    let quarter: u32 = quarter
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid quarterly reference '{reference}'")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid quarterly reference '{reference}'")))?;
    Period::from_quarter(year, quarter)
}

/// `mm/yyyy` → monthly period.
fn parse_month_reference(reference: &str) -> Result<Period, PipelineError> {
    let (month, year) = reference
        .split_once('/')
        .ok_or_else(|| PipelineError::Fetch(format!("invalid monthly reference '{reference}'")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid monthly reference '{reference}'")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid monthly reference '{reference}'")))?;
    Period::from_month(year, month)
}

/// `yyyy` → annual reference anchored to December.
fn parse_year_reference(reference: &str) -> Result<Period, PipelineError> {
    let year: i32 = reference
        .trim()
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid annual reference '{reference}'")))?;
    Period::from_year(year)
}

/// `Rn/yyyy` COPOM meeting → quarterly period for even meetings, `None` for
/// odd ones (eight meetings a year; the even ones close out quarters).
fn parse_meeting_reference(meeting: &str) -> Result<Option<Period>, PipelineError> {
    let (code, year) = meeting
        .split_once('/')
        .ok_or_else(|| PipelineError::Fetch(format!("invalid meeting reference '{meeting}'")))?;
    let year: i32 = year
        .parse()
        .map_err(|_| PipelineError::Fetch(format!("invalid meeting reference '{meeting}'")))?;
    let month = match code {
        "R2" => 3,
        "R4" => 6,
        "R6" => 9,
        "R8" => 12,
        "R1" | "R3" | "R5" | "R7" => return Ok(None),
        _ => {
            return Err(PipelineError::Fetch(format!(
                "invalid meeting reference '{meeting}'"
            )));
        }
    };
    Period::from_month(year, month).map(Some)
}
