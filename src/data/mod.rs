//! Data access: observed series and survey expectations.
//!
//! Three HTTP clients mirror the upstream providers:
//!
//! - `sidra` — IBGE SIDRA (national accounts, unemployment, IPCA)
//! - `olinda` — BCB Olinda, Focus survey median expectations
//! - `bacen` — BCB SGS (observed Selic)
//!
//! plus `sample`, a deterministic synthetic source for offline runs and
//! tests. The pipeline only ever sees the `DataSource` trait, so the retry
//! and fallback logic can be exercised against sources that fail on demand.

pub mod bacen;
pub mod olinda;
pub mod sample;
pub mod sidra;

pub use bacen::BacenClient;
pub use olinda::OlindaClient;
pub use sample::SampleSource;
pub use sidra::SidraClient;

use crate::domain::{Cadence, ExpectationSeries, ExpectationUnit, ObservedSeries};
use crate::error::PipelineError;

/// Observed (published) series the pipeline knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservedId {
    Gdp,
    HouseholdConsumption,
    IndustrialGdp,
    TradeGdp,
    UnemploymentRate,
    Ipca,
    Selic,
}

impl ObservedId {
    /// Column name in the assembled table.
    pub fn column_name(self) -> &'static str {
        match self {
            ObservedId::Gdp => "gdp",
            ObservedId::HouseholdConsumption => "household_consumption",
            ObservedId::IndustrialGdp => "industrial_gdp",
            ObservedId::TradeGdp => "trade_gdp",
            ObservedId::UnemploymentRate => "unemployment",
            ObservedId::Ipca => "ipca",
            ObservedId::Selic => "selic",
        }
    }

    pub fn cadence(self) -> Cadence {
        match self {
            ObservedId::Ipca => Cadence::Monthly,
            _ => Cadence::Quarterly,
        }
    }
}

/// Expectation series published by the Focus survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationId {
    GdpQuarterly,
    HouseholdConsumptionAnnual,
    IndustrialGdpAnnual,
    UnemploymentQuarterly,
    IpcaMonthly,
    SelicMeetings,
}

impl ExpectationId {
    pub fn cadence(self) -> Cadence {
        match self {
            ExpectationId::GdpQuarterly
            | ExpectationId::UnemploymentQuarterly
            | ExpectationId::SelicMeetings => Cadence::Quarterly,
            ExpectationId::HouseholdConsumptionAnnual | ExpectationId::IndustrialGdpAnnual => {
                Cadence::Annual
            }
            ExpectationId::IpcaMonthly => Cadence::Monthly,
        }
    }

    /// Growth expectations are percent changes; rate expectations are levels.
    pub fn unit(self) -> ExpectationUnit {
        match self {
            ExpectationId::UnemploymentQuarterly | ExpectationId::SelicMeetings => {
                ExpectationUnit::Level
            }
            _ => ExpectationUnit::Percent,
        }
    }

    pub fn series_name(self) -> &'static str {
        match self {
            ExpectationId::GdpQuarterly => "gdp_median_expectation",
            ExpectationId::HouseholdConsumptionAnnual => "household_consumption_expectation",
            ExpectationId::IndustrialGdpAnnual => "industrial_gdp_expectation",
            ExpectationId::UnemploymentQuarterly => "unemployment_expectation",
            ExpectationId::IpcaMonthly => "ipca_expectation",
            ExpectationId::SelicMeetings => "selic_expectation",
        }
    }
}

/// A provider of observed and expectation series.
///
/// `Sync` because indicator builds fan out across a rayon pool.
pub trait DataSource: Sync {
    fn observed(&self, id: ObservedId) -> Result<ObservedSeries, PipelineError>;
    fn expectation(&self, id: ExpectationId) -> Result<ExpectationSeries, PipelineError>;
}

/// The live provider: SIDRA + Olinda + SGS behind one `DataSource`.
pub struct ApiSource {
    sidra: SidraClient,
    olinda: OlindaClient,
    bacen: BacenClient,
}

impl ApiSource {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            sidra: SidraClient::new()?,
            olinda: OlindaClient::new()?,
            bacen: BacenClient::new()?,
        })
    }
}

impl DataSource for ApiSource {
    fn observed(&self, id: ObservedId) -> Result<ObservedSeries, PipelineError> {
        match id {
            ObservedId::Selic => self.bacen.fetch_selic(),
            _ => self.sidra.fetch_observed(id),
        }
    }

    fn expectation(&self, id: ExpectationId) -> Result<ExpectationSeries, PipelineError> {
        self.olinda.fetch_expectation(id)
    }
}
