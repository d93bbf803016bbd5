//! Crate-wide error type.
//!
//! Every stage of the pipeline reports through `PipelineError`. The variants
//! matter: the retry loop in `app::pipeline` retries transient failures,
//! refuses to retry alignment failures (malformed upstream data cannot be
//! fixed by refetching), and falls back to the persisted artifact only after
//! exhausting its attempts.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// A data source request failed or returned an unusable response.
    /// Transient; retried at the outer pipeline boundary only.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// An operation needed more known observations than the series carries
    /// (e.g. cubic interpolation with fewer than four known points).
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Duplicate or non-monotonic periods in a source series. Fatal: the
    /// runner neither retries this nor falls back to a stale artifact.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// Saving or loading the assembled table failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// No artifact has ever been persisted under the requested key.
    #[error("no persisted artifact: {0}")]
    NotFound(String),

    /// Every build attempt failed and no fallback artifact exists.
    #[error("all {attempts} build attempts failed and no fallback artifact exists (last error: {last})")]
    AttemptsExhausted { attempts: u32, last: String },

    /// Invalid configuration or arguments.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A numerical routine failed to produce a finite solution.
    #[error("numerical error: {0}")]
    Numerical(String),
}

impl PipelineError {
    /// Process exit code for the binary.
    ///
    /// 2 = usage/configuration problems, 4 = data/runtime failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Config(_) => 2,
            _ => 4,
        }
    }

    /// Fatal errors abort the retry loop immediately: another attempt cannot
    /// succeed and a fallback artifact would only mask the problem.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Alignment(_) | PipelineError::Config(_))
    }
}
