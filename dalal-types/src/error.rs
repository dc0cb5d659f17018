use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the dalal workspace.
///
/// Upstream failures, model fit failures and unreadable cache records are
/// normally absorbed by the service layer and replaced by a degraded output;
/// they still travel as `DalalError` between crates so call sites can log
/// and classify them uniformly.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DalalError {
    /// The upstream market data source failed or returned an unusable payload.
    #[error("{source_name} unavailable: {msg}")]
    UpstreamUnavailable {
        /// Name of the upstream feed or provider.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An upstream call exceeded its deadline and was cancelled.
    #[error("upstream timed out: {capability} after {timeout_ms}ms")]
    UpstreamTimeout {
        /// Capability label (e.g. "bulk-quotes", "batch-quotes", "history").
        capability: String,
        /// Deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The price series is too short to produce a forecast.
    #[error("insufficient history: have {have}, need {need}")]
    InsufficientHistory {
        /// Number of usable observations available.
        have: usize,
        /// Minimum number of observations required.
        need: usize,
    },

    /// A single forecast model failed to fit or produced non-finite output.
    #[error("{model} fit failed: {msg}")]
    ModelFit {
        /// Model label ("trend", "seasonal", "volatility").
        model: String,
        /// Human-readable reason.
        msg: String,
    },

    /// A durable cache record could not be read or decoded.
    #[error("corrupt cache record {path}: {msg}")]
    CacheCorrupt {
        /// Path of the offending record.
        path: String,
        /// Decoder or I/O message.
        msg: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A symbol or resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "quote for RELIANCE".
        what: String,
    },

    /// Filesystem failure outside of record decoding.
    #[error("io error: {0}")]
    Io(String),
}

impl DalalError {
    /// Helper: build an `UpstreamUnavailable` error.
    pub fn upstream(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `UpstreamTimeout` error from a capability and deadline.
    pub fn upstream_timeout(capability: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::UpstreamTimeout {
            capability: capability.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Helper: build a `ModelFit` error.
    pub fn model_fit(model: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ModelFit {
            model: model.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `CacheCorrupt` error.
    pub fn cache_corrupt(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::CacheCorrupt {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true if the error should reach an operator as something to act on.
    ///
    /// Short histories, unknown symbols and unreadable cache records are expected
    /// in normal operation and are handled by returning no result or recomputing.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(
            self,
            Self::InsufficientHistory { .. } | Self::NotFound { .. } | Self::CacheCorrupt { .. }
        )
    }

    /// Returns true for failures that originate upstream (network or timeout).
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamTimeout { .. }
        )
    }
}

impl From<std::io::Error> for DalalError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
