//! Structured error types shared across the QCELS crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`QcelsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (parameter names, offending values, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the estimator.
///
/// Only `InvalidArgument`, `SamplingFailure`, `Estimation` and `Serde` abort a
/// run. `NumericalNonConvergence` is never raised by the drivers themselves;
/// the fitter reports it as a flag and callers opt into the error through
/// `FitOutcome::ensure_converged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum QcelsError {
    /// Rejected inputs, raised before any sampling happens.
    #[error("invalid argument: {0}")]
    InvalidArgument(ErrorInfo),
    /// The bounded fitter exhausted its iteration budget.
    #[error("numerical non-convergence: {0}")]
    NumericalNonConvergence(ErrorInfo),
    /// The sampling collaborator failed or returned malformed counts.
    #[error("sampling failure: {0}")]
    SamplingFailure(ErrorInfo),
    /// The estimation procedure could not produce a result.
    #[error("estimation error: {0}")]
    Estimation(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl QcelsError {
    /// Shorthand for an [`QcelsError::InvalidArgument`] without context.
    pub fn invalid(code: &str, message: impl Into<String>) -> Self {
        QcelsError::InvalidArgument(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`QcelsError::SamplingFailure`] without context.
    pub fn sampling(code: &str, message: impl Into<String>) -> Self {
        QcelsError::SamplingFailure(ErrorInfo::new(code, message))
    }

    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            QcelsError::InvalidArgument(info)
            | QcelsError::NumericalNonConvergence(info)
            | QcelsError::SamplingFailure(info)
            | QcelsError::Estimation(info)
            | QcelsError::Serde(info) => info,
        }
    }

    /// Whether the error stems from caller input rather than the run itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, QcelsError::InvalidArgument(_))
    }
}

/// Rejects counts that must be strictly positive.
pub fn require_positive_count(name: &str, value: usize) -> Result<(), QcelsError> {
    if value == 0 {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new("non-positive-count", format!("{name} must be at least 1"))
                .with_context("parameter", name),
        ));
    }
    Ok(())
}

/// Rejects reals that must be strictly positive and finite.
pub fn require_positive_finite(name: &str, value: f64) -> Result<(), QcelsError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(QcelsError::InvalidArgument(
            ErrorInfo::new(
                "non-positive-value",
                format!("{name} must be positive and finite"),
            )
            .with_context("parameter", name)
            .with_context("value", value),
        ));
    }
    Ok(())
}
