//! Error types shared across the graph engine.

/// Errors reported by configuration and sample construction.
///
/// None of these are fatal to a running graph: callers that reconfigure a
/// live graph get the error back while the previous valid value stays in
/// effect.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    /// A graph option is out of range or not finite.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption {
        /// Option name, as spelled in the JSON configuration.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A fixed axis range is empty, inverted or not finite.
    #[error("invalid axis range [{min}, {max}]")]
    InvalidAxisRange {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },
    /// A fixed axis needs between 2 and 100 ticks.
    #[error("invalid tick count {0}, need 2 to {max}", max = crate::axis::MAX_TICKS)]
    InvalidTickCount(usize),
    /// A sample timestamp was NaN or infinite.
    #[error("sample timestamp {0} is not finite")]
    InvalidTimestamp(f64),
    /// A sample listed the same series key twice.
    #[error("duplicate series key `{0}` in sample")]
    DuplicateKey(String),
    /// A color string could not be parsed.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    /// A background worker thread could not be started.
    #[error("worker error: {0}")]
    Worker(#[from] std::io::Error),
}

impl GraphError {
    pub(crate) fn option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}
