//! Domain error types.

/// A strategy definition error, raised once at load/validate time.
///
/// A malformed strategy is fatal to that strategy before any symbol is
/// screened; it is never retried and never surfaces mid-run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid strategy JSON: {reason}")]
    Json { reason: String },

    #[error("strategy has no conditions")]
    NoConditions,

    #[error("unknown indicator '{name}'")]
    UnknownIndicator { name: String },

    #[error("invalid parameter '{param}' for indicator '{name}': {reason}")]
    InvalidParam {
        name: String,
        param: String,
        reason: String,
    },

    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("invalid tolerance {value}: must be a positive percentage")]
    InvalidTolerance { value: f64 },

    #[error("operand reference '{id}' is not defined")]
    UnknownRef { id: String },

    #[error("operand reference cycle involving '{id}'")]
    CyclicRef { id: String },
}

/// Top-level error type for stocksift.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Data { .. } | ScreenerError::NoData { .. } => 3,
            ScreenerError::Definition(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
