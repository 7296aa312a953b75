//! Domain error types.

/// Top-level error type for sigtrade.
#[derive(Debug, thiserror::Error)]
pub enum SigtradeError {
    #[error("{context}: expected length {expected}, found {found}")]
    Alignment {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("{context}: index differs at row {position}")]
    IndexMismatch { context: String, position: usize },

    #[error("{context}: timestamp at row {row} does not come after the one before it")]
    UnorderedIndex { context: String, row: usize },

    #[error("missing value in column {column} at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("non-finite value {value} in column {column} at row {row}")]
    NonFiniteValue {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("required column {column} is absent")]
    MissingColumn { column: String },

    #[error("non-integral value {value} in column {column} at row {row}")]
    NonIntegralSignal {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("initial position must be finite, got {value}")]
    InvalidInitialPosition { value: f64 },

    #[error("no usable data in {source_name}")]
    NoData { source_name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtradeError {
    pub(crate) fn alignment(context: impl Into<String>, expected: usize, found: usize) -> Self {
        SigtradeError::Alignment {
            context: context.into(),
            expected,
            found,
        }
    }

    /// Process exit status for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            SigtradeError::Io(_) => 1,
            SigtradeError::ConfigParse { .. }
            | SigtradeError::ConfigInvalid { .. } => 2,
            SigtradeError::Data { .. } => 3,
            SigtradeError::Alignment { .. }
            | SigtradeError::IndexMismatch { .. }
            | SigtradeError::UnorderedIndex { .. }
            | SigtradeError::MissingValue { .. }
            | SigtradeError::NonFiniteValue { .. }
            | SigtradeError::MissingColumn { .. }
            | SigtradeError::NonIntegralSignal { .. }
            | SigtradeError::InvalidInitialPosition { .. } => 4,
            SigtradeError::NoData { .. } => 5,
        }
    }
}

impl From<&SigtradeError> for std::process::ExitCode {
    fn from(err: &SigtradeError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
