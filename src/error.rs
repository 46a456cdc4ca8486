//! Error types.
//!
//! Two layers:
//!
//! - [`EnrichError`]: precise, row-naming failures raised by the
//!   normalization pipeline (bad date text, absent/non-numeric counts).
//! - [`AppError`]: an exit-code-carrying application error that everything is
//!   converted into at the command boundary.
//!
//! Exit code conventions: 2 = input/config, 3 = normalization, 4 = network/terminal.

/// A failure inside the normalization pipeline.
///
/// Unresolved state-name lookups (postal code or population) are *not* errors;
/// they degrade to absent optional fields on the output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    /// A record's date field does not match `YYYY-MM-DD`.
    MalformedDate { row: usize, value: String },
    /// A record's cases/deaths field is absent or non-numeric.
    MissingField {
        row: usize,
        state: String,
        field: &'static str,
    },
}

impl std::fmt::Display for EnrichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichError::MalformedDate { row, value } => {
                write!(f, "Row {row}: malformed date '{value}' (expected YYYY-MM-DD).")
            }
            EnrichError::MissingField { row, state, field } => {
                write!(
                    f,
                    "Row {row} ({state}): missing or non-numeric `{field}` value."
                )
            }
        }
    }
}

impl std::error::Error for EnrichError {}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<EnrichError> for AppError {
    fn from(err: EnrichError) -> Self {
        AppError::new(3, err.to_string())
    }
}
