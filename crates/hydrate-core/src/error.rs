//! Error types for materialization.

use std::fmt;

/// The primary error type for all hydrate operations.
#[derive(Debug)]
pub enum Error {
    /// A row violated the expected column contract
    MalformedRow(MalformedRowError),
    /// A factory produced an instance under the wrong key
    IdentityMismatch(IdentityMismatchError),
    /// Error raised by the external row source
    RowSource(RowSourceError),
    /// Type conversion errors
    Type(TypeError),
    /// Resolution attempted on a session that has been closed
    SessionClosed,
    /// A category hierarchy walk revisited a category
    HierarchyCycle { id: i64 },
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct MalformedRowError {
    pub table: &'static str,
    pub kind: MalformedRowKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRowKind {
    /// The row does not carry the expected number of columns
    Arity { expected: usize, actual: usize },
    /// A named row carries a different column where a mapped one belongs
    ColumnName {
        position: usize,
        expected: String,
        actual: String,
    },
    /// A column value could not be decoded into the mapped field
    Column {
        column: &'static str,
        expected: &'static str,
        actual: String,
    },
}

#[derive(Debug)]
pub struct IdentityMismatchError {
    pub table: &'static str,
    pub requested: i64,
    pub produced: i64,
}

#[derive(Debug)]
pub struct RowSourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<&'static str>,
}

impl RowSourceError {
    /// Create a row source error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl Error {
    /// Does this error indicate a bug in mapping code rather than bad data
    /// or an unavailable source?
    pub fn is_mapping_bug(&self) -> bool {
        matches!(self, Error::IdentityMismatch(_))
    }

    /// Did this error originate in the row source?
    pub fn is_row_source(&self) -> bool {
        matches!(self, Error::RowSource(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRow(e) => write!(f, "Malformed row: {}", e),
            Error::IdentityMismatch(e) => write!(f, "Identity mismatch: {}", e),
            Error::RowSource(e) => write!(f, "Row source error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::SessionClosed => write!(f, "Session is closed"),
            Error::HierarchyCycle { id } => {
                write!(f, "Category hierarchy cycle detected at category {}", id)
            }
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::RowSource(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for MalformedRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MalformedRowKind::Arity { expected, actual } => write!(
                f,
                "{} row expected {} columns, found {}",
                self.table, expected, actual
            ),
            MalformedRowKind::ColumnName {
                position,
                expected,
                actual,
            } => write!(
                f,
                "{} row column {} is '{}', expected '{}'",
                self.table, position, actual, expected
            ),
            MalformedRowKind::Column {
                column,
                expected,
                actual,
            } => write!(
                f,
                "{}.{} expected {}, found {}",
                self.table, column, expected, actual
            ),
        }
    }
}

impl fmt::Display for IdentityMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lookup for key {} produced an instance with key {}",
            self.table, self.requested, self.produced
        )
    }
}

impl fmt::Display for RowSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<MalformedRowError> for Error {
    fn from(err: MalformedRowError) -> Self {
        Error::MalformedRow(err)
    }
}

impl From<IdentityMismatchError> for Error {
    fn from(err: IdentityMismatchError) -> Self {
        Error::IdentityMismatch(err)
    }
}

impl From<RowSourceError> for Error {
    fn from(err: RowSourceError) -> Self {
        Error::RowSource(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for hydrate operations.
pub type Result<T> = std::result::Result<T, Error>;
