//! Column type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column types understood by the materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Text,
    Timestamp,
}

impl SqlType {
    /// SQL type name, as reported in decode errors.
    pub const fn sql_name(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Text => "TEXT",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

/// A point in time, stored as microseconds since the Unix epoch.
///
/// This matches the `Value::Timestamp` wire representation so conversions
/// are lossless in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    const MICROS_PER_SECOND: i64 = 1_000_000;

    /// Latest representable instant.
    pub const MAX: Self = Self(i64::MAX);

    /// Earliest representable instant.
    pub const MIN: Self = Self(i64::MIN);

    /// Create a timestamp from microseconds since epoch.
    pub const fn from_micros(us: i64) -> Self {
        Self(us)
    }

    /// Create a timestamp from whole seconds since epoch.
    ///
    /// Saturates at [`Timestamp::MIN`] and [`Timestamp::MAX`].
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(Self::MICROS_PER_SECOND))
    }

    /// Microseconds since epoch.
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Shift this timestamp by a number of whole seconds.
    ///
    /// Saturates instead of wrapping, so a far-future shift never lands
    /// before `self`.
    #[must_use]
    pub const fn add_secs(self, secs: i64) -> Self {
        Self(
            self.0
                .saturating_add(secs.saturating_mul(Self::MICROS_PER_SECOND)),
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.div_euclid(Self::MICROS_PER_SECOND);
        let micros = self.0.rem_euclid(Self::MICROS_PER_SECOND);
        write!(f, "{secs}.{micros:06}")
    }
}
