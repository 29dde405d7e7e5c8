//! Scalar cell values.

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

/// Error produced when text cannot be read as a cell value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell value '{input}'")]
pub struct ValueParseError {
    /// The rejected text.
    pub input: String,
}

/// The scalar held by one grid cell.
///
/// `Undefined` stands in for source characters that cannot be read as a
/// number, and renders as `?`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CellValue {
    /// A finite real number.
    Defined(f64),
    /// The distinguished undefined sentinel.
    #[default]
    Undefined,
}

impl CellValue {
    /// Read one character of a compact digit-string row.
    ///
    /// `'0'..='9'` map to their numeric value; anything else is undefined.
    pub fn from_digit(c: char) -> Self {
        c.to_digit(10)
            .map_or(Self::Undefined, |d| Self::Defined(f64::from(d)))
    }

    /// Whether this is the undefined sentinel.
    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The numeric value, if defined.
    pub const fn as_f64(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Defined(v)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => write!(f, "{v}"),
            Self::Undefined => f.write_str("?"),
        }
    }
}

impl FromStr for CellValue {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "?" {
            return Ok(Self::Undefined);
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Self::Defined(v)),
            _ => Err(ValueParseError {
                input: s.to_owned(),
            }),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_f64().serialize(serializer)
    }
}
