//! Unit newtypes used at the configuration boundary.
//!
//! Operators often type ratios into free-text fields, so scenario files may
//! carry `"1.5"` where a number is meant. Parsing happens here, once, during
//! deserialization; calculators only ever see numbers.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// A percentage on the 0–100 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    /// Zero percent.
    pub const ZERO: Percent = Percent(0.0);

    /// Raw value on the 0–100 scale.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Value as a fraction: 25% -> 0.25.
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }

    /// One minus the fraction: 25% -> 0.75.
    pub fn complement(self) -> f64 {
        1.0 - self.fraction()
    }

    /// Whether the value is finite and within [0, 100].
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (0.0..=100.0).contains(&self.0)
    }
}

impl From<f64> for Percent {
    fn from(v: f64) -> Self {
        Percent(v)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_f64(deserializer).map(Percent)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Deserialize an `f64` from either a number or a numeric string.
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}
