//! Shared pieces for insight text: threshold band tables and number formatting.
//!
//! Each metric that gets a qualitative label owns a small ordered table of
//! `(Bound, label)` rows. Rows are tried top to bottom and the first bound
//! that admits the value wins, so tables read like the rating guides they
//! encode.

/// Currency shown in generated text.
pub const CURRENCY: &str = "SAR";

/// Predicate half of a band row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    /// Strictly greater than.
    Above(f64),
    /// Strictly less than.
    Below(f64),
    /// Catch-all, for the last row.
    Any,
}

impl Bound {
    pub fn admits(self, value: f64) -> bool {
        match self {
            Bound::Above(t) => value > t,
            Bound::Below(t) => value < t,
            Bound::Any => true,
        }
    }
}

/// An ordered band table.
pub type Bands = [(Bound, &'static str)];

/// Label for `value`, or `"unrated"` if no row admits it.
pub fn classify(bands: &Bands, value: f64) -> &'static str {
    bands
        .iter()
        .find(|(bound, _)| bound.admits(value))
        .map(|(_, label)| *label)
        .unwrap_or("unrated")
}

/// Whole-unit amount with thousands separators: 1234567.4 -> "1,234,567".
pub fn money(amount: f64) -> String {
    let rounded = format!("{:.0}", amount);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if grouped == "0" {
        return grouped;
    }
    format!("{sign}{grouped}")
}

/// Amount in millions with two decimals: 1_234_567 -> "1.23".
pub fn millions(amount: f64) -> String {
    format!("{:.2}", amount / 1_000_000.0)
}

/// One-decimal percentage, or `n/a` when the base was zero.
pub fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "n/a".to_string(),
    }
}

/// `part / base × 100`, or `None` when `base` is zero.
pub fn percent_of(part: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some(part / base * 100.0)
    }
}
