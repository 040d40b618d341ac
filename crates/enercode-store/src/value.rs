//! Tagged field values.
//!
//! Every field in the store holds a [`FieldValue`]: a finite number, a
//! symbolic token (dropdown choice, occupancy class, city name), or the
//! explicit `Unavailable` sentinel. `Unavailable` is how "cannot compute"
//! propagates - it is deliberately distinct from `Number(0.0)` so a zero
//! result never masquerades as missing data, and vice versa.

use std::fmt;

use crate::field::FieldType;

/// Relative tolerance for deciding whether a numeric write materially
/// changes the stored value. Writes inside the tolerance are no-ops and
/// must not notify listeners.
pub(crate) const NUMERIC_TOLERANCE: f64 = 1e-9;

/// The textual form of [`FieldValue::Unavailable`] in caches, export
/// documents, and rendered output.
pub const UNAVAILABLE_TOKEN: &str = "N/A";

/// A single field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A finite numeric quantity. Percentage fields store the decimal
    /// fraction (0-1), never the display form.
    Number(f64),
    /// A symbolic value such as a dropdown selection.
    Token(String),
    /// Not computable / not yet available. Renders as `N/A`, never as `0`.
    Unavailable,
}

impl FieldValue {
    /// Wrap a number, mapping non-finite results to `Unavailable`.
    ///
    /// Writers use this so `NaN`/`Infinity` never enter the store.
    pub fn from_finite(n: f64) -> FieldValue {
        if n.is_finite() {
            FieldValue::Number(n)
        } else {
            FieldValue::Unavailable
        }
    }

    /// Token constructor taking anything string-like.
    pub fn token(s: impl Into<String>) -> FieldValue {
        FieldValue::Token(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&str> {
        match self {
            FieldValue::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, FieldValue::Unavailable)
    }

    /// Whether a write of `other` over `self` is a material change.
    ///
    /// Numbers compare with a small relative tolerance so recomputation
    /// that reproduces the same value (modulo floating noise) does not
    /// re-notify the cascade.
    pub fn materially_equal(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                let scale = a.abs().max(b.abs()).max(1.0);
                (a - b).abs() <= NUMERIC_TOLERANCE * scale
            }
            (FieldValue::Token(a), FieldValue::Token(b)) => a == b,
            (FieldValue::Unavailable, FieldValue::Unavailable) => true,
            _ => false,
        }
    }

    /// Parse committed user input for a field of the given type.
    ///
    /// Returns `None` when the input is not acceptable for the type; the
    /// caller must then discard the edit and keep the prior stored value.
    pub fn parse_input(field_type: FieldType, raw: &str) -> Option<FieldValue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.eq_ignore_ascii_case(UNAVAILABLE_TOKEN) {
            return Some(FieldValue::Unavailable);
        }
        match field_type {
            FieldType::Number => {
                let n: f64 = raw.parse().ok()?;
                n.is_finite().then_some(FieldValue::Number(n))
            }
            FieldType::Percentage => {
                // "85%" and "0.85" both mean the fraction 0.85.
                let (text, percent) = match raw.strip_suffix('%') {
                    Some(t) => (t.trim_end(), true),
                    None => (raw, false),
                };
                let mut n: f64 = text.parse().ok()?;
                if percent {
                    n /= 100.0;
                }
                n.is_finite().then_some(FieldValue::Number(n))
            }
            FieldType::Token => Some(FieldValue::Token(raw.to_string())),
        }
    }

    /// Precision-preserving string encoding for caches and export
    /// documents. Decoded by [`FieldValue::decode`].
    pub fn encode(&self) -> String {
        match self {
            // `{:?}` on f64 is the shortest round-trippable form.
            FieldValue::Number(n) => format!("{n:?}"),
            FieldValue::Token(t) => t.clone(),
            FieldValue::Unavailable => UNAVAILABLE_TOKEN.to_string(),
        }
    }

    /// Decode a cached/imported string for a field of the given type.
    ///
    /// Returns `None` for malformed numeric text so callers can fall back
    /// to the field's default instead of storing garbage.
    pub fn decode(field_type: FieldType, raw: &str) -> Option<FieldValue> {
        if raw == UNAVAILABLE_TOKEN {
            return Some(FieldValue::Unavailable);
        }
        match field_type {
            FieldType::Number | FieldType::Percentage => {
                let n: f64 = raw.parse().ok()?;
                n.is_finite().then_some(FieldValue::Number(n))
            }
            FieldType::Token => Some(FieldValue::Token(raw.to_string())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_ignores_floating_noise() {
        let a = FieldValue::Number(0.1 + 0.2);
        let b = FieldValue::Number(0.3);
        assert!(a.materially_equal(&b));
        assert!(!a.materially_equal(&FieldValue::Number(0.31)));
    }

    #[test]
    fn zero_is_not_unavailable() {
        assert!(!FieldValue::Number(0.0).materially_equal(&FieldValue::Unavailable));
    }

    #[test]
    fn parse_rejects_non_numeric_for_number_fields() {
        assert_eq!(FieldValue::parse_input(FieldType::Number, "abc"), None);
        assert_eq!(FieldValue::parse_input(FieldType::Number, ""), None);
        assert_eq!(
            FieldValue::parse_input(FieldType::Number, " 42.5 "),
            Some(FieldValue::Number(42.5))
        );
    }

    #[test]
    fn parse_percentage_forms() {
        assert_eq!(
            FieldValue::parse_input(FieldType::Percentage, "85%"),
            Some(FieldValue::Number(0.85))
        );
        assert_eq!(
            FieldValue::parse_input(FieldType::Percentage, "0.85"),
            Some(FieldValue::Number(0.85))
        );
    }

    #[test]
    fn encode_decode_round_trip() {
        let v = FieldValue::Number(0.1 + 0.2);
        let back = FieldValue::decode(FieldType::Number, &v.encode()).unwrap();
        assert_eq!(v, back);

        assert_eq!(
            FieldValue::decode(FieldType::Number, "N/A"),
            Some(FieldValue::Unavailable)
        );
        assert_eq!(FieldValue::decode(FieldType::Number, "not a number"), None);
    }
}
