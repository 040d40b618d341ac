//! Render-boundary formatting.
//!
//! Values live in the store in canonical form (fractions for percentages,
//! full float precision for numbers). Converting to display text happens
//! here and only here.

use crate::field::FieldType;
use crate::value::{FieldValue, UNAVAILABLE_TOKEN};

/// Format a number for display: integers without decimals, otherwise up to
/// two decimal places with trailing zeros trimmed.
pub fn format_number(n: f64) -> String {
    if n.fract().abs() < 1e-9 && n.abs() < 1e15 {
        return format!("{:.0}", n);
    }
    let s = format!("{:.2}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Format a field value for display according to its field type.
pub fn format_value(value: &FieldValue, field_type: FieldType) -> String {
    match value {
        FieldValue::Number(n) => match field_type {
            FieldType::Percentage => format!("{}%", format_number(n * 100.0)),
            _ => format_number(*n),
        },
        FieldValue::Token(t) => t.clone(),
        FieldValue::Unavailable => UNAVAILABLE_TOKEN.to_string(),
    }
}
