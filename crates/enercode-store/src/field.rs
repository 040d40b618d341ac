//! Field definitions.
//!
//! Each section publishes a table of [`FieldDef`]s for the fields it owns.
//! The table is the single source of defaults: state containers seed from
//! it, and no default literal may be duplicated inside calculation code.

use crate::value::FieldValue;

/// How a field parses, validates, and renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Plain numeric quantity.
    Number,
    /// Numeric, stored as a decimal fraction (0-1), rendered as percent.
    Percentage,
    /// Symbolic choice (dropdown selection, class code, city name).
    Token,
}

/// Definition of one field a section owns.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field id in the sheet's `<col>_<row>` style, e.g. `d_20`.
    pub id: String,
    pub field_type: FieldType,
    /// Default value, the only authoritative copy.
    pub default: FieldValue,
    /// Upstream field ids this field's formula reads (base ids, no
    /// scenario prefix). Drives cascade wiring and the dependency
    /// registry; may include fields of other sections.
    pub dependencies: Vec<String>,
    /// True for derived fields the section's compute pass produces.
    /// Computed fields are never reseeded from a reference standard.
    pub computed: bool,
}

impl FieldDef {
    /// A user-editable numeric input.
    pub fn number(id: &str, default: f64) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            field_type: FieldType::Number,
            default: FieldValue::Number(default),
            dependencies: Vec::new(),
            computed: false,
        }
    }

    /// A user-editable percentage input (default given as a fraction).
    pub fn percentage(id: &str, default: f64) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            field_type: FieldType::Percentage,
            default: FieldValue::Number(default),
            dependencies: Vec::new(),
            computed: false,
        }
    }

    /// A user-editable symbolic input.
    pub fn token(id: &str, default: &str) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            field_type: FieldType::Token,
            default: FieldValue::token(default),
            dependencies: Vec::new(),
            computed: false,
        }
    }

    /// A derived field produced by the section's compute pass. Starts
    /// `Unavailable` until first computed.
    pub fn computed(id: &str, field_type: FieldType) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            field_type,
            default: FieldValue::Unavailable,
            dependencies: Vec::new(),
            computed: true,
        }
    }

    /// Attach upstream dependencies (builder style).
    pub fn with_deps(mut self, deps: &[&str]) -> FieldDef {
        self.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }
}
