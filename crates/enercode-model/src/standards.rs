//! Reference-standard catalog.
//!
//! The Reference scenario's input defaults come from a selected code
//! edition. The selection is published in the store under the well-known
//! `d_13` key (see [`crate::REFERENCE_STANDARD_KEY`]); each edition is a
//! table of field-id overrides. Fields a standard is silent on fall back to
//! their definition defaults.

use std::collections::BTreeMap;

use enercode_store::FieldValue;

/// One code edition's Reference-side defaults.
#[derive(Debug, Clone)]
pub struct ReferenceStandard {
    token: String,
    overrides: BTreeMap<String, FieldValue>,
}

impl ReferenceStandard {
    pub fn new(token: &str) -> ReferenceStandard {
        ReferenceStandard {
            token: token.to_string(),
            overrides: BTreeMap::new(),
        }
    }

    /// The `d_13` dropdown token naming this edition.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set(&mut self, field_id: &str, value: FieldValue) {
        self.overrides.insert(field_id.to_string(), value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field_id: &str, value: FieldValue) -> ReferenceStandard {
        self.set(field_id, value);
        self
    }

    pub fn override_for(&self, field_id: &str) -> Option<FieldValue> {
        self.overrides.get(field_id).cloned()
    }

    pub fn overridden_ids(&self) -> impl Iterator<Item = &str> {
        self.overrides.keys().map(String::as_str)
    }
}

/// All known code editions, keyed by their `d_13` token.
#[derive(Debug, Clone, Default)]
pub struct StandardsCatalog {
    standards: BTreeMap<String, ReferenceStandard>,
}

impl StandardsCatalog {
    pub fn new() -> StandardsCatalog {
        StandardsCatalog::default()
    }

    pub fn add(&mut self, standard: ReferenceStandard) {
        self.standards.insert(standard.token().to_string(), standard);
    }

    pub fn with(mut self, standard: ReferenceStandard) -> StandardsCatalog {
        self.add(standard);
        self
    }

    pub fn lookup(&self, token: &str) -> Option<&ReferenceStandard> {
        self.standards.get(token)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.standards.keys().map(String::as_str)
    }
}
