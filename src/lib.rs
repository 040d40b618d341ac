//! Enercode - dual-scenario building-energy-code compliance calculator.
//!
//! The reactive core lives in [`enercode_store`] (values, scenarios, the
//! listener-driven store) and [`enercode_model`] (state containers, mode
//! facade, dual-engine orchestration, cascade). This crate supplies the
//! concrete calculation sections - the swappable business logic - and a
//! small non-interactive CLI for driving a model.

pub mod sections;
pub mod standards;

pub use enercode_model::{
    Compliance, Model, ModelBuilder, ModelError, Result, Scenario, StandardsCatalog,
};
pub use enercode_store::{FieldValue, Provenance, ValueStore};

use std::path::PathBuf;

/// Derived field compared across scenarios for the compliance verdict:
/// annual energy-use intensity, kWh/m²·yr.
pub const INTENSITY_FIELD: &str = "e_10";

/// Builder preloaded with every standard section, in dependency order
/// (upstream sections first), and the known reference standards.
pub fn builder() -> ModelBuilder {
    ModelBuilder::new()
        .standards(standards::catalog())
        .section(Box::new(sections::Climate))
        .section(Box::new(sections::Building))
        .section(Box::new(sections::Envelope))
        .section(Box::new(sections::Ventilation))
        .section(Box::new(sections::InternalGains))
        .section(Box::new(sections::Summary))
}

/// Assemble the standard model, optionally backed by a durable state cache.
pub fn build_model(cache_dir: Option<PathBuf>) -> Result<Model> {
    let mut b = builder();
    if let Some(dir) = cache_dir {
        b = b.cache_dir(dir);
    }
    b.build()
}
