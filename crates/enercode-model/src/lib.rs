//! enercode-model - the dual-state, dual-engine section pattern.
//!
//! Built on [`enercode_store`], this crate provides everything a section
//! needs except its domain formulas:
//!
//! - [`SectionState`] - per-(section, scenario) state container
//! - [`ModeFacade`] - display-mode routing with store mirroring
//! - [`Section`], [`ScenarioScope`] - pure compute passes over a
//!   namespace-locked store view (contamination is structurally impossible)
//! - [`SectionRuntime`] - the dual-engine orchestrator
//! - [`Scheduler`] - coalescing recalculation queue (cascade wiring)
//! - [`StateCache`] - durable per-section snapshot cache
//! - [`Model`] - assembly, user edits, import/export, compliance summary

pub mod cache;
pub mod cascade;
pub mod error;
pub mod facade;
pub mod model;
pub mod runtime;
pub mod section;
pub mod standards;
pub mod state;

pub use cache::StateCache;
pub use cascade::Scheduler;
pub use error::{ModelError, Result};
pub use facade::ModeFacade;
pub use model::{Compliance, Model, ModelBuilder, REFERENCE_STANDARD_KEY};
pub use runtime::{DisplayDriver, NullDisplay, SectionRuntime};
pub use section::{ScenarioScope, Section, safe_div};
pub use standards::{ReferenceStandard, StandardsCatalog};
pub use state::SectionState;

pub use enercode_store::{
    FieldDef, FieldType, FieldValue, Provenance, Scenario, ValueStore, format_value,
};
