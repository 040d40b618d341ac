//! enercode-store - reactive field store shared by every calculation section.
//!
//! This crate is domain-agnostic: it knows nothing about buildings, energy
//! codes, or what any particular field means. It provides:
//!
//! - [`FieldValue`] - tagged value type (`Number | Token | Unavailable`)
//! - [`Scenario`] - Target/Reference namespacing (`ref_` key convention)
//! - [`FieldDef`], [`FieldType`] - per-section field definition tables
//! - [`ValueStore`] - the reactive key/value store: records with provenance,
//!   per-key change listeners, a dependency registry, and explicit write
//!   batches that coalesce notifications
//! - [`format_value`] - render-boundary formatting

pub mod field;
pub mod format;
pub mod scenario;
pub mod store;
pub mod value;

pub use field::{FieldDef, FieldType};
pub use format::{format_number, format_value};
pub use scenario::{REF_PREFIX, Scenario};
pub use store::{BatchGuard, ChangeEvent, FieldRecord, Listener, Provenance, ValueStore};
pub use value::FieldValue;
