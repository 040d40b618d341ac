//! The calculation sections.
//!
//! Each section owns its fields, declares what it reads upstream, and
//! computes its derived values through a scenario-locked scope. Sections
//! are registered upstream-first in [`crate::builder`]; they never call
//! each other, only publish and subscribe through the store.

mod building;
mod climate;
mod envelope;
mod gains;
mod summary;
mod ventilation;

pub use building::Building;
pub use climate::Climate;
pub use envelope::Envelope;
pub use gains::InternalGains;
pub use summary::Summary;
pub use ventilation::Ventilation;
