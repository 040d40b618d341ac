//! Building information section: occupancy class, code standard selection,
//! conditioned area and volume. Inputs only; everything derived from these
//! belongs to downstream sections.

use enercode_model::{REFERENCE_STANDARD_KEY, Result, ScenarioScope, Section};
use enercode_store::{FieldDef, FieldValue};

use crate::standards::DEFAULT_STANDARD;

pub struct Building;

impl Section for Building {
    fn id(&self) -> &'static str {
        "building"
    }

    fn title(&self) -> &'static str {
        "Building Information"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::token("d_12", "Residential"),
            FieldDef::token(REFERENCE_STANDARD_KEY, DEFAULT_STANDARD),
            FieldDef::number("h_15", 150.0),  // conditioned floor area, m²
            FieldDef::number("d_105", 450.0), // conditioned volume, m³
        ]
    }

    fn compute(&self, _scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        Ok(Vec::new())
    }
}
