//! Internal gains section: occupants and plug loads, derated by a
//! utilization factor, as usable heat offsetting the losses.

use enercode_model::{Result, ScenarioScope, Section};
use enercode_store::{FieldDef, FieldType, FieldValue};

/// Continuous sensible heat per occupant, W.
const OCCUPANT_HEAT_W: f64 = 75.0;
const HOURS_PER_YEAR: f64 = 8760.0;

pub struct InternalGains;

impl Section for InternalGains {
    fn id(&self) -> &'static str {
        "gains"
    }

    fn title(&self) -> &'static str {
        "Internal Gains"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::number("d_63", 3.0), // occupants
            FieldDef::number("d_64", 5.0), // plug-load density, W/m²
            FieldDef::percentage("d_66", 0.9), // utilization factor
            FieldDef::computed("i_71", FieldType::Number)
                .with_deps(&["d_63", "d_64", "d_66", "h_15"]),
        ]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let occupants = scope.number_or("d_63", 0.0);
        let plug_density = scope.number_or("d_64", 0.0);
        let utilization = scope.number_or("d_66", 0.0);
        let area = scope.number_or("h_15", 0.0);

        let occupant_kwh = occupants * OCCUPANT_HEAT_W * HOURS_PER_YEAR / 1000.0;
        let plug_kwh = plug_density * area * HOURS_PER_YEAR / 1000.0;
        let usable = utilization * (occupant_kwh + plug_kwh);
        Ok(vec![("i_71".into(), FieldValue::from_finite(usable))])
    }
}
