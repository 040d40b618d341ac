//! Ventilation section: air-change rate and the resulting heat loss.
//!
//! loss = 0.33 · ACH · volume · HDD · 24 / 1000  [kWh/yr], with
//! 0.33 Wh/(m³·K) the volumetric heat capacity of air.

use enercode_model::{Result, ScenarioScope, Section};
use enercode_store::{FieldDef, FieldType, FieldValue};

const AIR_HEAT_CAPACITY: f64 = 0.33; // Wh/(m³·K)

pub struct Ventilation;

impl Section for Ventilation {
    fn id(&self) -> &'static str {
        "ventilation"
    }

    fn title(&self) -> &'static str {
        "Ventilation"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::number("d_119", 0.35), // air changes per hour
            FieldDef::computed("i_120", FieldType::Number).with_deps(&["d_119", "d_105", "d_20"]),
        ]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let loss = match (
            scope.number("d_119"),
            scope.number("d_105"),
            scope.number("d_20"),
        ) {
            (Some(ach), Some(volume), Some(hdd)) => {
                FieldValue::from_finite(AIR_HEAT_CAPACITY * ach * volume * hdd * 24.0 / 1000.0)
            }
            _ => FieldValue::Unavailable,
        };
        Ok(vec![("i_120".into(), loss)])
    }
}
