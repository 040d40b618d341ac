//! Summary section: net annual heating demand, energy-use intensity, and
//! the occupancy criticality indicator.

use enercode_model::{Result, ScenarioScope, Section, safe_div};
use enercode_store::{FieldDef, FieldType, FieldValue};

/// Occupancy classes treated as compliance-critical.
const CRITICAL_OCCUPANCIES: &[&str] = &["Care", "Detention"];

pub struct Summary;

impl Section for Summary {
    fn id(&self) -> &'static str {
        "summary"
    }

    fn title(&self) -> &'static str {
        "Summary"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            // Net annual heating demand, kWh/yr.
            FieldDef::computed("i_104", FieldType::Number).with_deps(&["i_98", "i_120", "i_71"]),
            // Energy-use intensity, kWh/m²·yr.
            FieldDef::computed("e_10", FieldType::Number).with_deps(&["i_104", "h_15"]),
            // Occupancy criticality badge.
            FieldDef::computed("d_10", FieldType::Token).with_deps(&["d_12"]),
        ]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let envelope = scope.number("i_98");
        let ventilation = scope.number("i_120");
        let gains = scope.number_or("i_71", 0.0);

        let (net, intensity) = match (envelope, ventilation) {
            (Some(envelope), Some(ventilation)) => {
                // Gains can at most cancel the losses; demand never goes
                // negative.
                let net = (envelope + ventilation - gains).max(0.0);
                let intensity = match scope.number("h_15") {
                    Some(area) => safe_div(net, area),
                    None => FieldValue::Unavailable,
                };
                (FieldValue::from_finite(net), intensity)
            }
            _ => (FieldValue::Unavailable, FieldValue::Unavailable),
        };

        let badge = match scope.token("d_12") {
            Some(class) if CRITICAL_OCCUPANCIES.contains(&class.as_str()) => {
                FieldValue::token("critical")
            }
            Some(_) => FieldValue::token("standard"),
            None => FieldValue::Unavailable,
        };

        Ok(vec![
            ("i_104".into(), net),
            ("e_10".into(), intensity),
            ("d_10".into(), badge),
        ])
    }
}
