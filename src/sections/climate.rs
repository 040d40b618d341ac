//! Climate section: location selector and degree-day lookups.

use enercode_model::{Result, ScenarioScope, Section};
use enercode_store::{FieldDef, FieldType, FieldValue};

/// (city, heating degree-days, cooling degree-days), 18°C base.
const CITIES: &[(&str, f64, f64)] = &[
    ("Calgary", 5000.0, 40.0),
    ("Edmonton", 5120.0, 30.0),
    ("Halifax", 4000.0, 140.0),
    ("Montreal", 4200.0, 230.0),
    ("Ottawa", 4500.0, 240.0),
    ("Toronto", 3520.0, 330.0),
    ("Vancouver", 2830.0, 60.0),
    ("Winnipeg", 5670.0, 190.0),
];

pub struct Climate;

impl Section for Climate {
    fn id(&self) -> &'static str {
        "climate"
    }

    fn title(&self) -> &'static str {
        "Climate"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::token("d_19", "Toronto"),
            FieldDef::computed("d_20", FieldType::Number).with_deps(&["d_19"]),
            FieldDef::computed("d_21", FieldType::Number).with_deps(&["d_19"]),
        ]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let lookup = scope
            .token("d_19")
            .and_then(|city| CITIES.iter().find(|&&(name, _, _)| name == city).copied());

        let (hdd, cdd) = match lookup {
            Some((_, hdd, cdd)) => (FieldValue::Number(hdd), FieldValue::Number(cdd)),
            // Unknown or missing location: degree-days are not computable.
            None => (FieldValue::Unavailable, FieldValue::Unavailable),
        };
        Ok(vec![("d_20".into(), hdd), ("d_21".into(), cdd)])
    }
}
