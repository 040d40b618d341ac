//! Envelope section: component areas, thermal resistances, and annual
//! transmission losses.
//!
//! Per component: loss = area · (1/RSI) · HDD · 24 / 1000  [kWh/yr].
//!
//! Edge cases follow the sentinel policy: a zero-area component loses
//! nothing (a computed `0`, not `N/A`), while a component whose RSI is
//! missing or non-positive is `Unavailable` and is excluded from the
//! section total instead of poisoning it. A total to which no component
//! contributed is itself `Unavailable`, never a fabricated `0`.

use tracing::debug;

use enercode_model::{Result, ScenarioScope, Section};
use enercode_store::{FieldDef, FieldType, FieldValue};

/// (component, area id, RSI id, loss id, default area m², default RSI).
const COMPONENTS: &[(&str, &str, &str, &str, f64, f64)] = &[
    ("roof", "d_85", "f_85", "i_85", 120.0, 6.41),
    ("walls", "d_86", "f_86", "i_86", 200.0, 4.87),
    ("windows", "d_87", "f_87", "i_87", 40.0, 0.77),
    ("floor", "d_88", "f_88", "i_88", 120.0, 4.40),
];

/// Section total transmission loss, kWh/yr.
const TOTAL_ID: &str = "i_98";

pub struct Envelope;

impl Section for Envelope {
    fn id(&self) -> &'static str {
        "envelope"
    }

    fn title(&self) -> &'static str {
        "Building Envelope"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        let mut defs = Vec::new();
        let mut loss_ids = Vec::new();
        for &(_, area_id, rsi_id, loss_id, area, rsi) in COMPONENTS {
            defs.push(FieldDef::number(area_id, area));
            defs.push(FieldDef::number(rsi_id, rsi));
            defs.push(
                FieldDef::computed(loss_id, FieldType::Number)
                    .with_deps(&[area_id, rsi_id, "d_20"]),
            );
            loss_ids.push(loss_id);
        }
        defs.push(FieldDef::computed(TOTAL_ID, FieldType::Number).with_deps(&loss_ids));
        defs
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let hdd = scope.number("d_20");

        let mut outputs = Vec::new();
        let mut total = 0.0;
        let mut contributed = false;
        for &(component, area_id, rsi_id, loss_id, _, _) in COMPONENTS {
            let loss = component_loss(scope.number(area_id), scope.number(rsi_id), hdd);
            match loss {
                FieldValue::Number(n) => {
                    total += n;
                    contributed = true;
                }
                _ => debug!(
                    scenario = scope.scenario().label(),
                    component,
                    "loss not computable, excluded from envelope total"
                ),
            }
            outputs.push((loss_id.to_string(), loss));
        }
        let total = if contributed {
            FieldValue::Number(total)
        } else {
            FieldValue::Unavailable
        };
        outputs.push((TOTAL_ID.to_string(), total));
        Ok(outputs)
    }
}

fn component_loss(area: Option<f64>, rsi: Option<f64>, hdd: Option<f64>) -> FieldValue {
    let Some(area) = area else {
        return FieldValue::Unavailable;
    };
    // No surface, no loss - regardless of whether an RSI is known.
    if area == 0.0 {
        return FieldValue::Number(0.0);
    }
    let (Some(rsi), Some(hdd)) = (rsi, hdd) else {
        return FieldValue::Unavailable;
    };
    if rsi <= 0.0 {
        return FieldValue::Unavailable;
    }
    FieldValue::from_finite(area * (1.0 / rsi) * hdd * 24.0 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_is_zero_not_unavailable() {
        assert_eq!(component_loss(Some(0.0), None, Some(3520.0)), FieldValue::Number(0.0));
    }

    #[test]
    fn missing_rsi_is_unavailable_not_zero() {
        assert_eq!(component_loss(Some(40.0), None, Some(3520.0)), FieldValue::Unavailable);
        assert_eq!(
            component_loss(Some(40.0), Some(0.0), Some(3520.0)),
            FieldValue::Unavailable
        );
    }

    #[test]
    fn nominal_loss() {
        // 40 m² at RSI 0.77 over 3520 HDD.
        let loss = component_loss(Some(40.0), Some(0.77), Some(3520.0));
        let expected = 40.0 * (1.0 / 0.77) * 3520.0 * 24.0 / 1000.0;
        assert_eq!(loss, FieldValue::Number(expected));
    }
}
