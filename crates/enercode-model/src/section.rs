//! The section contract: pure compute passes over a scenario-locked view.
//!
//! A section's `compute` is scenario-agnostic: the same code produces the
//! Target results when handed a Target scope and the Reference results when
//! handed a Reference scope. The scope only ever reads its own scenario's
//! namespace - there is deliberately no API for reaching the other one, so
//! a Reference pass can never fall back to a Target value ("contamination")
//! no matter what a section author writes.

use tracing::debug;

use enercode_store::{FieldDef, FieldValue, Scenario, ValueStore};

use crate::error::Result;

/// One self-contained calculation unit.
///
/// Sections own a set of fields (via [`field_defs`](Section::field_defs)),
/// consume upstream fields by id, and publish derived results. They never
/// touch the store directly; the runtime routes everything.
pub trait Section: Send + Sync {
    /// Stable section identifier, e.g. `climate`.
    fn id(&self) -> &'static str;

    /// Human-readable title for display surfaces.
    fn title(&self) -> &'static str {
        self.id()
    }

    /// The fields this section owns: the single source of defaults, types,
    /// and dependency declarations.
    fn field_defs(&self) -> Vec<FieldDef>;

    /// Compute every derived field from the scope's scenario. Must be
    /// deterministic (same inputs, same outputs) and must not care which
    /// scenario it is running as.
    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>>;
}

/// Read-only, namespace-locked view of the store for one compute pass.
pub struct ScenarioScope<'a> {
    store: &'a ValueStore,
    scenario: Scenario,
}

impl<'a> ScenarioScope<'a> {
    pub fn new(store: &'a ValueStore, scenario: Scenario) -> ScenarioScope<'a> {
        ScenarioScope { store, scenario }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// The raw value under this scenario's key, or `None` if absent.
    /// Never consults the other namespace.
    pub fn value(&self, id: &str) -> Option<FieldValue> {
        self.store.get_value(&self.scenario.key(id))
    }

    /// Numeric read; tokens and `Unavailable` read as `None`.
    pub fn number(&self, id: &str) -> Option<f64> {
        self.value(id).and_then(|v| v.as_number())
    }

    /// Numeric read with the missing-upstream policy applied:
    ///
    /// - Target scope: substitute the documented section-local `fallback`.
    /// - Reference scope: substitute zero - never the Target value.
    ///
    /// Both substitutions are logged with field context.
    pub fn number_or(&self, id: &str, fallback: f64) -> f64 {
        match self.number(id) {
            Some(n) => n,
            None => {
                let substituted = match self.scenario {
                    Scenario::Target => fallback,
                    Scenario::Reference => 0.0,
                };
                debug!(
                    field = id,
                    scenario = self.scenario.label(),
                    substituted,
                    "upstream value missing"
                );
                substituted
            }
        }
    }

    pub fn token(&self, id: &str) -> Option<String> {
        self.value(id).and_then(|v| v.as_token().map(str::to_string))
    }
}

/// Guarded division: a structurally-zero denominator yields `Unavailable`
/// instead of propagating `Infinity`/`NaN` downstream.
pub fn safe_div(numerator: f64, denominator: f64) -> FieldValue {
    if denominator == 0.0 {
        FieldValue::Unavailable
    } else {
        FieldValue::from_finite(numerator / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enercode_store::Provenance;

    #[test]
    fn scope_never_reads_the_other_namespace() {
        let store = ValueStore::new();
        store.set_value("d_20", FieldValue::Number(3520.0), Provenance::Calculated);

        let reference = ScenarioScope::new(&store, Scenario::Reference);
        // ref_d_20 was never written: absence, not the Target value.
        assert_eq!(reference.value("d_20"), None);
        assert_eq!(reference.number_or("d_20", 99.0), 0.0);

        let target = ScenarioScope::new(&store, Scenario::Target);
        assert_eq!(target.number("d_20"), Some(3520.0));
        assert_eq!(target.number_or("d_21", 42.0), 42.0);
    }

    #[test]
    fn safe_div_yields_unavailable_not_infinity() {
        assert_eq!(safe_div(10.0, 0.0), FieldValue::Unavailable);
        assert_eq!(safe_div(10.0, 4.0), FieldValue::Number(2.5));
    }
}
