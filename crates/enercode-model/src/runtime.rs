//! Dual-engine orchestrator: one runtime per section.
//!
//! `calculate_all` unconditionally runs both scenario passes regardless of
//! which one is displayed - downstream sections may be in either mode and
//! must always find both namespaces populated and current. The passes are
//! read-isolated by namespace, so their relative order is insignificant.

use std::sync::Arc;

use tracing::{debug, error};

use enercode_store::{FieldDef, FieldValue, Provenance, Scenario, ValueStore};

use crate::cache::StateCache;
use crate::error::Result;
use crate::facade::ModeFacade;
use crate::section::{ScenarioScope, Section};
use crate::standards::ReferenceStandard;

/// Hook for the out-of-scope rendering layer: called once per
/// `calculate_all` (and on mode switches) to refresh on-screen figures for
/// the active mode.
pub trait DisplayDriver: Send + Sync {
    fn refresh(&self, section: &str, mode: Scenario);
}

/// Display driver that renders nowhere.
pub struct NullDisplay;

impl DisplayDriver for NullDisplay {
    fn refresh(&self, _section: &str, _mode: Scenario) {}
}

/// A section plus its dual state containers and mode facade.
pub struct SectionRuntime {
    section: Box<dyn Section>,
    defs: Arc<Vec<FieldDef>>,
    facade: ModeFacade,
}

impl SectionRuntime {
    pub fn new(section: Box<dyn Section>) -> SectionRuntime {
        let defs = Arc::new(section.field_defs());
        let facade = ModeFacade::new(section.id(), defs.clone());
        SectionRuntime {
            section,
            defs,
            facade,
        }
    }

    pub fn id(&self) -> &'static str {
        self.section.id()
    }

    pub fn title(&self) -> &'static str {
        self.section.title()
    }

    pub fn defs(&self) -> &[FieldDef] {
        &self.defs
    }

    pub fn facade(&self) -> &ModeFacade {
        &self.facade
    }

    pub fn facade_mut(&mut self) -> &mut ModeFacade {
        &mut self.facade
    }

    /// Load both containers (cache or defaults) and mirror their contents
    /// into the store so downstream sections can read them.
    pub fn initialize(
        &mut self,
        store: &ValueStore,
        cache: Option<&StateCache>,
        standard: Option<&ReferenceStandard>,
    ) {
        for scenario in Scenario::BOTH {
            self.facade.state_mut(scenario).initialize(cache, standard);
            for (id, value, provenance) in self.facade.state(scenario).entries() {
                store.set_value(&scenario.key(id), value.clone(), provenance);
            }
        }
    }

    /// Record this section's dependency edges, in both namespaces.
    /// Introspection only; the cascade wiring is what drives recomputation.
    pub fn register_dependencies(&self, store: &ValueStore) {
        for def in self.defs.iter() {
            for dep in &def.dependencies {
                for scenario in Scenario::BOTH {
                    store.register_dependency(&scenario.key(dep), &scenario.key(&def.id));
                }
            }
        }
    }

    /// Every store key whose change must re-run this section: all declared
    /// dependencies, plain and `ref_` variants, deduplicated.
    pub fn upstream_keys(&self) -> Vec<String> {
        let mut keys = std::collections::BTreeSet::new();
        for def in self.defs.iter() {
            for dep in &def.dependencies {
                for scenario in Scenario::BOTH {
                    keys.insert(scenario.key(dep));
                }
            }
        }
        keys.into_iter().collect()
    }

    /// One scenario pass: compute against a namespace-locked scope, then
    /// publish every derived field under that scenario's keys with
    /// `Calculated` provenance. Non-finite results are stored as
    /// `Unavailable`, never as a number.
    pub fn calculate(&mut self, scenario: Scenario, store: &ValueStore) -> Result<()> {
        let scope = ScenarioScope::new(store, scenario);
        let outputs = self.section.compute(&scope)?;
        for (id, value) in outputs {
            let value = match value {
                FieldValue::Number(n) => FieldValue::from_finite(n),
                v => v,
            };
            store.set_value(&scenario.key(&id), value.clone(), Provenance::Calculated);
            self.facade
                .state_mut(scenario)
                .set(&id, value, Provenance::Calculated, None);
        }
        Ok(())
    }

    /// Run both passes, then refresh the display for the active mode.
    ///
    /// A failed pass is logged with section context and contained: it never
    /// aborts the other pass or the wider cascade.
    pub fn calculate_all(&mut self, store: &ValueStore, display: &dyn DisplayDriver) {
        for scenario in Scenario::BOTH {
            if let Err(err) = self.calculate(scenario, store) {
                error!(
                    section = self.id(),
                    scenario = scenario.label(),
                    %err,
                    "calculation pass failed; cascade continues"
                );
            }
        }
        display.refresh(self.id(), self.facade.current_mode());
    }

    /// Re-seed Reference-side input defaults after the selected standard
    /// changed. Goes through `Default`-provenance store writes, so values
    /// the user explicitly entered on the Reference side survive; computed
    /// fields are left to the recalculation that follows.
    pub fn reseed_reference(&mut self, standard: Option<&ReferenceStandard>, store: &ValueStore) {
        for def in self.defs.clone().iter() {
            if def.computed {
                continue;
            }
            let value = standard
                .and_then(|s| s.override_for(&def.id))
                .unwrap_or_else(|| def.default.clone());
            if store.set_value(
                &Scenario::Reference.key(&def.id),
                value.clone(),
                Provenance::Default,
            ) {
                debug!(
                    section = self.id(),
                    field = def.id.as_str(),
                    "reference default reseeded from standard"
                );
                self.facade
                    .state_mut(Scenario::Reference)
                    .set(&def.id, value, Provenance::Default, None);
            }
        }
    }
}
