//! Mode facade: one get/set surface over "whichever container is active".
//!
//! The facade is purely a display-routing switch. Switching modes never
//! mutates stored values and never triggers recomputation - both scenarios
//! are always kept computed regardless of which one is on screen. What the
//! facade does do, critically, is mirror every write into the store under
//! the active scenario's key, which is how a section's state becomes
//! visible to downstream sections.

use std::sync::Arc;

use tracing::debug;

use enercode_store::{FieldDef, FieldValue, Provenance, Scenario, ValueStore};

use crate::cache::StateCache;
use crate::standards::ReferenceStandard;
use crate::state::SectionState;

pub struct ModeFacade {
    section_id: String,
    current: Scenario,
    target: SectionState,
    reference: SectionState,
}

impl ModeFacade {
    pub fn new(section_id: &str, defs: Arc<Vec<FieldDef>>) -> ModeFacade {
        ModeFacade {
            section_id: section_id.to_string(),
            current: Scenario::Target,
            target: SectionState::new(section_id, Scenario::Target, defs.clone()),
            reference: SectionState::new(section_id, Scenario::Reference, defs),
        }
    }

    pub fn current_mode(&self) -> Scenario {
        self.current
    }

    pub fn state(&self, scenario: Scenario) -> &SectionState {
        match scenario {
            Scenario::Target => &self.target,
            Scenario::Reference => &self.reference,
        }
    }

    pub fn state_mut(&mut self, scenario: Scenario) -> &mut SectionState {
        match scenario {
            Scenario::Target => &mut self.target,
            Scenario::Reference => &mut self.reference,
        }
    }

    pub fn current_state(&self) -> &SectionState {
        self.state(self.current)
    }

    /// Read from the active container.
    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.current_state().get(id)
    }

    /// Write to the active container and mirror into the store under the
    /// active scenario's key.
    pub fn set(
        &mut self,
        id: &str,
        value: FieldValue,
        provenance: Provenance,
        store: &ValueStore,
        cache: Option<&StateCache>,
    ) {
        let scenario = self.current;
        self.state_mut(scenario)
            .set(id, value.clone(), provenance, cache);
        store.set_value(&scenario.key(id), value, provenance);
    }

    /// Write a scenario-independent field: both containers take the value
    /// so it reads the same in either mode, and the store mirror always
    /// goes under the plain key. Used for selectors that configure the
    /// model as a whole (notably the reference-standard dropdown) rather
    /// than describing one scenario's building.
    pub fn set_shared(
        &mut self,
        id: &str,
        value: FieldValue,
        provenance: Provenance,
        store: &ValueStore,
        cache: Option<&StateCache>,
    ) {
        for scenario in Scenario::BOTH {
            self.state_mut(scenario)
                .set(id, value.clone(), provenance, cache);
        }
        store.set_value(&Scenario::Target.key(id), value, provenance);
    }

    /// Flip the routing switch. Display-only: no stored value changes, no
    /// recomputation. Returns whether the mode actually changed, so the
    /// rendering layer knows to re-read visible fields.
    pub fn switch_mode(&mut self, mode: Scenario) -> bool {
        if mode == self.current {
            return false;
        }
        debug!(
            section = self.section_id.as_str(),
            mode = mode.label(),
            "mode switch"
        );
        self.current = mode;
        true
    }

    /// Reset both containers to defaults, persist them, and republish every
    /// default into the store (bypassing the user-modified conflict rule -
    /// discarding user values is the point of a reset). The caller triggers
    /// the full recalculation that follows.
    pub fn reset(
        &mut self,
        standard: Option<&ReferenceStandard>,
        store: &ValueStore,
        cache: Option<&StateCache>,
    ) {
        for scenario in Scenario::BOTH {
            let state = self.state_mut(scenario);
            state.set_defaults(standard);
            state.persist(cache);
            for (id, value, _) in self.state(scenario).entries() {
                store.overwrite_value(&scenario.key(id), value.clone(), Provenance::Default);
            }
        }
    }
}
