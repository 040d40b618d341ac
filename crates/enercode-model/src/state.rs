//! Per-(section, scenario) state containers.
//!
//! A container holds only the fields its section owns - inputs and local
//! intermediate results - and is always restorable to a deterministic
//! default set derived from the section's field definitions. The Reference
//! container may additionally seed its input defaults from a selected
//! reference standard (code edition); computed fields never are.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use enercode_store::{FieldDef, FieldValue, Provenance, Scenario, ValueStore};

use crate::cache::{Snapshot, StateCache};
use crate::standards::ReferenceStandard;

fn default_for(
    scenario: Scenario,
    def: &FieldDef,
    standard: Option<&ReferenceStandard>,
) -> FieldValue {
    if scenario == Scenario::Reference && !def.computed {
        if let Some(value) = standard.and_then(|s| s.override_for(&def.id)) {
            return value;
        }
    }
    def.default.clone()
}

/// Local state for one section in one scenario.
pub struct SectionState {
    section_id: String,
    scenario: Scenario,
    defs: Arc<Vec<FieldDef>>,
    values: HashMap<String, FieldValue>,
    /// Fields whose current value was user-entered (persisted, and restored
    /// as `UserModified`).
    user_fields: BTreeSet<String>,
}

impl SectionState {
    pub fn new(section_id: &str, scenario: Scenario, defs: Arc<Vec<FieldDef>>) -> SectionState {
        SectionState {
            section_id: section_id.to_string(),
            scenario,
            defs,
            values: HashMap::new(),
            user_fields: BTreeSet::new(),
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn owns(&self, id: &str) -> bool {
        self.defs.iter().any(|d| d.id == id)
    }

    fn def(&self, id: &str) -> Option<&FieldDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    /// Populate from defaults, then overlay a durable-cache snapshot when
    /// one is present and well-formed.
    pub fn initialize(&mut self, cache: Option<&StateCache>, standard: Option<&ReferenceStandard>) {
        self.set_defaults(standard);
        let Some(snapshot) = cache.and_then(|c| c.load(&self.section_id, self.scenario)) else {
            return;
        };
        debug!(
            section = self.section_id.as_str(),
            scenario = self.scenario.label(),
            "restoring state from cache"
        );
        for (id, raw) in &snapshot.fields {
            let Some(field_type) = self.def(id).map(|d| d.field_type) else {
                // Stale snapshot from an older field layout; skip quietly.
                continue;
            };
            match FieldValue::decode(field_type, raw) {
                Some(value) => {
                    self.values.insert(id.clone(), value);
                }
                None => warn!(
                    section = self.section_id.as_str(),
                    field = id.as_str(),
                    raw = raw.as_str(),
                    "undecodable cached value, keeping default"
                ),
            }
        }
        for id in snapshot.user {
            if self.values.contains_key(&id) {
                self.user_fields.insert(id);
            }
        }
    }

    /// Reset every field to its definition default. For a Reference
    /// container, a selected standard's overrides take precedence over the
    /// definition defaults for non-computed fields.
    pub fn set_defaults(&mut self, standard: Option<&ReferenceStandard>) {
        self.values.clear();
        self.user_fields.clear();
        let scenario = self.scenario;
        let defaults: Vec<(String, FieldValue)> = self
            .defs
            .iter()
            .map(|def| (def.id.clone(), default_for(scenario, def, standard)))
            .collect();
        self.values.extend(defaults);
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id)
    }

    /// Local write. User-originated writes persist a snapshot to the
    /// durable cache; recomputation writes do not, to avoid cache thrash.
    pub fn set(
        &mut self,
        id: &str,
        value: FieldValue,
        provenance: Provenance,
        cache: Option<&StateCache>,
    ) {
        if !self.owns(id) {
            warn!(
                section = self.section_id.as_str(),
                field = id,
                "ignoring write for field this section does not own"
            );
            return;
        }
        self.values.insert(id.to_string(), value);
        if provenance == Provenance::UserModified {
            self.user_fields.insert(id.to_string());
            self.persist(cache);
        }
    }

    /// One-shot pull of every owned field from the store under this
    /// container's scenario key. Used after bulk import.
    pub fn sync_from_store(&mut self, store: &ValueStore) {
        for def in self.defs.iter() {
            let key = self.scenario.key(&def.id);
            if let Some(record) = store.get_record(&key) {
                self.values.insert(def.id.clone(), record.value);
                if record.provenance == Provenance::UserModified {
                    self.user_fields.insert(def.id.clone());
                }
            }
        }
    }

    /// Persist the current snapshot; cache failures are logged, never fatal.
    pub fn persist(&self, cache: Option<&StateCache>) {
        let Some(cache) = cache else { return };
        if let Err(err) = cache.save(&self.section_id, self.scenario, &self.snapshot()) {
            warn!(
                section = self.section_id.as_str(),
                scenario = self.scenario.label(),
                %err,
                "failed to persist state snapshot"
            );
        }
    }

    fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (id, value) in &self.values {
            snapshot.fields.insert(id.clone(), value.encode());
        }
        snapshot.user = self.user_fields.iter().cloned().collect();
        snapshot
    }

    /// Iterate `(id, value, provenance)` for mirroring into the store.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue, Provenance)> {
        self.values.iter().map(|(id, value)| {
            let provenance = if self.user_fields.contains(id) {
                Provenance::UserModified
            } else {
                Provenance::Default
            };
            (id.as_str(), value, provenance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enercode_store::FieldType;

    fn defs() -> Arc<Vec<FieldDef>> {
        Arc::new(vec![
            FieldDef::token("d_19", "Toronto"),
            FieldDef::number("f_85", 5.0),
            FieldDef::computed("i_85", FieldType::Number),
        ])
    }

    #[test]
    fn defaults_come_from_definitions() {
        let mut state = SectionState::new("test", Scenario::Target, defs());
        state.set_defaults(None);
        assert_eq!(state.get("d_19"), Some(&FieldValue::token("Toronto")));
        assert_eq!(state.get("f_85"), Some(&FieldValue::Number(5.0)));
        assert_eq!(state.get("i_85"), Some(&FieldValue::Unavailable));
    }

    #[test]
    fn standard_overrides_reference_inputs_only() {
        let mut standard = ReferenceStandard::new("TEST-2020");
        standard.set("f_85", FieldValue::Number(8.67));
        standard.set("i_85", FieldValue::Number(999.0)); // computed: ignored

        let mut reference = SectionState::new("test", Scenario::Reference, defs());
        reference.set_defaults(Some(&standard));
        assert_eq!(reference.get("f_85"), Some(&FieldValue::Number(8.67)));
        assert_eq!(reference.get("i_85"), Some(&FieldValue::Unavailable));

        // Target containers never see the standard.
        let mut target = SectionState::new("test", Scenario::Target, defs());
        target.set_defaults(Some(&standard));
        assert_eq!(target.get("f_85"), Some(&FieldValue::Number(5.0)));
    }

    #[test]
    fn writes_for_unowned_fields_are_ignored() {
        let mut state = SectionState::new("test", Scenario::Target, defs());
        state.set_defaults(None);
        state.set("d_999", FieldValue::Number(1.0), Provenance::UserModified, None);
        assert_eq!(state.get("d_999"), None);
    }

    #[test]
    fn initialize_overlays_cache_snapshot_on_defaults() {
        let dir = std::env::temp_dir()
            .join(format!("enercode-state-cache-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let cache = StateCache::new(dir.clone());

        let mut snapshot = Snapshot::default();
        snapshot.fields.insert("f_85".into(), "9.0".into());
        snapshot.user.push("f_85".into());
        snapshot.fields.insert("d_19".into(), "Calgary".into());
        snapshot.fields.insert("i_85".into(), "garbage".into()); // undecodable
        snapshot.fields.insert("zz_9".into(), "1.0".into()); // stale layout
        cache.save("test", Scenario::Target, &snapshot).unwrap();

        let mut state = SectionState::new("test", Scenario::Target, defs());
        state.initialize(Some(&cache), None);
        assert_eq!(state.get("f_85"), Some(&FieldValue::Number(9.0)));
        assert_eq!(state.get("d_19"), Some(&FieldValue::token("Calgary")));
        // Undecodable and unknown entries keep their defaults / are absent.
        assert_eq!(state.get("i_85"), Some(&FieldValue::Unavailable));
        assert_eq!(state.get("zz_9"), None);

        // The user-entered field comes back as user-entered.
        let user: Vec<String> = state
            .entries()
            .filter(|(_, _, p)| *p == Provenance::UserModified)
            .map(|(id, _, _)| id.to_string())
            .collect();
        assert_eq!(user, vec!["f_85"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sync_pulls_only_this_scenario_namespace() {
        let store = ValueStore::new();
        store.set_value("f_85", FieldValue::Number(3.0), Provenance::UserModified);
        store.set_value("ref_f_85", FieldValue::Number(8.0), Provenance::Imported);

        let mut reference = SectionState::new("test", Scenario::Reference, defs());
        reference.set_defaults(None);
        reference.sync_from_store(&store);
        assert_eq!(reference.get("f_85"), Some(&FieldValue::Number(8.0)));

        let mut target = SectionState::new("test", Scenario::Target, defs());
        target.set_defaults(None);
        target.sync_from_store(&store);
        assert_eq!(target.get("f_85"), Some(&FieldValue::Number(3.0)));
    }
}
