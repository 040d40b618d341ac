//! Model assembly: sections, store, scheduler, and the public surface the
//! rendering and import/export layers drive.
//!
//! Sections are registered in dependency order (upstream first). All
//! cross-section data flow goes through the store; the model's job is the
//! plumbing around it: wiring cascade listeners, draining the scheduler
//! after each user action, and keeping the Reference defaults in step with
//! the selected code standard.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use enercode_store::{
    FieldDef, FieldValue, Provenance, Scenario, ValueStore, format_value,
};

use crate::cache::StateCache;
use crate::cascade::Scheduler;
use crate::error::{ModelError, Result};
use crate::runtime::{DisplayDriver, NullDisplay, SectionRuntime};
use crate::section::Section;
use crate::standards::{ReferenceStandard, StandardsCatalog};

/// Well-known store key holding the selected reference-standard token.
/// Writing it re-seeds every section's Reference defaults.
pub const REFERENCE_STANDARD_KEY: &str = "d_13";

/// Builder for [`Model`]. Register sections upstream-first.
pub struct ModelBuilder {
    sections: Vec<Box<dyn Section>>,
    cache_dir: Option<PathBuf>,
    standards: StandardsCatalog,
    display: Arc<dyn DisplayDriver>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        ModelBuilder {
            sections: Vec::new(),
            cache_dir: None,
            standards: StandardsCatalog::new(),
            display: Arc::new(NullDisplay),
        }
    }
}

impl ModelBuilder {
    pub fn new() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn section(mut self, section: Box<dyn Section>) -> ModelBuilder {
        self.sections.push(section);
        self
    }

    /// Enable the durable state cache under `dir`.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> ModelBuilder {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn standards(mut self, standards: StandardsCatalog) -> ModelBuilder {
        self.standards = standards;
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplayDriver>) -> ModelBuilder {
        self.display = display;
        self
    }

    /// Validate section/field ownership and assemble the model. The model
    /// is inert until [`Model::initialize`] (or per-section
    /// [`Model::on_section_rendered`]) runs.
    pub fn build(self) -> Result<Model> {
        let mut runtimes: Vec<SectionRuntime> = Vec::with_capacity(self.sections.len());
        let mut section_index = HashMap::new();
        let mut field_owner: HashMap<String, usize> = HashMap::new();

        for (idx, section) in self.sections.into_iter().enumerate() {
            let runtime = SectionRuntime::new(section);
            if section_index.insert(runtime.id().to_string(), idx).is_some() {
                return Err(ModelError::DuplicateSection(runtime.id().to_string()));
            }
            for def in runtime.defs() {
                if let Some(&first) = field_owner.get(&def.id) {
                    return Err(ModelError::DuplicateField {
                        field: def.id.clone(),
                        first: runtimes[first].id().to_string(),
                        second: runtime.id().to_string(),
                    });
                }
                field_owner.insert(def.id.clone(), idx);
            }
            runtimes.push(runtime);
        }

        let wired = vec![false; runtimes.len()];
        Ok(Model {
            store: Arc::new(ValueStore::new()),
            scheduler: Arc::new(Scheduler::new()),
            runtimes,
            section_index,
            field_owner,
            cache: self.cache_dir.map(StateCache::new),
            standards: self.standards,
            display: self.display,
            wired,
            mode: Scenario::Target,
        })
    }
}

/// Target/Reference comparison of one derived quantity.
///
/// This is the single deliberate cross-namespace read in the system: it
/// lives at the model boundary and reads both namespaces verbatim from the
/// store - never from inside a compute pass.
#[derive(Debug, Clone, Copy)]
pub struct Compliance {
    pub target: f64,
    pub reference: f64,
    /// `target / reference`; `None` when the baseline is zero.
    pub ratio: Option<f64>,
    /// Whether the design meets or beats the baseline.
    pub passes: bool,
}

/// Serialized portable document: store key -> encoded value.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    fields: BTreeMap<String, String>,
}

pub struct Model {
    store: Arc<ValueStore>,
    scheduler: Arc<Scheduler>,
    runtimes: Vec<SectionRuntime>,
    section_index: HashMap<String, usize>,
    field_owner: HashMap<String, usize>,
    cache: Option<StateCache>,
    standards: StandardsCatalog,
    display: Arc<dyn DisplayDriver>,
    wired: Vec<bool>,
    mode: Scenario,
}

impl Model {
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn mode(&self) -> Scenario {
        self.mode
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.runtimes.iter().map(|r| r.id())
    }

    /// Definition of a field, wherever it is owned.
    pub fn field_def(&self, id: &str) -> Option<&FieldDef> {
        let idx = *self.field_owner.get(id)?;
        self.runtimes[idx].defs().iter().find(|d| d.id == id)
    }

    fn current_standard(&self) -> Option<ReferenceStandard> {
        let token = self.store.get_value(REFERENCE_STANDARD_KEY)?;
        let token = token.as_token()?;
        let standard = self.standards.lookup(token);
        if standard.is_none() {
            warn!(token, "unknown reference standard selected");
        }
        standard.cloned()
    }

    /// Bring every section up: containers, dependency edges, cascade
    /// wiring, and one initial full calculation sweep.
    pub fn initialize(&mut self) {
        for idx in 0..self.runtimes.len() {
            self.render_section(idx);
        }
        self.drain();
    }

    /// Rendering-layer entry point: a single section's DOM is ready.
    pub fn on_section_rendered(&mut self, section_id: &str) -> Result<()> {
        let idx = *self
            .section_index
            .get(section_id)
            .ok_or_else(|| ModelError::UnknownSection(section_id.to_string()))?;
        self.render_section(idx);
        self.drain();
        Ok(())
    }

    fn render_section(&mut self, idx: usize) {
        let standard = self.current_standard();
        let runtime = &mut self.runtimes[idx];
        runtime.initialize(&self.store, self.cache.as_ref(), standard.as_ref());
        runtime.register_dependencies(&self.store);

        if !self.wired[idx] {
            for key in runtime.upstream_keys() {
                let scheduler = self.scheduler.clone();
                self.store.add_listener(
                    &key,
                    Arc::new(move |_event| {
                        scheduler.enqueue(idx);
                    }),
                );
            }
            self.wired[idx] = true;
        }

        debug!(section = self.runtimes[idx].id(), "section rendered");
        self.scheduler.enqueue(idx);
    }

    /// Run the cascade to exhaustion.
    fn drain(&mut self) {
        let scheduler = self.scheduler.clone();
        let store = self.store.clone();
        let display = self.display.clone();
        scheduler.drain(|idx| {
            if let Some(runtime) = self.runtimes.get_mut(idx) {
                runtime.calculate_all(&store, display.as_ref());
            }
        });
    }

    /// Commit one user edit.
    ///
    /// Input that does not parse for the field's type is rejected whole:
    /// the stored value is untouched and the caller redisplays it. Valid
    /// input routes through the owning section's facade (current display
    /// mode decides the namespace), then the cascade runs. The standard
    /// selector is the exception: it configures the whole model, so it is
    /// written scenario-independently under the plain key regardless of
    /// the display mode.
    pub fn set_field(&mut self, id: &str, raw: &str) -> Result<()> {
        let (idx, value) = self.parse_edit(id, raw)?;
        self.apply_edit(idx, id, value);
        if id == REFERENCE_STANDARD_KEY {
            self.reseed_reference_defaults();
        }
        self.drain();
        Ok(())
    }

    /// Commit several edits as one logical user action: one store batch,
    /// one coalesced cascade. All inputs are validated before any write, so
    /// a bad edit discards the whole action rather than applying part of it.
    pub fn set_fields(&mut self, edits: &[(&str, &str)]) -> Result<()> {
        let mut parsed = Vec::with_capacity(edits.len());
        for (id, raw) in edits {
            let (idx, value) = self.parse_edit(id, raw)?;
            parsed.push((idx, *id, value));
        }

        {
            let store = self.store.clone();
            let _batch = store.batch();
            for (idx, id, value) in parsed {
                self.apply_edit(idx, id, value);
            }
        }

        if edits.iter().any(|(id, _)| *id == REFERENCE_STANDARD_KEY) {
            self.reseed_reference_defaults();
        }
        self.drain();
        Ok(())
    }

    fn apply_edit(&mut self, idx: usize, id: &str, value: FieldValue) {
        let facade = self.runtimes[idx].facade_mut();
        if id == REFERENCE_STANDARD_KEY {
            facade.set_shared(
                id,
                value,
                Provenance::UserModified,
                &self.store,
                self.cache.as_ref(),
            );
        } else {
            facade.set(
                id,
                value,
                Provenance::UserModified,
                &self.store,
                self.cache.as_ref(),
            );
        }
    }

    fn parse_edit(&self, id: &str, raw: &str) -> Result<(usize, FieldValue)> {
        let idx = *self
            .field_owner
            .get(id)
            .ok_or_else(|| ModelError::UnknownField(id.to_string()))?;
        let def = self.runtimes[idx]
            .defs()
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ModelError::UnknownField(id.to_string()))?;
        match FieldValue::parse_input(def.field_type, raw) {
            Some(value) => Ok((idx, value)),
            None => {
                warn!(field = id, raw, "rejecting unparseable input, edit discarded");
                Err(ModelError::InvalidInput {
                    field: id.to_string(),
                    input: raw.to_string(),
                })
            }
        }
    }

    fn reseed_reference_defaults(&mut self) {
        let standard = self.current_standard();
        for runtime in &mut self.runtimes {
            runtime.reseed_reference(standard.as_ref(), &self.store);
        }
    }

    /// Switch the displayed scenario. Routing only: no stored value in
    /// either namespace changes, no recomputation runs.
    pub fn switch_mode(&mut self, mode: Scenario) {
        self.mode = mode;
        for runtime in &mut self.runtimes {
            if runtime.facade_mut().switch_mode(mode) {
                self.display.refresh(runtime.id(), mode);
            }
        }
    }

    /// Reset every section to defaults and recompute everything.
    pub fn reset(&mut self) {
        for runtime in &mut self.runtimes {
            runtime
                .facade_mut()
                .reset(None, &self.store, self.cache.as_ref());
        }
        // Containers are back on definition defaults, including the
        // standard selector; now overlay the (default) standard and sweep.
        self.reseed_reference_defaults();
        self.recalculate_all();
    }

    /// Enqueue every section and drain: the full recalculation sweep.
    pub fn recalculate_all(&mut self) {
        for idx in 0..self.runtimes.len() {
            self.scheduler.enqueue(idx);
        }
        self.drain();
    }

    /// Value under the given scenario's namespace, straight from the store.
    pub fn get(&self, scenario: Scenario, id: &str) -> Option<FieldValue> {
        self.store.get_value(&scenario.key(id))
    }

    /// Formatted display text for a field in the owning section's active
    /// mode.
    pub fn display_value(&self, id: &str) -> Result<String> {
        let idx = *self
            .field_owner
            .get(id)
            .ok_or_else(|| ModelError::UnknownField(id.to_string()))?;
        let runtime = &self.runtimes[idx];
        let def = runtime
            .defs()
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ModelError::UnknownField(id.to_string()))?;
        let value = runtime
            .facade()
            .get(id)
            .cloned()
            .unwrap_or(FieldValue::Unavailable);
        Ok(format_value(&value, def.field_type))
    }

    /// Export every store record verbatim - both namespaces - as a TOML
    /// document. Containers are deliberately not consulted.
    pub fn export_toml(&self) -> Result<String> {
        let mut doc = Document::default();
        for (key, record) in self.store.export_records() {
            doc.fields.insert(key, record.value.encode());
        }
        Ok(toml::to_string(&doc)?)
    }

    /// Bulk import: write every document record into the store under
    /// `Imported` provenance in one batch, re-sync both containers of every
    /// section in registration order, then run a full calculation sweep.
    pub fn import_toml(&mut self, text: &str) -> Result<()> {
        let doc: Document =
            toml::from_str(text).map_err(|e| ModelError::Document(e.to_string()))?;

        {
            let _batch = self.store.batch();
            for (key, raw) in &doc.fields {
                let (_, base) = Scenario::split_key(key);
                let Some(def) = self.field_def(base) else {
                    warn!(key = key.as_str(), "import skipping unknown field");
                    continue;
                };
                match FieldValue::decode(def.field_type, raw) {
                    Some(value) => {
                        self.store.set_value(key, value, Provenance::Imported);
                    }
                    None => warn!(
                        key = key.as_str(),
                        raw = raw.as_str(),
                        "import skipping undecodable value"
                    ),
                }
            }
        }

        for runtime in &mut self.runtimes {
            for scenario in Scenario::BOTH {
                runtime
                    .facade_mut()
                    .state_mut(scenario)
                    .sync_from_store(&self.store);
            }
        }
        self.recalculate_all();
        Ok(())
    }

    /// Compare one derived quantity across scenarios (e.g. energy-use
    /// intensity). `None` until both namespaces hold a number for it.
    pub fn compliance(&self, id: &str) -> Option<Compliance> {
        let target = self.get(Scenario::Target, id)?.as_number()?;
        let reference = self.get(Scenario::Reference, id)?.as_number()?;
        let ratio = (reference != 0.0).then(|| target / reference);
        Some(Compliance {
            target,
            reference,
            ratio,
            passes: target <= reference,
        })
    }
}
