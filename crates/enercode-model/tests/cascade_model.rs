//! Integration tests for the dual-engine cascade, using small synthetic
//! sections so the properties under test are not obscured by domain math.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use enercode_model::{
    DisplayDriver, Model, ModelBuilder, Result, ScenarioScope, Section,
};
use enercode_store::{FieldDef, FieldType, FieldValue, Provenance, Scenario};

/// Owns input `a_1`, computes `a_2 = a_1 * 10`.
struct Source;

impl Section for Source {
    fn id(&self) -> &'static str {
        "source"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![
            FieldDef::number("a_1", 2.0),
            FieldDef::computed("a_2", FieldType::Number).with_deps(&["a_1"]),
        ]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let out = match scope.number("a_1") {
            Some(n) => FieldValue::Number(n * 10.0),
            None => FieldValue::Unavailable,
        };
        Ok(vec![("a_2".into(), out)])
    }
}

/// Downstream of `source`: computes `b_1 = a_2 + 1`.
struct Sink;

impl Section for Sink {
    fn id(&self) -> &'static str {
        "sink"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![FieldDef::computed("b_1", FieldType::Number).with_deps(&["a_2"])]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let out = match scope.number("a_2") {
            Some(n) => FieldValue::Number(n + 1.0),
            None => FieldValue::Unavailable,
        };
        Ok(vec![("b_1".into(), out)])
    }
}

/// Reads `x_1`, a field no section owns - it only exists if something
/// outside the model published it.
struct External;

impl Section for External {
    fn id(&self) -> &'static str {
        "external"
    }

    fn field_defs(&self) -> Vec<FieldDef> {
        vec![FieldDef::computed("e_1", FieldType::Number).with_deps(&["x_1"])]
    }

    fn compute(&self, scope: &ScenarioScope<'_>) -> Result<Vec<(String, FieldValue)>> {
        let out = match scope.number("x_1") {
            Some(n) => FieldValue::Number(n * 2.0),
            None => FieldValue::Unavailable,
        };
        Ok(vec![("e_1".into(), out)])
    }
}

#[derive(Default)]
struct RefreshCounter {
    refreshes: Mutex<Vec<String>>,
}

impl DisplayDriver for RefreshCounter {
    fn refresh(&self, section: &str, _mode: Scenario) {
        self.refreshes.lock().unwrap().push(section.to_string());
    }
}

impl RefreshCounter {
    fn count(&self, section: &str) -> usize {
        self.refreshes
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.as_str() == section)
            .count()
    }

    fn clear(&self) {
        self.refreshes.lock().unwrap().clear();
    }
}

fn toy_model() -> Model {
    let mut model = ModelBuilder::new()
        .section(Box::new(Source))
        .section(Box::new(Sink))
        .build()
        .unwrap();
    model.initialize();
    model
}

#[test]
fn initial_cascade_populates_both_namespaces() {
    let model = toy_model();
    assert_eq!(
        model.get(Scenario::Target, "a_2"),
        Some(FieldValue::Number(20.0))
    );
    assert_eq!(
        model.get(Scenario::Reference, "a_2"),
        Some(FieldValue::Number(20.0))
    );
    assert_eq!(
        model.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(21.0))
    );
    assert_eq!(
        model.get(Scenario::Reference, "b_1"),
        Some(FieldValue::Number(21.0))
    );
}

#[test]
fn recalculation_with_unchanged_inputs_is_silent() {
    let mut model = toy_model();

    let notifications = Arc::new(AtomicUsize::new(0));
    for key in ["a_1", "a_2", "b_1", "ref_a_1", "ref_a_2", "ref_b_1"] {
        let notifications = notifications.clone();
        model.store().add_listener(
            key,
            Arc::new(move |_| {
                notifications.fetch_add(1, Ordering::SeqCst);
            }),
        );
    }

    model.recalculate_all();
    assert_eq!(notifications.load(Ordering::SeqCst), 0);

    // Stored values are bit-identical after the second sweep.
    let before = model.export_toml().unwrap();
    model.recalculate_all();
    assert_eq!(before, model.export_toml().unwrap());
}

#[test]
fn namespaces_recompute_independently() {
    let mut model = toy_model();

    model.set_field("a_1", "5").unwrap();
    assert_eq!(
        model.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(51.0))
    );
    assert_eq!(
        model.get(Scenario::Reference, "b_1"),
        Some(FieldValue::Number(21.0))
    );

    model.switch_mode(Scenario::Reference);
    model.set_field("a_1", "7").unwrap();
    assert_eq!(
        model.get(Scenario::Reference, "b_1"),
        Some(FieldValue::Number(71.0))
    );
    // The Target result is untouched by the Reference edit.
    assert_eq!(
        model.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(51.0))
    );
}

#[test]
fn absent_reference_upstream_yields_sentinel_not_target_value() {
    let mut model = ModelBuilder::new()
        .section(Box::new(External))
        .build()
        .unwrap();
    model.initialize();

    // Publish the upstream field in the Target namespace only.
    model
        .store()
        .set_value("x_1", FieldValue::Number(3.0), Provenance::Imported);
    model.recalculate_all();

    assert_eq!(
        model.get(Scenario::Target, "e_1"),
        Some(FieldValue::Number(6.0))
    );
    // ref_x_1 is absent: the Reference result is the sentinel, never 6.0.
    assert_eq!(
        model.get(Scenario::Reference, "e_1"),
        Some(FieldValue::Unavailable)
    );
}

#[test]
fn mode_switch_changes_no_stored_values() {
    let mut model = toy_model();
    model.set_field("a_1", "9").unwrap();

    let before = model.export_toml().unwrap();
    model.switch_mode(Scenario::Reference);
    model.switch_mode(Scenario::Target);
    assert_eq!(before, model.export_toml().unwrap());
}

#[test]
fn batched_edits_recalculate_each_section_once() {
    let counter = Arc::new(RefreshCounter::default());
    let mut model = ModelBuilder::new()
        .section(Box::new(Source))
        .section(Box::new(Sink))
        .display(counter.clone())
        .build()
        .unwrap();
    model.initialize();
    counter.clear();

    // One logical action writing the input twice over: still one
    // recalculation per affected section.
    model.set_fields(&[("a_1", "4"), ("a_1", "6")]).unwrap();
    assert_eq!(counter.count("source"), 1);
    assert_eq!(counter.count("sink"), 1);
    assert_eq!(
        model.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(61.0))
    );
}

#[test]
fn invalid_batch_edit_discards_the_whole_action() {
    let mut model = toy_model();
    model.set_field("a_1", "5").unwrap();

    assert!(model.set_fields(&[("a_1", "8"), ("a_1", "oops")]).is_err());
    // Nothing was applied.
    assert_eq!(
        model.get(Scenario::Target, "a_1"),
        Some(FieldValue::Number(5.0))
    );
    assert_eq!(
        model.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(51.0))
    );
}

#[test]
fn import_restores_both_namespaces_and_recomputes() {
    let mut model = toy_model();
    model.set_field("a_1", "5").unwrap();
    model.switch_mode(Scenario::Reference);
    model.set_field("a_1", "8").unwrap();
    let doc = model.export_toml().unwrap();

    let mut restored = toy_model();
    restored.import_toml(&doc).unwrap();
    assert_eq!(
        restored.get(Scenario::Target, "b_1"),
        Some(FieldValue::Number(51.0))
    );
    assert_eq!(
        restored.get(Scenario::Reference, "b_1"),
        Some(FieldValue::Number(81.0))
    );
}
