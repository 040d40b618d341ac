//! The reactive value store.
//!
//! A process-wide map from field key to value-with-provenance, with per-key
//! change listeners and an introspection-only dependency registry. All
//! cross-section communication goes through here: sections never call each
//! other, they publish under their own keys and subscribe to upstream keys.
//!
//! Writes that do not materially change the stored value are no-ops and do
//! not notify. Multi-field user actions wrap their writes in a batch
//! ([`ValueStore::batch`]); listener notification is then deferred and
//! coalesced to one event per changed key when the outermost batch closes.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::trace;

use crate::value::FieldValue;

/// Where a stored value came from. Used for conflict resolution: a
/// `Default` write never overwrites a `UserModified` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Default,
    UserModified,
    Calculated,
    Imported,
}

/// One stored field: the atomic unit of the store.
#[derive(Debug, Clone)]
pub struct FieldRecord {
    pub value: FieldValue,
    pub provenance: Provenance,
}

/// Change notification passed to listeners.
#[derive(Debug)]
pub struct ChangeEvent<'a> {
    /// Full store key, including any scenario prefix.
    pub key: &'a str,
    pub new: &'a FieldValue,
    /// Value before the write (or before the batch's first write to this
    /// key). `None` when the key had never been set.
    pub old: Option<&'a FieldValue>,
    pub provenance: Provenance,
}

/// Listener callback. Invoked synchronously, in registration order.
pub type Listener = Arc<dyn Fn(&ChangeEvent<'_>) + Send + Sync>;

#[derive(Default)]
struct BatchState {
    depth: usize,
    /// Changed keys in first-write order.
    order: Vec<String>,
    /// Pre-batch value per changed key.
    old: HashMap<String, Option<FieldValue>>,
    /// Last provenance written per key within the batch.
    provenance: HashMap<String, Provenance>,
}

/// The reactive key/value store.
///
/// Holds no domain knowledge of what a field means; values are opaque
/// [`FieldValue`]s and keys are opaque strings (scenario prefixing is the
/// caller's concern, see [`crate::Scenario`]).
#[derive(Default)]
pub struct ValueStore {
    records: DashMap<String, FieldRecord>,
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    /// producer -> consumers, introspection only.
    dependents: DashMap<String, BTreeSet<String>>,
    /// consumer -> producers, introspection only.
    dependencies: DashMap<String, BTreeSet<String>>,
    batch: Mutex<BatchState>,
}

impl ValueStore {
    pub fn new() -> ValueStore {
        ValueStore::default()
    }

    /// Last written value for a key, or `None` if never set.
    ///
    /// An unknown key is not an error: callers treat `None` as "not yet
    /// available" and apply their own documented fallback policy.
    pub fn get_value(&self, key: &str) -> Option<FieldValue> {
        self.records.get(key).map(|r| r.value.clone())
    }

    /// Full record (value + provenance) for a key.
    pub fn get_record(&self, key: &str) -> Option<FieldRecord> {
        self.records.get(key).map(|r| r.clone())
    }

    /// Store a value, notifying listeners on material change.
    ///
    /// Returns `false` without notifying when the write is a no-op: the
    /// stored value is materially unchanged, or a `Default`-provenance
    /// write would overwrite a `UserModified` record.
    pub fn set_value(&self, key: &str, value: FieldValue, provenance: Provenance) -> bool {
        self.write(key, value, provenance, false)
    }

    /// Store a value bypassing the `UserModified` conflict rule.
    ///
    /// Only for explicit user reset, where returning to defaults is the
    /// whole point. Notification semantics are identical to `set_value`.
    pub fn overwrite_value(&self, key: &str, value: FieldValue, provenance: Provenance) -> bool {
        self.write(key, value, provenance, true)
    }

    fn write(&self, key: &str, value: FieldValue, provenance: Provenance, force: bool) -> bool {
        let old = match self.records.get(key) {
            Some(existing) => {
                if !force
                    && provenance == Provenance::Default
                    && existing.provenance == Provenance::UserModified
                {
                    trace!(key, "default write skipped: user-modified value present");
                    return false;
                }
                if existing.value.materially_equal(&value) {
                    trace!(key, "write skipped: value unchanged");
                    return false;
                }
                Some(existing.value.clone())
            }
            None => None,
        };

        self.records.insert(
            key.to_string(),
            FieldRecord {
                value: value.clone(),
                provenance,
            },
        );

        {
            let mut batch = self.batch.lock().expect("store batch lock poisoned");
            if batch.depth > 0 {
                if !batch.old.contains_key(key) {
                    batch.order.push(key.to_string());
                    batch.old.insert(key.to_string(), old);
                }
                batch.provenance.insert(key.to_string(), provenance);
                return true;
            }
        }

        self.notify(key, &value, old.as_ref(), provenance);
        true
    }

    /// Register a change listener for a key. Multiple listeners per key are
    /// allowed; all are invoked in registration order on every change.
    pub fn add_listener(&self, key: &str, listener: Listener) {
        self.listeners
            .lock()
            .expect("store listener lock poisoned")
            .entry(key.to_string())
            .or_default()
            .push(listener);
    }

    fn notify(&self, key: &str, new: &FieldValue, old: Option<&FieldValue>, provenance: Provenance) {
        // Snapshot outside the lock so a listener may register further
        // listeners or write back into the store.
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.lock().expect("store listener lock poisoned");
            match listeners.get(key) {
                Some(list) => list.clone(),
                None => return,
            }
        };
        let event = ChangeEvent {
            key,
            new,
            old,
            provenance,
        };
        for listener in snapshot {
            listener(&event);
        }
    }

    /// Open a write batch. Notifications are deferred until the returned
    /// guard (and any nested guards) drop, then fire once per changed key
    /// in first-write order with the pre-batch old value.
    pub fn batch(&self) -> BatchGuard<'_> {
        self.batch.lock().expect("store batch lock poisoned").depth += 1;
        BatchGuard { store: self }
    }

    fn close_batch(&self) {
        let pending = {
            let mut batch = self.batch.lock().expect("store batch lock poisoned");
            batch.depth -= 1;
            if batch.depth > 0 {
                return;
            }
            std::mem::take(&mut *batch)
        };

        for key in pending.order {
            let Some(record) = self.get_record(&key) else {
                continue;
            };
            let old = pending.old.get(&key).cloned().flatten();
            // A value changed and changed back within the batch nets out
            // to no change; skip it.
            if let Some(ref o) = old {
                if o.materially_equal(&record.value) {
                    continue;
                }
            }
            let provenance = pending
                .provenance
                .get(&key)
                .copied()
                .unwrap_or(record.provenance);
            self.notify(&key, &record.value, old.as_ref(), provenance);
        }
    }

    /// Record a `producer -> consumer` dependency edge.
    ///
    /// Introspection/debugging only: correctness is guaranteed by the
    /// listener cascade, never by this registry.
    pub fn register_dependency(&self, producer: &str, consumer: &str) {
        self.dependents
            .entry(producer.to_string())
            .or_default()
            .insert(consumer.to_string());
        self.dependencies
            .entry(consumer.to_string())
            .or_default()
            .insert(producer.to_string());
    }

    /// Registered consumers of a key, sorted.
    pub fn dependents_of(&self, key: &str) -> Vec<String> {
        self.dependents
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Registered producers a key reads, sorted.
    pub fn dependencies_of(&self, key: &str) -> Vec<String> {
        self.dependencies
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every record, both namespaces, sorted by key. The export layer reads
    /// this directly so both scenarios are captured verbatim.
    pub fn export_records(&self) -> Vec<(String, FieldRecord)> {
        let mut out: Vec<(String, FieldRecord)> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// RAII handle for an open batch; closing the outermost batch flushes the
/// coalesced notifications.
pub struct BatchGuard<'a> {
    store: &'a ValueStore,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.store.close_batch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_listener(count: Arc<AtomicUsize>) -> Listener {
        Arc::new(move |_event| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn unchanged_write_does_not_notify() {
        let store = ValueStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        store.add_listener("d_20", counter_listener(count.clone()));

        assert!(store.set_value("d_20", FieldValue::Number(3520.0), Provenance::Calculated));
        assert!(!store.set_value("d_20", FieldValue::Number(3520.0), Provenance::Calculated));
        // Within floating tolerance is also a no-op.
        assert!(!store.set_value(
            "d_20",
            FieldValue::Number(3520.0 + 1e-12),
            Provenance::Calculated
        ));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let store = ValueStore::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = log.clone();
            store.add_listener(
                "d_19",
                Arc::new(move |_| log.lock().unwrap().push(tag)),
            );
        }
        store.set_value("d_19", FieldValue::token("Toronto"), Provenance::UserModified);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn default_write_never_clobbers_user_value() {
        let store = ValueStore::new();
        store.set_value("d_63", FieldValue::Number(4.0), Provenance::UserModified);
        assert!(!store.set_value("d_63", FieldValue::Number(2.0), Provenance::Default));
        assert_eq!(store.get_value("d_63"), Some(FieldValue::Number(4.0)));

        // Explicit reset bypasses the rule.
        assert!(store.overwrite_value("d_63", FieldValue::Number(2.0), Provenance::Default));
        assert_eq!(store.get_value("d_63"), Some(FieldValue::Number(2.0)));
    }

    #[test]
    fn batch_coalesces_to_one_event_per_key() {
        let store = ValueStore::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        for key in ["d_85", "d_86"] {
            let events = events.clone();
            store.add_listener(
                key,
                Arc::new(move |e: &ChangeEvent<'_>| {
                    events
                        .lock()
                        .unwrap()
                        .push((e.key.to_string(), e.new.clone(), e.old.cloned()));
                }),
            );
        }

        store.set_value("d_85", FieldValue::Number(1.0), Provenance::Default);
        {
            let _guard = store.batch();
            store.set_value("d_85", FieldValue::Number(2.0), Provenance::UserModified);
            store.set_value("d_86", FieldValue::Number(5.0), Provenance::UserModified);
            store.set_value("d_85", FieldValue::Number(3.0), Provenance::UserModified);
            assert!(events.lock().unwrap().len() == 1); // only the pre-batch write
        }

        let events = events.lock().unwrap();
        // One event per key, first-write order, old value is pre-batch.
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].0, "d_85");
        assert_eq!(events[1].1, FieldValue::Number(3.0));
        assert_eq!(events[1].2, Some(FieldValue::Number(1.0)));
        assert_eq!(events[2].0, "d_86");
    }

    #[test]
    fn batch_write_and_revert_nets_to_no_event() {
        let store = ValueStore::new();
        store.set_value("f_85", FieldValue::Number(5.0), Provenance::Default);
        let count = Arc::new(AtomicUsize::new(0));
        store.add_listener("f_85", counter_listener(count.clone()));
        {
            let _guard = store.batch();
            store.set_value("f_85", FieldValue::Number(9.0), Provenance::UserModified);
            store.set_value("f_85", FieldValue::Number(5.0), Provenance::UserModified);
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nested_batches_flush_at_outermost_close() {
        let store = ValueStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        store.add_listener("d_119", counter_listener(count.clone()));
        {
            let _outer = store.batch();
            {
                let _inner = store.batch();
                store.set_value("d_119", FieldValue::Number(1.5), Provenance::UserModified);
            }
            assert_eq!(count.load(Ordering::SeqCst), 0);
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dependency_registry_is_introspection_only() {
        let store = ValueStore::new();
        store.register_dependency("d_20", "i_85");
        store.register_dependency("d_20", "i_86");
        assert_eq!(store.dependents_of("d_20"), vec!["i_85", "i_86"]);
        assert_eq!(store.dependencies_of("i_85"), vec!["d_20"]);
        assert_eq!(store.dependents_of("unknown"), Vec::<String>::new());
    }

    #[test]
    fn unknown_key_reads_as_none() {
        let store = ValueStore::new();
        assert_eq!(store.get_value("nope"), None);
    }
}
