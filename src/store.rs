//! # Store Module
//!
//! Process-wide in-memory state shared by every request.
//!
//! The whole state lives in one [`ArcSwap`] cell holding an immutable JSON
//! tree. Readers load a snapshot without blocking. Writers run an optimistic
//! read-modify-write: the update function is applied to the current snapshot
//! and the result is installed with a compare-and-swap; if another writer won
//! the race the function is re-invoked against the newer snapshot.
//!
//! The tree has two partitions, `pets` (keyed by the decimal pet id) and
//! `users` (keyed by username). An update only rewrites its own sub-path, so
//! concurrent updates to different keys never lose each other's effect, and
//! concurrent updates to the same key serialize without torn writes.

use arc_swap::{ArcSwap, Guard};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const PETS: &str = "pets";
pub const USERS: &str = "users";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store path '{path}' descends through a non-object value")]
    NotAnObject { path: String },
}

pub struct Store {
    state: ArcSwap<Value>,
    conflicts: AtomicU64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Empty store with both partitions present.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(json!({ "pets": {}, "users": {} })),
            conflicts: AtomicU64::new(0),
        }
    }

    /// Current snapshot of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Value> {
        self.state.load_full()
    }

    /// Value at `path`, if present.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<Value> {
        let snapshot = self.state.load();
        lookup(&snapshot, path).cloned()
    }

    /// Number of compare-and-swap retries so far.
    #[must_use]
    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Atomically replace the value at `path` with `f(current)`.
    ///
    /// `f` receives the current value (or `None`) and returns the replacement;
    /// returning `None` removes the key. Missing intermediate objects are
    /// created. `f` may run more than once under contention and must be pure.
    /// Returns the snapshot that was installed.
    pub fn atomic_update<F>(&self, path: &[&str], f: F) -> Result<Arc<Value>, StoreError>
    where
        F: Fn(Option<&Value>) -> Option<Value>,
    {
        let mut current = self.state.load_full();
        loop {
            let mut next = Value::clone(&current);
            set_in(&mut next, path, &f)?;
            let next = Arc::new(next);

            let previous = self.state.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&previous, &current) {
                return Ok(next);
            }
            let retries = self.conflicts.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(path = %path.join("/"), retries, "store update conflict, retrying");
            current = Guard::into_inner(previous);
        }
    }

    /// Set `path` to `value`, replacing whatever was there.
    pub fn insert(&self, path: &[&str], value: Value) -> Result<Arc<Value>, StoreError> {
        self.atomic_update(path, |_| Some(value.clone()))
    }

    /// Shallow-merge the fields of `partial` over the value at `path`.
    pub fn merge(&self, path: &[&str], partial: &Map<String, Value>) -> Result<Arc<Value>, StoreError> {
        self.atomic_update(path, |current| {
            let mut merged = current
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            for (k, v) in partial {
                merged.insert(k.clone(), v.clone());
            }
            Some(Value::Object(merged))
        })
    }

    /// All values directly under `path`, in key order.
    #[must_use]
    pub fn values(&self, path: &[&str]) -> Vec<Value> {
        let snapshot = self.state.load();
        lookup(&snapshot, path)
            .and_then(Value::as_object)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }
}

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

fn set_in<F>(root: &mut Value, path: &[&str], f: &F) -> Result<(), StoreError>
where
    F: Fn(Option<&Value>) -> Option<Value>,
{
    let Some((last, parents)) = path.split_last() else {
        if let Some(v) = f(Some(&*root)) {
            *root = v;
        }
        return Ok(());
    };

    let mut node = root;
    for (depth, key) in parents.iter().enumerate() {
        let obj = node.as_object_mut().ok_or_else(|| StoreError::NotAnObject {
            path: path[..depth].join("/"),
        })?;
        node = obj
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let obj = node.as_object_mut().ok_or_else(|| StoreError::NotAnObject {
        path: parents.join("/"),
    })?;
    match f(obj.get(*last)) {
        Some(v) => {
            obj.insert(last.to_string(), v);
        }
        None => {
            obj.remove(*last);
        }
    }
    Ok(())
}
