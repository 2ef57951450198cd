//! 清单对象存储：按 id / 类型 / 应用建立索引
//!
//! Indexed in-memory collection of manifest objects of one kind.
//!
//! Objects are indexed by id (1:1), by type and by owning application (1:N, in
//! insertion order). Lookups intersect whichever indexes the filter selects and then
//! apply the qualifier criterion with the chosen [`MatchQualifier`]; the default is the
//! symmetric [`QualifierMatcher::Wildcard`].
//!
//! The store is owned by a single registry and mutated through `&mut self`.
//! Listeners registered through `&self` observe every mutation synchronously.

mod listeners;

pub use listeners::{ChangeListeners, ListenerId};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::manifest::{ManifestObject, ManifestObjectFilter};
use crate::qualifier::{MatchQualifier, QualifierMatcher};
use crate::{Error, Result};

/// Outcome of [`ManifestObjectStore::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome<T> {
    Inserted,
    /// An object with the same id was stored and has been replaced.
    Replaced(T),
}

impl<T> AddOutcome<T> {
    pub fn is_replaced(&self) -> bool {
        matches!(self, AddOutcome::Replaced(_))
    }
}

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    object: T,
}

#[derive(Debug)]
pub struct ManifestObjectStore<T> {
    objects: HashMap<String, Entry<T>>,
    by_type: HashMap<String, Vec<String>>,
    by_app: HashMap<String, Vec<String>>,
    next_seq: u64,
    listeners: ChangeListeners<T>,
}

impl<T> ManifestObjectStore<T>
where
    T: ManifestObject + Clone,
{
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            by_type: HashMap::new(),
            by_app: HashMap::new(),
            next_seq: 0,
            listeners: ChangeListeners::new(),
        }
    }

    /// Inserts `object`. An object already stored under the same id is unindexed
    /// first, so lookups by id, type and app all see only the new object.
    ///
    /// A replacement is one change: removed listeners see the previous object before
    /// added listeners see the new one, and change listeners fire once.
    pub fn add(&mut self, object: T) -> AddOutcome<T> {
        let id = object.id().to_string();
        let Some(previous) = self.delete(&id) else {
            self.insert(object);
            if let Some(entry) = self.objects.get(&id) {
                self.listeners.emit_added(&entry.object);
            }
            return AddOutcome::Inserted;
        };

        warn!(
            id = %id,
            object_type = previous.object_type(),
            "Replacing manifest object registered under the same id"
        );
        self.insert(object);
        if let Some(entry) = self.objects.get(&id) {
            self.listeners.emit_replaced(&previous, &entry.object);
        }
        AddOutcome::Replaced(previous)
    }

    /// Like [`add`](Self::add), but rejects an id that is already stored.
    pub fn try_add(&mut self, object: T) -> Result<()> {
        if self.objects.contains_key(object.id()) {
            return Err(Error::DuplicateId {
                id: object.id().to_string(),
            });
        }
        let id = object.id().to_string();
        self.insert(object);
        if let Some(entry) = self.objects.get(&id) {
            self.listeners.emit_added(&entry.object);
        }
        Ok(())
    }

    fn insert(&mut self, object: T) {
        let id = object.id().to_string();
        debug!(
            id = %id,
            object_type = object.object_type(),
            app = object.app_symbolic_name(),
            "Manifest object added"
        );
        self.by_type
            .entry(object.object_type().to_string())
            .or_default()
            .push(id.clone());
        self.by_app
            .entry(object.app_symbolic_name().to_string())
            .or_default()
            .push(id.clone());

        let seq = self.next_seq;
        self.next_seq += 1;
        self.objects.insert(id, Entry { seq, object });
    }

    /// Finds objects matching `filter`, comparing qualifiers with the symmetric
    /// wildcard matcher.
    pub fn find(&self, filter: &ManifestObjectFilter) -> Vec<T> {
        self.find_with(filter, &QualifierMatcher::Wildcard)
    }

    /// Finds objects matching `filter`, comparing qualifiers with `matcher`.
    ///
    /// The matcher receives the stored object's qualifier first and the filter's
    /// pattern second. Results are in insertion order.
    pub fn find_with<M>(&self, filter: &ManifestObjectFilter, matcher: &M) -> Vec<T>
    where
        M: MatchQualifier + ?Sized,
    {
        self.candidates(filter)
            .into_iter()
            .filter(|object| filter.matches_identity(*object))
            .filter(|object| filter.matches_qualifier(*object, matcher))
            .cloned()
            .collect()
    }

    /// Candidate set from the most selective index the filter names.
    fn candidates(&self, filter: &ManifestObjectFilter) -> Vec<&T> {
        if let Some(id) = filter.id.as_deref() {
            return self.objects.get(id).map(|e| &e.object).into_iter().collect();
        }

        let by_type = filter
            .object_type
            .as_deref()
            .map(|t| self.by_type.get(t).map(Vec::as_slice).unwrap_or_default());
        let by_app = filter
            .app_symbolic_name
            .as_deref()
            .map(|app| self.by_app.get(app).map(Vec::as_slice).unwrap_or_default());

        let bucket = match (by_type, by_app) {
            (Some(t), Some(a)) => Some(if t.len() <= a.len() { t } else { a }),
            (Some(t), None) => Some(t),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        };

        match bucket {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.objects.get(id).map(|e| &e.object))
                .collect(),
            None => {
                let mut entries: Vec<&Entry<T>> = self.objects.values().collect();
                entries.sort_by_key(|e| e.seq);
                entries.into_iter().map(|e| &e.object).collect()
            }
        }
    }

    /// Removes every object [`find`](Self::find) returns for `filter` and returns them.
    ///
    /// Listeners are notified once with the batch, and only if something was removed.
    pub fn remove(&mut self, filter: &ManifestObjectFilter) -> Vec<T> {
        let removed: Vec<T> = self
            .find(filter)
            .iter()
            .filter_map(|object| self.delete(object.id()))
            .collect();

        if !removed.is_empty() {
            debug!(count = removed.len(), "Manifest objects removed");
            self.listeners.emit_removed(&removed);
        }
        removed
    }

    fn delete(&mut self, id: &str) -> Option<T> {
        let entry = self.objects.remove(id)?;
        let object = entry.object;
        unindex(&mut self.by_type, object.object_type(), id);
        unindex(&mut self.by_app, object.app_symbolic_name(), id);
        Some(object)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.objects.get(id).map(|e| &e.object)
    }

    /// All objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut entries: Vec<&Entry<T>> = self.objects.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| &e.object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn listeners(&self) -> &ChangeListeners<T> {
        &self.listeners
    }

    pub fn on_added<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.on_added(f)
    }

    pub fn on_removed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.listeners.on_removed(f)
    }

    /// Signals any addition or removal, without payload.
    pub fn on_change<F>(&self, f: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.on_change(f)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl<T> Default for ManifestObjectStore<T>
where
    T: ManifestObject + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

fn unindex(index: &mut HashMap<String, Vec<String>>, key: &str, id: &str) {
    if let Some(ids) = index.get_mut(key) {
        ids.retain(|existing| existing != id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
