//! Per-template mutable value state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::internal::InternalValue;

/// Fixed values, constructed values and the generated-value markers of one
/// template instance.
///
/// A value id is in at most one of `fixed` and `constructed`. Ids listed in
/// `generated` were installed by tag evaluation and do not count as set by the
/// caller.
#[derive(Debug, Clone, Default)]
pub(crate) struct ValueStore {
    fixed: HashMap<String, Arc<str>>,
    constructed: HashMap<String, InternalValue>,
    generated: HashSet<String>,
}

impl ValueStore {
    pub(crate) fn set_fixed(&mut self, id: &str, value: Arc<str>) {
        self.generated.remove(id);
        self.constructed.remove(id);
        self.fixed.insert(id.to_string(), value);
    }

    pub(crate) fn set_constructed(&mut self, id: &str, value: InternalValue) {
        self.generated.remove(id);
        self.fixed.remove(id);
        self.constructed.insert(id.to_string(), value);
    }

    pub(crate) fn fixed(&self, id: &str) -> Option<&Arc<str>> {
        self.fixed.get(id)
    }

    pub(crate) fn constructed(&self, id: &str) -> Option<&InternalValue> {
        self.constructed.get(id)
    }

    /// Mutable access to a constructed value; the value becomes caller-owned.
    pub(crate) fn constructed_mut(&mut self, id: &str) -> Option<&mut InternalValue> {
        let value = self.constructed.get_mut(id)?;
        self.generated.remove(id);
        Some(value)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.fixed.contains_key(id) || self.constructed.contains_key(id)
    }

    /// Set by the caller, as opposed to installed by tag evaluation.
    pub(crate) fn is_set(&self, id: &str) -> bool {
        self.contains(id) && !self.generated.contains(id)
    }

    pub(crate) fn mark_generated(&mut self, id: &str) {
        if self.contains(id) {
            self.generated.insert(id.to_string());
        }
    }

    pub(crate) fn is_generated(&self, id: &str) -> bool {
        self.generated.contains(id)
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.fixed.remove(id);
        self.constructed.remove(id);
        self.generated.remove(id);
    }

    /// Drop every generated value, returning the ids that were removed.
    pub(crate) fn remove_generated(&mut self) -> Vec<String> {
        let ids: Vec<String> = self.generated.drain().collect();
        for id in &ids {
            self.fixed.remove(id);
            self.constructed.remove(id);
        }
        ids
    }

    /// Number of caller-set values.
    pub(crate) fn count(&self) -> usize {
        self.fixed.keys().filter(|id| !self.generated.contains(*id)).count()
            + self
                .constructed
                .keys()
                .filter(|id| !self.generated.contains(*id))
                .count()
    }

    pub(crate) fn clear(&mut self) {
        self.fixed.clear();
        self.constructed.clear();
        self.generated.clear();
    }
}
