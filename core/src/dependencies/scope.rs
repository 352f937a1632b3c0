use crate::dependencies::types::{Instance, ServiceId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static SCOPE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Per-request cache of scoped instances.
///
/// A scope is owned by exactly one request and dropped with it; nothing
/// it constructed is ever visible to another scope.
#[derive(Debug)]
pub struct ScopeContext {
    id: u64,
    instances: HashMap<ServiceId, Instance>,
}

impl ScopeContext {
    pub fn new() -> Self {
        let id = SCOPE_COUNTER.fetch_add(1, Ordering::Relaxed);
        log::trace!("Opening scope {}", id);

        Self {
            id,
            instances: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.instances.contains_key(id)
    }

    pub(crate) fn get(&self, id: &ServiceId) -> Option<Instance> {
        self.instances.get(id).cloned()
    }

    pub(crate) fn insert(&mut self, id: ServiceId, instance: Instance) {
        self.instances.insert(id, instance);
    }
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopeContext {
    fn drop(&mut self) {
        log::trace!(
            "Closing scope {} with {} scoped instances",
            self.id,
            self.instances.len()
        );
    }
}
