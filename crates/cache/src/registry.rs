//! Group registry
//!
//! Groups are looked up by name. A [`Registry`] can be created per test or
//! per component; [`Registry::global`] is the process-wide instance used by
//! the [`new_group`] and [`get_group`] helpers. Registration takes the write
//! lock, lookups share the read lock.

use crate::byte_view::ByteView;
use crate::errors::{CacheError, Result};
use crate::eviction::EvictionCallback;
use crate::group::{Getter, Group};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Create and register a group, replacing any group with the same name
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        getter: impl Getter + 'static,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name.into(), cache_bytes, Arc::new(getter), None));
        self.insert(Arc::clone(&group));
        group
    }

    /// Start configuring a group
    pub fn group(&self, name: impl Into<String>) -> GroupBuilder<'_> {
        GroupBuilder {
            registry: self,
            name: name.into(),
            cache_bytes: 0,
            getter: None,
            on_evicted: None,
        }
    }

    /// Look up a group by name
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Registered group names, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn insert(&self, group: Arc<Group>) {
        let name = group.name().to_string();
        let cache_bytes = group.cache_bytes();
        if self.groups.write().insert(name.clone(), group).is_some() {
            warn!(group = %name, "replaced existing group");
        }
        info!(group = %name, cache_bytes, "registered group");
    }
}

/// Builder for groups that need more than a name, budget and loader
pub struct GroupBuilder<'a> {
    registry: &'a Registry,
    name: String,
    cache_bytes: u64,
    getter: Option<Arc<dyn Getter>>,
    on_evicted: Option<EvictionCallback<ByteView>>,
}

impl GroupBuilder<'_> {
    /// Byte budget for the group's store; zero means unlimited
    pub fn cache_bytes(mut self, cache_bytes: u64) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn getter(mut self, getter: impl Getter + 'static) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    /// Observe entries evicted from the group's store.
    ///
    /// The callback runs while the group's store lock is held, so it must not
    /// call back into the same group.
    pub fn on_evicted<F>(mut self, on_evicted: F) -> Self
    where
        F: FnMut(&str, &ByteView) + Send + 'static,
    {
        self.on_evicted = Some(Box::new(on_evicted));
        self
    }

    /// Build and register the group
    pub fn register(self) -> Result<Arc<Group>> {
        if self.name.is_empty() {
            return Err(CacheError::MisconfiguredGroup {
                name: self.name,
                reason: "group name is empty".to_string(),
            });
        }
        let Some(getter) = self.getter else {
            return Err(CacheError::MisconfiguredGroup {
                name: self.name,
                reason: "no getter configured".to_string(),
            });
        };

        let group = Arc::new(Group::new(
            self.name,
            self.cache_bytes,
            getter,
            self.on_evicted,
        ));
        self.registry.insert(Arc::clone(&group));
        Ok(group)
    }
}

/// Register a group in the global registry
pub fn new_group(name: impl Into<String>, cache_bytes: u64, getter: impl Getter + 'static) -> Arc<Group> {
    GLOBAL.new_group(name, cache_bytes, getter)
}

/// Look up a group in the global registry
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GLOBAL.get_group(name)
}
