use std::any::TypeId;
use std::collections::HashMap;

use crate::dispose::Disposer;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::{Provider, SharedProvider};

/// The immutable set of bindings of a container, grouped by target type.
#[derive(Debug)]
pub struct ProviderMap {
    providers: HashMap<TypeId, HashMap<Box<dyn Key>, ProviderEntry>>,
    len: usize,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            len: 0,
        }
    }

    /// Adds `entry` unless its key is already bound, in which case `entry`
    /// is handed back.
    pub fn insert(&mut self, entry: ProviderEntry) -> Result<(), ProviderEntry> {
        let slot = self.providers.entry(entry.key.target_type()).or_default();
        if slot.contains_key(entry.key.as_ref()) {
            return Err(entry);
        }

        let entry = ProviderEntry {
            order: self.len,
            ..entry
        };
        slot.insert(entry.key.dyn_clone(), entry);
        self.len += 1;
        Ok(())
    }

    pub fn get(&self, key: &dyn Key) -> Option<&ProviderEntry> {
        self.providers
            .get(&key.target_type())
            .and_then(|slot| slot.get(key))
    }

    /// Returns the keys bound to objects of `target`, in the order they were
    /// registered.
    pub fn keys(&self, target: TypeId) -> Vec<Box<dyn Key>> {
        let Some(slot) = self.providers.get(&target) else {
            return Vec::new();
        };
        let mut entries: Vec<&ProviderEntry> = slot.values().collect();
        entries.sort_by_key(|entry| entry.order);
        entries.into_iter().map(|entry| entry.key.dyn_clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

/// One binding: a key, the provider constructing its objects, and how long
/// these objects are reused.
#[derive(Debug)]
pub struct ProviderEntry {
    key: Box<dyn Key>,
    kind: ProviderKind,
    order: usize,
}

#[derive(Debug)]
pub enum ProviderKind {
    Owned(Box<dyn Provider>),
    Shared {
        provider: Box<dyn SharedProvider>,
        lifetime: Lifetime,
        disposer: Option<Disposer>,
    },
}

impl ProviderEntry {
    pub fn new_owned(key: Box<dyn Key>, provider: Box<dyn Provider>) -> Self {
        Self {
            key,
            kind: ProviderKind::Owned(provider),
            order: 0,
        }
    }

    pub fn new_shared(
        key: Box<dyn Key>,
        provider: Box<dyn SharedProvider>,
        lifetime: Lifetime,
        disposer: Option<Disposer>,
    ) -> Self {
        debug_assert!(lifetime.is_shared(), "a shared binding can't be transient");
        Self {
            key,
            kind: ProviderKind::Shared {
                provider,
                lifetime,
                disposer,
            },
            order: 0,
        }
    }

    pub fn key(&self) -> &dyn Key {
        self.key.as_ref()
    }

    pub fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    pub fn lifetime(&self) -> Lifetime {
        match &self.kind {
            ProviderKind::Owned(_) => Lifetime::Transient,
            ProviderKind::Shared { lifetime, .. } => *lifetime,
        }
    }
}
