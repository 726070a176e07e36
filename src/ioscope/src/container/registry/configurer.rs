use std::error::Error;

use crate::container::registry::provider_map::{ProviderEntry, ProviderMap};
use crate::container::registry::{Configurer, ConfigurerPrivate, RegistryError};
use crate::dispose::Disposer;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::{Provider, SharedProvider};

/// Collects bindings and registration errors while modules are configured.
pub struct ConfigurerImpl {
    providers: ProviderMap,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            providers: ProviderMap::new(),
            errors: Vec::new(),
        }
    }

    /// Returns the collected bindings, or every reported error at once.
    pub fn finish(self) -> Result<ProviderMap, RegistryError> {
        match RegistryError::aggregate(self.errors) {
            None => {
                tracing::debug!(bindings = self.providers.len(), "registry is built");
                Ok(self.providers)
            }
            Some(err) => Err(err),
        }
    }

    fn insert(&mut self, entry: ProviderEntry) {
        let lifetime = entry.lifetime();
        match self.providers.insert(entry) {
            Ok(()) => {}
            Err(rejected) => {
                tracing::debug!(key = %rejected.key(), %lifetime, "duplicated binding is rejected");
                self.errors.push(RegistryError::KeyDuplicated {
                    key: rejected.key().dyn_clone(),
                });
            }
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register(&mut self, key: Box<dyn Key>, provider: Box<dyn Provider>) {
        self.insert(ProviderEntry::new_owned(key, provider));
    }

    fn dyn_register_shared(
        &mut self,
        key: Box<dyn Key>,
        provider: Box<dyn SharedProvider>,
        lifetime: Lifetime,
        disposer: Option<Disposer>,
    ) {
        self.insert(ProviderEntry::new_shared(key, provider, lifetime, disposer));
    }
}
