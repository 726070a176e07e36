use std::any::TypeId;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::core::ContainerCore;
use crate::container::injector::{CallContext, Injector, InjectorError};
use crate::container::registry::{ConfigurerImpl, Registry, RegistryError};
use crate::container::{ContainerOptions, DisposeError, Managed, Scope, ScopeId, ScopeState};
use crate::key::Key;
use crate::module::Module;

/// A dependency-injection container built from a [`Module`].
///
/// Resolutions made on the container itself happen in its implicit root
/// scope: singletons are cached for the container's whole life, and so are
/// scoped objects unless [`ContainerOptions::validate_scopes`] is enabled.
/// Use [`Container::create_scope`] for per-unit-of-work objects.
///
/// Handles are cheap to clone and refer to the same container. When the last
/// handle and the last scope are dropped, the container is disposed as if
/// [`Container::dispose`] were called.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    /// Opens a new [`Scope`] with an empty cache of scoped objects.
    pub fn create_scope(&self) -> Scope {
        let id = ScopeId::next();
        Scope::new(id, ContainerCore::new_child(Arc::clone(&self.core), id))
    }

    pub fn options(&self) -> &ContainerOptions {
        self.core.options()
    }

    /// Disposes the singletons and the objects of the implicit root scope.
    /// Later resolutions of shared objects fail with
    /// [`InjectorError::ScopeClosed`], including the singleton requests of
    /// scopes which are still open.
    ///
    /// # Errors
    ///
    /// Returns [`DisposeError::AlreadyClosed`] if the container is already
    /// disposed, or the errors raised by disposers.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        self.core.close()
    }

    pub fn is_disposed(&self) -> bool {
        self.core.state() == ScopeState::Closed
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("options", self.options())
            .field("state", &self.core.state())
            .finish_non_exhaustive()
    }
}

impl Registry for Container {
    fn init_with_options<M>(module: M, options: ContainerOptions) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let providers = configurer.finish()?;
        let core = ContainerCore::new_root(providers, options);
        Ok(Self {
            core: Arc::new(core),
        })
    }
}

impl Injector for Container {
    fn dyn_get(&self, key: &dyn Key) -> Result<Box<dyn Managed>, InjectorError> {
        self.core.dyn_get(key)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &dyn Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        self.core.dyn_get_dependency(key, context)
    }

    fn keys(&self, type_id: TypeId) -> Vec<Box<dyn Key>> {
        self.core.keys(type_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::convert::Infallible;
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use crate::container::injector::TypedInjector;
    use crate::container::registry::{Configurer, TypedConfigurer};
    use crate::key::{self, KeyTypePattern};
    use crate::lifetime::{Scoped, Singleton};
    use crate::provider::{ClosureProvider, InstanceProvider};

    use super::*;

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Session {
        user: Arc<String>,
    }

    struct AppModule;

    impl Module for AppModule {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            configurer.register_shared(
                key::of::<Arc<String>>(),
                InstanceProvider::new(Arc::new(String::from("alice"))),
                Singleton,
                None,
            );
            configurer.register_shared(
                key::of::<Arc<Session>>(),
                ClosureProvider::new(|user: Arc<String>| {
                    CREATED.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(Arc::new(Session { user }))
                }),
                Scoped,
                None,
            );
            configurer.register(key::qualified::<u8, _>('a'), InstanceProvider::new(1u8));
            configurer.register(key::qualified::<u8, _>('b'), InstanceProvider::new(2u8));
            Ok(())
        }
    }

    #[test]
    fn container_operations_succeeds() {
        let container = Container::init(AppModule).unwrap();

        let user: Arc<String> = container.get(key::of()).unwrap();
        let handle = thread::spawn({
            let container = container.clone();
            move || container.get(key::of::<Arc<String>>()).unwrap()
        });
        assert!(Arc::ptr_eq(&user, &handle.join().unwrap()));

        let scope = container.create_scope();
        let session: Arc<Session> = scope.get(key::of()).unwrap();
        assert!(Arc::ptr_eq(&session.user, &user));
        assert!(Arc::ptr_eq(&session, &scope.get(key::of()).unwrap()));

        let counters: BTreeMap<char, u8> = container.collect(KeyTypePattern::new()).unwrap();
        assert_eq!(counters.into_iter().collect::<Vec<_>>(), vec![('a', 1), ('b', 2)]);
        assert!(CREATED.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn container_dispose_succeeds() {
        let container = Container::init(AppModule).unwrap();
        let scope = container.create_scope();

        assert!(!container.is_disposed());
        container.dispose().unwrap();
        assert!(container.is_disposed());
        assert!(matches!(
            container.get(key::of::<Arc<String>>()),
            Err(InjectorError::ScopeClosed { .. })
        ));
        assert!(matches!(
            scope.get(key::of::<Arc<Session>>()),
            Err(InjectorError::ScopeClosed { .. })
        ));
        assert!(matches!(
            container.dispose(),
            Err(DisposeError::AlreadyClosed { .. })
        ));
    }

    #[test]
    fn container_init_fails_when_module_fails() {
        struct BrokenModule;

        impl Module for BrokenModule {
            fn configure(
                &self,
                _configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                Err("missing connection string".into())
            }
        }

        assert!(matches!(
            Container::init(BrokenModule),
            Err(RegistryError::ModuleInner { .. })
        ));
    }
}
