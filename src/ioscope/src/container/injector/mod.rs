mod collect;
mod context;
mod object_map;
mod proxy;

use std::any::TypeId;
use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::{Managed, ScopeLevel};
use crate::key::{Key, Pattern, TypedKey};
use crate::lifetime::Lifetime;
use crate::util::any::Downcast;

pub use collect::Collect;
pub use context::{CallContext, InjectionTrace};
pub(super) use object_map::ObjectMap;
pub(crate) use proxy::ContextForwardingInjectorProxy;

/// A source of managed objects, addressed by type-erased keys.
#[cfg_attr(test, mockall::automock)]
pub trait Injector: Send + Sync {
    /// Resolves the object identified by `key` on behalf of the caller.
    fn dyn_get(&self, key: &dyn Key) -> Result<Box<dyn Managed>, InjectorError>;

    /// Resolves the object identified by `key` as a dependency of the object
    /// being constructed in `context`.
    fn dyn_get_dependency<'a>(
        &self,
        key: &dyn Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn Managed>, InjectorError>;

    /// Returns all registered keys of the target type, in registration
    /// order.
    fn keys(&self, type_id: TypeId) -> Vec<Box<dyn Key>>;
}

pub trait TypedInjector: Injector {
    /// Resolves the object identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::NotFound`] if nothing is registered under
    /// `key`, or any error raised while constructing the object or its
    /// dependencies.
    fn get<K>(&self, key: K) -> Result<K::Target, InjectorError>
    where
        K: TypedKey,
    {
        match self.dyn_get(&key) {
            Ok(boxed) => match boxed.downcast::<K::Target>() {
                Ok(object) => Ok(*object),
                Err(_) => unreachable!("the object's type should be `K::Target`"),
            },
            Err(err) => Err(err),
        }
    }

    /// Resolves the object identified by `key`, or returns [`None`] if
    /// nothing is registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns any error raised while constructing the object or its
    /// dependencies. A missing dependency of a registered object is still an
    /// error.
    fn try_get<K>(&self, key: K) -> Result<Option<K::Target>, InjectorError>
    where
        K: TypedKey,
    {
        match self.get(key) {
            Ok(object) => Ok(Some(object)),
            Err(InjectorError::NotFound { key: missing }) if missing.as_ref() == &key as &dyn Key => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves every object whose key matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::EmptyCollection`] if no key matches, or the
    /// first error raised while resolving the matched objects.
    fn collect<C, P>(&self, pattern: P) -> Result<C, InjectorError>
    where
        C: Collect<P>,
        P: Pattern,
    {
        let keys = self.keys(TypeId::of::<P::Target>());
        C::collect(self, keys.iter().map(AsRef::as_ref), pattern)
    }

    fn upcast_dyn(&self) -> &dyn Injector;
}

impl<T> TypedInjector for T
where
    T: Injector,
{
    fn upcast_dyn(&self) -> &dyn Injector {
        self
    }
}

impl TypedInjector for dyn Injector + '_ {
    fn upcast_dyn(&self) -> &dyn Injector {
        self
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InjectorError {
    #[snafu(display("could not find the object identified by the given key {key}"))]
    #[non_exhaustive]
    NotFound { key: Box<dyn Key> },
    #[snafu(display("could not gather any object matching {pattern} to a {collection}"))]
    #[non_exhaustive]
    EmptyCollection {
        collection: &'static str,
        pattern: &'static str,
    },
    #[snafu(display("could not construct the object {key} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { key: Box<dyn Key> },
    #[snafu(display("could not build a object {key} of {lifetime} lifetime in the {scope} scope"))]
    #[non_exhaustive]
    ShortLifetime {
        key: Box<dyn Key>,
        lifetime: Lifetime,
        scope: ScopeLevel,
    },
    #[snafu(display("could not resolve the object {key} since the {scope} scope is closed"))]
    #[non_exhaustive]
    ScopeClosed { key: Box<dyn Key>, scope: ScopeLevel },
    #[snafu(display("could not construct the object {key}"))]
    #[non_exhaustive]
    ObjectConstruction {
        key: Box<dyn Key>,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display("could not construct the object {key} since its factory panicked"))]
    #[non_exhaustive]
    FactoryPanicked { key: Box<dyn Key> },
}

impl Clone for InjectorError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound { key } => Self::NotFound {
                key: key.dyn_clone(),
            },
            Self::EmptyCollection {
                collection,
                pattern,
            } => Self::EmptyCollection {
                collection,
                pattern,
            },
            Self::CyclicDependency { key } => Self::CyclicDependency {
                key: key.dyn_clone(),
            },
            Self::ShortLifetime {
                key,
                lifetime,
                scope,
            } => Self::ShortLifetime {
                key: key.dyn_clone(),
                lifetime: *lifetime,
                scope: *scope,
            },
            Self::ScopeClosed { key, scope } => Self::ScopeClosed {
                key: key.dyn_clone(),
                scope: *scope,
            },
            Self::ObjectConstruction { key, source } => Self::ObjectConstruction {
                key: key.dyn_clone(),
                source: Arc::clone(source),
            },
            Self::FactoryPanicked { key } => Self::FactoryPanicked {
                key: key.dyn_clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::key;

    use super::*;

    #[test]
    fn typed_injector_get_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_get()
            .returning(|_| Ok(Box::new(Arc::new(String::from("db")))));

        let object: Arc<String> = injector.get(key::of()).unwrap();
        assert_eq!(object.as_str(), "db");
    }

    #[test]
    fn typed_injector_try_get_succeeds_when_key_not_found() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get().returning(|key| {
            Err(InjectorError::NotFound {
                key: key.dyn_clone(),
            })
        });

        let object = injector.try_get(key::of::<Arc<String>>()).unwrap();
        assert!(object.is_none());
    }

    #[test]
    fn typed_injector_try_get_fails_when_dependency_not_found() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get().returning(|_| {
            Err(InjectorError::NotFound {
                key: Box::new(key::named::<i32>("dependency")),
            })
        });

        assert!(matches!(
            injector.try_get(key::of::<Arc<String>>()),
            Err(InjectorError::NotFound { .. })
        ));
    }

    #[test]
    fn injector_error_clone_succeeds() {
        let err = InjectorError::ObjectConstruction {
            key: Box::new(key::of::<i32>()),
            source: Arc::from(Box::<dyn Error + Send + Sync>::from("factory failed")),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert_eq!(
            cloned.source().map(ToString::to_string),
            Some(String::from("factory failed"))
        );
    }
}
