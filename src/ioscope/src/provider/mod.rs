//! Factories constructing managed objects.

mod closure;
mod component;
mod instance;

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::container::{Managed, SharedManaged};

pub use crate::container::injector::CallContext;
pub use closure::{Closure, ClosureProvider, RawClosure, RawClosureProvider};
pub use component::{Component, ComponentProvider};
pub use instance::InstanceProvider;

/// A universal factory which constructs objects of one type.
///
/// A [`Provider`] constructs an object on each request and retrieves all its
/// dependencies from an [`Injector`]. Whether the object is reused afterwards
/// is decided by the lifetime of the binding, not by the provider.
///
/// In convention, a [`Provider`] is a stateless object and may be used by
/// multiple threads. Each request to a [`Provider`] should receive a new
/// object. Especially, if the underlying type is some kind of pointer, it
/// should point to a new object rather than a shared one, unless it's a
/// truly immutable object without interior mutability.
///
/// Usually, you don't need to implement [`Provider`] manually, since this is
/// automatically done by [`TypedProvider`]'s blanket implementation.
pub trait Provider: Debug + Send + Sync + 'static {
    /// Provides a newly created type-erased object. The `context` identifies
    /// the object being built so that its dependencies can be traced.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn Managed>, InjectorError>;
}

/// A static variant of the [`Provider`] trait, leveraging static dispatch and
/// type-safety.
pub trait TypedProvider: Provider {
    /// The return type in response to each request to the provider.
    type Output: Managed;

    /// Provides a newly created object of type [`TypedProvider::Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be fetched or the object
    /// construction fails.
    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>
    where
        I: TypedInjector + ?Sized;
}

impl<T: TypedProvider> Provider for T {
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        self.provide(injector, context)
            .map(|obj| -> Box<dyn Managed> { Box::new(obj) })
    }
}

/// A variant of the [`Provider`] trait, which produces a shareable object
/// that the container can cache for [`Scoped`] and [`Singleton`] bindings.
///
/// Even though the requested object is shareable, each request should still
/// be provided with a newly created object, since caching is the business
/// of containers.
///
/// [`Scoped`]: crate::lifetime::Scoped
/// [`Singleton`]: crate::lifetime::Singleton
pub trait SharedProvider: Provider {
    /// Provides a newly created shareable type-erased object.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide_shared(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError>;
}

/// A static variant of the [`SharedProvider`] trait.
pub trait TypedSharedProvider
where
    Self: SharedProvider + TypedProvider<Output: SharedManaged>,
{
}

impl<T: TypedSharedProvider> SharedProvider for T {
    fn dyn_provide_shared(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.provide(injector, context)
            .map(|obj| -> Box<dyn SharedManaged> { Box::new(obj) })
    }
}

/// Turns the error returned by a factory into an [`InjectorError`].
///
/// Errors raised by the injector itself, such as a missing dependency, are
/// passed through so that they keep their meaning. Any other error is the
/// factory's own failure and is attributed to the object being built, with
/// the original error kept as the source.
pub(crate) fn factory_error<E>(context: &CallContext<'_>, err: E) -> InjectorError
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    match err.into().downcast::<InjectorError>() {
        Ok(err) => *err,
        Err(err) => InjectorError::ObjectConstruction {
            key: context.key().dyn_clone(),
            source: Arc::from(err),
        },
    }
}
