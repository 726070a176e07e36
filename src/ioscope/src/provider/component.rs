use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::injector::{
    CallContext, ContextForwardingInjectorProxy, InjectorError, TypedInjector,
};
use crate::container::{Managed, SharedManaged};
use crate::provider::{factory_error, TypedProvider, TypedSharedProvider};

/// A type which knows how to build itself from an injector.
///
/// ```rust
/// # use std::sync::Arc;
/// # use ioscope::container::injector::{InjectorError, TypedInjector};
/// # use ioscope::key;
/// # use ioscope::provider::Component;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English {
///     name: Arc<String>,
/// }
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         format!("Hello {}!", self.name)
///     }
/// }
///
/// impl Component for English {
///     type Output = Arc<dyn Greeter>;
///
///     type Error = InjectorError;
///
///     fn construct<I>(injector: &I) -> Result<Self, Self::Error>
///     where
///         I: TypedInjector + ?Sized,
///     {
///         let name = injector.get(key::named("user"))?;
///         Ok(Self { name })
///     }
///
///     fn finish(self) -> Self::Output {
///         Arc::new(self)
///     }
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// What the binding hands out, e.g. `Self`, `Arc<Self>` or
    /// `Arc<dyn Trait>`.
    type Output: Managed;

    /// Returning an [`InjectorError`] here keeps its meaning; any other error
    /// is reported as [`InjectorError::ObjectConstruction`].
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// Resolves the dependencies and creates the component.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency can't be resolved or the component
    /// can't be created from them.
    fn construct<I>(injector: &I) -> Result<Self, Self::Error>
    where
        I: TypedInjector + ?Sized;

    /// Wraps the component into what the binding hands out.
    fn finish(self) -> Self::Output;
}

/// A [`Provider`] building a [`Component`].
///
/// [`Provider`]: crate::provider::Provider
pub struct ComponentProvider<C> {
    _marker: PhantomData<fn() -> C>,
}

impl<C> ComponentProvider<C>
where
    C: Component,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C> Debug for ComponentProvider<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentProvider").finish_non_exhaustive()
    }
}

impl<C> TypedProvider for ComponentProvider<C>
where
    C: Component,
{
    type Output = C::Output;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        let injector = ContextForwardingInjectorProxy::new(injector, context);
        C::construct(&injector)
            .map(Component::finish)
            .map_err(|err| factory_error(context, err))
    }
}

impl<C> TypedSharedProvider for ComponentProvider<C> where C: Component<Output: SharedManaged> {}
