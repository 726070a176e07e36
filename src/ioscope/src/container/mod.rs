pub mod injector;
pub mod registry;

mod core;
mod disposal;
mod handle;
mod options;
mod scope;

use std::sync::Arc;

use crate::util::any::AsAny;

pub use disposal::DisposeError;
pub use handle::Container;
pub use options::ContainerOptions;
pub use scope::{Scope, ScopeId, ScopeLevel, ScopeState};

/// An object that a container can construct and hand out.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// A [`Managed`] object that can be cached and handed out several times,
/// which is what [`Scoped`] and [`Singleton`] bindings require. Cloning a
/// [`SharedManaged`] object never creates a new underlying object, so two
/// clones are identity-equal.
///
/// [`Scoped`]: crate::lifetime::Scoped
/// [`Singleton`]: crate::lifetime::Singleton
pub trait SharedManaged: Managed {
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;

    fn as_managed(&self) -> &dyn Managed;

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed>;
}

impl<T> SharedManaged for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }

    fn as_managed(&self) -> &dyn Managed {
        self
    }

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed> {
        self
    }
}
