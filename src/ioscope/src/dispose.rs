//! Releasing shared objects when the scope owning them ends.

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::Managed;
use crate::util::any::AsAny;

/// An object holding resources which should be released explicitly when its
/// owning scope or container ends.
///
/// The container only disposes objects it caches, i.e. objects of
/// [`Scoped`] and [`Singleton`] bindings marked as disposable. A transient
/// object belongs to its caller, who is responsible for releasing it.
///
/// [`Scoped`]: crate::lifetime::Scoped
/// [`Singleton`]: crate::lifetime::Singleton
pub trait Dispose: Send + Sync {
    /// Releases the resources held by `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if some resources can't be released. Other objects
    /// of the same scope are still disposed.
    fn dispose(&self) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<T> Dispose for Arc<T>
where
    T: Dispose + ?Sized,
{
    fn dispose(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).dispose()
    }
}

/// A type-erased [`Dispose`] implementation attached to a binding.
#[derive(Clone)]
pub struct Disposer {
    dispose: Arc<DisposeFn>,
}

type DisposeFn = dyn Fn(&dyn Managed) -> Result<(), Box<dyn Error + Send + Sync>> + Send + Sync;

impl Disposer {
    /// Creates a [`Disposer`] calling [`Dispose::dispose`] on objects of type
    /// `T`.
    pub fn of<T>() -> Self
    where
        T: Managed + Dispose,
    {
        Self::from_fn(|object: &T| object.dispose())
    }

    /// Creates a [`Disposer`] from a closure releasing objects of type `T`.
    pub fn from_fn<T, F>(dispose: F) -> Self
    where
        T: Managed,
        F: Fn(&T) -> Result<(), Box<dyn Error + Send + Sync>> + Send + Sync + 'static,
    {
        let dispose = move |object: &dyn Managed| match AsAny::as_any(object).downcast_ref::<T>() {
            Some(object) => dispose(object),
            None => unreachable!("a disposer should only receive objects of its binding"),
        };
        Self {
            dispose: Arc::new(dispose),
        }
    }

    pub(crate) fn dispose(&self, object: &dyn Managed) -> Result<(), Box<dyn Error + Send + Sync>> {
        (self.dispose)(object)
    }
}

impl Debug for Disposer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Disposer").finish_non_exhaustive()
    }
}
