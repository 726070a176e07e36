use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::injector::{CallContext, InjectorError, TypedInjector};
use crate::container::{Managed, SharedManaged};
use crate::provider::{TypedProvider, TypedSharedProvider};

/// A [`Provider`] handing out clones of a prebuilt value.
///
/// Bound as a singleton, an `Arc` instance is handed out as is, so every
/// resolution is identity-equal to the registered value.
///
/// [`Provider`]: crate::provider::Provider
pub struct InstanceProvider<T> {
    instance: T,
}

impl<T> InstanceProvider<T>
where
    T: Managed + Clone,
{
    pub fn new(instance: T) -> Self {
        Self { instance }
    }
}

impl<T> Debug for InstanceProvider<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceProvider").finish_non_exhaustive()
    }
}

impl<T> TypedProvider for InstanceProvider<T>
where
    T: Managed + Clone,
{
    type Output = T;

    fn provide<I>(
        &self,
        _injector: &I,
        _context: &CallContext<'_>,
    ) -> Result<Self::Output, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        Ok(self.instance.clone())
    }
}

impl<T> TypedSharedProvider for InstanceProvider<T> where T: SharedManaged + Clone {}
