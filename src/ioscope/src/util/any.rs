//! Type erasure helpers for trait objects.

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Upcasts to [`Any`] from any trait object whose trait has [`AsAny`] as a
/// supertrait.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Recovers the concrete type of a boxed trait object.
pub trait Downcast: Sized {
    fn downcast<T: Any>(self) -> Result<Box<T>, Self>;
}

impl<S> Downcast for Box<S>
where
    S: AsAny + ?Sized,
{
    fn downcast<T: Any>(self) -> Result<Box<T>, Self> {
        // `self.as_any()` would upcast the box itself.
        if !(*self).as_any().is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(object) => Ok(object),
            Err(_) => unreachable!("`self` should be `Box<T>`"),
        }
    }
}

/// Equality and hashing through `dyn` references, so that type-erased keys
/// and qualifiers can be used in hash maps. Values of different concrete
/// types are never equal.
pub trait DynHash: AsAny {
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + Any> DynHash for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        matches!(other.downcast_ref::<T>(), Some(other) if self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        Hash::hash(self, &mut state);
    }
}
