//! Keys identifying bindings.
//!
//! A key is made of a target type, the type of the objects it resolves to,
//! and a qualifier distinguishing several bindings of the same target type.
//! Two keys are equal only if their target types, qualifier types and
//! qualifier values are all equal.

mod pattern;
mod qualified;

use std::any::TypeId;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

use crate::container::Managed;
use crate::util::any::{AsAny, DynHash};

pub use pattern::{AnyPattern, KeyTypePattern, Pattern};
use qualified::QualifiedKey;

/// A type-erased key.
pub trait Key
where
    Self: Debug + Display + AsAny + DynHash + Send + Sync + 'static,
{
    /// Returns the [`TypeId`] of the objects this key resolves to.
    fn target_type(&self) -> TypeId;

    /// Returns the [`TypeId`] of the qualifier.
    fn qualifier_type(&self) -> TypeId;

    /// Returns the qualifier as a type-erased reference.
    fn dyn_qualifier(&self) -> &dyn Qualifier;

    fn dyn_clone(&self) -> Box<dyn Key>;
}

impl PartialEq for dyn Key {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Key {}

impl Hash for dyn Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

impl<T: TypedKey> Key for T {
    fn target_type(&self) -> TypeId {
        TypeId::of::<T::Target>()
    }

    fn qualifier_type(&self) -> TypeId {
        TypeId::of::<T::Qualifier>()
    }

    fn dyn_qualifier(&self) -> &dyn Qualifier {
        self.qualifier_ref()
    }

    fn dyn_clone(&self) -> Box<dyn Key> {
        Box::new(*self)
    }
}

/// A statically typed key.
pub trait TypedKey: Key + Copy + Eq + Hash {
    type Target: Managed;

    type Qualifier: TypedQualifier;

    fn qualifier(&self) -> Self::Qualifier;

    fn qualifier_ref(&self) -> &Self::Qualifier;
}

/// A type-erased qualifier.
pub trait Qualifier: Debug + AsAny + DynHash + Send + Sync + 'static {
    fn clone_qualifier(&self) -> Box<dyn Qualifier>;
}

impl PartialEq for dyn Qualifier {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Qualifier {}

impl Hash for dyn Qualifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

impl<Q> Qualifier for Q
where
    Q: Copy + Debug + Eq + Hash + Send + Sync + 'static,
{
    fn clone_qualifier(&self) -> Box<dyn Qualifier> {
        Box::new(*self)
    }
}

/// A statically typed qualifier. Any small `Copy` value with equality and
/// hashing qualifies, e.g. `()`, `&'static str` or a fieldless `enum`.
pub trait TypedQualifier: Qualifier + Copy + Debug + Eq + Hash + Send + Sync + 'static {}

impl<Q> TypedQualifier for Q where Q: Copy + Debug + Eq + Hash + Send + Sync + 'static {}

/// Creates an unqualified key of `T`.
pub fn of<T>() -> impl TypedKey<Target = T, Qualifier = ()>
where
    T: Managed,
{
    QualifiedKey::new(())
}

/// Creates a key of `T` qualified by a name.
pub fn named<T>(name: &'static str) -> impl TypedKey<Target = T, Qualifier = &'static str>
where
    T: Managed,
{
    QualifiedKey::new(name)
}

/// Creates a key of `T` qualified by an arbitrary qualifier.
pub fn qualified<T, Q>(qualifier: Q) -> impl TypedKey<Target = T, Qualifier = Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    QualifiedKey::new(qualifier)
}
