use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::container::Managed;
use crate::key::{TypedKey, TypedQualifier};
use crate::util::display::ShortTypeName;

/// The key made by [`of`], [`named`] and [`qualified`].
///
/// It is displayed as `Arc<Session>` when unqualified and as
/// `Arc<Session>@"admin"` otherwise, which is how keys show up in errors.
/// [`Debug`] keeps the full type path.
///
/// [`of`]: crate::key::of
/// [`named`]: crate::key::named
/// [`qualified`]: crate::key::qualified
pub(crate) struct QualifiedKey<T, Q> {
    qualifier: Q,
    _target: PhantomData<fn() -> T>,
}

impl<T, Q> QualifiedKey<T, Q> {
    pub(crate) const fn new(qualifier: Q) -> Self {
        Self {
            qualifier,
            _target: PhantomData,
        }
    }
}

// Derived impls would put bounds on `T`.
impl<T, Q: Copy> Clone for QualifiedKey<T, Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Q: Copy> Copy for QualifiedKey<T, Q> {}

impl<T, Q: PartialEq> PartialEq for QualifiedKey<T, Q> {
    fn eq(&self, other: &Self) -> bool {
        self.qualifier == other.qualifier
    }
}

impl<T, Q: Eq> Eq for QualifiedKey<T, Q> {}

impl<T, Q: Hash> Hash for QualifiedKey<T, Q> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualifier.hash(state);
    }
}

impl<T: Managed, Q: TypedQualifier> Display for QualifiedKey<T, Q> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", ShortTypeName::of::<T>())?;
        if TypeId::of::<Q>() != TypeId::of::<()>() {
            write!(f, "@{:?}", self.qualifier)?;
        }
        Ok(())
    }
}

impl<T: Managed, Q: TypedQualifier> Debug for QualifiedKey<T, Q> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}@{:?}", any::type_name::<T>(), self.qualifier)
    }
}

impl<T: Managed, Q: TypedQualifier> TypedKey for QualifiedKey<T, Q> {
    type Target = T;

    type Qualifier = Q;

    fn qualifier(&self) -> Self::Qualifier {
        self.qualifier
    }

    fn qualifier_ref(&self) -> &Self::Qualifier {
        &self.qualifier
    }
}
