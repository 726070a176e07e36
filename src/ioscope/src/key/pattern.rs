use std::any::TypeId;
use std::marker::PhantomData;

use crate::container::Managed;
use crate::key::{Key, Qualifier, TypedQualifier};

/// Selects keys, typically to gather every binding of one contract with
/// [`TypedInjector::collect`].
///
/// [`TypedInjector::collect`]: crate::container::injector::TypedInjector::collect
pub trait Pattern {
    /// The target type of every matched key.
    type Target: Managed;

    /// The qualifier type of every matched key, or `Box<dyn Qualifier>` when
    /// matched keys may have different qualifier types.
    type Qualifier;

    fn matches(&self, key: &dyn Key) -> bool;
}

/// Matches every key of target type `T`, whatever its qualifier.
///
/// ```rust
/// # use ioscope::key::{self, Pattern, AnyPattern};
/// let pattern = AnyPattern::<i32>::new();
/// assert!(pattern.matches(&key::of::<i32>()));
/// assert!(pattern.matches(&key::named::<i32>("named")));
/// assert!(!pattern.matches(&key::of::<i64>()));
/// ```
pub struct AnyPattern<T>(PhantomData<fn() -> T>);

impl<T: Managed> AnyPattern<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Managed> Pattern for AnyPattern<T> {
    type Target = T;

    type Qualifier = Box<dyn Qualifier>;

    fn matches(&self, key: &dyn Key) -> bool {
        key.target_type() == TypeId::of::<T>()
    }
}

/// Matches the keys of target type `T` whose qualifier is a `Q`, so that
/// the qualifiers can be kept as map keys, e.g. `KeyTypePattern<T, char>`
/// gathers a `BTreeMap<char, T>`.
///
/// ```rust
/// # use ioscope::key::{self, Pattern, KeyTypePattern};
/// let pattern = KeyTypePattern::<i32, &'static str>::new();
/// assert!(pattern.matches(&key::named::<i32>("named")));
/// assert!(!pattern.matches(&key::of::<i32>()));
/// assert!(!pattern.matches(&key::named::<i64>("named")));
/// ```
pub struct KeyTypePattern<T, Q>(PhantomData<fn() -> (T, Q)>);

impl<T: Managed, Q: TypedQualifier> KeyTypePattern<T, Q> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Managed, Q: TypedQualifier> Pattern for KeyTypePattern<T, Q> {
    type Target = T;

    type Qualifier = Q;

    fn matches(&self, key: &dyn Key) -> bool {
        AnyPattern::<T>::new().matches(key) && key.qualifier_type() == TypeId::of::<Q>()
    }
}
