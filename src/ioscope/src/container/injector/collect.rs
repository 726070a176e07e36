use std::any::{self, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use crate::container::injector::{InjectorError, TypedInjector};
use crate::container::Managed;
use crate::key::{Key, Pattern, Qualifier, TypedQualifier};
use crate::util::any::Downcast;

/// A collection which can be filled with every object whose key matches a
/// [`Pattern`].
///
/// Sequence collections keep the registration order of the matched keys.
pub trait Collect<P>: Sized
where
    P: Pattern,
{
    /// Resolves the objects of the matching `keys` from `injector`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::EmptyCollection`] if no key matches, or the
    /// first error raised while resolving a matched object.
    fn collect<'a, I, KI>(injector: &I, keys: KI, pattern: P) -> Result<Self, InjectorError>
    where
        I: TypedInjector + ?Sized,
        KI: Iterator<Item = &'a dyn Key>;
}

fn resolve_matching<'a, T, I, KI, P>(
    injector: &'a I,
    keys: KI,
    pattern: P,
) -> impl Iterator<Item = Result<(&'a dyn Key, T), InjectorError>> + 'a
where
    T: Managed,
    I: TypedInjector + ?Sized,
    KI: Iterator<Item = &'a dyn Key> + 'a,
    P: Pattern<Target = T> + 'a,
{
    keys.filter(|key| key.target_type() == TypeId::of::<T>())
        .filter(move |key| pattern.matches(*key))
        .map(move |key| {
            let object = injector.dyn_get(key)?.downcast::<T>().unwrap_or_else(|_| {
                unreachable!("an object resolved by a key of `T` should be `Box<T>`")
            });
            Ok((key, *object))
        })
}

fn non_empty<C, P>(collection: C, is_empty: fn(&C) -> bool) -> Result<C, InjectorError> {
    if is_empty(&collection) {
        Err(InjectorError::EmptyCollection {
            collection: any::type_name::<C>(),
            pattern: any::type_name::<P>(),
        })
    } else {
        Ok(collection)
    }
}

macro_rules! impl_collect_for_sequences {
    ($collection:ident, [$($bounds:ident),*]) => {
        impl<T, P> Collect<P> for $collection<T>
        where
            T: Managed $(+ $bounds)*,
            P: Pattern<Target = T>,
        {
            fn collect<'a, I, KI>(injector: &I, keys: KI, pattern: P) -> Result<Self, InjectorError>
            where
                I: TypedInjector + ?Sized,
                KI: Iterator<Item = &'a dyn Key>,
            {
                let keys: Vec<&dyn Key> = keys.collect();
                let collection = resolve_matching(injector, keys.into_iter(), pattern)
                    .map(|res| res.map(|(_, object)| object))
                    .collect::<Result<Self, InjectorError>>()?;
                non_empty::<_, P>(collection, Self::is_empty)
            }
        }
    };
}

impl_collect_for_sequences!(Vec, []);
impl_collect_for_sequences!(VecDeque, []);
impl_collect_for_sequences!(HashSet, [Eq, Hash]);
impl_collect_for_sequences!(BTreeSet, [Ord]);

macro_rules! impl_collect_for_maps {
    ($collection:ident, [$($bounds:ident),*]) => {
        impl<T, Q, P> Collect<P> for $collection<Q, T>
        where
            T: Managed,
            Q: TypedQualifier $(+ $bounds)*,
            P: Pattern<Target = T, Qualifier = Q>,
        {
            fn collect<'a, I, KI>(injector: &I, keys: KI, pattern: P) -> Result<Self, InjectorError>
            where
                I: TypedInjector + ?Sized,
                KI: Iterator<Item = &'a dyn Key>,
            {
                let keys: Vec<&dyn Key> = keys
                    .filter(|key| key.qualifier_type() == TypeId::of::<Q>())
                    .collect();
                let collection = resolve_matching(injector, keys.into_iter(), pattern)
                    .map(|res| {
                        res.map(|(key, object)| {
                            let qualifier = key.dyn_qualifier().as_any().downcast_ref::<Q>().copied();
                            let qualifier = qualifier.unwrap_or_else(|| {
                                unreachable!("the qualifier of a matched key should be `Q`")
                            });
                            (qualifier, object)
                        })
                    })
                    .collect::<Result<Self, InjectorError>>()?;
                non_empty::<_, P>(collection, Self::is_empty)
            }
        }
    };
}

impl_collect_for_maps!(HashMap, []);
impl_collect_for_maps!(BTreeMap, [Ord]);

impl<T, P> Collect<P> for HashMap<Box<dyn Qualifier>, T>
where
    T: Managed,
    P: Pattern<Target = T, Qualifier = Box<dyn Qualifier>>,
{
    fn collect<'a, I, KI>(injector: &I, keys: KI, pattern: P) -> Result<Self, InjectorError>
    where
        I: TypedInjector + ?Sized,
        KI: Iterator<Item = &'a dyn Key>,
    {
        let keys: Vec<&dyn Key> = keys.collect();
        let collection = resolve_matching(injector, keys.into_iter(), pattern)
            .map(|res| res.map(|(key, object)| (key.dyn_qualifier().clone_qualifier(), object)))
            .collect::<Result<Self, InjectorError>>()?;
        non_empty::<_, P>(collection, Self::is_empty)
    }
}
