use std::marker::PhantomData;

use crate::container::Managed;
use crate::key::TypedQualifier;
use crate::lifetime::{Scoped, Singleton, ToLifetime, Transient};
use crate::module::dsl::provider_helper::ProviderBinding;
use crate::provider::{
    Closure, ClosureProvider, Component, ComponentProvider, InstanceProvider, RawClosure,
    RawClosureProvider, TypedProvider,
};

/// A binding whose key and lifetime are being declared, before a provider
/// is chosen.
pub struct MetadataBinding<KT, KQ, L>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
{
    qualifier: KQ,
    lifetime: L,
    _marker: PhantomData<fn() -> KT>,
}

impl<KT, KQ, L> MetadataBinding<KT, KQ, L>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
{
    pub(super) fn new(qualifier: KQ, lifetime: L) -> Self {
        Self {
            qualifier,
            lifetime,
            _marker: PhantomData,
        }
    }

    pub fn qualified_by<NewKQ>(self, qualifier: NewKQ) -> MetadataBinding<KT, NewKQ, L>
    where
        NewKQ: TypedQualifier,
    {
        MetadataBinding::new(qualifier, self.lifetime)
    }

    pub fn named(self, name: &'static str) -> MetadataBinding<KT, &'static str, L> {
        self.qualified_by(name)
    }

    pub fn as_transient(self) -> MetadataBinding<KT, KQ, Transient> {
        MetadataBinding::new(self.qualifier, Transient)
    }

    pub fn as_scoped(self) -> MetadataBinding<KT, KQ, Scoped> {
        MetadataBinding::new(self.qualifier, Scoped)
    }

    pub fn as_singleton(self) -> MetadataBinding<KT, KQ, Singleton> {
        MetadataBinding::new(self.qualifier, Singleton)
    }

    /// Builds the objects with a closure whose arguments are resolved by
    /// their unqualified keys.
    pub fn to_closure<C, Args>(self, closure: C) -> ProviderBinding<KT, KQ, L, ClosureProvider<C, Args>>
    where
        C: Closure<Args, Output = KT>,
        Args: 'static,
    {
        self.to_provider(ClosureProvider::new(closure))
    }

    /// Builds the objects with a closure receiving the injector.
    pub fn to_raw_closure<C>(self, closure: C) -> ProviderBinding<KT, KQ, L, RawClosureProvider<C>>
    where
        C: RawClosure<Output = KT>,
    {
        self.to_provider(RawClosureProvider::new(closure))
    }

    pub fn to_component<C>(self) -> ProviderBinding<KT, KQ, L, ComponentProvider<C>>
    where
        C: Component<Output = KT>,
    {
        self.to_provider(ComponentProvider::new())
    }

    /// Hands out clones of `instance`.
    pub fn to_instance(self, instance: KT) -> ProviderBinding<KT, KQ, L, InstanceProvider<KT>>
    where
        KT: Clone,
    {
        self.to_provider(InstanceProvider::new(instance))
    }

    pub fn to_provider<P>(self, provider: P) -> ProviderBinding<KT, KQ, L, P>
    where
        P: TypedProvider<Output = KT>,
    {
        ProviderBinding::new(provider, self.qualifier, self.lifetime)
    }
}
