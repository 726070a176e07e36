use std::error::Error;

use crate::container::registry::{Configurer, TypedConfigurer};
use crate::container::{Managed, SharedManaged};
use crate::dispose::{Dispose, Disposer};
use crate::key::{self, TypedQualifier};
use crate::lifetime::{Scoped, SharedLifetime, Singleton, ToLifetime, Transient};
use crate::provider::{TypedProvider, TypedSharedProvider};

/// A binding whose provider is chosen, ready to be set on a configurer.
pub struct ProviderBinding<KT, KQ, L, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
    P: TypedProvider<Output = KT>,
{
    provider: P,
    qualifier: KQ,
    lifetime: L,
    disposer: Option<Disposer>,
}

impl<KT, KQ, L, P> ProviderBinding<KT, KQ, L, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
    P: TypedProvider<Output = KT>,
{
    pub(super) fn new(provider: P, qualifier: KQ, lifetime: L) -> Self {
        Self {
            provider,
            qualifier,
            lifetime,
            disposer: None,
        }
    }

    fn with_lifetime<NewL>(self, lifetime: NewL) -> ProviderBinding<KT, KQ, NewL, P>
    where
        NewL: ToLifetime,
    {
        ProviderBinding {
            provider: self.provider,
            qualifier: self.qualifier,
            lifetime,
            disposer: self.disposer,
        }
    }

    pub fn qualified_by<NewKQ>(self, qualifier: NewKQ) -> ProviderBinding<KT, NewKQ, L, P>
    where
        NewKQ: TypedQualifier,
    {
        ProviderBinding {
            provider: self.provider,
            qualifier,
            lifetime: self.lifetime,
            disposer: self.disposer,
        }
    }

    pub fn named(self, name: &'static str) -> ProviderBinding<KT, &'static str, L, P> {
        self.qualified_by(name)
    }

    /// Makes the binding transient. A disposer set before is discarded,
    /// since transient objects belong to their callers.
    pub fn as_transient(self) -> ProviderBinding<KT, KQ, Transient, P> {
        ProviderBinding {
            disposer: None,
            ..self.with_lifetime(Transient)
        }
    }

    pub fn as_scoped(self) -> ProviderBinding<KT, KQ, Scoped, P> {
        self.with_lifetime(Scoped)
    }

    pub fn as_singleton(self) -> ProviderBinding<KT, KQ, Singleton, P> {
        self.with_lifetime(Singleton)
    }
}

impl<KT, KQ, L, P> ProviderBinding<KT, KQ, L, P>
where
    KT: SharedManaged,
    KQ: TypedQualifier,
    L: SharedLifetime,
    P: TypedSharedProvider<Output = KT>,
{
    /// Disposes the cached object with [`Dispose::dispose`] when the scope
    /// owning it ends.
    pub fn disposable(self) -> Self
    where
        KT: Dispose,
    {
        Self {
            disposer: Some(Disposer::of::<KT>()),
            ..self
        }
    }

    /// Disposes the cached object with `dispose` when the scope owning it
    /// ends.
    pub fn dispose_with<F>(self, dispose: F) -> Self
    where
        F: Fn(&KT) -> Result<(), Box<dyn Error + Send + Sync>> + Send + Sync + 'static,
    {
        Self {
            disposer: Some(Disposer::from_fn(dispose)),
            ..self
        }
    }

    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<KT, _>(self.qualifier);
        configurer.register_shared(key, self.provider, self.lifetime, self.disposer);
    }
}

impl<KT, KQ, P> ProviderBinding<KT, KQ, Transient, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    P: TypedProvider<Output = KT>,
{
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<KT, _>(self.qualifier);
        configurer.register(key, self.provider);
    }
}
