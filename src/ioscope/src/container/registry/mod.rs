//! Building containers from modules.

mod configurer;
mod provider_map;

use std::error::Error;

use snafu::prelude::*;

use crate::container::{ContainerOptions, SharedManaged};
use crate::dispose::Disposer;
use crate::key::{Key, TypedKey};
use crate::lifetime::{Lifetime, SharedLifetime};
use crate::module::Module;
use crate::provider::{Provider, SharedProvider, TypedProvider, TypedSharedProvider};
use crate::util::display::AggregatedDisplayer;

pub(super) use configurer::ConfigurerImpl;
pub(super) use provider_map::{ProviderEntry, ProviderKind, ProviderMap};

/// Something that can be built once from the bindings declared by a
/// [`Module`].
pub trait Registry: Sized + Send + Sync + 'static {
    /// Builds `Self` with the default [`ContainerOptions`].
    ///
    /// # Errors
    ///
    /// Returns every error reported while the module declared its bindings,
    /// aggregated if there is more than one.
    fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        Self::init_with_options(module, ContainerOptions::default())
    }

    /// Builds `Self` with the given [`ContainerOptions`].
    ///
    /// # Errors
    ///
    /// Returns every error reported while the module declared its bindings,
    /// aggregated if there is more than one.
    fn init_with_options<M>(module: M, options: ContainerOptions) -> Result<Self, RegistryError>
    where
        M: Module;
}

/// The sink of the bindings declared by a [`Module`].
///
/// Bindings are usually declared with the [`dsl`] rather than through this
/// trait directly.
///
/// [`dsl`]: crate::module::dsl
pub trait Configurer: Send + Sync + 'static {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    /// Records that `module` failed to declare its bindings. The error is
    /// returned when the registry is built.
    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

trait ConfigurerPrivate {
    fn dyn_register(&mut self, key: Box<dyn Key>, provider: Box<dyn Provider>);

    fn dyn_register_shared(
        &mut self,
        key: Box<dyn Key>,
        provider: Box<dyn SharedProvider>,
        lifetime: Lifetime,
        disposer: Option<Disposer>,
    );
}

pub trait TypedConfigurer: Configurer {
    /// Binds `key` to a transient `provider`.
    fn register<K, P>(&mut self, key: K, provider: P)
    where
        K: TypedKey,
        P: TypedProvider<Output = K::Target>,
    {
        self.as_private()
            .dyn_register(Box::new(key), Box::new(provider));
    }

    /// Binds `key` to a `provider` whose objects are cached for `lifetime`.
    /// Cached objects are released with `disposer`, if any, when their
    /// owning scope ends.
    fn register_shared<K, P, L>(
        &mut self,
        key: K,
        provider: P,
        _lifetime: L,
        disposer: Option<Disposer>,
    ) where
        K: TypedKey,
        K::Target: SharedManaged,
        P: TypedSharedProvider<Output = K::Target>,
        L: SharedLifetime,
    {
        self.as_private().dyn_register_shared(
            Box::new(key),
            Box::new(provider),
            L::LIFETIME,
            disposer,
        );
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("the key {key} is bound more than once"))]
    #[non_exhaustive]
    KeyDuplicated { key: Box<dyn Key> },
    #[snafu(display("module {module} could not declare its bindings"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("{} registry errors occurred:\n{}", errors.len(), AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

impl RegistryError {
    /// Merges several errors into one, keeping a single error as is.
    pub(super) fn aggregate(mut errors: Vec<RegistryError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregated { errors }),
        }
    }
}
