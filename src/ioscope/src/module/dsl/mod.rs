//! A fluent way to declare bindings inside [`Module::configure`].
//!
//! A declaration starts with [`bind`] or [`bind_key`], optionally changes
//! the qualifier and the lifetime, picks a provider and ends with `set_on`:
//!
//! ```rust
//! # use std::convert::Infallible;
//! # use std::sync::Arc;
//! # use ioscope::container::registry::Configurer;
//! # use ioscope::module::dsl::bind;
//! # fn configure(configurer: &mut dyn Configurer) {
//! bind::<Arc<String>>()
//!     .named("greeting")
//!     .as_singleton()
//!     .to_instance(Arc::new(String::from("hello")))
//!     .set_on(configurer);
//!
//! bind::<usize>()
//!     .to_closure(|greeting: Arc<String>| Ok::<_, Infallible>(greeting.len()))
//!     .set_on(configurer);
//! # }
//! ```
//!
//! Bindings are transient unless `as_scoped()` or `as_singleton()` is
//! called. Scoped and singleton bindings need a shareable target, e.g. an
//! `Arc`, which is checked at compile time by `set_on`.
//!
//! [`Module::configure`]: crate::module::Module::configure

mod metadata_helper;
mod provider_helper;

use crate::container::Managed;
use crate::key::TypedKey;
use crate::lifetime::Transient;

pub use metadata_helper::MetadataBinding;
pub use provider_helper::ProviderBinding;

/// Starts declaring an unqualified transient binding of `KT`.
pub fn bind<KT>() -> MetadataBinding<KT, (), Transient>
where
    KT: Managed,
{
    MetadataBinding::new((), Transient)
}

/// Starts declaring a transient binding of `key`.
pub fn bind_key<K>(key: K) -> MetadataBinding<K::Target, K::Qualifier, Transient>
where
    K: TypedKey,
{
    MetadataBinding::new(key.qualifier(), Transient)
}
