//! Dependency injection with transient, scoped and singleton lifetimes.
//!
//! Bindings are declared by [`Module`]s and built into a [`Container`]. Each
//! binding has a [`Lifetime`] deciding when a resolution reuses an object:
//!
//! - transient objects are never reused;
//! - scoped objects are reused within one [`Scope`], or within the implicit
//!   root scope when resolved on the container;
//! - singletons are reused for the whole life of the container.
//!
//! ```rust
//! # use std::convert::Infallible;
//! # use std::error::Error;
//! # use std::sync::Arc;
//! use ioscope::prelude::*;
//!
//! struct Request;
//!
//! struct AppModule;
//!
//! impl Module for AppModule {
//!     fn configure(
//!         &self,
//!         configurer: &mut dyn Configurer,
//!     ) -> Result<(), Box<dyn Error + Send + Sync>> {
//!         bind::<Arc<Request>>()
//!             .as_scoped()
//!             .to_closure(|| Ok::<_, Infallible>(Arc::new(Request)))
//!             .set_on(configurer);
//!         Ok(())
//!     }
//! }
//!
//! let container = Container::init(AppModule).unwrap();
//! let scope = container.create_scope();
//! let first: Arc<Request> = scope.get(key::of()).unwrap();
//! let second: Arc<Request> = scope.get(key::of()).unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! let other: Arc<Request> = container.create_scope().get(key::of()).unwrap();
//! assert!(!Arc::ptr_eq(&first, &other));
//! ```
//!
//! [`Module`]: crate::module::Module
//! [`Container`]: crate::container::Container
//! [`Lifetime`]: crate::lifetime::Lifetime
//! [`Scope`]: crate::container::Scope

#![allow(clippy::new_without_default)]

pub mod container;
pub mod dispose;
pub mod key;
pub mod lifetime;
pub mod module;
pub mod provider;
mod util;

pub mod prelude {
    pub use crate::container::injector::{Injector, InjectorError, TypedInjector};
    pub use crate::container::registry::{Configurer, Registry, RegistryError, TypedConfigurer};
    pub use crate::container::{Container, ContainerOptions, DisposeError, Scope};
    pub use crate::dispose::Dispose;
    pub use crate::key;
    pub use crate::lifetime::{Scoped, Singleton, Transient};
    pub use crate::module::{bind, bind_key, Configuration, Module};
    pub use crate::provider::Component;
}
