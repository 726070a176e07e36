//! Declaring bindings.

pub mod dsl;

use std::any;
use std::error::Error;

use crate::container::registry::Configurer;

pub use dsl::{bind, bind_key};

/// A reusable group of bindings.
///
/// ```rust
/// # use std::error::Error;
/// # use std::sync::Arc;
/// # use std::convert::Infallible;
/// # use ioscope::prelude::*;
/// struct Clock;
///
/// struct ClockModule;
///
/// impl Module for ClockModule {
///     fn configure(
///         &self,
///         configurer: &mut dyn Configurer,
///     ) -> Result<(), Box<dyn Error + Send + Sync>> {
///         bind::<Arc<Clock>>()
///             .as_singleton()
///             .to_closure(|| Ok::<_, Infallible>(Arc::new(Clock)))
///             .set_on(configurer);
///         Ok(())
///     }
/// }
/// ```
pub trait Module: 'static {
    /// The name reported along with the errors of this module.
    fn name(&self) -> &'static str {
        any::type_name::<Self>()
    }

    /// Declares the bindings of this module on `configurer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module can't declare its bindings. The error
    /// is reported when the registry is built; registration errors such as
    /// duplicated keys are reported by `configurer` itself.
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    #[doc(hidden)]
    fn setup(&self, configurer: &mut dyn Configurer) {
        if let Err(err) = self.configure(configurer) {
            configurer.report_module_error(self.name(), err);
        }
    }
}

/// A [`Module`] made of other modules, configured in the order they are
/// added.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn compose(mut self, mut other: Configuration) -> Self {
        self.modules.append(&mut other.modules);
        self
    }
}

impl Module for Configuration {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        for module in &self.modules {
            module.setup(configurer);
        }
        Ok(())
    }
}
