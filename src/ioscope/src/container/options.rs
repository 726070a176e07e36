/// Settings of a [`Container`], fixed when it is built.
///
/// ```rust
/// # use ioscope::container::ContainerOptions;
/// let options = ContainerOptions::new().validate_scopes(true);
/// assert!(options.validates_scopes());
/// ```
///
/// [`Container`]: crate::container::Container
#[derive(Debug, Clone, Default)]
pub struct ContainerOptions {
    validate_scopes: bool,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, a [`Scoped`] binding can only be resolved inside a
    /// [`Scope`]. Resolving it on the container, directly or as a dependency
    /// of a singleton, fails with [`InjectorError::ShortLifetime`] instead of
    /// falling back to the implicit root scope. Disabled by default.
    ///
    /// [`Scoped`]: crate::lifetime::Scoped
    /// [`Scope`]: crate::container::Scope
    /// [`InjectorError::ShortLifetime`]: crate::container::injector::InjectorError::ShortLifetime
    pub fn validate_scopes(mut self, enabled: bool) -> Self {
        self.validate_scopes = enabled;
        self
    }

    pub fn validates_scopes(&self) -> bool {
        self.validate_scopes
    }
}
