use std::fmt::{Display, Formatter, Result as FmtResult};

/// How long an object created by a container can be reused.
///
/// Lifetimes are ordered by how long the reuse lasts, so
/// `Transient < Scoped < Singleton`.
///
/// - [`Lifetime::Transient`]: every resolution constructs a new object and
///   the container keeps nothing.
/// - [`Lifetime::Scoped`]: one object per [`Scope`]. Resolutions made on the
///   container itself share the objects of an implicit root scope, which
///   lives as long as the container.
/// - [`Lifetime::Singleton`]: one object per container, whatever scope the
///   request comes from.
///
/// Note that reuse only concerns construction. Shared objects are handed out
/// as `Arc`s, so a caller can keep one alive after its scope is closed; the
/// container simply stops handing it out and disposes it if it was
/// registered as disposable.
///
/// [`Scope`]: crate::container::Scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifetime {
    Transient,
    Scoped,
    Singleton,
}

impl Lifetime {
    /// Returns true if objects of this lifetime are cached and shared.
    pub fn is_shared(self) -> bool {
        self != Self::Transient
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Self::Transient => "Transient",
            Self::Scoped => "Scoped",
            Self::Singleton => "Singleton",
        }
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

/// Type-level marker of [`Lifetime::Transient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transient;

/// Type-level marker of [`Lifetime::Scoped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scoped;

/// Type-level marker of [`Lifetime::Singleton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Singleton;

/// A type-level [`Lifetime`], used by the registration DSL to decide at
/// compile time whether a binding needs a shareable object.
#[allow(private_bounds)]
pub trait ToLifetime: Sealed + Copy + Send + Sync + 'static {
    const LIFETIME: Lifetime;
}

/// A [`ToLifetime`] whose objects are cached, i.e. [`Scoped`] or
/// [`Singleton`].
pub trait SharedLifetime: ToLifetime {}

trait Sealed {}

impl Sealed for Transient {}

impl Sealed for Scoped {}

impl Sealed for Singleton {}

impl ToLifetime for Transient {
    const LIFETIME: Lifetime = Lifetime::Transient;
}

impl ToLifetime for Scoped {
    const LIFETIME: Lifetime = Lifetime::Scoped;
}

impl ToLifetime for Singleton {
    const LIFETIME: Lifetime = Lifetime::Singleton;
}

impl SharedLifetime for Scoped {}

impl SharedLifetime for Singleton {}
