use std::any::TypeId;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::container::core::ContainerCore;
use crate::container::injector::{CallContext, Injector, InjectorError};
use crate::container::{DisposeError, Managed};
use crate::key::Key;

/// A unique identifier of a [`Scope`] within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(super) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Where a resolution happens: on the container itself, i.e. its implicit
/// root scope, or in a [`Scope`] created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
    Root,
    Child(ScopeId),
}

impl Display for ScopeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Root => write!(f, "root"),
            Self::Child(id) => write!(f, "scope-{id}"),
        }
    }
}

/// A scope is open until it is closed explicitly or its last handle is
/// dropped. It never opens again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeState {
    Open,
    Closed,
}

/// A short-lived unit of work created by [`Container::create_scope`].
///
/// A scope caches one object per [`Scoped`] binding and forwards
/// [`Singleton`] requests to its container. Transient objects are built in
/// the scope, so their scoped dependencies come from the scope as well.
///
/// Handles are cheap to clone and share the same cache. When the scope is
/// closed, its disposable objects are disposed in the reverse order of
/// their creation.
///
/// [`Container::create_scope`]: crate::container::Container::create_scope
/// [`Scoped`]: crate::lifetime::Scoped
/// [`Singleton`]: crate::lifetime::Singleton
#[derive(Clone)]
pub struct Scope {
    id: ScopeId,
    core: Arc<ContainerCore>,
}

impl Scope {
    pub(super) fn new(id: ScopeId, core: ContainerCore) -> Self {
        Self {
            id,
            core: Arc::new(core),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn state(&self) -> ScopeState {
        self.core.state()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ScopeState::Closed
    }

    /// Closes the scope for every handle and disposes its disposable
    /// objects. Later resolutions fail with [`InjectorError::ScopeClosed`].
    ///
    /// # Errors
    ///
    /// Returns [`DisposeError::AlreadyClosed`] if the scope is already closed,
    /// or the errors raised by disposers. Every disposer runs even if some of
    /// them fail.
    pub fn close(&self) -> Result<(), DisposeError> {
        self.core.close()
    }
}

impl Debug for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Injector for Scope {
    fn dyn_get(&self, key: &dyn Key) -> Result<Box<dyn Managed>, InjectorError> {
        self.core.dyn_get(key)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &dyn Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn Managed>, InjectorError> {
        self.core.dyn_get_dependency(key, context)
    }

    fn keys(&self, type_id: TypeId) -> Vec<Box<dyn Key>> {
        self.core.keys(type_id)
    }
}
