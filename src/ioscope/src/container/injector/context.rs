use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter;

use crate::key::Key;

/// Information about an ongoing resolution, passed down to providers so that
/// the dependencies they request are attributed to the object they build.
#[derive(Clone)]
pub struct CallContext<'a> {
    trace: InjectionTrace<'a>,
}

impl<'a> CallContext<'a> {
    pub fn new(key: &'a dyn Key) -> Self {
        Self {
            trace: InjectionTrace::new(key),
        }
    }

    /// Returns the context of a dependency of the current object.
    pub fn append<'b>(&'b self, key: &'b dyn Key) -> CallContext<'b> {
        CallContext {
            trace: self.trace.append(key),
        }
    }

    /// Returns the key of the object being resolved.
    pub fn key(&self) -> &dyn Key {
        self.trace.key()
    }

    pub fn trace(&self) -> &InjectionTrace<'_> {
        &self.trace
    }
}

/// The chain of keys from the object requested by the caller down to the
/// object currently being resolved.
#[derive(Clone)]
pub struct InjectionTrace<'a> {
    key: &'a dyn Key,
    previous: Option<&'a InjectionTrace<'a>>,
}

impl<'a> InjectionTrace<'a> {
    pub fn new(key: &'a dyn Key) -> Self {
        Self {
            key,
            previous: None,
        }
    }

    pub fn append<'b>(&'b self, key: &'b dyn Key) -> InjectionTrace<'b> {
        InjectionTrace {
            key,
            previous: Some(self),
        }
    }

    pub fn key(&self) -> &dyn Key {
        self.key
    }

    pub fn previous(&self) -> Option<&InjectionTrace<'a>> {
        self.previous
    }

    /// Iterates from the current key back to the key requested by the caller.
    pub fn keys(&self) -> impl Iterator<Item = &dyn Key> + '_ {
        iter::successors(Some(self), |trace| trace.previous()).map(InjectionTrace::key)
    }

    /// Returns true if `key` is already being resolved by an enclosing
    /// request, excluding the current one.
    pub fn previous_exist_key(&self, key: &dyn Key) -> bool {
        self.keys().skip(1).any(|previous| previous == key)
    }
}

impl Display for InjectionTrace<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut keys: Vec<_> = self.keys().collect();
        keys.reverse();
        for (i, key) in keys.into_iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::key;

    use super::*;

    #[test]
    fn injection_trace_previous_exist_key_succeeds() {
        let app = key::named::<i32>("app");
        let repo = key::named::<i32>("repo");
        let db = key::named::<i32>("db");

        let context = CallContext::new(&app);
        let context = context.append(&repo);
        let context = context.append(&db);

        assert!(context.trace().previous_exist_key(&app));
        assert!(context.trace().previous_exist_key(&repo));
        assert!(!context.trace().previous_exist_key(&db));
        assert_eq!(context.key(), &db as &dyn Key);
    }

    #[test]
    fn injection_trace_display_succeeds() {
        let app = key::named::<i32>("app");
        let db = key::named::<i32>("db");

        let context = CallContext::new(&app);
        let context = context.append(&db);

        assert_eq!(
            context.trace().to_string(),
            "i32@\"app\" -> i32@\"db\""
        );
    }
}
