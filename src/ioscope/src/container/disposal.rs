use std::error::Error;

use snafu::prelude::*;

use crate::container::{ScopeLevel, SharedManaged};
use crate::dispose::Disposer;
use crate::key::Key;
use crate::util::display::AggregatedDisplayer;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DisposeError {
    #[snafu(display("could not dispose the object {key}"))]
    #[non_exhaustive]
    Object {
        key: Box<dyn Key>,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("the {scope} scope is already closed"))]
    #[non_exhaustive]
    AlreadyClosed { scope: ScopeLevel },
    #[snafu(display("{} objects could not be disposed:\n{}", errors.len(), AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<DisposeError> },
}

/// A cached object waiting to be disposed when its scope closes.
pub(super) struct Disposal {
    key: Box<dyn Key>,
    object: Box<dyn SharedManaged>,
    disposer: Disposer,
}

impl Disposal {
    pub fn new(key: Box<dyn Key>, object: Box<dyn SharedManaged>, disposer: Disposer) -> Self {
        Self {
            key,
            object,
            disposer,
        }
    }

    pub fn run(self) -> Result<(), DisposeError> {
        tracing::trace!(key = %self.key, "disposing object");
        self.disposer
            .dispose(self.object.as_managed())
            .map_err(|source| DisposeError::Object {
                key: self.key,
                source,
            })
    }
}

/// Runs `disposals` from the last to the first, attempting each of them.
pub(super) fn dispose_all(disposals: Vec<Disposal>) -> Result<(), DisposeError> {
    let mut errors: Vec<DisposeError> = disposals
        .into_iter()
        .rev()
        .filter_map(|disposal| disposal.run().err())
        .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(DisposeError::Aggregated { errors }),
    }
}
