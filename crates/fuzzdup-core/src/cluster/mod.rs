//! Live cluster topology.
//!
//! The core only needs one thing from a cluster: the identities of the workers
//! currently registered with its scheduler. [`WorkerRegistry`] is that capability;
//! anything that manages a cluster implements it and keeps the rest of its API to
//! itself.

mod scheduler_info;
pub use scheduler_info::{SchedulerInfo, WorkerInfo};

use std::{collections::HashSet, convert::Infallible};

use tracing::debug;

/// Read-only view of the workers registered with a cluster scheduler.
pub trait WorkerRegistry {
    /// Failure reported when the cluster cannot be queried.
    type Error;

    /// Identities of the currently registered workers.
    fn workers(&self) -> Result<Vec<String>, Self::Error>;
}

impl<T> WorkerRegistry for &T
where
    T: WorkerRegistry + ?Sized,
{
    type Error = T::Error;

    fn workers(&self) -> Result<Vec<String>, Self::Error> {
        (**self).workers()
    }
}

/// Number of distinct workers currently registered with `registry`.
///
/// Queries on every call. A cluster with no workers yields `0`; callers that
/// divide work by this number must handle that. Query errors are returned as-is.
pub fn num_workers<R>(registry: &R) -> Result<usize, R::Error>
where
    R: WorkerRegistry + ?Sized,
{
    let workers = registry.workers()?;
    let count = workers.iter().map(String::as_str).collect::<HashSet<_>>().len();

    debug!(workers = count, "queried cluster topology");
    Ok(count)
}

/// Fixed set of worker identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticWorkers(Vec<String>);

impl StaticWorkers {
    pub fn new<I, S>(workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(workers.into_iter().map(Into::into).collect())
    }

    /// `count` workers of a single-node local cluster, named `local-0`, `local-1`, ...
    pub fn local(count: usize) -> Self {
        Self((0..count).map(|i| format!("local-{i}")).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl WorkerRegistry for StaticWorkers {
    type Error = Infallible;

    fn workers(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.0.clone())
    }
}
