use std::{collections::BTreeMap, convert::Infallible};

use serde::{Deserialize, Serialize};

use super::WorkerRegistry;

/// Snapshot of a scheduler's identity, as published in its info document or
/// scheduler file.
///
/// Only the fields the pipeline cares about are modelled; everything else in the
/// document is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Registered workers keyed by worker address.
    #[serde(default)]
    pub workers: BTreeMap<String, WorkerInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nthreads: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

impl WorkerRegistry for SchedulerInfo {
    type Error = Infallible;

    fn workers(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.workers.keys().cloned().collect())
    }
}
