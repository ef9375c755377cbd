//! Turning the flat list of input files into per-worker work.
//!
//! Files are first capped (`num-files`), then grouped into logical partitions of
//! `files-per-partition` consecutive files, and finally the partitions are spread
//! round-robin over the workers.

use fuzzdup_model::PipelineConfig;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{error::CoreError, partition::split_round_robin};

/// Keep at most `num_files` files, in input order.
pub fn limit_files<T>(mut files: Vec<T>, num_files: Option<usize>) -> Vec<T> {
    if let Some(limit) = num_files {
        files.truncate(limit);
    }
    files
}

/// Group consecutive files into partitions of `files_per_partition`; the last
/// group may be shorter.
pub fn group_files<T>(files: Vec<T>, files_per_partition: usize) -> Result<Vec<Vec<T>>, CoreError> {
    if files_per_partition == 0 {
        return Err(CoreError::InvalidFilesPerPartition(files_per_partition));
    }

    let mut groups = Vec::with_capacity(files.len().div_ceil(files_per_partition));
    let mut iter = files.into_iter().peekable();
    while iter.peek().is_some() {
        groups.push(iter.by_ref().take(files_per_partition).collect());
    }
    Ok(groups)
}

/// Static assignment of file partitions to workers, computed once up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkPlan<T> {
    workers: Vec<Vec<Vec<T>>>,
    total_files: usize,
}

impl<T> WorkPlan<T> {
    /// Cap, group and distribute `files` over `nworkers` workers.
    ///
    /// A zero worker count is rejected before any work is planned.
    #[instrument(level = "debug", skip(files, cfg), fields(files = files.len()))]
    pub fn build(files: Vec<T>, cfg: &PipelineConfig, nworkers: usize) -> Result<Self, CoreError> {
        if nworkers == 0 {
            return Err(CoreError::InvalidChunkCount(nworkers));
        }

        let files = limit_files(files, cfg.num_files());
        let total_files = files.len();
        let partitions = group_files(files, cfg.files_per_partition())?;
        debug!(partitions = partitions.len(), "grouped input files");

        let workers = split_round_robin(partitions, nworkers)?;
        Ok(Self {
            workers,
            total_files,
        })
    }

    /// Partitions assigned to each worker, indexed by worker.
    pub fn per_worker(&self) -> &[Vec<Vec<T>>] {
        &self.workers
    }

    pub fn worker(&self, idx: usize) -> Option<&[Vec<T>]> {
        self.workers.get(idx).map(Vec::as_slice)
    }

    pub fn nworkers(&self) -> usize {
        self.workers.len()
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn total_partitions(&self) -> usize {
        self.workers.iter().map(Vec::len).sum()
    }

    pub fn into_per_worker(self) -> Vec<Vec<Vec<T>>> {
        self.workers
    }
}

/// Emits a progress line every `every` processed partitions.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    every: usize,
    total: usize,
    processed: usize,
}

impl ProgressLog {
    pub fn new(every: usize, total: usize) -> Self {
        Self {
            every: every.max(1),
            total,
            processed: 0,
        }
    }

    pub fn from_config(cfg: &PipelineConfig, total: usize) -> Self {
        Self::new(cfg.log_frequency(), total)
    }

    /// Record one processed partition; returns `true` when a line was logged.
    pub fn tick(&mut self) -> bool {
        self.processed += 1;
        if self.processed % self.every != 0 {
            return false;
        }
        info!(
            processed = self.processed,
            total = self.total,
            "processed {} of {} partitions",
            self.processed,
            self.total
        );
        true
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("part-{i:03}.jsonl")).collect()
    }

    fn config(args: &[&str]) -> PipelineConfig {
        let argv = std::iter::once("stage").chain(args.iter().copied());
        PipelineConfig::try_parse_from(fuzzdup_model::DEFAULT_ABOUT, argv).unwrap()
    }

    #[test]
    fn limit_keeps_prefix() {
        assert_eq!(limit_files(files(5), Some(2)), files(2));
        assert_eq!(limit_files(files(5), Some(10)), files(5));
        assert_eq!(limit_files(files(5), None), files(5));
    }

    #[test]
    fn groups_are_contiguous() {
        let groups = group_files(vec![1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(groups, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn grouping_empty_list() {
        assert!(group_files(Vec::<u8>::new(), 3).unwrap().is_empty());
    }

    #[test]
    fn zero_group_size_is_rejected() {
        assert_eq!(
            group_files(vec![1, 2], 0),
            Err(CoreError::InvalidFilesPerPartition(0))
        );
    }

    #[test]
    fn plan_with_defaults() {
        let plan = WorkPlan::build(files(9), &PipelineConfig::default(), 2).unwrap();

        assert_eq!(plan.nworkers(), 2);
        assert_eq!(plan.total_files(), 9);
        assert_eq!(plan.total_partitions(), 5);

        let w0 = plan.worker(0).unwrap();
        assert_eq!(w0.len(), 3);
        assert_eq!(w0[0], vec!["part-000.jsonl", "part-001.jsonl"]);
        assert_eq!(w0[1], vec!["part-004.jsonl", "part-005.jsonl"]);
        assert_eq!(w0[2], vec!["part-008.jsonl"]);

        let w1 = plan.worker(1).unwrap();
        assert_eq!(w1[0], vec!["part-002.jsonl", "part-003.jsonl"]);
        assert_eq!(w1[1], vec!["part-006.jsonl", "part-007.jsonl"]);
        assert!(plan.worker(2).is_none());
    }

    #[test]
    fn plan_honours_file_cap_and_group_size() {
        let cfg = config(&["--num-files", "6", "--files-per-partition", "3"]);
        let plan = WorkPlan::build(files(100), &cfg, 4).unwrap();

        assert_eq!(plan.total_files(), 6);
        assert_eq!(plan.total_partitions(), 2);
        let sizes: Vec<usize> = plan.per_worker().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0]);
    }

    #[test]
    fn plan_keeps_every_file_once() {
        let input = files(37);
        let plan = WorkPlan::build(input.clone(), &PipelineConfig::default(), 3).unwrap();

        let mut seen: Vec<String> = plan
            .into_per_worker()
            .into_iter()
            .flatten()
            .flatten()
            .collect();
        seen.sort();
        assert_eq!(seen, input);
    }

    #[test]
    fn plan_rejects_zero_workers() {
        assert_eq!(
            WorkPlan::build(files(4), &PipelineConfig::default(), 0),
            Err(CoreError::InvalidChunkCount(0))
        );
    }

    #[test]
    fn progress_logs_on_frequency() {
        let cfg = config(&["--log-frequency", "3"]);
        let mut progress = ProgressLog::from_config(&cfg, 7);
        let logged: Vec<bool> = (0..7).map(|_| progress.tick()).collect();
        assert_eq!(
            logged,
            vec![false, false, true, false, false, true, false]
        );
        assert_eq!(progress.processed(), 7);
    }
}
