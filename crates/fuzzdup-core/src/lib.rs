pub mod error;
pub use error::CoreError;

pub mod cluster;
pub use cluster::{SchedulerInfo, StaticWorkers, WorkerInfo, WorkerRegistry, num_workers};

pub mod partition;
pub use partition::split_round_robin;

pub mod plan;
pub use plan::{ProgressLog, WorkPlan, group_files, limit_files};

pub mod timer;
pub use timer::{Elapsed, Timed, TimingReport, TracingReport, timed};
