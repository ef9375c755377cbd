use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use tracing::{debug, info};

use fuzzdup_core::{
    ProgressLog, SchedulerInfo, StaticWorkers, Timed, WorkPlan, WorkerRegistry, num_workers,
};
use fuzzdup_model::{ClusterSource, PipelineArgs, PipelineConfig};
use fuzzdup_observe::{LogFormat, LoggerConfig, init_logger};

/// Plan the per-worker file assignment of a fuzzy-dedup stage.
#[derive(Debug, Parser)]
#[command(name = "stage")]
struct Cli {
    #[command(flatten)]
    common: PipelineArgs,

    /// Number of workers in the local cluster when no scheduler is given.
    #[arg(long, default_value_t = 1)]
    local_workers: usize,

    /// Log output format (text|json|journald).
    #[arg(long, default_value = "text")]
    logger_format: LogFormat,

    /// Log filter directive.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match cli.common.into_config() {
        Ok(config) => config,
        Err(e) => e.exit(&mut Cli::command()),
    };

    // 1) Logger
    let logger = LoggerConfig::default()
        .with_format(cli.logger_format)
        .with_filter(cli.log_level);
    init_logger(&logger)?;
    info!(config = %serde_json::to_string(&config)?, "pipeline configured");

    // 2) Cluster topology
    let registry = cluster_snapshot(&config, cli.local_workers)?;
    let nworkers = num_workers(registry.as_ref())?;
    info!(workers = nworkers, "cluster ready");

    // 3) Plan
    let files = list_jsonl_files(config.input_data_dirs())?;
    let plan = Timed::new("plan_work").run(|| WorkPlan::build(files, &config, nworkers))?;
    info!(
        files = plan.total_files(),
        partitions = plan.total_partitions(),
        "work planned"
    );

    // 4) Dispatch (logged only)
    let mut progress = ProgressLog::from_config(&config, plan.total_partitions());
    for (worker, partitions) in plan.per_worker().iter().enumerate() {
        for partition in partitions {
            debug!(worker, files = ?partition, "assigned partition");
            progress.tick();
        }
    }

    info!(processed = progress.processed(), "stage finished");
    Ok(())
}

fn cluster_snapshot(
    config: &PipelineConfig,
    local_workers: usize,
) -> anyhow::Result<Box<dyn WorkerRegistry<Error = std::convert::Infallible>>> {
    match config.cluster() {
        ClusterSource::Local { protocol, .. } => {
            info!(%protocol, workers = local_workers, "using local cluster");
            Ok(Box::new(StaticWorkers::local(local_workers)))
        }
        ClusterSource::File(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading scheduler file {}", path.display()))?;
            let info: SchedulerInfo = serde_json::from_str(&raw)
                .with_context(|| format!("parsing scheduler file {}", path.display()))?;
            Ok(Box::new(info))
        }
        ClusterSource::Address(addr) => {
            bail!("joining a running scheduler at {addr} needs a cluster client")
        }
    }
}

fn list_jsonl_files(dirs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in dirs {
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let path = entry?.path();
            if is_jsonl(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_jsonl(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl")
}
