use std::{ffi::OsString, path::Path, path::PathBuf};

use clap::{Args, CommandFactory, FromArgMatches, Parser};
use serde::Serialize;

use crate::{error::ConfigError, protocol::Protocol, size::ByteSize};

/// Description used when a stage does not provide its own.
pub const DEFAULT_ABOUT: &str = "Default GPU fuzzy-dedup argument parser";

const DEFAULT_TEXT_FIELD: &str = "text";
const DEFAULT_ID_FIELD: &str = "adlr_id";
const DEFAULT_LOG_DIR: &str = "./logs/";
const DEFAULT_FILES_PER_PARTITION: usize = 2;
const DEFAULT_LOG_FREQUENCY: usize = 500;

// Arguments common to every stage of the pipeline. Stage binaries embed this with
// `#[command(flatten)]`, add their own flags and call `into_config` once.
//
// No doc comment on the struct: clap turns it into the parser's about text, which
// would replace the description of every parser flattening it.
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Input directories consisting of .jsonl files. Must be accessible to all nodes in the cluster.
    #[arg(long, num_args = 1.., value_name = "DIR")]
    pub input_data_dirs: Option<Vec<PathBuf>>,

    /// Address of the scheduler of an already running cluster. If neither this nor
    /// --scheduler-file is given, a single-node local cluster is started.
    #[arg(long, conflicts_with = "scheduler_file")]
    pub scheduler_address: Option<String>,

    /// Path to the scheduler file of an already running cluster.
    #[arg(long)]
    pub scheduler_file: Option<PathBuf>,

    /// Initial GPU memory pool size (e.g. 14GB, 5e9, or 0.9 for a fraction of device
    /// memory). Passed as-is to the cluster; only applies to a locally started cluster.
    #[arg(long)]
    pub rmm_pool_size: Option<String>,

    /// Transport for a locally started cluster.
    #[arg(long, value_enum, default_value_t = Protocol::Tcp)]
    pub protocol: Protocol,

    /// Start the local cluster with only NVLink enabled. Requires --protocol ucx and no
    /// external scheduler.
    #[arg(long)]
    pub nvlink_only: bool,

    /// Field of each JSON record holding the document text.
    #[arg(long, default_value = DEFAULT_TEXT_FIELD)]
    pub input_json_text_field: String,

    /// Field of each JSON record holding the unique document id.
    #[arg(long, default_value = DEFAULT_ID_FIELD)]
    pub input_json_id_field: String,

    /// Output directory for node and stage logs.
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Number of jsonl files combined into a single partition.
    #[arg(long, default_value_t = DEFAULT_FILES_PER_PARTITION)]
    pub files_per_partition: usize,

    /// Upper limit on the number of jsonl files to process.
    #[arg(long)]
    pub num_files: Option<usize>,

    /// Write a progress message every N processed partitions.
    #[arg(long, default_value_t = DEFAULT_LOG_FREQUENCY)]
    pub log_frequency: usize,

    /// Path to save the performance profile of the run.
    #[arg(long)]
    pub profile_path: Option<PathBuf>,
}

/// Where the stage gets its cluster from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterSource {
    /// Join a running cluster by scheduler address.
    Address(String),
    /// Join a running cluster described by a scheduler file.
    File(PathBuf),
    /// Start a single-node cluster on this machine.
    Local {
        protocol: Protocol,
        rmm_pool_size: Option<String>,
        nvlink_only: bool,
    },
}

impl ClusterSource {
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, ClusterSource::Local { .. })
    }
}

/// Validated, immutable pipeline configuration.
///
/// Built once per process and handed by reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    input_data_dirs: Vec<PathBuf>,
    cluster: ClusterSource,
    text_field: String,
    id_field: String,
    log_dir: PathBuf,
    files_per_partition: usize,
    num_files: Option<usize>,
    log_frequency: usize,
    profile_path: Option<PathBuf>,
}

impl PipelineArgs {
    /// Validate the raw arguments and freeze them into a [`PipelineConfig`].
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        if self.files_per_partition == 0 {
            return Err(ConfigError::InvalidValue {
                arg: "files-per-partition",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.log_frequency == 0 {
            return Err(ConfigError::InvalidValue {
                arg: "log-frequency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_files == Some(0) {
            return Err(ConfigError::InvalidValue {
                arg: "num-files",
                reason: "must be at least 1 when given".to_string(),
            });
        }
        if self.input_json_text_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                arg: "input-json-text-field",
                reason: "must not be empty".to_string(),
            });
        }
        if self.input_json_id_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                arg: "input-json-id-field",
                reason: "must not be empty".to_string(),
            });
        }

        let cluster = match (self.scheduler_address, self.scheduler_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict(
                    "--scheduler-address and --scheduler-file are mutually exclusive".to_string(),
                ));
            }
            (Some(addr), None) => ClusterSource::Address(addr),
            (None, Some(file)) => ClusterSource::File(file),
            (None, None) => ClusterSource::Local {
                protocol: self.protocol,
                rmm_pool_size: self.rmm_pool_size,
                nvlink_only: self.nvlink_only,
            },
        };

        if self.nvlink_only {
            if !cluster.is_local() {
                return Err(ConfigError::Conflict(
                    "--nvlink-only only applies to a locally started cluster".to_string(),
                ));
            }
            if !self.protocol.supports_nvlink() {
                return Err(ConfigError::Conflict(format!(
                    "--nvlink-only requires --protocol ucx (got {})",
                    self.protocol
                )));
            }
        }

        Ok(PipelineConfig {
            input_data_dirs: self.input_data_dirs.unwrap_or_default(),
            cluster,
            text_field: self.input_json_text_field,
            id_field: self.input_json_id_field,
            log_dir: self.log_dir,
            files_per_partition: self.files_per_partition,
            num_files: self.num_files,
            log_frequency: self.log_frequency,
            profile_path: self.profile_path,
        })
    }
}

#[derive(Debug, Parser)]
struct PipelineCli {
    #[command(flatten)]
    args: PipelineArgs,
}

impl PipelineConfig {
    /// Parse the process arguments with the given parser description.
    ///
    /// Prints the usage message and exits the process on malformed arguments.
    pub fn parse(about: &'static str) -> Self {
        Self::try_parse_from(about, std::env::args_os())
            .unwrap_or_else(|e| e.exit(&mut PipelineCli::command().about(about)))
    }

    /// Parse `args` (the first item is the binary name) into a validated config.
    ///
    /// Every error, including validation failures, is returned as
    /// [`ConfigError::Parse`] so it renders with the usage message.
    pub fn try_parse_from<I, T>(about: &'static str, args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = PipelineCli::command().about(about).long_about(None);
        let matches = cmd.try_get_matches_from_mut(args)?;
        let cli = PipelineCli::from_arg_matches(&matches)?;
        cli.args
            .into_config()
            .map_err(|e| ConfigError::Parse(e.with_usage(&mut cmd)))
    }

    pub fn input_data_dirs(&self) -> &[PathBuf] {
        &self.input_data_dirs
    }

    pub fn cluster(&self) -> &ClusterSource {
        &self.cluster
    }

    pub fn protocol(&self) -> Option<Protocol> {
        match &self.cluster {
            ClusterSource::Local { protocol, .. } => Some(*protocol),
            _ => None,
        }
    }

    /// RMM pool size as given on the command line, local clusters only.
    pub fn rmm_pool_size(&self) -> Option<&str> {
        match &self.cluster {
            ClusterSource::Local { rmm_pool_size, .. } => rmm_pool_size.as_deref(),
            _ => None,
        }
    }

    /// RMM pool size in bytes, when it is written as an absolute size.
    ///
    /// `None` for fractions of device memory and spellings only the cluster
    /// collaborator understands.
    pub fn rmm_pool_bytes(&self) -> Option<u64> {
        self.rmm_pool_size()
            .and_then(|raw| raw.parse::<ByteSize>().ok())
            .map(|size| size.bytes())
    }

    /// RMM pool size as a fraction of device memory, when written as one.
    pub fn rmm_pool_fraction(&self) -> Option<f64> {
        self.rmm_pool_size().and_then(ByteSize::device_fraction)
    }

    pub fn nvlink_only(&self) -> bool {
        matches!(self.cluster, ClusterSource::Local { nvlink_only: true, .. })
    }

    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn files_per_partition(&self) -> usize {
        self.files_per_partition
    }

    pub fn num_files(&self) -> Option<usize> {
        self.num_files
    }

    pub fn log_frequency(&self) -> usize {
        self.log_frequency
    }

    pub fn profile_path(&self) -> Option<&Path> {
        self.profile_path.as_deref()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_data_dirs: Vec::new(),
            cluster: ClusterSource::Local {
                protocol: Protocol::default(),
                rmm_pool_size: None,
                nvlink_only: false,
            },
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            files_per_partition: DEFAULT_FILES_PER_PARTITION,
            num_files: None,
            log_frequency: DEFAULT_LOG_FREQUENCY,
            profile_path: None,
        }
    }
}
