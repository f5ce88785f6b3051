use crate::{cli::Args, invocation::BenchmarkInvocation};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Error},
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, error, warn};
use ycsb_ingest::Binding;

// check if a file is executable
pub fn check_executable(path: &Path) -> Result<bool, ConfigErrors> {
    if !path.is_file() {
        Err(ConfigErrors::FileNotFound(path.to_path_buf()))
    } else {
        match File::open(path).map(|file| file.metadata()) {
            Ok(Ok(metadata)) => Ok((metadata.mode() & 0o111) != 0),
            Ok(Err(e)) | Err(e) => Err(ConfigErrors::MetadataNotFound(e)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),
    #[error("Metadata not found")]
    MetadataNotFound(#[from] Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Configuration is invalid, see the errors above")]
    Invalid,
}

/// Optional YAML file holding defaults for the command line
///
/// ```yaml
/// ycsb_dir: /opt/ycsb
/// output_dir: results
/// threads: 8
/// properties:
///   rocksdb: -p rocksdb.dir=/tmp/rocksdb
/// ```
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    pub ycsb_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub threads: Option<u32>,
    // seconds per phase, no timeout if absent
    pub timeout: Option<u64>,
    // extra `-p` properties per binding, appended verbatim
    #[serde(default)]
    pub properties: BTreeMap<Binding, String>,
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        if !path.is_file() {
            return Err(ConfigErrors::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        debug!("Loaded config from {path:?}: {config:?}");

        Ok(config)
    }

    /// Merge the command line over this config and validate the result
    ///
    /// All problems are reported before failing.
    pub fn merge(self, args: Args) -> Result<BenchmarkInvocation, ConfigErrors> {
        let mut contains_error = false;

        let ycsb_dir = args.ycsb_dir.or(self.ycsb_dir);
        if ycsb_dir.is_none() {
            error!("No YCSB directory given, use --ycsb-dir or set ycsb_dir in the config");
            contains_error = true;
        }

        let output_dir = args.output_dir.or(self.output_dir);
        if output_dir.is_none() {
            error!("No output directory given, use --output-dir or set output_dir in the config");
            contains_error = true;
        }

        let threads = args.threads.or(self.threads).unwrap_or(1);
        if threads == 0 {
            error!("threads cannot be 0, YCSB needs at least one client thread");
            contains_error = true;
        }

        let timeout = args.timeout.or(self.timeout);
        if timeout == Some(0) {
            error!("timeout cannot be 0, omit it to wait for YCSB indefinitely");
            contains_error = true;
        }

        if !args.workload.is_file() {
            error!(
                "Failed to find workload file at {}",
                args.workload.to_string_lossy()
            );
            contains_error = true;
        }

        let properties = match args.db_props {
            Some(properties) => {
                if self.properties.contains_key(&args.db) {
                    warn!("--db-props replaces properties.{} from the config", args.db);
                }
                properties
            }
            None => self.properties.get(&args.db).cloned().unwrap_or_default(),
        };
        // quoting follows the shell, `-p db.passwd="a b"` is one property
        let properties = match shell_words::split(&properties) {
            Ok(properties) => properties,
            Err(e) => {
                error!("Failed to split database properties `{properties}`: {e}");
                contains_error = true;
                Vec::new()
            }
        };

        match (ycsb_dir, output_dir) {
            (Some(ycsb_dir), Some(output_dir)) if !contains_error => Ok(BenchmarkInvocation {
                ycsb_dir,
                binding: args.db,
                workload: args.workload,
                threads,
                properties,
                output_dir,
                timeout: timeout.map(Duration::from_secs),
            }),
            _ => Err(ConfigErrors::Invalid),
        }
    }
}

/// Build the invocation from the command line, reading `--config` first if given
pub fn resolve(args: Args) -> Result<BenchmarkInvocation, ConfigErrors> {
    let config = match args.config.as_deref() {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };

    config.merge(args)
}
