use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{naming::Phase, IngestError};

/// Self-describing record written next to every log, so that the identity of a run does not depend
/// on how its log happens to be named.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunMetadata {
    pub database: String,
    pub workload: String,
    pub phase: Phase,
    pub timestamp: String,
    pub threads: u32,
    #[serde(default)]
    pub properties: String,
    pub command: String,
    // None when the process was killed or never spawned
    pub exit_code: Option<i32>,
    pub duration_secs: f64,
}

impl RunMetadata {
    /// `foo_run_20240101_000000.log` -> `foo_run_20240101_000000.meta.yaml`
    pub fn sidecar_path(log_path: &Path) -> PathBuf {
        log_path.with_extension("meta.yaml")
    }

    pub fn write(&self, log_path: &Path) -> Result<PathBuf, IngestError> {
        let path = Self::sidecar_path(log_path);
        let contents = serde_yaml::to_string(self)?;

        fs::write(&path, contents).map_err(|error| IngestError::WriteSidecar {
            path: path.clone(),
            source: error,
        })?;

        Ok(path)
    }

    /// read the sidecar belonging to `log_path`, `Ok(None)` if there is none
    pub fn read(log_path: &Path) -> Result<Option<Self>, IngestError> {
        let path = Self::sidecar_path(log_path);

        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(&path).map_err(|error| IngestError::ReadLog {
            path: path.clone(),
            source: error,
        })?;

        Ok(Some(serde_yaml::from_reader(BufReader::new(file))?))
    }
}
