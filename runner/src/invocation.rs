use std::{
    env,
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    time::Duration,
};
use ycsb_ingest::{Binding, Phase};

/// Everything needed to benchmark one binding with one workload
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkInvocation {
    pub ycsb_dir: PathBuf,
    pub binding: Binding,
    pub workload: PathBuf,
    pub threads: u32,
    // already split into separate arguments
    pub properties: Vec<String>,
    pub output_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl BenchmarkInvocation {
    pub fn binary_path(&self) -> PathBuf {
        self.ycsb_dir.join("bin").join("ycsb")
    }

    /// basename of the workload file, used in log names
    pub fn workload_name(&self) -> String {
        self.workload
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.workload.to_string_lossy().into_owned())
    }
}

/// A single YCSB execution as handed to an executor
#[derive(Debug, Clone)]
pub struct PhaseRequest<'a> {
    pub binary: &'a Path,
    pub phase: Phase,
    pub binding: Binding,
    pub workload: &'a Path,
    pub threads: u32,
    pub properties: &'a [String],
    pub timeout: Option<Duration>,
}

impl PhaseRequest<'_> {
    /// `{phase} {binding} -s -P {workload} -p threadcount={threads} {properties...}`
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.phase.as_str().into(),
            self.binding.as_str().into(),
            "-s".into(),
            "-P".into(),
            self.workload.as_os_str().to_owned(),
            "-p".into(),
            format!("threadcount={}", self.threads).into(),
        ];
        args.extend(self.properties.iter().map(OsString::from));

        args
    }

    /// human readable command, only used for reporting
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.as_os_str().to_owned())
            .chain(self.args())
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Anchor a relative path at the working directory without resolving symlinks
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}
