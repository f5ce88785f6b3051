use clap::Parser;
use std::path::PathBuf;
use ycsb_ingest::Binding;

/// Run the YCSB load and run phase against a single database binding
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YCSB directory (containing bin/ycsb)
    #[arg(long)]
    pub ycsb_dir: Option<PathBuf>,

    /// Database binding to use
    #[arg(long, value_enum)]
    pub db: Binding,

    /// Path to the workload config file
    #[arg(long)]
    pub workload: PathBuf,

    /// Number of client threads [default: 1]
    #[arg(long)]
    pub threads: Option<u32>,

    /// Directory to save the logs to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Additional DB properties (e.g., "-p rocksdb.dir=/tmp/rocksdb")
    #[arg(long, allow_hyphen_values = true)]
    pub db_props: Option<String>,

    /// Kill a phase after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// YAML file with defaults for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,
}
