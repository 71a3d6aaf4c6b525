use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::ConfigError;
use crate::random::RND_DATA_SZ;

/// Benchmarks run when `-b` is not given.
pub const DEFAULT_BENCHMARKS: &str = "fillrandom,\
                                      fillsync,\
                                      fillseq,\
                                      overwrite,\
                                      readrandom,\
                                      readseq,\
                                      readreverse,\
                                      readhot,\
                                      readmissing,\
                                      deleteseq,\
                                      fillseq,\
                                      deleterandom,\
                                      fill100K";

pub const DEFAULT_NUM: i64 = 1_000_000;
pub const DEFAULT_VALUE_SIZE: i64 = 100;

/// Record counts at or below this are rejected.
pub const MIN_NUM_EXCLUSIVE: i64 = 1000;

/// Largest record count whose indices all fit in a 16-digit key.
pub const MAX_NUM: i64 = 10_000_000_000_000_000;

pub const BENCHMARK_HELP: &str = "Available benchmarks:
  fillseq        write N values in sequential key order in async mode
  fillrandom     write N values in random key order in async mode
  overwrite      overwrite N values in random key order in async mode
  fillsync       write N/10 values in random key order in sync mode
  fill100K       write N/100 100K values in random order in async mode
  deleteseq      delete N keys in sequential order
  deleterandom   delete N keys in random order
  readseq        read N times sequentially
  readreverse    read N times in reverse order
  readrandom     read N times in random order
  readmissing    read N missing keys in random order
  readhot        read N times in random order from 1% section of DB
  seekrandom     N random seeks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// In-memory ordered map
    Memory,
    /// sled (requires the `sled` feature)
    Sled,
    /// redb (requires the `redb` feature)
    Redb,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Sled => "sled",
            BackendKind::Redb => "redb",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "kvbench", about = "Key-value storage engine benchmark", after_help = BENCHMARK_HELP)]
pub struct BenchParams {
    /// Number of stored records
    #[clap(short = 'n', long = "num", default_value_t = DEFAULT_NUM, allow_negative_numbers = true)]
    pub num: i64,

    /// Number of records to read (equals to number of stored records if not specified)
    #[clap(short = 'r', long = "reads", allow_negative_numbers = true)]
    pub num_reads: Option<i64>,

    /// Size of a single record value in bytes
    #[clap(short = 'z', long = "value-size", visible_alias = "vz", default_value_t = DEFAULT_VALUE_SIZE, allow_negative_numbers = true)]
    pub value_size: i64,

    /// Comma separated benchmarks to run
    #[clap(short = 'b', long, default_value = DEFAULT_BENCHMARKS)]
    pub benchmarks: String,

    /// CSV report file
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Storage engine under test
    #[clap(long, value_enum, default_value_t = BackendKind::Memory)]
    pub backend: BackendKind,

    /// Database location. A temporary directory is used if not set
    #[clap(long)]
    pub db_path: Option<PathBuf>,
}

/// Rewrites the legacy single-dash `-vz` option into `--vz`.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            if arg == "-vz" {
                "--vz".to_string()
            } else {
                arg
            }
        })
        .collect()
}

/// Validated run parameters. Built once and shared read-only by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    num: usize,
    num_reads: usize,
    value_size: usize,
    benchmarks: String,
    report: Option<PathBuf>,
}

impl RunConfig {
    /// Validates and builds a configuration.
    ///
    /// * `num` must be greater than 1000 and at most [`MAX_NUM`].
    /// * `num_reads` falls back to `num` when absent or negative.
    /// * `value_size` must be positive and fit in the random data pool.
    pub fn new(
        num: i64,
        num_reads: Option<i64>,
        value_size: i64,
        benchmarks: impl Into<String>,
        report: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if num <= MIN_NUM_EXCLUSIVE || num > MAX_NUM {
            return Err(ConfigError::InvalidNum(num));
        }
        if value_size <= 0 {
            return Err(ConfigError::InvalidValueSize(value_size));
        }
        let num = usize::try_from(num).map_err(|_| ConfigError::InvalidNum(num))?;
        let value_size = usize::try_from(value_size)
            .map_err(|_| ConfigError::InvalidValueSize(value_size))?;
        if value_size > RND_DATA_SZ {
            return Err(ConfigError::ValueSizeTooLarge {
                size: value_size,
                max: RND_DATA_SZ,
            });
        }
        let num_reads = match num_reads {
            Some(r) if r >= 0 => usize::try_from(r).unwrap_or(num),
            _ => num,
        };
        Ok(RunConfig {
            num,
            num_reads,
            value_size,
            benchmarks: benchmarks.into(),
            report,
        })
    }

    pub fn num(&self) -> usize {
        self.num
    }

    pub fn num_reads(&self) -> usize {
        self.num_reads
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn benchmarks(&self) -> &str {
        &self.benchmarks
    }

    pub fn report(&self) -> Option<&PathBuf> {
        self.report.as_ref()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            num: DEFAULT_NUM as usize,
            num_reads: DEFAULT_NUM as usize,
            value_size: DEFAULT_VALUE_SIZE as usize,
            benchmarks: DEFAULT_BENCHMARKS.to_string(),
            report: None,
        }
    }
}

impl TryFrom<&BenchParams> for RunConfig {
    type Error = ConfigError;

    fn try_from(params: &BenchParams) -> Result<Self, Self::Error> {
        RunConfig::new(
            params.num,
            params.num_reads,
            params.value_size,
            params.benchmarks.clone(),
            params.report.clone(),
        )
    }
}

impl std::fmt::Display for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "num records: {}, read num records: {}, value size: {}, benchmarks: {}, report: {}",
            self.num,
            self.num_reads,
            self.value_size,
            self.benchmarks,
            self.report
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string())
        )
    }
}
