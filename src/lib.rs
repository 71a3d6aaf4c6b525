pub mod backend;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod key;
pub mod random;
pub mod report;
pub mod time;
pub mod workload;

pub mod prelude {
    pub use crate::backend::{BackendBuilder, CallbackBackend, KvBackend, MemoryBackend};
    #[cfg(feature = "redb")]
    pub use crate::backend::RedbBackend;
    #[cfg(feature = "sled")]
    pub use crate::backend::SledBackend;
    pub use crate::config::{normalize_args, BackendKind, BenchParams, RunConfig};
    pub use crate::context::BenchContext;
    pub use crate::dispatch::{BenchNames, BenchResult, Dispatcher, RunSummary};
    pub use crate::error::{BackendError, BenchError, ConfigError, ReportError};
    pub use crate::key::BenchKey;
    pub use crate::random::RandomBytePool;
    pub use crate::report::ReportWriter;
    pub use crate::workload::Benchmark;
}
