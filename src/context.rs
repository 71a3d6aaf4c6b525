use crate::config::RunConfig;
use crate::error::BackendError;
use crate::random::RandomBytePool;
use crate::workload::Benchmark;

/// Mutable state of one benchmark run.
///
/// Created right before the run and dropped right after it. `H` is the handle
/// the backend returns from `open`; it lives in the context until `close`.
pub struct BenchContext<'a, H> {
    success: bool,
    fresh_db: bool,
    benchmark: Benchmark,
    num: usize,
    num_reads: usize,
    key_space: usize,
    value_size: usize,
    start_ms: u64,
    end_ms: u64,
    db: Option<H>,
    pool: &'a RandomBytePool,
    rnd_data_pos: usize,
}

impl<'a, H> BenchContext<'a, H> {
    pub fn new(benchmark: Benchmark, config: &RunConfig, pool: &'a RandomBytePool) -> Self {
        BenchContext {
            success: false,
            fresh_db: benchmark.requires_fresh_db(),
            benchmark,
            num: config.num(),
            num_reads: config.num_reads(),
            key_space: config.num(),
            value_size: config.value_size(),
            start_ms: 0,
            end_ms: 0,
            db: None,
            pool,
            rnd_data_pos: 0,
        }
    }

    /// Overrides the fresh-database flag derived from the benchmark.
    pub fn with_fresh_db(mut self, fresh_db: bool) -> Self {
        self.fresh_db = fresh_db;
        self
    }

    pub fn name(&self) -> &'static str {
        self.benchmark.name()
    }

    pub fn benchmark(&self) -> Benchmark {
        self.benchmark
    }

    /// True if the run expects (and the backend must provide) an empty database.
    pub fn fresh_db(&self) -> bool {
        self.fresh_db
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Records written or deleted by this run.
    pub fn num(&self) -> usize {
        self.num
    }

    /// Lookups issued by the read benchmarks.
    pub fn num_reads(&self) -> usize {
        self.num_reads
    }

    /// Random keys are drawn from `[0, key_space)`.
    pub fn key_space(&self) -> usize {
        self.key_space
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    pub fn db(&self) -> Result<&H, BackendError> {
        self.db.as_ref().ok_or(BackendError::NotOpen)
    }

    pub fn db_mut(&mut self) -> Result<&mut H, BackendError> {
        self.db.as_mut().ok_or(BackendError::NotOpen)
    }

    /// Removes the handle, typically from within `close`.
    pub fn take_db(&mut self) -> Result<H, BackendError> {
        self.db.take().ok_or(BackendError::NotOpen)
    }

    /// Next `value_size` bytes from the random pool.
    pub fn next_value(&mut self) -> &'a [u8] {
        let pool: &'a RandomBytePool = self.pool;
        pool.next_slice(&mut self.rnd_data_pos, self.value_size)
    }

    pub(crate) fn set_db(&mut self, db: H) {
        self.db = Some(db);
    }

    pub(crate) fn set_num(&mut self, num: usize) {
        self.num = num;
    }

    pub(crate) fn set_value_size(&mut self, value_size: usize) {
        self.value_size = value_size;
    }

    pub(crate) fn set_success(&mut self, success: bool) {
        self.success = success;
    }

    pub(crate) fn set_start_ms(&mut self, ms: u64) {
        self.start_ms = ms;
    }

    pub(crate) fn set_end_ms(&mut self, ms: u64) {
        self.end_ms = ms;
    }
}

impl<H> std::fmt::Debug for BenchContext<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchContext")
            .field("name", &self.name())
            .field("success", &self.success)
            .field("fresh_db", &self.fresh_db)
            .field("num", &self.num)
            .field("num_reads", &self.num_reads)
            .field("key_space", &self.key_space)
            .field("value_size", &self.value_size)
            .field("start_ms", &self.start_ms)
            .field("end_ms", &self.end_ms)
            .field("open", &self.db.is_some())
            .finish()
    }
}
