mod callback;
mod memory;
#[cfg(feature = "redb")]
mod redb_backend;
#[cfg(feature = "sled")]
mod sled_backend;
#[cfg(test)]
pub(crate) mod test_util;

pub use callback::{BackendBuilder, CallbackBackend};
pub use memory::MemoryBackend;
#[cfg(feature = "redb")]
pub use redb_backend::RedbBackend;
#[cfg(feature = "sled")]
pub use sled_backend::SledBackend;

use crate::context::BenchContext;
use crate::error::BackendError;

/// Capabilities a storage engine must provide to be benchmarked.
///
/// Every operation receives the running context. The handle returned by
/// `open` is stored in the context and reached through
/// [`BenchContext::db_mut`]; `close` takes it back out with
/// [`BenchContext::take_db`].
pub trait KvBackend {
    type Handle;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Called once before the first benchmark.
    fn env_setup(&mut self) {}

    /// Opens the database. When `ctx.fresh_db()` is set the returned database
    /// must be empty.
    fn open(&mut self, ctx: &BenchContext<'_, Self::Handle>) -> Result<Self::Handle, BackendError>;

    fn close(&mut self, ctx: &mut BenchContext<'_, Self::Handle>) -> Result<(), BackendError>;

    /// Stores `value` under `key`. `sync` asks for the write to be durable
    /// before returning.
    fn put(
        &mut self,
        ctx: &mut BenchContext<'_, Self::Handle>,
        key: &[u8],
        value: &[u8],
        sync: bool,
    ) -> Result<(), BackendError>;

    /// Looks up `key`, replacing the contents of `value` when found.
    fn get(
        &mut self,
        ctx: &mut BenchContext<'_, Self::Handle>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError>;

    /// Positions a cursor at the first key `>= key` and reads its value.
    /// Returns false when no such key exists.
    fn cursor_to_key(
        &mut self,
        ctx: &mut BenchContext<'_, Self::Handle>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError>;

    /// Removes `key`. Returns whether it existed.
    fn delete(
        &mut self,
        ctx: &mut BenchContext<'_, Self::Handle>,
        key: &[u8],
    ) -> Result<bool, BackendError>;

    /// Iterates over up to `ctx.num_reads()` records in key order, or in
    /// reverse key order when `reverse` is set.
    fn read_seq(
        &mut self,
        ctx: &mut BenchContext<'_, Self::Handle>,
        reverse: bool,
    ) -> Result<(), BackendError>;
}
