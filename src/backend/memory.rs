use std::collections::BTreeMap;
use std::hint::black_box;
use std::ops::Bound;

use crate::context::BenchContext;
use crate::error::BackendError;

use super::KvBackend;

type Store = BTreeMap<Vec<u8>, Vec<u8>>;

/// Ordered in-memory map that outlives individual runs.
///
/// `open` moves the map into the context and `close` moves it back, so data
/// written by one benchmark is visible to the next unless it asks for a fresh
/// database.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Store,
    opened: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records currently held between runs.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.store
    }

    /// Number of successful `open` calls.
    pub fn open_count(&self) -> usize {
        self.opened
    }
}

impl KvBackend for MemoryBackend {
    type Handle = Store;

    fn name(&self) -> &str {
        "memory"
    }

    fn env_setup(&mut self) {
        log::info!("backend: in-memory BTreeMap");
    }

    fn open(&mut self, ctx: &BenchContext<'_, Store>) -> Result<Store, BackendError> {
        let mut store = std::mem::take(&mut self.store);
        if ctx.fresh_db() {
            store.clear();
        }
        self.opened += 1;
        Ok(store)
    }

    fn close(&mut self, ctx: &mut BenchContext<'_, Store>) -> Result<(), BackendError> {
        self.store = ctx.take_db()?;
        Ok(())
    }

    fn put(
        &mut self,
        ctx: &mut BenchContext<'_, Store>,
        key: &[u8],
        value: &[u8],
        _sync: bool,
    ) -> Result<(), BackendError> {
        ctx.db_mut()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(
        &mut self,
        ctx: &mut BenchContext<'_, Store>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        match ctx.db()?.get(key) {
            Some(v) => {
                value.clear();
                value.extend_from_slice(v);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn cursor_to_key(
        &mut self,
        ctx: &mut BenchContext<'_, Store>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        let mut range = ctx
            .db()?
            .range::<[u8], _>((Bound::Included(key), Bound::Unbounded));
        match range.next() {
            Some((_, v)) => {
                value.clear();
                value.extend_from_slice(v);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(
        &mut self,
        ctx: &mut BenchContext<'_, Store>,
        key: &[u8],
    ) -> Result<bool, BackendError> {
        Ok(ctx.db_mut()?.remove(key).is_some())
    }

    fn read_seq(
        &mut self,
        ctx: &mut BenchContext<'_, Store>,
        reverse: bool,
    ) -> Result<(), BackendError> {
        let limit = ctx.num_reads();
        let store = ctx.db()?;
        let mut bytes = 0;
        if reverse {
            for (k, v) in store.iter().rev().take(limit) {
                bytes += black_box(k.len() + v.len());
            }
        } else {
            for (k, v) in store.iter().take(limit) {
                bytes += black_box(k.len() + v.len());
            }
        }
        black_box(bytes);
        Ok(())
    }
}
