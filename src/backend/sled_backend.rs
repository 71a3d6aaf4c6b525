use std::hint::black_box;
use std::path::{Path, PathBuf};

use crate::context::BenchContext;
use crate::error::BackendError;

use super::KvBackend;

/// sled database stored in a directory. A fresh open wipes the directory.
pub struct SledBackend {
    path: PathBuf,
}

impl SledBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SledBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvBackend for SledBackend {
    type Handle = sled::Db;

    fn name(&self) -> &str {
        "sled"
    }

    fn env_setup(&mut self) {
        log::info!("backend: sled at {}", self.path.display());
    }

    fn open(&mut self, ctx: &BenchContext<'_, sled::Db>) -> Result<sled::Db, BackendError> {
        if ctx.fresh_db() && self.path.exists() {
            std::fs::remove_dir_all(&self.path)?;
        }
        let db = sled::Config::default()
            .path(&self.path)
            .mode(sled::Mode::HighThroughput)
            .open()?;
        Ok(db)
    }

    fn close(&mut self, ctx: &mut BenchContext<'_, sled::Db>) -> Result<(), BackendError> {
        let db = ctx.take_db()?;
        db.flush()?;
        Ok(())
    }

    fn put(
        &mut self,
        ctx: &mut BenchContext<'_, sled::Db>,
        key: &[u8],
        value: &[u8],
        sync: bool,
    ) -> Result<(), BackendError> {
        let db = ctx.db()?;
        db.insert(key, value)?;
        if sync {
            db.flush()?;
        }
        Ok(())
    }

    fn get(
        &mut self,
        ctx: &mut BenchContext<'_, sled::Db>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        match ctx.db()?.get(key)? {
            Some(v) => {
                value.clear();
                value.extend_from_slice(&v);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn cursor_to_key(
        &mut self,
        ctx: &mut BenchContext<'_, sled::Db>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        match ctx.db()?.range(key..).next() {
            Some(entry) => {
                let (_, v) = entry?;
                value.clear();
                value.extend_from_slice(&v);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(
        &mut self,
        ctx: &mut BenchContext<'_, sled::Db>,
        key: &[u8],
    ) -> Result<bool, BackendError> {
        Ok(ctx.db()?.remove(key)?.is_some())
    }

    fn read_seq(
        &mut self,
        ctx: &mut BenchContext<'_, sled::Db>,
        reverse: bool,
    ) -> Result<(), BackendError> {
        let limit = ctx.num_reads();
        let iter = ctx.db()?.iter();
        let mut bytes = 0;
        if reverse {
            for entry in iter.rev().take(limit) {
                let (k, v) = entry?;
                bytes += black_box(k.len() + v.len());
            }
        } else {
            for entry in iter.take(limit) {
                let (k, v) = entry?;
                bytes += black_box(k.len() + v.len());
            }
        }
        black_box(bytes);
        Ok(())
    }
}
