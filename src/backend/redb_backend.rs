use std::hint::black_box;
use std::path::{Path, PathBuf};

use redb::{Database, Durability, ReadableTable, TableDefinition};

use crate::context::BenchContext;
use crate::error::BackendError;

use super::KvBackend;

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kvbench");

fn redb_err(err: impl Into<redb::Error>) -> BackendError {
    BackendError::Redb(err.into())
}

/// redb database file. Each put and delete runs in its own write transaction;
/// deletes and async puts commit with `Durability::None` and are made durable
/// on close.
pub struct RedbBackend {
    path: PathBuf,
}

impl RedbBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RedbBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvBackend for RedbBackend {
    type Handle = Database;

    fn name(&self) -> &str {
        "redb"
    }

    fn env_setup(&mut self) {
        log::info!("backend: redb at {}", self.path.display());
    }

    fn open(&mut self, ctx: &BenchContext<'_, Database>) -> Result<Database, BackendError> {
        if ctx.fresh_db() && self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        let db = Database::create(&self.path).map_err(redb_err)?;

        // Create the table up front so readers never see it missing.
        let txn = db.begin_write().map_err(redb_err)?;
        txn.open_table(TABLE).map_err(redb_err)?;
        txn.commit().map_err(redb_err)?;
        Ok(db)
    }

    fn close(&mut self, ctx: &mut BenchContext<'_, Database>) -> Result<(), BackendError> {
        let db = ctx.take_db()?;
        // A durable commit persists everything committed with `Durability::None`.
        let txn = db.begin_write().map_err(redb_err)?;
        txn.commit().map_err(redb_err)?;
        Ok(())
    }

    fn put(
        &mut self,
        ctx: &mut BenchContext<'_, Database>,
        key: &[u8],
        value: &[u8],
        sync: bool,
    ) -> Result<(), BackendError> {
        let mut txn = ctx.db()?.begin_write().map_err(redb_err)?;
        if !sync {
            txn.set_durability(Durability::None);
        }
        {
            let mut table = txn.open_table(TABLE).map_err(redb_err)?;
            table.insert(key, value).map_err(redb_err)?;
        }
        txn.commit().map_err(redb_err)?;
        Ok(())
    }

    fn get(
        &mut self,
        ctx: &mut BenchContext<'_, Database>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        let txn = ctx.db()?.begin_read().map_err(redb_err)?;
        let table = txn.open_table(TABLE).map_err(redb_err)?;
        let found = match table.get(key).map_err(redb_err)? {
            Some(guard) => {
                value.clear();
                value.extend_from_slice(guard.value());
                true
            }
            None => false,
        };
        Ok(found)
    }

    fn cursor_to_key(
        &mut self,
        ctx: &mut BenchContext<'_, Database>,
        key: &[u8],
        value: &mut Vec<u8>,
    ) -> Result<bool, BackendError> {
        let txn = ctx.db()?.begin_read().map_err(redb_err)?;
        let table = txn.open_table(TABLE).map_err(redb_err)?;
        let mut range = table.range::<&[u8]>(key..).map_err(redb_err)?;
        let found = match range.next() {
            Some(entry) => {
                let (_, v) = entry.map_err(redb_err)?;
                value.clear();
                value.extend_from_slice(v.value());
                true
            }
            None => false,
        };
        Ok(found)
    }

    fn delete(
        &mut self,
        ctx: &mut BenchContext<'_, Database>,
        key: &[u8],
    ) -> Result<bool, BackendError> {
        let mut txn = ctx.db()?.begin_write().map_err(redb_err)?;
        txn.set_durability(Durability::None);
        let existed = {
            let mut table = txn.open_table(TABLE).map_err(redb_err)?;
            let removed = table.remove(key).map_err(redb_err)?;
            removed.is_some()
        };
        txn.commit().map_err(redb_err)?;
        Ok(existed)
    }

    fn read_seq(
        &mut self,
        ctx: &mut BenchContext<'_, Database>,
        reverse: bool,
    ) -> Result<(), BackendError> {
        let limit = ctx.num_reads();
        let txn = ctx.db()?.begin_read().map_err(redb_err)?;
        let table = txn.open_table(TABLE).map_err(redb_err)?;
        let iter = table.iter().map_err(redb_err)?;
        let mut bytes = 0;
        if reverse {
            for entry in iter.rev().take(limit) {
                let (k, v) = entry.map_err(redb_err)?;
                bytes += black_box(k.value().len() + v.value().len());
            }
        } else {
            for entry in iter.take(limit) {
                let (k, v) = entry.map_err(redb_err)?;
                bytes += black_box(k.value().len() + v.value().len());
            }
        }
        black_box(bytes);
        Ok(())
    }
}
