use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::BackendError;

use super::{BackendBuilder, CallbackBackend};

/// Every call a recording backend has seen.
#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub opens: Vec<bool>,
    pub closes: usize,
    /// (key, value length, sync)
    pub puts: Vec<(Vec<u8>, usize, bool)>,
    pub gets: Vec<Vec<u8>>,
    pub seeks: Vec<Vec<u8>>,
    pub deletes: Vec<Vec<u8>>,
    pub scans: Vec<(bool, usize)>,
    pub env_setups: usize,
}

/// Knobs for the recording backend.
#[derive(Debug, Default, Clone)]
pub(crate) struct Behavior {
    /// Fail the put with this index (0-based).
    pub fail_put_at: Option<usize>,
    /// Report every lookup as found.
    pub always_found: bool,
    pub fail_open: bool,
    pub fail_close: bool,
}

/// A callback backend that stores keys in a set and records each call.
pub(crate) fn recording_backend(
    calls: Rc<RefCell<Calls>>,
    behavior: Behavior,
) -> CallbackBackend<BTreeSet<Vec<u8>>> {
    let keys: Rc<RefCell<BTreeSet<Vec<u8>>>> = Rc::default();

    let (c_env, c_open, c_close, c_put, c_get, c_seek, c_del, c_scan) = (
        calls.clone(),
        calls.clone(),
        calls.clone(),
        calls.clone(),
        calls.clone(),
        calls.clone(),
        calls.clone(),
        calls,
    );
    let (k_open, k_close) = (keys.clone(), keys);
    let (b_open, b_close, b_put, b_get) = (
        behavior.clone(),
        behavior.clone(),
        behavior.clone(),
        behavior,
    );

    BackendBuilder::<BTreeSet<Vec<u8>>>::new("recording")
        .env_setup(move || c_env.borrow_mut().env_setups += 1)
        .open(move |ctx| {
            c_open.borrow_mut().opens.push(ctx.fresh_db());
            if b_open.fail_open {
                return Err(BackendError::msg("open failed"));
            }
            let mut set = std::mem::take(&mut *k_open.borrow_mut());
            if ctx.fresh_db() {
                set.clear();
            }
            Ok(set)
        })
        .close(move |ctx| {
            c_close.borrow_mut().closes += 1;
            *k_close.borrow_mut() = ctx.take_db()?;
            if b_close.fail_close {
                return Err(BackendError::msg("close failed"));
            }
            Ok(())
        })
        .put(move |ctx, key, value, sync| {
            let mut calls = c_put.borrow_mut();
            if b_put.fail_put_at == Some(calls.puts.len()) {
                return Err(BackendError::msg("put failed"));
            }
            calls.puts.push((key.to_vec(), value.len(), sync));
            ctx.db_mut()?.insert(key.to_vec());
            Ok(())
        })
        .get(move |ctx, key, value| {
            c_get.borrow_mut().gets.push(key.to_vec());
            let found = b_get.always_found || ctx.db()?.contains(key);
            if found {
                value.clear();
                value.extend_from_slice(b"v");
            }
            Ok(found)
        })
        .cursor_to_key(move |ctx, key, _value| {
            c_seek.borrow_mut().seeks.push(key.to_vec());
            Ok(ctx.db()?.range(key.to_vec()..).next().is_some())
        })
        .del(move |ctx, key| {
            c_del.borrow_mut().deletes.push(key.to_vec());
            Ok(ctx.db_mut()?.remove(key))
        })
        .read_seq(move |ctx, reverse| {
            c_scan.borrow_mut().scans.push((reverse, ctx.num_reads()));
            Ok(())
        })
        .build()
        .unwrap()
}
