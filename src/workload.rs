use crate::backend::KvBackend;
use crate::context::BenchContext;
use crate::error::BenchError;
use crate::key::BenchKey;
use crate::random::gen_key_index;

/// Value size used by `fill100K`.
pub const LARGE_VALUE_SIZE: usize = 100 * 1000;

/// The named benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Benchmark {
    FillSeq,
    FillRandom,
    Overwrite,
    FillSync,
    Fill100K,
    DeleteSeq,
    DeleteRandom,
    ReadSeq,
    ReadReverse,
    ReadRandom,
    ReadMissing,
    ReadHot,
    SeekRandom,
}

impl Benchmark {
    pub const ALL: [Benchmark; 13] = [
        Benchmark::FillSeq,
        Benchmark::FillRandom,
        Benchmark::Overwrite,
        Benchmark::FillSync,
        Benchmark::Fill100K,
        Benchmark::DeleteSeq,
        Benchmark::DeleteRandom,
        Benchmark::ReadSeq,
        Benchmark::ReadReverse,
        Benchmark::ReadRandom,
        Benchmark::ReadMissing,
        Benchmark::ReadHot,
        Benchmark::SeekRandom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Benchmark::FillSeq => "fillseq",
            Benchmark::FillRandom => "fillrandom",
            Benchmark::Overwrite => "overwrite",
            Benchmark::FillSync => "fillsync",
            Benchmark::Fill100K => "fill100K",
            Benchmark::DeleteSeq => "deleteseq",
            Benchmark::DeleteRandom => "deleterandom",
            Benchmark::ReadSeq => "readseq",
            Benchmark::ReadReverse => "readreverse",
            Benchmark::ReadRandom => "readrandom",
            Benchmark::ReadMissing => "readmissing",
            Benchmark::ReadHot => "readhot",
            Benchmark::SeekRandom => "seekrandom",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Fill benchmarks must start from an empty database; every other
    /// benchmark must run against existing data.
    pub fn requires_fresh_db(self) -> bool {
        matches!(
            self,
            Benchmark::FillSeq | Benchmark::FillRandom | Benchmark::FillSync | Benchmark::Fill100K
        )
    }

    /// Read benchmarks issue `num_reads` operations instead of `num`.
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Benchmark::ReadSeq
                | Benchmark::ReadReverse
                | Benchmark::ReadRandom
                | Benchmark::ReadMissing
                | Benchmark::ReadHot
                | Benchmark::SeekRandom
        )
    }

    /// Runs the benchmark body against an open backend.
    pub fn run<B: KvBackend>(
        self,
        backend: &mut B,
        ctx: &mut BenchContext<'_, B::Handle>,
    ) -> Result<(), BenchError> {
        if ctx.fresh_db() != self.requires_fresh_db() {
            return Err(BenchError::Precondition {
                name: self.name(),
                expected: self.requires_fresh_db(),
                actual: ctx.fresh_db(),
            });
        }
        let key_space = ctx.key_space();
        match self {
            Benchmark::FillSeq => do_write(backend, ctx, true, false),
            Benchmark::FillRandom | Benchmark::Overwrite => do_write(backend, ctx, false, false),
            Benchmark::FillSync => {
                ctx.set_num(ctx.num() / 10);
                do_write(backend, ctx, false, true)
            }
            Benchmark::Fill100K => {
                ctx.set_num(ctx.num() / 100);
                ctx.set_value_size(LARGE_VALUE_SIZE);
                do_write(backend, ctx, false, false)
            }
            Benchmark::DeleteSeq => do_delete(backend, ctx, true),
            Benchmark::DeleteRandom => do_delete(backend, ctx, false),
            Benchmark::ReadSeq => Ok(backend.read_seq(ctx, false)?),
            Benchmark::ReadReverse => Ok(backend.read_seq(ctx, true)?),
            Benchmark::ReadRandom => do_read_random(backend, ctx, key_space),
            Benchmark::ReadMissing => do_read_missing(backend, ctx),
            Benchmark::ReadHot => do_read_random(backend, ctx, hot_range(key_space)),
            Benchmark::SeekRandom => do_seek_random(backend, ctx),
        }
    }
}

impl std::fmt::Display for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Benchmark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Benchmark::from_name(s).ok_or_else(|| format!("Unknown benchmark: '{}'", s))
    }
}

/// Size of the hot key range: the first 1% of the key space, rounded up.
pub fn hot_range(key_space: usize) -> usize {
    key_space.div_ceil(100)
}

#[inline]
fn key_index(seq: bool, i: usize, key_space: usize) -> usize {
    if seq {
        i
    } else {
        gen_key_index(key_space)
    }
}

/// Writes `ctx.num()` records of `ctx.value_size()` bytes.
pub fn do_write<B: KvBackend>(
    backend: &mut B,
    ctx: &mut BenchContext<'_, B::Handle>,
    seq: bool,
    sync: bool,
) -> Result<(), BenchError> {
    let key_space = ctx.key_space();
    for i in 0..ctx.num() {
        let key = BenchKey::new(key_index(seq, i, key_space));
        let value = ctx.next_value();
        backend.put(ctx, key.as_bytes(), value, sync)?;
    }
    Ok(())
}

/// Deletes `ctx.num()` keys. Deleting an absent key is not an error.
pub fn do_delete<B: KvBackend>(
    backend: &mut B,
    ctx: &mut BenchContext<'_, B::Handle>,
    seq: bool,
) -> Result<(), BenchError> {
    let key_space = ctx.key_space();
    for i in 0..ctx.num() {
        let key = BenchKey::new(key_index(seq, i, key_space));
        backend.delete(ctx, key.as_bytes())?;
    }
    Ok(())
}

/// `ctx.num_reads()` point lookups of keys drawn from `[0, range)`.
fn do_read_random<B: KvBackend>(
    backend: &mut B,
    ctx: &mut BenchContext<'_, B::Handle>,
    range: usize,
) -> Result<(), BenchError> {
    let mut value = Vec::new();
    for _ in 0..ctx.num_reads() {
        let key = BenchKey::new(gen_key_index(range));
        backend.get(ctx, key.as_bytes(), &mut value)?;
        value.clear();
    }
    Ok(())
}

fn do_read_missing<B: KvBackend>(
    backend: &mut B,
    ctx: &mut BenchContext<'_, B::Handle>,
) -> Result<(), BenchError> {
    let mut value = Vec::new();
    let key_space = ctx.key_space();
    for _ in 0..ctx.num_reads() {
        let key = BenchKey::missing(gen_key_index(key_space));
        let found = backend.get(ctx, key.as_bytes(), &mut value)?;
        value.clear();
        if found {
            return Err(BenchError::UnexpectedFound(key.to_string()));
        }
    }
    Ok(())
}

fn do_seek_random<B: KvBackend>(
    backend: &mut B,
    ctx: &mut BenchContext<'_, B::Handle>,
) -> Result<(), BenchError> {
    let mut value = Vec::new();
    let key_space = ctx.key_space();
    for _ in 0..ctx.num_reads() {
        let key = BenchKey::new(gen_key_index(key_space));
        backend.cursor_to_key(ctx, key.as_bytes(), &mut value)?;
        value.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use rstest::rstest;

    use crate::backend::test_util::{recording_backend, Behavior, Calls};
    use crate::backend::{CallbackBackend, MemoryBackend};
    use crate::config::RunConfig;
    use crate::error::BackendError;
    use crate::random::RandomBytePool;

    use super::*;

    type Recorder = CallbackBackend<BTreeSet<Vec<u8>>>;

    fn config(num: i64, reads: Option<i64>) -> RunConfig {
        RunConfig::new(num, reads, 50, "", None).unwrap()
    }

    fn recorder(behavior: Behavior) -> (Recorder, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        (recording_backend(calls.clone(), behavior), calls)
    }

    /// Opens, runs `benchmark` with an explicit fresh flag, closes.
    fn run_once<B: KvBackend>(
        backend: &mut B,
        config: &RunConfig,
        pool: &RandomBytePool,
        benchmark: Benchmark,
        fresh_db: bool,
    ) -> Result<(usize, usize), BenchError> {
        let mut ctx = BenchContext::new(benchmark, config, pool).with_fresh_db(fresh_db);
        let db = backend.open(&ctx)?;
        ctx.set_db(db);
        let res = benchmark.run(backend, &mut ctx);
        backend.close(&mut ctx)?;
        res.map(|_| (ctx.num(), ctx.value_size()))
    }

    #[test]
    fn test_names_round_trip() {
        for b in Benchmark::ALL {
            assert_eq!(Benchmark::from_name(b.name()), Some(b));
            assert_eq!(b.name().parse::<Benchmark>(), Ok(b));
        }
        assert_eq!(Benchmark::from_name("fill100k"), None);
        assert_eq!(Benchmark::from_name(""), None);
        assert!("nope".parse::<Benchmark>().is_err());
    }

    #[test]
    fn test_hot_range() {
        assert_eq!(hot_range(1001), 11);
        assert_eq!(hot_range(2000), 20);
        assert_eq!(hot_range(2001), 21);
        assert_eq!(hot_range(1_000_000), 10_000);
    }

    #[test]
    fn test_fillseq_writes_every_key_in_order() {
        let pool = RandomBytePool::new();
        let config = config(1001, None);
        let mut backend = MemoryBackend::new();
        run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap();

        assert_eq!(backend.len(), 1001);
        let keys = backend.store().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys.first().unwrap().as_slice(), b"0000000000000000");
        assert_eq!(keys.last().unwrap().as_slice(), b"0000000000001000");
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(key.as_slice(), BenchKey::new(i).as_bytes());
        }
        assert!(backend.store().values().all(|v| v.len() == 50));
    }

    #[test]
    fn test_fill_calls_put_in_sequence() {
        let pool = RandomBytePool::new();
        let config = config(1500, None);
        let (mut backend, calls) = recorder(Behavior::default());
        run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.puts.len(), 1500);
        for (i, (key, len, sync)) in calls.puts.iter().enumerate() {
            assert_eq!(key.as_slice(), format!("{:016}", i).as_bytes());
            assert_eq!(*len, 50);
            assert!(!sync);
        }
    }

    #[test]
    fn test_fillrandom_keys_within_key_space() {
        let pool = RandomBytePool::new();
        let config = config(2000, None);
        let (mut backend, calls) = recorder(Behavior::default());
        run_once(&mut backend, &config, &pool, Benchmark::FillRandom, true).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.puts.len(), 2000);
        for (key, _, _) in calls.puts.iter() {
            let idx: usize = std::str::from_utf8(key).unwrap().parse().unwrap();
            assert!(idx < 2000);
            assert_eq!(key.len(), 16);
        }
    }

    #[test]
    fn test_fillsync_divides_count() {
        let pool = RandomBytePool::new();
        let config = config(2500, None);
        let (mut backend, calls) = recorder(Behavior::default());
        let (num, value_size) =
            run_once(&mut backend, &config, &pool, Benchmark::FillSync, true).unwrap();
        assert_eq!((num, value_size), (250, 50));

        let calls = calls.borrow();
        assert_eq!(calls.puts.len(), 250);
        assert!(calls.puts.iter().all(|(_, len, sync)| *len == 50 && *sync));
    }

    #[test]
    fn test_fill100k_divides_count_and_sets_size() {
        let pool = RandomBytePool::new();
        let config = config(2500, None);
        let (mut backend, calls) = recorder(Behavior::default());
        let (num, value_size) =
            run_once(&mut backend, &config, &pool, Benchmark::Fill100K, true).unwrap();
        assert_eq!((num, value_size), (25, LARGE_VALUE_SIZE));

        let calls = calls.borrow();
        assert_eq!(calls.puts.len(), 25);
        assert!(calls
            .puts
            .iter()
            .all(|(_, len, sync)| *len == 100_000 && !*sync));
    }

    #[rstest]
    #[case(Benchmark::FillSeq, false)]
    #[case(Benchmark::FillRandom, false)]
    #[case(Benchmark::FillSync, false)]
    #[case(Benchmark::Fill100K, false)]
    #[case(Benchmark::Overwrite, true)]
    #[case(Benchmark::DeleteSeq, true)]
    #[case(Benchmark::DeleteRandom, true)]
    #[case(Benchmark::ReadSeq, true)]
    #[case(Benchmark::ReadReverse, true)]
    #[case(Benchmark::ReadRandom, true)]
    #[case(Benchmark::ReadMissing, true)]
    #[case(Benchmark::ReadHot, true)]
    #[case(Benchmark::SeekRandom, true)]
    fn test_precondition_mismatch_fails(#[case] benchmark: Benchmark, #[case] fresh_db: bool) {
        assert_eq!(benchmark.requires_fresh_db(), !fresh_db);

        let pool = RandomBytePool::new();
        let config = config(2000, None);
        let (mut backend, calls) = recorder(Behavior::default());
        let err = run_once(&mut backend, &config, &pool, benchmark, fresh_db).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Precondition { name, .. } if name == benchmark.name()
        ));

        // Nothing reached the backend besides open/close.
        let calls = calls.borrow();
        assert!(calls.puts.is_empty());
        assert!(calls.gets.is_empty());
        assert!(calls.deletes.is_empty());
        assert!(calls.scans.is_empty());
        assert!(calls.seeks.is_empty());
        assert_eq!(calls.closes, 1);
    }

    #[test]
    fn test_put_failure_aborts_loop() {
        let pool = RandomBytePool::new();
        let config = config(2000, None);
        let (mut backend, calls) = recorder(Behavior {
            fail_put_at: Some(10),
            ..Default::default()
        });
        let err = run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap_err();
        assert!(matches!(err, BenchError::Backend(BackendError::Message(_))));
        assert_eq!(calls.borrow().puts.len(), 10);
    }

    #[test]
    fn test_readmissing_after_fill_never_found() {
        let pool = RandomBytePool::new();
        let config = config(3000, Some(5000));
        let mut backend = MemoryBackend::new();
        run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap();
        run_once(&mut backend, &config, &pool, Benchmark::ReadMissing, false).unwrap();
    }

    #[test]
    fn test_readmissing_found_is_failure() {
        let pool = RandomBytePool::new();
        let config = config(2000, Some(100));
        let (mut backend, calls) = recorder(Behavior {
            always_found: true,
            ..Default::default()
        });
        let err =
            run_once(&mut backend, &config, &pool, Benchmark::ReadMissing, false).unwrap_err();
        match err {
            BenchError::UnexpectedFound(key) => {
                assert_eq!(key.len(), 17);
                assert!(key.ends_with('.'));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Stopped at the first hit.
        assert_eq!(calls.borrow().gets.len(), 1);
    }

    #[test]
    fn test_read_variants_use_read_count() {
        let pool = RandomBytePool::new();
        let config = config(5000, Some(321));
        let (mut backend, calls) = recorder(Behavior::default());
        for benchmark in [
            Benchmark::ReadRandom,
            Benchmark::ReadMissing,
            Benchmark::ReadHot,
            Benchmark::SeekRandom,
            Benchmark::ReadSeq,
            Benchmark::ReadReverse,
        ] {
            run_once(&mut backend, &config, &pool, benchmark, false).unwrap();
        }

        let calls = calls.borrow();
        // readrandom + readmissing + readhot
        assert_eq!(calls.gets.len(), 3 * 321);
        assert_eq!(calls.seeks.len(), 321);
        assert_eq!(calls.scans, vec![(false, 321), (true, 321)]);

        let (random, rest) = calls.gets.split_at(321);
        let (missing, hot) = rest.split_at(321);
        for key in random {
            assert_eq!(key.len(), 16);
            assert!(std::str::from_utf8(key).unwrap().parse::<usize>().unwrap() < 5000);
        }
        for key in missing {
            assert_eq!(key.len(), 17);
            assert_eq!(key.last(), Some(&b'.'));
        }
        for key in hot {
            assert!(std::str::from_utf8(key).unwrap().parse::<usize>().unwrap() < 50);
        }
    }

    #[test]
    fn test_delete_variants() {
        let pool = RandomBytePool::new();
        let config = config(1200, None);
        let mut backend = MemoryBackend::new();
        run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap();
        run_once(&mut backend, &config, &pool, Benchmark::DeleteRandom, false).unwrap();
        assert!(backend.len() < 1200);
        // Keys already gone are not an error.
        run_once(&mut backend, &config, &pool, Benchmark::DeleteSeq, false).unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_existing_data() {
        let pool = RandomBytePool::new();
        let config = config(1200, None);
        let mut backend = MemoryBackend::new();
        run_once(&mut backend, &config, &pool, Benchmark::FillSeq, true).unwrap();
        run_once(&mut backend, &config, &pool, Benchmark::Overwrite, false).unwrap();
        assert_eq!(backend.len(), 1200);
    }
}
