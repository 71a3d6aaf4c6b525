use std::io::{Stdout, Write};

use chrono::{DateTime, Local};

use crate::backend::KvBackend;
use crate::config::RunConfig;
use crate::context::BenchContext;
use crate::error::BenchError;
use crate::random::RandomBytePool;
use crate::time::now_ms;
use crate::workload::Benchmark;

/// Longest benchmark name; longer input is split into several names.
pub const MAX_NAME_LEN: usize = 99;

/// Splits a benchmark list into names.
///
/// Whitespace is ignored anywhere in the list. A name ends at `,`, at the end
/// of the list, or once it holds [`MAX_NAME_LEN`] characters. In the last case
/// the character that follows is consumed as the terminator, whatever it is.
/// Empty entries (`",,"`, a trailing comma, an empty list) come out as empty
/// names so the caller can report them.
pub struct BenchNames<'s> {
    chars: std::str::Chars<'s>,
    done: bool,
}

impl<'s> BenchNames<'s> {
    pub fn new(list: &'s str) -> Self {
        BenchNames {
            chars: list.chars(),
            done: false,
        }
    }
}

impl Iterator for BenchNames<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let mut name = String::new();
        let mut len = 0;
        loop {
            match self.chars.next() {
                None => {
                    self.done = true;
                    return Some(name);
                }
                Some(',') => return Some(name),
                Some(_) if len >= MAX_NAME_LEN => return Some(name),
                Some(c) if c.is_whitespace() => {}
                Some(c) => {
                    name.push(c);
                    len += 1;
                }
            }
        }
    }
}

/// Outcome of one executed benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub name: &'static str,
    /// Records written, deleted or read.
    pub num: usize,
    pub value_size: usize,
    pub elapsed_ms: u64,
    pub success: bool,
    pub finished_at: DateTime<Local>,
}

impl BenchResult {
    fn from_context<H>(ctx: &BenchContext<'_, H>) -> Self {
        let num = if ctx.benchmark().is_read() {
            ctx.num_reads()
        } else {
            ctx.num()
        };
        BenchResult {
            name: ctx.name(),
            num,
            value_size: ctx.value_size(),
            elapsed_ms: ctx.elapsed_ms(),
            success: ctx.success(),
            finished_at: Local::now(),
        }
    }

    /// Operations per second, 0 when the run took less than a millisecond.
    pub fn ops_per_sec(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.num as f64 * 1000.0 / self.elapsed_ms as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    results: Vec<BenchResult>,
    skipped: Vec<String>,
    success: bool,
}

impl Default for RunSummary {
    fn default() -> Self {
        RunSummary {
            results: Vec::new(),
            skipped: Vec::new(),
            success: true,
        }
    }
}

impl RunSummary {
    /// Appends an executed benchmark. A failed one fails the whole run.
    pub fn push(&mut self, result: BenchResult) {
        self.success &= result.success;
        self.results.push(result);
    }

    /// True if every resolved benchmark succeeded.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Executed benchmarks in run order, including the one that failed.
    pub fn results(&self) -> &[BenchResult] {
        &self.results
    }

    /// Names that did not resolve to a benchmark.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

/// Runs a benchmark list against one backend.
pub struct Dispatcher<'a, B: KvBackend, W: Write = Stdout> {
    config: &'a RunConfig,
    backend: B,
    pool: &'a RandomBytePool,
    out: W,
}

impl<'a, B: KvBackend> Dispatcher<'a, B, Stdout> {
    pub fn new(config: &'a RunConfig, backend: B, pool: &'a RandomBytePool) -> Self {
        Dispatcher::with_output(config, backend, pool, std::io::stdout())
    }
}

impl<'a, B: KvBackend, W: Write> Dispatcher<'a, B, W> {
    /// Progress lines go to `out` instead of stdout.
    pub fn with_output(
        config: &'a RunConfig,
        backend: B,
        pool: &'a RandomBytePool,
        out: W,
    ) -> Self {
        Dispatcher {
            config,
            backend,
            pool,
            out,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_parts(self) -> (B, W) {
        (self.backend, self.out)
    }

    /// Context for `name`, or `None` if no benchmark has that name.
    pub fn create_context(&self, name: &str) -> Option<BenchContext<'a, B::Handle>> {
        let benchmark = Benchmark::from_name(name)?;
        Some(BenchContext::new(benchmark, self.config, self.pool))
    }

    /// Runs every benchmark in the configured list, stopping at the first
    /// failure.
    pub fn run(&mut self) -> RunSummary {
        self.backend.env_setup();

        let config = self.config;
        let mut summary = RunSummary::default();
        for name in BenchNames::new(config.benchmarks()) {
            let Some(mut ctx) = self.create_context(&name) else {
                log::warn!("Unknown benchmark: '{}'", name);
                summary.skipped.push(name);
                continue;
            };
            let ok = self.run_context(&mut ctx);
            summary.push(BenchResult::from_context(&ctx));
            if !ok {
                break;
            }
        }
        summary
    }

    /// Opens, runs, closes and times one context. Returns its success flag.
    pub fn run_context(&mut self, ctx: &mut BenchContext<'a, B::Handle>) -> bool {
        let name = ctx.name();
        self.emit(format_args!("Starting benchmark: '{}'", name));

        ctx.set_start_ms(now_ms());
        let res = self.execute(ctx);
        ctx.set_end_ms(now_ms());

        match res {
            Ok(()) => {
                ctx.set_success(true);
                self.emit(format_args!("Done '{}' in {}", name, ctx.elapsed_ms()));
            }
            Err(e) => {
                ctx.set_success(false);
                log::error!("Failed to run benchmark: {}: {}", name, e);
            }
        }
        ctx.success()
    }

    fn execute(&mut self, ctx: &mut BenchContext<'a, B::Handle>) -> Result<(), BenchError> {
        let db = self.backend.open(ctx)?;
        ctx.set_db(db);
        let res = ctx.benchmark().run(&mut self.backend, ctx);
        let closed = self.backend.close(ctx);
        res?;
        closed?;
        Ok(())
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            log::warn!("cannot write progress line: {}", e);
        }
    }
}
