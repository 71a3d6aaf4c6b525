use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use kvbench::prelude::*;

fn run<B: KvBackend>(config: &RunConfig, backend: B) -> bool {
    let pool = RandomBytePool::new();
    let backend_name = backend.name().to_string();
    let mut dispatcher = Dispatcher::new(config, backend, &pool);
    let summary = dispatcher.run();
    for name in summary.skipped() {
        log::debug!("skipped '{}'", name);
    }

    if let Some(path) = config.report() {
        let written = ReportWriter::create(path, backend_name.as_str())
            .and_then(|mut writer| writer.write_summary(&summary));
        match written {
            Ok(()) => log::info!("report written to {}", path.display()),
            Err(e) => {
                log::error!("cannot write report {}: {}", path.display(), e);
                return false;
            }
        }
    }
    summary.success()
}

/// Builds the selected backend and runs the benchmark list against it. A
/// temporary database directory is removed on return.
fn run_backend(params: &BenchParams, config: &RunConfig) -> bool {
    let temp_dir;
    #[cfg_attr(not(any(feature = "sled", feature = "redb")), allow(unused_variables))]
    let db_dir: PathBuf = match &params.db_path {
        Some(path) => path.clone(),
        None => {
            temp_dir = match tempfile::tempdir() {
                Ok(dir) => dir,
                Err(e) => {
                    log::error!("cannot create temporary directory: {}", e);
                    exit(1);
                }
            };
            temp_dir.path().to_path_buf()
        }
    };

    match params.backend {
        BackendKind::Memory => run(config, MemoryBackend::new()),
        #[cfg(feature = "sled")]
        BackendKind::Sled => run(config, SledBackend::new(db_dir.join("sled"))),
        #[cfg(feature = "redb")]
        BackendKind::Redb => run(config, RedbBackend::new(db_dir.join("bench.redb"))),
        #[allow(unreachable_patterns)]
        other => {
            log::error!(
                "backend '{}' is not compiled in (build with --features {})",
                other,
                other
            );
            false
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = match BenchParams::try_parse_from(normalize_args(std::env::args())) {
        Ok(params) => params,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            exit(1);
        }
    };
    let config = match RunConfig::try_from(&params) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            log::error!("Benchmark cannot be initialized");
            exit(1);
        }
    };
    log::info!("{}, backend: {}", config, params.backend);

    if !run_backend(&params, &config) {
        exit(1);
    }
}
