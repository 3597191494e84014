use anyhow::{Result, anyhow};

use ladder_sheet::config::Config;
use ladder_sheet::pipeline::{RunOptions, run_once};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            log::error!("configuration error: {err}");
            std::process::exit(1);
        }
    };
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let opts = RunOptions::from_args(&args);

    let summary = run_once(&cfg, &opts)?;
    log::info!(
        "fetched={} appended={} header_written={}",
        summary.fetched,
        summary.saved.appended,
        summary.saved.header_written
    );
    log::info!("--- run finished ---");

    if let Some(err) = summary.fetch_error
        && cfg.fail_on_fetch_error
    {
        return Err(anyhow!("battle log fetch failed: {err}"));
    }
    Ok(())
}
