use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use batch_app::{AppConfig, Cli, Controller, StdoutSink};
use batch_engine::EngineHandle;
use batch_logging::{batch_info, batch_warn};
use clap::Parser;
use log::LevelFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.apply(AppConfig::load(cli.config.as_deref())?);
    batch_logging::initialize(config.log_destination, LevelFilter::Info, &config.log_file);

    let targets = fs::read_to_string(&cli.targets)
        .with_context(|| format!("reading targets from {}", cli.targets.display()))?;
    let caller = config
        .remote_caller()
        .context("building the remote caller")?;

    let mut controller = Controller::new(config.variant(), EngineHandle::new(caller), StdoutSink);
    if !controller.submit(cli.job_request(&config, targets)) {
        return Ok(());
    }

    let interrupted = watch_ctrl_c();
    controller.run_until_settled(POLL_INTERVAL, || interrupted.swap(false, Ordering::SeqCst));
    if let Some(message) = controller.engine_failure() {
        bail!("engine stopped: {message}");
    }

    let view = controller.state().view();
    batch_info!(
        "job finished in phase {:?}: {}/{} settled, {} records, {} failed, {} without article",
        view.phase,
        view.completed,
        view.target_count,
        view.result_count,
        view.failed,
        view.no_article
    );
    controller.export(cli.output.clone());
    Ok(())
}

/// Sets the returned flag each time Ctrl-C is pressed.
fn watch_ctrl_c() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let setter = flag.clone();
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                batch_warn!("Ctrl-C handler unavailable: {}", err);
                return;
            }
        };
        runtime.block_on(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                setter.store(true, Ordering::SeqCst);
            }
        });
    });
    flag
}
