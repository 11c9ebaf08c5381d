//! Run command - drive the pipeline headlessly for a number of ticks.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use orbitlayer::ephemeris::Sgp4Propagator;
use orbitlayer::layer::SatelliteLayer;
use orbitlayer::pipeline::PropagationWorker;
use orbitlayer::render::{Palette, RecordingRenderer, RenderSync};
use orbitlayer::telemetry::PipelineMetrics;
use orbitlayer::track::OrbitTracker;
use tracing::info;

use super::resolve_start;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
pub struct RunArgs {
    pub catalog: Option<PathBuf>,
    pub ticks: u64,
    pub time_scale: Option<f64>,
    pub start: Option<i64>,
    pub select: Option<String>,
    /// Skip the inter-tick sleep.
    pub fast: bool,
}

/// Run the run command.
pub fn run(runner: &CliRunner, args: RunArgs) -> Result<(), CliError> {
    runner.log_startup("run");
    let config = runner.config();

    let catalog = runner.load_catalog(args.catalog)?;
    let object_count = catalog.len();
    let start = resolve_start(args.start)?;

    let mut clock = config.clock(start);
    if let Some(scale) = args.time_scale {
        clock.set_time_scale(scale);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("orbitlayer-worker")
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let propagator = Arc::new(Sgp4Propagator::new());
    let metrics = Arc::new(PipelineMetrics::new());
    let (worker, controller) = PropagationWorker::new(
        Arc::clone(&propagator),
        config.propagation_config(),
        Arc::clone(&metrics),
    );
    runtime.spawn(worker.run());

    let sync = RenderSync::new(config.frame_mapper(), Palette::default());
    let mut layer = SatelliteLayer::new(
        catalog,
        controller,
        RecordingRenderer::new(object_count),
        sync,
        clock,
    )?;
    layer.start()?;

    if let Some(query) = &args.select {
        if layer.search_and_select(query).is_none() {
            println!("No object matches '{}', running without selection", query);
        }
    }

    println!("OrbitLayer v{}", env!("CARGO_PKG_VERSION"));
    println!("================================");
    println!();
    println!("Objects:    {}", object_count);
    println!("Start:      {}", start.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Time scale: {}x", layer.clock().time_scale());
    println!("Ticks:      {}", args.ticks);
    println!();
    println!("Press Ctrl+C to stop early");
    println!();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let progress = ProgressBar::new(args.ticks);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} ticks  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let tick_interval = config.tick_interval();
    let mut last_tick = Instant::now();
    let mut last_visible = None;
    let mut applied = 0u64;

    for _ in 0..args.ticks {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        if !args.fast {
            std::thread::sleep(tick_interval);
        }

        let elapsed = if args.fast { tick_interval } else { last_tick.elapsed() };
        last_tick = Instant::now();

        let report = layer.tick(elapsed);
        if report.applied {
            applied += 1;
            last_visible = report.visible;
            progress.set_message(format!(
                "{} visible  {}",
                report.visible.unwrap_or_default(),
                report.instant.format("%H:%M:%S")
            ));
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(applied, "Run finished");

    println!("Session Summary");
    println!("───────────────");
    println!("  Simulated until: {}", layer.clock().now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Buffers applied: {}", applied);
    if let Some(visible) = last_visible {
        println!("  Visible objects: {} of {}", visible, object_count);
    }
    println!();
    for line in metrics.snapshot().to_string().lines() {
        println!("  {}", line);
    }

    let tracker = OrbitTracker::new(propagator);
    if let Some(summary) = layer.selected_summary(&tracker) {
        println!();
        println!("Selected: {} ({})", summary.name, summary.id);
        match summary.geodetic {
            Some(g) => println!(
                "  lat {:.3}°  lon {:.3}°  alt {:.1} km",
                g.latitude_deg, g.longitude_deg, g.altitude_km
            ),
            None => println!("  no valid position"),
        }
        if let Some(period) = summary.period_minutes {
            println!("  period {:.1} min", period);
        }
    }

    layer.shutdown();
    runtime.shutdown_timeout(Duration::from_secs(2));
    Ok(())
}
