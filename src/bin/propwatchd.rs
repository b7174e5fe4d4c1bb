//! propwatchd - performative prop monitor daemon
//!
//! Runs the full pipeline against synthetic frames and the built-in stub
//! detector: detect, classify, threshold, debounce, overlay. Logs every
//! scene transition and a periodic health line, persists the threshold
//! settings on shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use propwatch::{
    CanvasSize, IntervalScheduler, PropwatchConfig, SceneMonitor, Settings, StubDetector,
    TickOutcome, TickScheduler, VideoSize,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Daemon config file (JSON). Falls back to PROPWATCH_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to the persisted threshold settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Frames per second for the synthetic source.
    #[arg(long)]
    fps: Option<u32>,
    /// Emit overlay draw instructions for each processed frame.
    #[arg(long)]
    overlay: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = match args.config.as_deref() {
        Some(path) => PropwatchConfig::load_from(Some(path))?,
        None => PropwatchConfig::load()?,
    };
    if let Some(path) = args.settings {
        cfg.settings_path = path;
    }
    if let Some(fps) = args.fps {
        cfg.source.target_fps = fps.max(1);
    }
    if args.overlay {
        cfg.overlay = true;
    }

    let settings = Settings::load_from_path(&cfg.settings_path);
    log::info!(
        "propwatchd starting: enter={:.2} exit={:.2} frames_enter={} frames_exit={}",
        settings.enter_score(),
        settings.exit_score(),
        settings.frames_enter(),
        settings.frames_exit()
    );

    let width = cfg.source.width;
    let height = cfg.source.height;
    let video = VideoSize::new(width as f32, height as f32);
    let canvas = CanvasSize::from_css(video.width, video.height, 1.0);

    let mut monitor = SceneMonitor::new(StubDetector::new(), settings)
        .with_overlay(cfg.overlay)
        .with_state_sink(|performative: bool| {
            if performative {
                log::info!("scene is now PERFORMATIVE");
            } else {
                log::info!("scene is now non-performative");
            }
        });
    monitor.set_surface(video, canvas);
    monitor.warm_up().context("detector warm-up failed")?;
    monitor.start();

    let stop = monitor.stop_handle();
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            log::info!("shutdown requested");
            stop.stop();
        })
        .context("failed to install signal handler")?;
    }

    log::info!(
        "monitoring {}x{} at {} fps with detector '{}'",
        width,
        height,
        cfg.source.target_fps,
        monitor.detector_name()
    );

    let mut scheduler = IntervalScheduler::new(cfg.source.target_fps, stop);
    let mut last_health_log = Instant::now();
    let mut frame_index = 0u64;

    while scheduler.next_tick() {
        let pixels = synthetic_frame(frame_index, width, height);
        frame_index += 1;

        match monitor.tick(&pixels, width, height) {
            TickOutcome::Frame(report) => {
                if report.transition.is_some() {
                    log::debug!(
                        "transition at frame {} ({} passing, {} draw ops)",
                        monitor.frames_processed(),
                        report.pass_count,
                        report.overlay.len()
                    );
                }
            }
            TickOutcome::DetectorFailed => {
                // Streaks hold; the next tick runs normally.
            }
            TickOutcome::Idle => break,
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            log::info!(
                "health: frames={} performative={} match_streak={} non_match_streak={}",
                monitor.frames_processed(),
                monitor.state().is_performative(),
                monitor.state().match_streak(),
                monitor.state().non_match_streak()
            );
            last_health_log = Instant::now();
        }
    }

    monitor.stop();
    if let Err(e) = monitor.settings().save_to_path(&cfg.settings_path) {
        log::warn!("failed to persist settings: {:#}", e);
    } else {
        log::info!("settings saved to {}", cfg.settings_path.display());
    }
    log::info!("propwatchd stopped after {} frames", frame_index);
    Ok(())
}

/// Deterministic per-frame pixel pattern so the stub detector's
/// digest-based jitter varies from frame to frame.
fn synthetic_frame(index: u64, width: u32, height: u32) -> Vec<u8> {
    let len = (width as usize) * (height as usize) * 3;
    vec![(index % 251) as u8; len]
}
