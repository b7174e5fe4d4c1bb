//! The per-tick detection loop.
//!
//! `SceneMonitor` owns everything a session needs: the detector backend,
//! the threshold policy, the settings, and the debounced state. One tick
//! runs detector → threshold filter → state machine → overlay, in that
//! order, for one frame. Execution is single-threaded and cooperative;
//! no two ticks' worth of state mutation ever interleave.
//!
//! Scheduling is injected (`TickScheduler`) so the pipeline can be driven
//! by synthetic frame sequences in tests with no timer, display, or
//! camera involved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::detect::Detector;
use crate::hysteresis::{DetectionState, Transition};
use crate::overlay::{self, CanvasSize, DrawOp, VideoSize};
use crate::policy::{CategoryMinimums, ThresholdPolicy};
use crate::settings::Settings;

/// Receives the new boolean scene state, exactly once per real
/// transition. Cheaply implemented by any `FnMut(bool)` closure.
pub trait StateSink {
    fn on_state_change(&mut self, performative: bool);
}

impl<F: FnMut(bool)> StateSink for F {
    fn on_state_change(&mut self, performative: bool) {
        self(performative)
    }
}

/// Shared liveness flag for a session.
///
/// An external stop (signal handler, another component) flips the flag at
/// any time; the monitor re-checks it after every detector call so a
/// result that lands after stop never mutates state.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that no further tick be processed.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Everything a processed frame produced.
#[derive(Clone, Debug)]
pub struct TickReport {
    /// State crossing, if this frame completed a run.
    pub transition: Option<Transition>,
    /// How many predictions passed classification and thresholds.
    pub pass_count: usize,
    /// Drawing instructions for the display surface.
    pub overlay: Vec<DrawOp>,
}

/// Outcome of one call to [`SceneMonitor::tick`].
#[derive(Clone, Debug)]
pub enum TickOutcome {
    /// Session stopped or hidden; nothing ran and nothing changed.
    Idle,
    /// The detector call failed. Both streaks hold their prior values and
    /// no overlay instructions are produced for this tick.
    DetectorFailed,
    /// The frame was fully processed.
    Frame(TickReport),
}

/// Drives the detection pipeline once per display tick.
pub struct SceneMonitor<D: Detector> {
    detector: D,
    policy: ThresholdPolicy,
    settings: Settings,
    state: DetectionState,
    stop: StopHandle,
    running: bool,
    visible: bool,
    overlay_enabled: bool,
    video: VideoSize,
    canvas: CanvasSize,
    sink: Option<Box<dyn StateSink + Send>>,
    frames_processed: u64,
}

impl<D: Detector> SceneMonitor<D> {
    pub fn new(detector: D, settings: Settings) -> Self {
        let video = VideoSize::new(640.0, 480.0);
        Self {
            detector,
            policy: ThresholdPolicy::default(),
            settings,
            state: DetectionState::new(),
            stop: StopHandle::new(),
            running: false,
            visible: true,
            overlay_enabled: false,
            video,
            canvas: CanvasSize::from_css(video.width, video.height, 1.0),
            sink: None,
            frames_processed: 0,
        }
    }

    pub fn with_minimums(mut self, minimums: CategoryMinimums) -> Self {
        self.policy = ThresholdPolicy::new(minimums);
        self
    }

    pub fn with_overlay(mut self, enabled: bool) -> Self {
        self.overlay_enabled = enabled;
        self
    }

    pub fn with_state_sink(mut self, sink: impl StateSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Begin a session: state goes back to non-performative with both
    /// streaks at zero, and a previously requested stop is cleared.
    pub fn start(&mut self) {
        self.state.reset();
        self.frames_processed = 0;
        self.stop.clear();
        self.running = true;
    }

    /// End the session. Cancels any further tick and resets state.
    pub fn stop(&mut self) {
        self.running = false;
        self.state.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.stop.is_stopped()
    }

    /// Pause or resume scheduling with the execution context's
    /// visibility. Hiding never resets state; resuming picks up the
    /// streaks exactly where they left off.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handle for external stop requests (e.g. a signal handler).
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    pub fn warm_up(&mut self) -> Result<()> {
        self.detector.warm_up()
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay_enabled
    }

    pub fn set_overlay_enabled(&mut self, enabled: bool) {
        self.overlay_enabled = enabled;
    }

    /// Update the video/canvas geometry on a layout or resize event.
    pub fn set_surface(&mut self, video: VideoSize, canvas: CanvasSize) {
        self.video = video;
        self.canvas = canvas;
    }

    pub fn set_enter_score(&mut self, value: f32) {
        self.settings.set_enter_score(value);
    }

    pub fn set_exit_score(&mut self, value: f32) {
        self.settings.set_exit_score(value);
    }

    /// Change the enter run length. The partially-built match streak is
    /// forgotten: frames counted under the old threshold must not count
    /// toward the new one.
    pub fn set_frames_enter(&mut self, value: u32) {
        self.settings.set_frames_enter(value);
        self.state.reset_match_streak();
    }

    /// Change the exit run length (see `set_frames_enter`).
    pub fn set_frames_exit(&mut self, value: u32) {
        self.settings.set_frames_exit(value);
        self.state.reset_non_match_streak();
    }

    /// Restore default settings and forget both streaks.
    pub fn reset_settings(&mut self) {
        self.settings = Settings::default();
        self.state.reset_match_streak();
        self.state.reset_non_match_streak();
    }

    /// Process one display tick against one frame's pixels.
    ///
    /// Exactly one state-machine mutation happens per processed frame.
    /// When the session is stopped or hidden the tick is a no-op; when
    /// the detector fails the streaks hold and the loop stays alive.
    pub fn tick(&mut self, pixels: &[u8], width: u32, height: u32) -> TickOutcome {
        if !self.is_running() || !self.visible {
            return TickOutcome::Idle;
        }

        let predictions = match self.detector.detect(pixels, width, height) {
            Ok(predictions) => predictions,
            Err(e) => {
                log::warn!("detector '{}' failed: {:#}", self.detector.name(), e);
                return TickOutcome::DetectorFailed;
            }
        };

        // A stop may have been requested while the detector call was in
        // flight; its result must not mutate state.
        if self.stop.is_stopped() {
            return TickOutcome::Idle;
        }

        let pass = self
            .policy
            .pass_set(&predictions, &self.state, &self.settings);
        let pass_count = pass.len();
        let overlay = if self.overlay_enabled {
            overlay::render(&pass, self.video, self.canvas)
        } else {
            overlay::cleared()
        };

        let transition = self.state.observe(
            pass_count > 0,
            self.settings.frames_enter(),
            self.settings.frames_exit(),
        );
        if let Some(transition) = transition {
            log::debug!(
                "state transition: {:?} (pass_count={}, frame={})",
                transition,
                pass_count,
                self.frames_processed
            );
            if let Some(sink) = self.sink.as_mut() {
                sink.on_state_change(transition.is_performative());
            }
        }
        self.frames_processed += 1;

        TickOutcome::Frame(TickReport {
            transition,
            pass_count,
            overlay,
        })
    }
}

/// Paces ticks of the loop. Injected so the core never touches a real
/// timer directly.
pub trait TickScheduler {
    /// Blocks until the next display tick is due. Returns false when no
    /// further tick will be delivered and the loop should wind down.
    fn next_tick(&mut self) -> bool;
}

/// Wall-clock scheduler targeting a fixed frame rate, honoring a stop
/// handle both before and after the wait.
pub struct IntervalScheduler {
    period: Duration,
    stop: StopHandle,
}

impl IntervalScheduler {
    pub fn new(target_fps: u32, stop: StopHandle) -> Self {
        let fps = target_fps.max(1);
        Self {
            period: Duration::from_millis(1000 / u64::from(fps)),
            stop,
        }
    }
}

impl TickScheduler for IntervalScheduler {
    fn next_tick(&mut self) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        std::thread::sleep(self.period);
        !self.stop.is_stopped()
    }
}
