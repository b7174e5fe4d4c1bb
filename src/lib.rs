//! Propwatch
//!
//! This crate turns a noisy per-frame object detector into a stable
//! boolean scene state: is a "performative" prop (a drink, a book, a tin)
//! currently staged in front of the camera?
//!
//! # Pipeline
//!
//! Each frame flows through four stages, in order:
//!
//! 1. **Detect** (`detect`): a backend produces labeled, scored boxes.
//! 2. **Classify** (`classify`): labels map to a prop category, or none.
//! 3. **Threshold** (`policy`): scores are filtered against the active
//!    enter/exit threshold plus per-category minimums.
//! 4. **Debounce** (`hysteresis`): consecutive-frame streaks decide when
//!    the scene state actually flips.
//!
//! `monitor` drives the stages once per display tick and forwards state
//! transitions to an injected sink; `overlay` renders the surviving
//! detections as device-pixel draw instructions; `settings` persists the
//! tunable thresholds with clamping on every write path.

pub mod classify;
pub mod config;
pub mod detect;
pub mod hysteresis;
pub mod monitor;
pub mod overlay;
pub mod policy;
pub mod settings;

pub use classify::{classify, Category};
pub use config::{PropwatchConfig, SourceSettings};
pub use detect::{BBox, Detector, Prediction, ScriptedDetector, ScriptedFrame, StubDetector};
pub use hysteresis::{DetectionState, Transition};
pub use monitor::{
    IntervalScheduler, SceneMonitor, StateSink, StopHandle, TickOutcome, TickReport, TickScheduler,
};
pub use overlay::{CanvasSize, DrawOp, VideoSize};
pub use policy::{CategoryMinimums, ThresholdPolicy};
pub use settings::Settings;
