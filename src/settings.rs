//! Tuning settings and their text store.
//!
//! Settings outlive detection sessions. Fields are private so that every
//! mutation path runs through a clamping setter; the ordering invariant
//! `exit_score < enter_score` therefore holds at all times.
//!
//! The store format is a flat camelCase JSON record. Loading is fully
//! tolerant: each field is type-checked independently and falls back to
//! its compiled-in default alone, and a missing or unreadable file simply
//! yields the defaults. Load never returns an error to the caller.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_ENTER_SCORE: f32 = 0.35;
pub const DEFAULT_EXIT_SCORE: f32 = 0.30;
pub const DEFAULT_FRAMES_ENTER: u32 = 4;
pub const DEFAULT_FRAMES_EXIT: u32 = 6;

const ENTER_SCORE_MIN: f32 = 0.05;
const ENTER_SCORE_MAX: f32 = 0.99;
const EXIT_SCORE_MIN: f32 = 0.01;
/// Gap the exit score is pulled down to when the enter score crosses it.
const EXIT_PULL_GAP: f32 = 0.05;
/// The exit score must sit at least this far below the enter score.
const EXIT_MARGIN: f32 = 0.01;
const FRAMES_MIN: u32 = 1;
const FRAMES_ENTER_MAX: u32 = 60;
const FRAMES_EXIT_MAX: u32 = 120;

/// Confidence thresholds and run-length requirements for the hysteresis
/// pipeline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    enter_score: f32,
    exit_score: f32,
    frames_enter: u32,
    frames_exit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enter_score: DEFAULT_ENTER_SCORE,
            exit_score: DEFAULT_EXIT_SCORE,
            frames_enter: DEFAULT_FRAMES_ENTER,
            frames_exit: DEFAULT_FRAMES_EXIT,
        }
    }
}

impl Settings {
    /// Score required to first declare the scene performative.
    pub fn enter_score(&self) -> f32 {
        self.enter_score
    }

    /// Score required to keep believing the scene is performative.
    /// Always below `enter_score`.
    pub fn exit_score(&self) -> f32 {
        self.exit_score
    }

    /// Consecutive matching frames required to enter.
    pub fn frames_enter(&self) -> u32 {
        self.frames_enter
    }

    /// Consecutive non-matching frames required to exit.
    pub fn frames_exit(&self) -> u32 {
        self.frames_exit
    }

    /// Set the enter score, clamped to its range. When the new enter score
    /// lands at or below the exit score, the exit score is pulled down to
    /// keep the ordering invariant. Non-finite input retains the old value.
    pub fn set_enter_score(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.enter_score = value.clamp(ENTER_SCORE_MIN, ENTER_SCORE_MAX);
        if self.exit_score >= self.enter_score {
            self.exit_score = (self.enter_score - EXIT_PULL_GAP).max(EXIT_SCORE_MIN);
        }
    }

    /// Set the exit score, clamped below the current enter score.
    /// Non-finite input retains the old value.
    pub fn set_exit_score(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.exit_score = value.clamp(EXIT_SCORE_MIN, self.enter_score - EXIT_MARGIN);
    }

    pub fn set_frames_enter(&mut self, value: u32) {
        self.frames_enter = value.clamp(FRAMES_MIN, FRAMES_ENTER_MAX);
    }

    pub fn set_frames_exit(&mut self, value: u32) {
        self.frames_exit = value.clamp(FRAMES_MIN, FRAMES_EXIT_MAX);
    }

    /// Parse the persisted record. Fields with a wrong or missing type
    /// fall back to their defaults individually; the whole string failing
    /// to parse yields all defaults. Values pass through the clamping
    /// setters so the ordering invariant holds after load as well.
    pub fn from_json_str(raw: &str) -> Self {
        let mut settings = Self::default();
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return settings;
        };
        if let Some(v) = value.get("enterScore").and_then(Value::as_f64) {
            settings.set_enter_score(v as f32);
        }
        if let Some(v) = value.get("exitScore").and_then(Value::as_f64) {
            settings.set_exit_score(v as f32);
        }
        // Frame counts must be integers; 4.5 is a type error, not a value
        // to round.
        if let Some(v) = value.get("framesEnter").and_then(Value::as_u64) {
            settings.set_frames_enter(u32::try_from(v).unwrap_or(u32::MAX));
        }
        if let Some(v) = value.get("framesExit").and_then(Value::as_u64) {
            settings.set_frames_exit(u32::try_from(v).unwrap_or(u32::MAX));
        }
        settings
    }

    /// Serialize to the flat camelCase record.
    pub fn to_json_string(&self) -> String {
        serde_json::json!({
            "enterScore": self.enter_score,
            "exitScore": self.exit_score,
            "framesEnter": self.frames_enter,
            "framesExit": self.frames_exit,
        })
        .to_string()
    }

    /// Load from a file, treating any read failure as "no stored settings".
    pub fn load_from_path(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(e) => {
                log::debug!("settings store {} not readable ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Persist to a file. Unlike load, save is fallible so callers can log.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string())
            .with_context(|| format!("failed to write settings store {}", path.display()))
    }
}
