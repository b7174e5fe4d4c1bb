use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};

use crate::detect::backend::Detector;
use crate::detect::result::{BBox, Prediction};

/// Frames per "empty scene" phase of the stub script.
const PHASE_EMPTY_FRAMES: u64 = 24;
/// Frames per "prop in view" phase of the stub script.
const PHASE_PROP_FRAMES: u64 = 36;

/// Stub detector for demos. Alternates between an empty scene and a scene
/// holding a cup (and sometimes a book), with scores jittered from a hash
/// of the frame pixels so the output is deterministic per pixel sequence.
pub struct StubDetector {
    frame_count: u64,
}

impl StubDetector {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Prediction>> {
        let digest: [u8; 32] = Sha256::digest(pixels).into();
        let phase = self.frame_count % (PHASE_EMPTY_FRAMES + PHASE_PROP_FRAMES);
        self.frame_count += 1;

        if phase < PHASE_EMPTY_FRAMES {
            return Ok(Vec::new());
        }

        let w = width as f32;
        let h = height as f32;
        let jitter = f32::from(digest[0]) / 255.0;

        let mut predictions = vec![Prediction::new(
            "cup",
            0.38 + jitter * 0.2,
            BBox::new(w * 0.30, h * 0.40, w * 0.20, h * 0.25),
        )];
        if digest[1] % 3 == 0 {
            predictions.push(Prediction::new(
                "book",
                0.45 + jitter * 0.1,
                BBox::new(w * 0.55, h * 0.35, w * 0.25, h * 0.30),
            ));
        }
        Ok(predictions)
    }
}

/// What a scripted detector returns for one frame.
#[derive(Clone, Debug, Default)]
pub enum ScriptedFrame {
    /// No detections this frame.
    #[default]
    Empty,
    /// Fixed detections this frame.
    Predictions(Vec<Prediction>),
    /// The detector call itself fails this frame.
    Fail,
}

/// Detector that replays a fixed per-frame script, then returns empty
/// frames forever. Intended for tests that need exact frame sequences.
pub struct ScriptedDetector {
    frames: VecDeque<ScriptedFrame>,
}

impl ScriptedDetector {
    pub fn new(frames: impl IntoIterator<Item = ScriptedFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl Detector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Prediction>> {
        match self.frames.pop_front() {
            None | Some(ScriptedFrame::Empty) => Ok(Vec::new()),
            Some(ScriptedFrame::Predictions(predictions)) => Ok(predictions),
            Some(ScriptedFrame::Fail) => Err(anyhow!("scripted detector failure")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_is_deterministic_for_identical_pixel_sequences() {
        let mut a = StubDetector::new();
        let mut b = StubDetector::new();
        for i in 0..100u8 {
            let pixels = vec![i; 64];
            let left = a.detect(&pixels, 640, 480).unwrap();
            let right = b.detect(&pixels, 640, 480).unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn stub_alternates_empty_and_prop_phases() {
        let mut stub = StubDetector::new();
        let pixels = vec![7u8; 64];
        for _ in 0..PHASE_EMPTY_FRAMES {
            assert!(stub.detect(&pixels, 640, 480).unwrap().is_empty());
        }
        for _ in 0..PHASE_PROP_FRAMES {
            assert!(!stub.detect(&pixels, 640, 480).unwrap().is_empty());
        }
        assert!(stub.detect(&pixels, 640, 480).unwrap().is_empty());
    }

    #[test]
    fn scripted_replays_then_returns_empty() {
        let mut scripted = ScriptedDetector::new([
            ScriptedFrame::Predictions(vec![Prediction::new(
                "cup",
                0.5,
                BBox::new(0.0, 0.0, 10.0, 10.0),
            )]),
            ScriptedFrame::Fail,
        ]);
        assert_eq!(scripted.detect(&[], 1, 1).unwrap().len(), 1);
        assert!(scripted.detect(&[], 1, 1).is_err());
        assert!(scripted.detect(&[], 1, 1).unwrap().is_empty());
    }
}
