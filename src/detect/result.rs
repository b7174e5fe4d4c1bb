/// A single prediction emitted by a detector backend for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Raw label as reported by the detector (e.g. "cup", "wine glass").
    pub label: String,
    /// Confidence score in 0..=1.
    pub score: f32,
    /// Bounding box in detector/video pixel space.
    pub bbox: BBox,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32, bbox: BBox) -> Self {
        Self {
            label: label.into(),
            score,
            bbox,
        }
    }
}

/// Axis-aligned bounding box (x, y, width, height) in video pixels.
///
/// Components may be non-finite: detectors occasionally emit garbage
/// geometry, and that is a valid input, not an error. Such predictions are
/// skipped by the overlay renderer but still count for classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// True when every component is a finite number, i.e. the box is drawable.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}
