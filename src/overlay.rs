//! Overlay renderer.
//!
//! Pure geometry mapper: takes the frame's pass set plus the video and
//! canvas geometry and produces a list of drawing instructions. No real
//! drawing backend lives here; consumers execute the ops against whatever
//! 2D surface they own. The instruction list always starts by clearing
//! the surface, so stale boxes never survive a tick.

use crate::detect::Prediction;

/// Device pixel ratios above this are clamped to bound draw cost.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Box stroke width in CSS pixels (scaled by DPR).
const LINE_WIDTH: f32 = 2.0;
/// Label font size in CSS pixels.
const LABEL_FONT_PX: f32 = 11.0;
/// Label background height in CSS pixels.
const LABEL_HEIGHT: f32 = 20.0;
/// Label padding / corner radius in CSS pixels.
const LABEL_PAD: f32 = 6.0;
/// Extra width added to the label background, in CSS pixels.
const LABEL_WIDTH_PAD: f32 = 12.0;
/// Estimated glyph advance as a fraction of the font size. A pure
/// renderer cannot measure text, so the background width is approximate.
const GLYPH_ADVANCE: f32 = 0.6;
/// How far above the box the label baseline sits, in CSS pixels.
const TEXT_BASELINE_LIFT: f32 = 10.0;
/// Minimum baseline so the label stays on-surface at the top edge.
const TEXT_MIN_BASELINE: f32 = 14.0;

/// Native size of the video the detector ran on, in video pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoSize {
    pub width: f32,
    pub height: f32,
}

impl VideoSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Drawing surface size in device pixels, with the device pixel ratio it
/// was derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl CanvasSize {
    /// Derive the device-pixel surface size from the displayed CSS size.
    /// The device pixel ratio is clamped to [`MAX_DEVICE_PIXEL_RATIO`];
    /// a non-finite or non-positive ratio falls back to 1.
    pub fn from_css(css_width: f32, css_height: f32, device_pixel_ratio: f32) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: css_width * dpr,
            height: css_height * dpr,
            dpr,
        }
    }
}

/// One drawing instruction, in device-pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Clear the whole surface. Always the first op of a frame.
    Clear,
    /// Stroke the detection rectangle.
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        line_width: f32,
    },
    /// Fill the label background box.
    FillRoundRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
    },
    /// Draw label text at a baseline position.
    FillText {
        text: String,
        x: f32,
        y: f32,
        font_px: f32,
    },
}

/// The clear-only instruction list, used when overlays are disabled.
/// The surface is still wiped every tick so stale boxes disappear.
pub fn cleared() -> Vec<DrawOp> {
    vec![DrawOp::Clear]
}

/// Render the pass set against the given geometry.
///
/// Predictions with any non-finite bbox component are skipped; they are
/// undrawable but remain valid inputs. A degenerate video size renders
/// clear-only rather than emitting non-finite coordinates.
pub fn render(pass_set: &[&Prediction], video: VideoSize, canvas: CanvasSize) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::Clear];
    if pass_set.is_empty() || video.is_degenerate() {
        return ops;
    }

    let scale_x = canvas.width / video.width;
    let scale_y = canvas.height / video.height;
    let dpr = canvas.dpr;

    for prediction in pass_set {
        let bbox = prediction.bbox;
        if !bbox.is_finite() {
            continue;
        }

        let sx = bbox.x * scale_x;
        let sy = bbox.y * scale_y;
        ops.push(DrawOp::StrokeRect {
            x: sx,
            y: sy,
            w: bbox.w * scale_x,
            h: bbox.h * scale_y,
            line_width: LINE_WIDTH * dpr,
        });

        let text = format!(
            "{} {}%",
            prediction.label,
            (prediction.score * 100.0).round() as i32
        );
        let font_px = LABEL_FONT_PX * dpr;
        let tw = text.chars().count() as f32 * font_px * GLYPH_ADVANCE + LABEL_WIDTH_PAD * dpr;
        let th = LABEL_HEIGHT * dpr;
        ops.push(DrawOp::FillRoundRect {
            x: sx,
            // Clamp at the top edge so the label stays on-surface.
            y: (sy - th - LABEL_PAD * dpr).max(0.0),
            w: tw,
            h: th,
            radius: LABEL_PAD * dpr,
        });
        ops.push(DrawOp::FillText {
            text,
            x: sx + LABEL_PAD * dpr,
            y: (sy - TEXT_BASELINE_LIFT * dpr).max(TEXT_MIN_BASELINE * dpr),
            font_px,
        });
    }
    ops
}
