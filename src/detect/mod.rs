//! Detector-facing types.
//!
//! The crate does not perform object detection itself. Detection is an
//! external collaborator behind the [`Detector`] trait; everything
//! downstream (classification, thresholds, hysteresis, overlay) consumes
//! the `Prediction` values a backend returns.

pub mod backend;
pub mod result;
pub mod stub;

pub use backend::Detector;
pub use result::{BBox, Prediction};
pub use stub::{ScriptedDetector, ScriptedFrame, StubDetector};
