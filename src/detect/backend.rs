use anyhow::Result;

use crate::detect::result::Prediction;

/// Detector backend trait.
///
/// Implementations consume one frame's pixels and return the raw
/// per-frame predictions. Exactly one `detect` call is in flight at a
/// time; the monitor suspends on it and only then runs classification,
/// thresholding, the state machine, and overlay rendering for the tick.
///
/// A failed call is non-fatal to the loop: the monitor logs it, holds
/// both streak counters at their prior values, and reschedules.
pub trait Detector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Prediction>>;

    /// Optional warm-up hook, called once before the first frame.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
