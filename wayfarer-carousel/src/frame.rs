//! One-shot "next animation frame" gate.
//!
//! A teleport must reach the screen with transitions disabled before they
//! are switched back on. The gate records the frame a teleport happened in
//! and fires on the first frame after it.

/// Fires once on the first animation frame after [`FrameGate::arm`].
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    frame: u64,
    armed_at: Option<u64>,
}

impl FrameGate {
    /// A disarmed gate at frame 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame counter.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Waiting for the next frame.
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Request a callback on the next frame.
    pub fn arm(&mut self) {
        self.armed_at = Some(self.frame);
    }

    /// Drop a pending request. Used on teardown so no state update lands
    /// after unmount.
    pub fn cancel(&mut self) {
        self.armed_at = None;
    }

    /// Advance to the next frame. Returns `true` when an armed request is due.
    pub fn on_frame(&mut self) -> bool {
        self.frame = self.frame.wrapping_add(1);
        if let Some(armed) = self.armed_at.take() {
            tracing::trace!(target: "carousel::frame", armed, frame = self.frame, "deferred frame callback");
            return true;
        }
        false
    }
}
