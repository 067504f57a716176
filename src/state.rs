use crate::math::{clamp, wrap_angle_signed};

/// Orientation of the whole sphere, in degrees.
///
/// One per gallery. Only the gesture controller writes it; everything else
/// reads through [`RotationState::pitch_deg`] and [`RotationState::yaw_deg`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    /// Rotation around the X-axis, clamped to the configured maximum
    pitch_deg: f64,
    /// Rotation around the Y-axis; unwrapped while dragging
    yaw_deg: f64,
}

impl RotationState {
    pub fn new(pitch_deg: f64, yaw_deg: f64) -> Self {
        Self { pitch_deg, yaw_deg }
    }

    pub fn pitch_deg(&self) -> f64 {
        self.pitch_deg
    }

    pub fn yaw_deg(&self) -> f64 {
        self.yaw_deg
    }

    /// Sets both angles, clamping pitch into `[-max_pitch, max_pitch]`.
    pub(crate) fn set(&mut self, pitch_deg: f64, yaw_deg: f64, max_pitch: f64) {
        self.pitch_deg = clamp(pitch_deg, -max_pitch, max_pitch);
        self.yaw_deg = yaw_deg;
    }

    /// Brings yaw back into `(-180, 180]`; called whenever rotation comes to rest.
    pub(crate) fn settle(&mut self) {
        self.yaw_deg = wrap_angle_signed(self.yaw_deg);
    }
}
