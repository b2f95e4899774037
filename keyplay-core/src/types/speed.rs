//! Playback speed with a canonical clamp

use std::fmt;

/// Playback speed multiplier. 2.0 plays twice as fast.
///
/// Always within [`PlaybackSpeed::MIN`, `PlaybackSpeed::MAX`]; out-of-range
/// requests are clamped, non-finite or non-positive ones fall back to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackSpeed(f64);

impl PlaybackSpeed {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 2.0;
    pub const NORMAL: PlaybackSpeed = PlaybackSpeed(1.0);

    pub fn new(requested: f64) -> Self {
        if !requested.is_finite() || requested <= 0.0 {
            return Self::NORMAL;
        }
        Self(requested.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// True if `requested` would be altered by [`PlaybackSpeed::new`]
    pub fn is_clamped(requested: f64) -> bool {
        Self::new(requested).0 != requested
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_clamping() {
        assert_eq!(PlaybackSpeed::new(1.5).get(), 1.5);
        assert_eq!(PlaybackSpeed::new(0.1).get(), 0.5);
        assert_eq!(PlaybackSpeed::new(10.0).get(), 2.0);
    }

    #[test]
    fn test_invalid_speed_falls_back_to_normal() {
        assert_eq!(PlaybackSpeed::new(0.0), PlaybackSpeed::NORMAL);
        assert_eq!(PlaybackSpeed::new(-2.0), PlaybackSpeed::NORMAL);
        assert_eq!(PlaybackSpeed::new(f64::NAN), PlaybackSpeed::NORMAL);
        assert_eq!(PlaybackSpeed::new(f64::INFINITY), PlaybackSpeed::NORMAL);
    }

    #[test]
    fn test_is_clamped() {
        assert!(!PlaybackSpeed::is_clamped(1.0));
        assert!(PlaybackSpeed::is_clamped(3.0));
        assert!(PlaybackSpeed::is_clamped(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(PlaybackSpeed::new(1.25).to_string(), "1.25x");
    }
}
