//! Frame timing for the Tessera scene engine
//!
//! The scheduler advances a [`FrameClock`] once per tick; update callbacks
//! read the resulting scaled and clamped delta.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating clock configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("time scale must be finite and non-negative, got {0}")]
    InvalidTimeScale(f32),

    #[error("max delta time must be finite and positive, got {0}")]
    InvalidMaxDelta(f32),
}

/// Configuration for the frame clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

impl ClockConfig {
    /// Check that the configuration describes a usable clock
    pub fn validate(&self) -> Result<(), ClockError> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ClockError::InvalidTimeScale(self.time_scale));
        }
        if !self.max_delta_time.is_finite() || self.max_delta_time <= 0.0 {
            return Err(ClockError::InvalidMaxDelta(self.max_delta_time));
        }
        Ok(())
    }
}

/// Per-frame time tracking
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Configuration
    pub config: ClockConfig,
    /// Simulated time since the first frame in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Clamped but unscaled delta time
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether simulated time is frozen
    pub paused: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl FrameClock {
    /// Create a new clock with custom config
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            paused: false,
        }
    }

    /// Advance by the raw delta measured since the previous frame.
    ///
    /// Negative or non-finite input counts as zero elapsed time.
    pub fn advance(&mut self, raw_delta: f32) {
        let raw_delta = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        self.unscaled_delta_time = raw_delta.min(self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the time scale (0.0 = frozen, 1.0 = normal, 2.0 = double speed).
    /// The current scale is kept if `scale` is negative or not finite.
    pub fn set_time_scale(&mut self, scale: f32) -> Result<(), ClockError> {
        ClockConfig {
            time_scale: scale,
            ..self.config.clone()
        }
        .validate()?;
        self.config.time_scale = scale;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::default();
        clock.advance(0.016);

        assert!(clock.delta_time > 0.0);
        assert_eq!(clock.frame_count, 1);

        clock.pause();
        clock.advance(0.016);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn delta_is_clamped_then_scaled() {
        let mut clock = FrameClock::new(ClockConfig {
            time_scale: 2.0,
            max_delta_time: 0.1,
        });
        clock.advance(1.0);
        assert!((clock.unscaled_delta_time - 0.1).abs() < f32::EPSILON);
        assert!((clock.delta_time - 0.2).abs() < f32::EPSILON);
        assert!((clock.total_time - 0.2).abs() < 1e-6);

        clock.advance(-3.0);
        assert_eq!(clock.delta_time, 0.0);
        clock.advance(f32::NAN);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn resume_and_toggle() {
        let mut clock = FrameClock::default();
        clock.pause();
        clock.resume();
        clock.advance(0.1);
        assert!((clock.delta_time - 0.1).abs() < f32::EPSILON);

        clock.toggle_pause();
        assert!(clock.paused);
        clock.advance(0.1);
        assert_eq!(clock.delta_time, 0.0);
        clock.toggle_pause();
        assert!(!clock.paused);
    }

    #[test]
    fn time_scale_rejects_invalid_values() {
        let mut clock = FrameClock::default();
        assert!(clock.set_time_scale(0.5).is_ok());
        assert_eq!(
            clock.set_time_scale(f32::INFINITY),
            Err(ClockError::InvalidTimeScale(f32::INFINITY))
        );
        assert_eq!(
            clock.set_time_scale(-2.0),
            Err(ClockError::InvalidTimeScale(-2.0))
        );
        assert_eq!(clock.config.time_scale, 0.5);

        clock.advance(0.2);
        assert!((clock.delta_time - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn config_validation() {
        assert!(ClockConfig::default().validate().is_ok());

        let bad_scale = ClockConfig {
            time_scale: -1.0,
            ..Default::default()
        };
        assert_eq!(bad_scale.validate(), Err(ClockError::InvalidTimeScale(-1.0)));

        let bad_delta = ClockConfig {
            max_delta_time: 0.0,
            ..Default::default()
        };
        assert_eq!(bad_delta.validate(), Err(ClockError::InvalidMaxDelta(0.0)));
    }
}
