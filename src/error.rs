//! Configuration validation errors.
//!
//! Per-frame operation has no failure paths; the only fallible surface is
//! control construction, where tunable constants are checked once.

use thiserror::Error;

/// Rejected tunable-constant combinations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The grab threshold must sit strictly below the open threshold so the
    /// gap between them forms the anti-flicker dead zone.
    #[error("grab threshold {grab} must be below open threshold {open}")]
    ThresholdBand { grab: f32, open: f32 },

    /// The release threshold must sit strictly below the activation
    /// threshold so the gap forms the press hysteresis band.
    #[error("release threshold {release} must be below activation threshold {activation}")]
    ActivationBand { activation: f32, release: f32 },

    /// The release range must be at least the highlight range so an
    /// engaged pair of hands is not dropped at the acquisition boundary.
    #[error("release padding {release} must not be below highlight padding {highlight}")]
    PaddingBand { highlight: f32, release: f32 },

    /// Scale clamp bounds are inverted.
    #[error("min scale {min} must not exceed max scale {max}")]
    ScaleBounds { min: f32, max: f32 },

    /// Rotary grab radii are inverted.
    #[error("inner radius {inner} must be below outer radius {outer}")]
    RadiusBand { inner: f32, outer: f32 },

    /// A rotary selector needs at least one option.
    #[error("segment count must be at least 1")]
    ZeroSegments,

    /// A length, depth, rate, or threshold that must be strictly positive.
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

/// Shorthand used by the config validators.
pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("travel", 0.2).is_ok());
        assert_eq!(
            require_positive("travel", 0.0),
            Err(ConfigError::NonPositive {
                name: "travel",
                value: 0.0,
            }),
        );
        assert!(require_positive("travel", -1.0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::ThresholdBand {
            grab: 0.2,
            open: 0.1,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.2"), "unexpected message: {}", msg);
        assert!(msg.contains("below"), "unexpected message: {}", msg);
    }
}
