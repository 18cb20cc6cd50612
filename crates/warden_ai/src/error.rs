//! Error types for agent configuration

use thiserror::Error;

/// Agent configuration errors
///
/// Only raised while building an agent. Once an agent runs, degenerate
/// inputs are handled as policy branches and never surface as errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    /// View distance must be strictly positive
    #[error("Invalid view distance: {0} (must be > 0)")]
    InvalidViewDistance(f32),

    /// View angle must lie in (0, 180] degrees
    #[error("Invalid view angle: {0} degrees (must be in (0, 180])")]
    InvalidViewAngle(f32),

    /// A duration, speed or distance was negative or not a number
    #[error("Invalid {name}: {value} (must be a non-negative number)")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// Flee sweep parameters are unusable
    #[error("Invalid flee search: {0}")]
    InvalidFleeSearch(String),

    /// A trigger-fleeing profile was given a filter that matches any object
    #[error("Trigger flee filter must require at least one tag")]
    UntaggedFleeTrigger,
}

/// Result type for agent configuration
pub type Result<T> = std::result::Result<T, AiError>;

/// Check that `value` is a finite, non-negative number
pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AiError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_negative() {
        assert!(non_negative("speed", 0.0).is_ok());
        assert!(non_negative("speed", 3.5).is_ok());
        assert_eq!(
            non_negative("speed", -1.0),
            Err(AiError::InvalidParameter { name: "speed", value: -1.0 })
        );
        assert!(non_negative("speed", f32::NAN).is_err());
        assert!(non_negative("speed", f32::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AiError::InvalidViewAngle(200.0).to_string(),
            "Invalid view angle: 200 degrees (must be in (0, 180])"
        );
        assert_eq!(
            AiError::InvalidParameter { name: "flee_duration", value: -2.0 }.to_string(),
            "Invalid flee_duration: -2 (must be a non-negative number)"
        );
    }
}
