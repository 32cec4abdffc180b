//! Error types for nodeflow.
//!
//! Stepping a simulation never fails. Everything that can go wrong happens
//! before the first tick: a malformed configuration, or a config file that
//! cannot be read or parsed.

/// A configuration value that cannot produce a valid topology or simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A count that must be at least one was zero.
    #[error("`{field}` must be at least 1")]
    ZeroCount { field: &'static str },

    /// A length, radius or magnitude that must be positive was not.
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    /// A value that must not be negative was.
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    /// NaN or infinity.
    #[error("`{field}` must be finite")]
    NotFinite { field: &'static str },

    /// A fraction outside its allowed interval.
    #[error("`{field}` must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// A `min..max` pair whose ends are swapped.
    #[error("`{field}` range is inverted ({min} > {max})")]
    InvertedRange { field: &'static str, min: f32, max: f32 },

    /// The hue palette has no entries.
    #[error("`graph.hues` must contain at least one hue")]
    EmptyPalette,
}

/// Errors returned while setting up a simulation.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A config file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// A config file is not valid JSON for [`FlowConfig`](crate::FlowConfig).
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_flow_error() {
        let err: FlowError = ConfigError::ZeroCount { field: "pool.capacity" }.into();
        assert!(matches!(err, FlowError::Config(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: `pool.capacity` must be at least 1"
        );
    }

    #[test]
    fn range_message_names_both_ends() {
        let err = ConfigError::InvertedRange {
            field: "particles.min_lifetime",
            min: 9.0,
            max: 3.0,
        };
        assert!(err.to_string().contains("9 > 3"));
    }
}
