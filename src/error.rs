use thiserror::Error;

/// Rejected game configuration; the session never begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("target word must not be empty")]
    EmptyTargetWord,
    #[error("top-k must be at least 1")]
    ZeroTopK,
    #[error("confidence threshold {0} is outside (0, 1]")]
    ThresholdOutOfRange(f64),
    #[error("time budget must be at least one second")]
    ZeroDuration,
}

/// Errors returned by the session entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The clock was started while a countdown is still running.
    #[error("clock is already running")]
    AlreadyRunning,
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// The drawing surface could not be sampled this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("snapshot unavailable: {0}")]
pub struct CaptureUnavailable(pub String);

/// The classifier could not rank a sample this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("malformed sample: {0}")]
    MalformedSample(String),
    #[error("classification timed out")]
    Timeout,
    #[error("model failure: {0}")]
    Model(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("pixel buffer holds {actual} values, expected {expected} for {width}x{height}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("script contains no rankings")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_session_error() {
        let err: SessionError = ConfigError::ZeroTopK.into();
        assert_eq!(err, SessionError::InvalidConfig(ConfigError::ZeroTopK));
        assert_eq!(
            err.to_string(),
            "invalid configuration: top-k must be at least 1"
        );
    }

    #[test]
    fn sample_error_message_names_dimensions() {
        let err = SampleError::LengthMismatch {
            width: 2,
            height: 3,
            expected: 6,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "pixel buffer holds 4 values, expected 6 for 2x3"
        );
    }
}
