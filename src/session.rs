use crate::error::ConfigError;
use crate::guess::{normalize_label, Guess};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Rules for a single game, validated when the session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// How many ranked guesses count as "in range" for a win.
    pub top_k: usize,
    /// Minimum probability the target needs inside the top-k window, in (0, 1].
    pub confidence_threshold: f64,
    pub total_seconds: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            confidence_threshold: 0.01,
            total_seconds: 60,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        // NaN fails both comparisons and is rejected too
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(ConfigError::ThresholdOutOfRange(self.confidence_threshold));
        }
        if self.total_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Status {
    InProgress,
    Won,
    Lost,
    TimedOut,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// Direction of the target word's probability between consecutive merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display)]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

impl Trend {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// Authoritative state of the live game.
#[derive(Debug, Clone)]
pub struct Session {
    pub target_word: String,
    pub status: Status,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub top_k: usize,
    pub confidence_threshold: f64,
    pub last_target_probability: f64,
    pub trend: Trend,
    pub started_at: DateTime<Local>,
}

impl Session {
    pub fn new(target_word: &str, config: &GameConfig) -> Result<Self, ConfigError> {
        let target_word = normalize_label(target_word);
        if target_word.is_empty() {
            return Err(ConfigError::EmptyTargetWord);
        }
        config.validate()?;

        Ok(Self {
            target_word,
            status: Status::InProgress,
            remaining_seconds: config.total_seconds,
            total_seconds: config.total_seconds,
            top_k: config.top_k,
            confidence_threshold: config.confidence_threshold,
            last_target_probability: 0.0,
            trend: Trend::Flat,
            started_at: Local::now(),
        })
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }
}

/// Target-word probability observed `t` seconds into the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityPoint {
    pub t: f64,
    pub probability: f64,
}

impl ProbabilityPoint {
    pub fn new(t: f64, probability: f64) -> Self {
        Self { t, probability }
    }
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub target_word: String,
    pub status: Status,
    pub trend: Trend,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub top_k: usize,
    pub confidence_threshold: f64,
    pub last_target_probability: f64,
    /// Zero-based rank of the target in the latest ranking, if it was ranked.
    pub target_rank: Option<usize>,
    pub top_guesses: Vec<Guess>,
    pub history: Vec<ProbabilityPoint>,
    pub classification_in_flight: bool,
    pub started_at: DateTime<Local>,
}

impl SessionSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(top_k: usize, confidence_threshold: f64, total_seconds: u32) -> GameConfig {
        GameConfig {
            top_k,
            confidence_threshold,
            total_seconds,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_top_k() {
        assert_eq!(config(0, 0.5, 10).validate(), Err(ConfigError::ZeroTopK));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        for bad in [0.0, -0.1, 1.01] {
            assert_eq!(
                config(3, bad, 10).validate(),
                Err(ConfigError::ThresholdOutOfRange(bad))
            );
        }
        assert!(config(3, f64::NAN, 10).validate().is_err());
        assert_eq!(config(3, 1.0, 10).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_duration() {
        assert_eq!(config(3, 0.5, 0).validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn test_session_new() {
        let session = Session::new("hot_air_balloon", &config(2, 0.25, 30)).unwrap();
        assert_eq!(session.target_word, "hot air balloon");
        assert_eq!(session.status, Status::InProgress);
        assert_eq!(session.remaining_seconds, 30);
        assert_eq!(session.last_target_probability, 0.0);
        assert_eq!(session.trend, Trend::Flat);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn test_session_rejects_blank_word() {
        assert_eq!(
            Session::new("  ", &GameConfig::default()).unwrap_err(),
            ConfigError::EmptyTargetWord
        );
    }

    #[test]
    fn test_trend_between() {
        assert_eq!(Trend::between(0.1, 0.3), Trend::Up);
        assert_eq!(Trend::between(0.3, 0.1), Trend::Down);
        assert_eq!(Trend::between(0.3, 0.3), Trend::Flat);
        assert_eq!(Trend::between(0.0, 0.0), Trend::Flat);
        assert_eq!(Trend::between(0.0, f64::MIN_POSITIVE), Trend::Up);
        assert_eq!(Trend::between(1.0, 0.999), Trend::Down);

        let samples = [0.0, 0.1, 0.25, 0.5, 0.99, 1.0];
        for (i, &previous) in samples.iter().enumerate() {
            for (j, &current) in samples.iter().enumerate() {
                let trend = Trend::between(previous, current);
                assert_eq!(trend == Trend::Up, j > i);
                assert_eq!(trend == Trend::Down, j < i);
                assert_eq!(trend == Trend::Flat, i == j);
            }
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(!Status::InProgress.is_terminal());
        assert!(Status::Won.is_terminal());
        assert!(Status::Lost.is_terminal());
        assert!(Status::TimedOut.is_terminal());
        assert_eq!(Status::TimedOut.to_string(), "TimedOut");
    }
}
