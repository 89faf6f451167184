// Library surface for the binary, headless integration tests and embedding
// in a presentation layer.
pub mod app_dirs;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod controller;
pub mod difficulty;
pub mod error;
pub mod guess;
pub mod machine;
pub mod replay;
pub mod sample;
pub mod scheduler;
pub mod session;

pub use classifier::Classifier;
pub use controller::SessionController;
pub use error::{CaptureUnavailable, ClassificationError, ConfigError, SessionError};
pub use guess::{Guess, RankedGuess};
pub use sample::{Sample, SnapshotProvider};
pub use session::{GameConfig, ProbabilityPoint, SessionSnapshot, Status, Trend};
