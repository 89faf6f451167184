use crate::classifier::Classifier;
use crate::error::{ClassificationError, ScriptError};
use crate::guess::{normalize_label, Guess, RankedGuess};
use crate::sample::Sample;
use rand::Rng;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// One scripted classifier response; `None` means the call fails.
pub type Frame = Option<Vec<(String, f64)>>;

/// Replays a fixed sequence of rankings, one per call.
///
/// Script files are JSON arrays of frames, e.g.
/// `[[["dog", 0.4], ["cat", 0.3]], null, [["cat", 0.6]]]`.
/// Once exhausted the last frame repeats.
#[derive(Debug)]
pub struct ScriptedClassifier {
    frames: Vec<Frame>,
    cursor: AtomicUsize,
    latency: Duration,
}

impl ScriptedClassifier {
    pub fn new(frames: Vec<Frame>) -> Result<Self, ScriptError> {
        if frames.is_empty() {
            return Err(ScriptError::Empty);
        }
        Ok(Self {
            frames,
            cursor: AtomicUsize::new(0),
            latency: Duration::ZERO,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Sleep this long inside every call to emulate model latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _sample: &Sample) -> Result<RankedGuess, ClassificationError> {
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        match &self.frames[idx.min(self.frames.len() - 1)] {
            Some(pairs) => Ok(RankedGuess::from_pairs(
                pairs.iter().map(|(label, p)| (label.as_str(), *p)),
            )),
            None => Err(ClassificationError::Model(format!(
                "scripted failure on call {}",
                idx + 1
            ))),
        }
    }
}

/// Random rankings over a label set, with the target slowly gaining confidence
/// the way a drawing converges on the word.
#[derive(Debug)]
pub struct SimulatedClassifier {
    target: String,
    labels: Vec<String>,
    calls: AtomicUsize,
    drift: f64,
}

impl SimulatedClassifier {
    pub fn new(target: &str, labels: &[&str]) -> Self {
        let target = normalize_label(target);
        let labels = labels
            .iter()
            .map(|l| normalize_label(l))
            .filter(|l| *l != target)
            .collect();
        Self {
            target,
            labels,
            calls: AtomicUsize::new(0),
            drift: 0.06,
        }
    }

    /// How much the target's base probability rises per call.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }
}

impl Classifier for SimulatedClassifier {
    fn classify(&self, _sample: &Sample) -> Result<RankedGuess, ClassificationError> {
        let step = self.calls.fetch_add(1, Ordering::Relaxed) as f64;
        let mut rng = rand::thread_rng();

        let target_p = (0.02 + self.drift * step + rng.gen_range(-0.03..0.03)).clamp(0.0, 0.95);
        let mut remaining = 1.0 - target_p;
        let mut guesses = vec![Guess::new(&self.target, target_p)];
        for label in &self.labels {
            let p = remaining * rng.gen_range(0.0..0.5);
            remaining -= p;
            guesses.push(Guess::new(label, p));
        }
        Ok(RankedGuess::new(guesses))
    }
}
