use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of ranked guesses shown to the player.
pub const DISPLAY_GUESSES: usize = 10;

/// Class names come out of the model with underscores for spaces ("hot_air_balloon").
pub fn normalize_label(label: &str) -> String {
    label.replace('_', " ").trim().to_string()
}

/// A single classifier guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guess {
    pub label: String,
    pub probability: f64,
}

impl Guess {
    pub fn new(label: &str, probability: f64) -> Self {
        Self {
            label: normalize_label(label),
            probability,
        }
    }
}

impl From<(&str, f64)> for Guess {
    fn from(v: (&str, f64)) -> Self {
        Guess::new(v.0, v.1)
    }
}

/// Classifier output ordered by descending probability.
///
/// The full ranking is kept for rank lookup; `top` gives the display window.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RankedGuess {
    guesses: Vec<Guess>,
}

impl RankedGuess {
    /// Sorts an unordered set of guesses. The sort is stable, so equal
    /// probabilities keep their input order; NaN sinks to the bottom.
    pub fn new(guesses: Vec<Guess>) -> Self {
        let guesses = guesses
            .into_iter()
            .sorted_by(|a, b| descending(a.probability, b.probability))
            .collect();
        Self { guesses }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        Self::new(pairs.into_iter().map(Guess::from).collect())
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    pub fn top(&self, n: usize) -> &[Guess] {
        &self.guesses[..n.min(self.guesses.len())]
    }

    /// Zero-based rank of the first (highest) occurrence of `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        let label = normalize_label(label);
        self.guesses.iter().position(|g| g.label == label)
    }

    /// Probability of `label`, or 0.0 when the classifier did not rank it.
    pub fn probability_of(&self, label: &str) -> f64 {
        self.position(label)
            .map(|i| self.guesses[i].probability)
            .unwrap_or(0.0)
    }

    /// First occurrence of `label` within the top `k` entries.
    pub fn find_within(&self, label: &str, k: usize) -> Option<&Guess> {
        let label = normalize_label(label);
        self.top(k).iter().find(|g| g.label == label)
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("hot_air_balloon"), "hot air balloon");
        assert_eq!(normalize_label(" cat "), "cat");
    }

    #[test]
    fn test_sorted_descending() {
        let ranked = RankedGuess::from_pairs([("bird", 0.1), ("dog", 0.4), ("cat", 0.3)]);
        let labels: Vec<&str> = ranked.guesses().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["dog", "cat", "bird"]);
    }

    #[test]
    fn test_nan_sinks_to_bottom() {
        let ranked = RankedGuess::from_pairs([("x", f64::NAN), ("y", 0.0), ("z", 0.5)]);
        assert_eq!(ranked.guesses()[0].label, "z");
        assert_eq!(ranked.guesses()[2].label, "x");
    }

    #[test]
    fn test_top_is_bounded_by_len() {
        let ranked = RankedGuess::from_pairs([("a", 0.6), ("b", 0.4)]);
        assert_eq!(ranked.top(10).len(), 2);
        assert_eq!(ranked.top(1)[0].label, "a");
        assert!(RankedGuess::default().top(3).is_empty());
    }

    #[test]
    fn test_probability_of_missing_label_is_zero() {
        let ranked = RankedGuess::from_pairs([("dog", 0.9)]);
        assert_eq!(ranked.probability_of("cat"), 0.0);
        assert_eq!(ranked.probability_of("dog"), 0.9);
    }

    #[test]
    fn test_lookup_normalizes_underscores() {
        let ranked = RankedGuess::from_pairs([("ice_cream", 0.7), ("cake", 0.2)]);
        assert_eq!(ranked.position("ice cream"), Some(0));
        assert_eq!(ranked.position("ice_cream"), Some(0));
    }

    #[test]
    fn test_find_within_uses_first_occurrence() {
        let ranked = RankedGuess::new(vec![
            Guess::new("cat", 0.5),
            Guess::new("dog", 0.3),
            Guess::new("cat", 0.1),
        ]);
        assert_eq!(ranked.find_within("cat", 3).map(|g| g.probability), Some(0.5));
        assert!(ranked.find_within("dog", 1).is_none());
    }
}
