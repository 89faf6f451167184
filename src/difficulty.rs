use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How close to the top of the ranking the target word has to land.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Accuracy {
    Top1,
    Top2,
    #[default]
    Top3,
}

impl Accuracy {
    pub fn top_k(&self) -> usize {
        match self {
            Accuracy::Top1 => 1,
            Accuracy::Top2 => 2,
            Accuracy::Top3 => 3,
        }
    }
}

/// Minimum classifier confidence for a win.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Confidence {
    #[default]
    #[value(name = "1")]
    Percent1,
    #[value(name = "10")]
    Percent10,
    #[value(name = "25")]
    Percent25,
    #[value(name = "50")]
    Percent50,
}

impl Confidence {
    pub fn threshold(&self) -> f64 {
        match self {
            Confidence::Percent1 => 0.01,
            Confidence::Percent10 => 0.10,
            Confidence::Percent25 => 0.25,
            Confidence::Percent50 => 0.50,
        }
    }
}

/// Time budget for drawing the word.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum TimeLimit {
    #[value(name = "15")]
    Secs15,
    #[value(name = "30")]
    Secs30,
    #[value(name = "45")]
    Secs45,
    #[default]
    #[value(name = "60")]
    Secs60,
}

impl TimeLimit {
    pub fn seconds(&self) -> u32 {
        match self {
            TimeLimit::Secs15 => 15,
            TimeLimit::Secs30 => 30,
            TimeLimit::Secs45 => 45,
            TimeLimit::Secs60 => 60,
        }
    }
}
