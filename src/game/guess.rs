use std::fmt::Display;

use crate::towns::Town;

/// How a guessed town's air compares with the reference town's.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Worse,
    NotWorse,
    /// One of the two readings is missing.
    Unknown,
}

impl Outcome {
    /// Worse means strictly greater than the baseline; a tie is not worse.
    pub fn classify(baseline: Option<f64>, candidate: Option<f64>) -> Self {
        match (baseline, candidate) {
            (Some(baseline), Some(candidate)) if candidate > baseline => Self::Worse,
            (Some(_), Some(_)) => Self::NotWorse,
            _ => Self::Unknown,
        }
    }

    pub const fn is_worse(self) -> bool {
        matches!(self, Self::Worse)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Worse => "worse",
            Self::NotWorse => "not worse",
            Self::Unknown => "unknown",
        })
    }
}

/// One completed guess. Never changes once made.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GuessResult {
    town: &'static Town,
    pm25: Option<f64>,
    outcome: Outcome,
}

impl GuessResult {
    pub(super) fn new(town: &'static Town, pm25: Option<f64>, baseline: Option<f64>) -> Self {
        Self {
            town,
            pm25,
            outcome: Outcome::classify(baseline, pm25),
        }
    }

    pub fn town(&self) -> &'static Town {
        self.town
    }

    pub fn name(&self) -> &'static str {
        self.town.name
    }

    pub fn pm25(&self) -> Option<f64> {
        self.pm25
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}
