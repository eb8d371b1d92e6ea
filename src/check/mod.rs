//! Check module: verdict types and the shared evaluation helpers.

mod levels;
mod presence;
pub mod render;
mod states;
mod version;

pub use levels::*;
pub use presence::*;
pub use states::*;
pub use version::*;

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monitoring state of a single result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum State {
    #[default]
    Ok,
    Warn,
    Crit,
    Unknown,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid monitoring state {0}, expected 0 (OK), 1 (WARN), 2 (CRIT) or 3 (UNKNOWN)")]
pub struct InvalidState(pub u8);

impl State {
    pub fn as_int(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Crit => 2,
            Self::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Crit => "CRIT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Marker appended to non-OK partial results.
    pub fn as_sym(self) -> Option<&'static str> {
        match self {
            Self::Ok => None,
            Self::Warn => Some("(!)"),
            Self::Crit => Some("(!!)"),
            Self::Unknown => Some("(?)"),
        }
    }

    // CRIT outranks UNKNOWN when aggregating.
    fn rank(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warn => 1,
            Self::Unknown => 2,
            Self::Crit => 3,
        }
    }

    /// The worse of two states.
    pub fn worst(self, other: State) -> State {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

impl TryFrom<u8> for State {
    type Error = InvalidState;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Ok),
            1 => Ok(Self::Warn),
            2 => Ok(Self::Crit),
            3 => Ok(Self::Unknown),
            other => Err(InvalidState(other)),
        }
    }
}

impl From<State> for u8 {
    fn from(state: State) -> u8 {
        state.as_int()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric series value, rendered as `name=value;warn;crit;min;max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub levels: Option<(f64, f64)>,
    pub bounds: (Option<f64>, Option<f64>),
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            levels: None,
            bounds: (None, None),
        }
    }

    pub fn with_levels(mut self, levels: Option<(f64, f64)>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.bounds = (min, max);
        self
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let opt = |v: Option<f64>| v.map_or(String::new(), |v| v.to_string());
        write!(
            f,
            "{}={};{};{};{};{}",
            self.name,
            self.value,
            opt(self.levels.map(|(warn, _)| warn)),
            opt(self.levels.map(|(_, crit)| crit)),
            opt(self.bounds.0),
            opt(self.bounds.1),
        )
    }
}

/// One line of a check's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub state: State,
    pub summary: String,
    pub metrics: Vec<Metric>,
}

impl CheckResult {
    pub fn new(state: State, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
            metrics: Vec::new(),
        }
    }

    pub fn ok(summary: impl Into<String>) -> Self {
        Self::new(State::Ok, summary)
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }
}

/// What a check produced for one item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Results(Vec<CheckResult>),
    /// The item is gone while its queue manager runs: nothing to report.
    Vanished,
    /// The item's queue manager is not running: the service goes stale.
    Stale(Stale),
}

impl Outcome {
    pub fn results(&self) -> &[CheckResult] {
        match self {
            Self::Results(results) => results.as_slice(),
            Self::Vanished | Self::Stale(_) => &[],
        }
    }

    /// Worst state over all results, `None` unless results were produced.
    pub fn state(&self) -> Option<State> {
        match self {
            Self::Results(results) => Some(
                results
                    .iter()
                    .fold(State::Ok, |acc, result| acc.worst(result.state)),
            ),
            Self::Vanished | Self::Stale(_) => None,
        }
    }

    pub fn is_vanished(&self) -> bool {
        matches!(self, Self::Vanished)
    }
}
