//! Threshold evaluation.

use std::fmt::{self, Display, Formatter};

use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelsStrategy {
    Upper,
    Lower,
}

impl LevelsStrategy {
    fn exceeds<T: PartialOrd>(&self, value: &T, level: &T) -> bool {
        match self {
            Self::Upper => value >= level,
            Self::Lower => value < level,
        }
    }
}

/// A warn/crit pair applied either as upper or as lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels<T> {
    strategy: LevelsStrategy,
    warn: T,
    crit: T,
}

impl<T: PartialOrd> Levels<T> {
    pub fn upper(warn: T, crit: T) -> Self {
        Self {
            strategy: LevelsStrategy::Upper,
            warn,
            crit,
        }
    }

    pub fn lower(warn: T, crit: T) -> Self {
        Self {
            strategy: LevelsStrategy::Lower,
            warn,
            crit,
        }
    }

    pub fn evaluate(&self, value: &T) -> State {
        if self.strategy.exceeds(value, &self.crit) {
            State::Crit
        } else if self.strategy.exceeds(value, &self.warn) {
            State::Warn
        } else {
            State::Ok
        }
    }

    /// Same levels with both values passed through `f`.
    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Levels<U> {
        Levels {
            strategy: self.strategy,
            warn: f(&self.warn),
            crit: f(&self.crit),
        }
    }
}

impl<T: Display> Display for Levels<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.strategy {
            LevelsStrategy::Upper => write!(f, "warn/crit at {}/{}", self.warn, self.crit),
            LevelsStrategy::Lower => write!(f, "warn/crit below {}/{}", self.warn, self.crit),
        }
    }
}

/// Check `value` against optional upper and lower levels.
///
/// Returns the state and the level text to append to the info text, e.g.
/// `" (warn/crit at 10 min/20 min)"`; the text is empty when OK. Upper
/// levels are checked first.
pub fn check_levels<F>(
    value: f64,
    upper: Option<(f64, f64)>,
    lower: Option<(f64, f64)>,
    render: F,
) -> (State, String)
where
    F: Fn(f64) -> String,
{
    let candidates = [
        upper.map(|(warn, crit)| Levels::upper(warn, crit)),
        lower.map(|(warn, crit)| Levels::lower(warn, crit)),
    ];

    for levels in candidates.into_iter().flatten() {
        let state = levels.evaluate(&value);
        if state != State::Ok {
            return (state, format!(" ({})", levels.map(|v| render(*v))));
        }
    }
    (State::Ok, String::new())
}
