//! Mapping of raw MQ status strings to monitoring states.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::State;

/// Symbolic name for statuses missing from a table.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Raw status -> (symbolic name, default state).
#[derive(Debug, Clone, Copy)]
pub struct StatusTable(&'static [(&'static str, &'static str, State)]);

impl StatusTable {
    pub const fn new(entries: &'static [(&'static str, &'static str, State)]) -> Self {
        Self(entries)
    }

    pub fn lookup(&self, raw: &str) -> (&'static str, State) {
        self.0
            .iter()
            .find(|(status, _, _)| *status == raw)
            .map_or((UNKNOWN_STATUS, State::Unknown), |(_, name, state)| {
                (*name, *state)
            })
    }
}

/// User overrides for a status table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StateOverrides {
    #[serde(default)]
    pub mapped_states: BTreeMap<String, State>,
    #[serde(default)]
    pub mapped_states_default: Option<State>,
}

impl StateOverrides {
    /// Explicit override, then the configured default, then the table default.
    ///
    /// `mapped_states_default` only applies when a mapping is configured.
    pub fn resolve(&self, symbolic: &str, default: State) -> State {
        if self.mapped_states.is_empty() {
            return default;
        }
        self.mapped_states
            .get(symbolic)
            .copied()
            .or(self.mapped_states_default)
            .unwrap_or(default)
    }

    pub fn map_status(&self, table: &StatusTable, raw: &str) -> State {
        let (symbolic, default) = table.lookup(raw);
        self.resolve(symbolic, default)
    }
}
