//! Check plugins for IBM MQ services.
//!
//! Each plugin discovers its items in the parsed sections and evaluates one
//! item against the parameters of its ruleset.

mod channels;
mod managers;
mod plugin;
mod queues;

pub use channels::*;
pub use managers::*;
pub use plugin::*;
pub use queues::*;

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::check::{is_item_vanished, CheckResult, Outcome, State};
use crate::config::Rules;
use crate::section::{AgentSections, AttributeRecord, Section};

/// Check error types.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rules: {0}")]
    InvalidRules(#[from] serde_json::Error),
    #[error("invalid parameters for {ruleset}: {source}")]
    InvalidParams {
        ruleset: String,
        source: serde_json::Error,
    },
    #[error("unknown ruleset: {0}")]
    UnknownRuleset(String),
}

pub type DiscoveryFn = fn(&AgentSections) -> Vec<String>;
pub type CheckFn = fn(&str, &Value, &AgentSections) -> Result<Outcome, CheckError>;

/// A check plugin: how to find items and how to evaluate one.
#[derive(Clone, Copy)]
pub struct CheckPlugin {
    pub name: &'static str,
    /// Service name with `%s` standing for the item.
    pub service_name_template: &'static str,
    pub ruleset_name: &'static str,
    pub discover: DiscoveryFn,
    pub check: CheckFn,
}

impl fmt::Debug for CheckPlugin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("CheckPlugin")
            .field("name", &self.name)
            .field("service_name_template", &self.service_name_template)
            .field("ruleset_name", &self.ruleset_name)
            .finish()
    }
}

impl CheckPlugin {
    pub fn service_name(&self, item: &str) -> String {
        self.service_name_template.replace("%s", item)
    }
}

/// All IBM MQ check plugins.
pub fn registry() -> Vec<CheckPlugin> {
    vec![
        CHANNEL_PLUGIN,
        QUEUE_PLUGIN,
        MANAGER_PLUGIN,
        PLUGIN_INFO_PLUGIN,
    ]
}

/// Build typed parameters from raw JSON; `null` means defaults.
pub fn decode_params<P>(ruleset: &str, params: &Value) -> Result<P, CheckError>
where
    P: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(P::default());
    }
    P::deserialize(params).map_err(|source| CheckError::InvalidParams {
        ruleset: ruleset.to_string(),
        source,
    })
}

/// Reject rules for rulesets no plugin reads.
pub fn validate_rules(plugins: &[CheckPlugin], rules: &Rules) -> Result<(), CheckError> {
    for ruleset in rules.rulesets() {
        if !plugins.iter().any(|plugin| plugin.ruleset_name == ruleset) {
            return Err(CheckError::UnknownRuleset(ruleset.to_string()));
        }
    }
    Ok(())
}

/// The record of `item`, or the outcome to report when it is missing.
pub(crate) fn find_item<'a>(item: &str, section: &'a Section) -> Result<&'a AttributeRecord, Outcome> {
    match is_item_vanished(item, section) {
        Err(stale) => Err(Outcome::Stale(stale)),
        Ok(true) => Err(Outcome::Vanished),
        Ok(false) => section.get(item).ok_or(Outcome::Vanished),
    }
}

/// Verdict for one service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReport {
    pub service: String,
    pub outcome: Outcome,
}

impl Display for ServiceReport {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let results = match &self.outcome {
            Outcome::Vanished => return Ok(()),
            Outcome::Stale(stale) => return write!(f, "STALE {} - {}", self.service, stale),
            Outcome::Results(results) => results,
        };

        let summary = results
            .iter()
            .map(|result| match result.state.as_sym() {
                Some(sym) => format!("{}{}", result.summary, sym),
                None => result.summary.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let state = self.outcome.state().unwrap_or_default();
        write!(f, "{} {} - {}", state, self.service, summary)?;

        let perfdata = results
            .iter()
            .flat_map(|result| result.metrics.iter())
            .map(|metric| metric.to_string())
            .collect::<Vec<_>>();
        if !perfdata.is_empty() {
            write!(f, " | {}", perfdata.join(" "))?;
        }
        Ok(())
    }
}

/// Run every plugin on the discovered items plus the items named in the rules.
///
/// Items only known from the rules are where vanished and stale services
/// come from. Invalid parameters turn into an UNKNOWN result for that service.
pub fn run_checks(plugins: &[CheckPlugin], sections: &AgentSections, rules: &Rules) -> Vec<ServiceReport> {
    let mut reports = Vec::new();

    for plugin in plugins {
        let mut items: BTreeSet<String> = (plugin.discover)(sections).into_iter().collect();
        items.extend(rules.configured_items(plugin.ruleset_name).map(str::to_string));
        tracing::debug!("{}: {} items", plugin.name, items.len());

        for item in &items {
            let params = rules.params_for(plugin.ruleset_name, item);
            let outcome = match (plugin.check)(item, params, sections) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("{} {:?}: {}", plugin.name, item, e);
                    Outcome::Results(vec![CheckResult::new(State::Unknown, e.to_string())])
                }
            };
            reports.push(ServiceReport {
                service: plugin.service_name(item),
                outcome,
            });
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Metric, Stale};

    fn rules(json: &str) -> Rules {
        Rules::from_json(json).unwrap()
    }

    #[test]
    fn test_service_names() {
        let names: Vec<String> = registry()
            .iter()
            .map(|plugin| plugin.service_name("QM1:X"))
            .collect();
        assert_eq!(
            names,
            vec![
                "IBM MQ Channel QM1:X",
                "IBM MQ Queue QM1:X",
                "IBM MQ Queue Manager QM1:X",
                "IBM MQ Plugin",
            ]
        );
    }

    #[test]
    fn test_decode_params() {
        let params: ChannelParams = decode_params("ibm_mq_channels", &Value::Null).unwrap();
        assert_eq!(params, ChannelParams::default());

        let bad = serde_json::json!({"mapped_states_default": 9});
        let err = decode_params::<ChannelParams>("ibm_mq_channels", &bad).unwrap_err();
        assert!(matches!(err, CheckError::InvalidParams { ref ruleset, .. } if ruleset == "ibm_mq_channels"));
    }

    #[test]
    fn test_validate_rules() {
        let plugins = registry();
        assert!(validate_rules(&plugins, &rules(r#"{"ibm_mq_queues": {}}"#)).is_ok());
        let err = validate_rules(&plugins, &rules(r#"{"ibm_mq_topics": {}}"#)).unwrap_err();
        assert_eq!(err.to_string(), "unknown ruleset: ibm_mq_topics");
    }

    #[test]
    fn test_report_display() {
        let report = ServiceReport {
            service: "IBM MQ Queue QM1:APP.IN".to_string(),
            outcome: Outcome::Results(vec![
                CheckResult::new(State::Warn, "Queue depth: 10")
                    .with_metric(Metric::new("curdepth", 10.0).with_bounds(Some(0.0), None)),
                CheckResult::ok("Open input count: 1").with_metric(Metric::new("reading", 1.0)),
            ]),
        };
        assert_eq!(
            report.to_string(),
            "WARN IBM MQ Queue QM1:APP.IN - Queue depth: 10(!), Open input count: 1 | curdepth=10;;;0; reading=1;;;;"
        );

        let stale = ServiceReport {
            service: "IBM MQ Channel QM1:C".to_string(),
            outcome: Outcome::Stale(Stale {
                status: "ENDED NORMALLY".to_string(),
            }),
        };
        assert_eq!(
            stale.to_string(),
            "STALE IBM MQ Channel QM1:C - Stale because queue manager ENDED NORMALLY"
        );
    }

    #[test]
    fn test_run_checks() {
        let mut sections = AgentSections::default();
        sections.channels = Section::from_pairs(vec![
            ("QM1", vec![("STATUS", "RUNNING"), ("NOW", "2020-04-03T17:27:02+0200")]),
            ("QM1:CHAN1", vec![("CHLTYPE", "SDR"), ("STATUS", "RETRYING")]),
            ("QM2", vec![("STATUS", "ENDED NORMALLY"), ("NOW", "2020-04-03T17:27:02+0200")]),
        ]);
        let rules = rules(
            r#"{"ibm_mq_channels": {"items": {"QM1:GONE": null, "QM2:CHAN9": null}},
                "ibm_mq_queues": {"items": {"QM1:Q": {"curdepth": "bad"}}}}"#,
        );

        let reports = run_checks(&registry(), &sections, &rules);
        let lines: Vec<String> = reports.iter().map(|r| r.to_string()).collect();
        assert_eq!(reports.len(), 4);
        assert_eq!(lines[0], "WARN IBM MQ Channel QM1:CHAN1 - Status: RETRYING, Type: SDR(!)");
        assert!(reports[1].outcome.is_vanished());
        assert_eq!(
            lines[2],
            "STALE IBM MQ Channel QM2:CHAN9 - Stale because queue manager ENDED NORMALLY"
        );
        assert_eq!(reports[3].service, "IBM MQ Queue QM1:Q");
        assert_eq!(reports[3].outcome.state(), Some(State::Unknown));
    }
}
