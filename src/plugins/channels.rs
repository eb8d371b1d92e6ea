//! IBM MQ channel status check.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_params, find_item, CheckError, CheckPlugin};
use crate::check::{CheckResult, Outcome, State, StateOverrides, StatusTable};
use crate::section::{AgentSections, Section};

pub const CHANNELS_RULESET: &str = "ibm_mq_channels";

/// Reported when a channel has no channel status block.
const DEFAULT_CHANNEL_STATUS: &str = "INACTIVE";

const CHANNEL_STATES: StatusTable = StatusTable::new(&[
    ("BINDING", "binding", State::Ok),
    ("INACTIVE", "inactive", State::Ok),
    ("INITIALIZING", "initializing", State::Ok),
    ("PAUSED", "paused", State::Ok),
    ("REQUESTING", "requesting", State::Ok),
    ("RETRYING", "retrying", State::Warn),
    ("RUNNING", "running", State::Ok),
    ("STARTING", "starting", State::Ok),
    ("STOPPED", "stopped", State::Crit),
    ("STOPPING", "stopping", State::Ok),
    ("SWITCHING", "switching", State::Ok),
]);

pub const CHANNEL_PLUGIN: CheckPlugin = CheckPlugin {
    name: "ibm_mq_channels",
    service_name_template: "IBM MQ Channel %s",
    ruleset_name: CHANNELS_RULESET,
    discover: discover_channels,
    check: check_channel_plugin,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChannelParams {
    #[serde(flatten)]
    pub states: StateOverrides,
}

pub fn discover_channels(sections: &AgentSections) -> Vec<String> {
    sections.channels.object_keys().map(str::to_string).collect()
}

fn check_channel_plugin(item: &str, params: &Value, sections: &AgentSections) -> Result<Outcome, CheckError> {
    let params: ChannelParams = decode_params(CHANNELS_RULESET, params)?;
    Ok(check_channel(item, &params, &sections.channels))
}

pub fn check_channel(item: &str, params: &ChannelParams, section: &Section) -> Outcome {
    let attrs = match find_item(item, section) {
        Ok(attrs) => attrs,
        Err(outcome) => return outcome,
    };

    let status = attrs
        .get("STATUS")
        .map_or(DEFAULT_CHANNEL_STATUS, String::as_str);
    let state = params.states.map_status(&CHANNEL_STATES, status);

    let mut text = format!("Status: {}", status);
    if let Some(chltype) = attrs.get("CHLTYPE") {
        text.push_str(&format!(", Type: {}", chltype));
    }
    if let Some(xmitq) = attrs.get("XMITQ") {
        text.push_str(&format!(", Xmitq: {}", xmitq));
    }

    Outcome::Results(vec![CheckResult::new(state, text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn section() -> Section {
        Section::from_pairs(vec![
            ("QM1", vec![("STATUS", "RUNNING"), ("NOW", "2020-04-03T17:27:02+0200")]),
            (
                "QM1:CHAN1",
                vec![("CHLTYPE", "SDR"), ("STATUS", "RETRYING"), ("XMITQ", "MY.XMIT.Q")],
            ),
            ("QM1:CHAN2", vec![("CHLTYPE", "RCVR")]),
            ("QM1:CHAN3", vec![("CHLTYPE", "SVRCONN"), ("STATUS", "STOPPED")]),
            ("QM2", vec![("STATUS", "ENDED NORMALLY"), ("NOW", "2020-04-03T17:27:02+0200")]),
        ])
    }

    fn single(outcome: Outcome) -> CheckResult {
        match outcome {
            Outcome::Results(mut results) if results.len() == 1 => results.remove(0),
            other => panic!("expected one result, got {:?}", other),
        }
    }

    #[test]
    fn test_discovery() {
        let sections = AgentSections {
            channels: section(),
            ..Default::default()
        };
        assert_eq!(
            discover_channels(&sections),
            vec!["QM1:CHAN1", "QM1:CHAN2", "QM1:CHAN3"]
        );
    }

    #[test]
    fn test_retrying_channel() {
        let result = single(check_channel("QM1:CHAN1", &ChannelParams::default(), &section()));
        assert_eq!(result.state, State::Warn);
        assert_eq!(result.summary, "Status: RETRYING, Type: SDR, Xmitq: MY.XMIT.Q");
    }

    #[test]
    fn test_missing_status_is_inactive() {
        let result = single(check_channel("QM1:CHAN2", &ChannelParams::default(), &section()));
        assert_eq!(result.state, State::Ok);
        assert_eq!(result.summary, "Status: INACTIVE, Type: RCVR");
    }

    #[test]
    fn test_stopped_channel() {
        let result = single(check_channel("QM1:CHAN3", &ChannelParams::default(), &section()));
        assert_eq!(result.state, State::Crit);
    }

    #[test]
    fn test_mapped_states() {
        let params = ChannelParams {
            states: StateOverrides {
                mapped_states: BTreeMap::from([("stopped".to_string(), State::Ok)]),
                mapped_states_default: Some(State::Warn),
            },
        };
        assert_eq!(single(check_channel("QM1:CHAN3", &params, &section())).state, State::Ok);
        assert_eq!(single(check_channel("QM1:CHAN2", &params, &section())).state, State::Warn);

        let params: ChannelParams =
            serde_json::from_value(serde_json::json!({"mapped_states": {"retrying": 2}})).unwrap();
        assert_eq!(single(check_channel("QM1:CHAN1", &params, &section())).state, State::Crit);
    }

    #[test]
    fn test_default_state_needs_mapping() {
        let section = Section::from_pairs(vec![
            ("QM1", vec![("STATUS", "RUNNING")]),
            ("QM1:CHAN1", vec![("CHLTYPE", "SDR"), ("STATUS", "RUNNING")]),
        ]);
        let params: ChannelParams =
            serde_json::from_value(serde_json::json!({"mapped_states_default": 2})).unwrap();
        let outcome = check_channel("QM1:CHAN1", &params, &section);
        assert_eq!(outcome.state(), Some(State::Ok));
    }

    #[test]
    fn test_unknown_status() {
        let section = Section::from_pairs(vec![("QM1:CHAN1", vec![("STATUS", "DOING THINGS")])]);
        let result = single(check_channel("QM1:CHAN1", &ChannelParams::default(), &section));
        assert_eq!(result.state, State::Unknown);
    }

    #[test]
    fn test_vanished_and_stale() {
        let section = section();
        assert_eq!(
            check_channel("QM1:GONE", &ChannelParams::default(), &section),
            Outcome::Vanished
        );
        match check_channel("QM2:CHAN1", &ChannelParams::default(), &section) {
            Outcome::Stale(stale) => assert_eq!(stale.status, "ENDED NORMALLY"),
            other => panic!("expected stale, got {:?}", other),
        }
    }
}
