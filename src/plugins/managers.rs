//! IBM MQ queue manager check: status, version, installation and HA setup.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_params, CheckError, CheckPlugin};
use crate::check::{
    check_version, is_item_vanished, CheckResult, Outcome, State, StateOverrides, StatusTable,
    VersionRule,
};
use crate::section::{AgentSections, Instance, ManagerRecord, ManagerSection};

pub const MANAGERS_RULESET: &str = "ibm_mq_managers";

const MANAGER_STATES: StatusTable = StatusTable::new(&[
    ("RUNNING", "running", State::Ok),
    ("RUNNING AS STANDBY", "running_as_standby", State::Ok),
    ("RUNNING ELSEWHERE", "running_elsewhere", State::Ok),
    ("QUIESCING", "quiescing", State::Ok),
    ("ENDING IMMEDIATELY", "ending_immediately", State::Ok),
    ("ENDING PREEMPTIVELY", "ending_preemptively", State::Ok),
    ("ENDED NORMALLY", "ended_normally", State::Ok),
    ("ENDED IMMEDIATELY", "ended_immediately", State::Ok),
    ("ENDED UNEXPECTEDLY", "ended_unexpectedly", State::Crit),
    ("ENDED PREEMPTIVELY", "ended_preemptively", State::Warn),
    ("NOT AVAILABLE", "not_available", State::Ok),
    ("STARTING", "starting", State::Ok),
    ("STATUS NOT AVAILABLE", "status_not_available", State::Ok),
]);

pub const MANAGER_PLUGIN: CheckPlugin = CheckPlugin {
    name: "ibm_mq_managers",
    service_name_template: "IBM MQ Queue Manager %s",
    ruleset_name: MANAGERS_RULESET,
    discover: discover_managers,
    check: check_manager_plugin,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ManagerParams {
    #[serde(flatten)]
    pub states: StateOverrides,
    #[serde(default)]
    pub version: Option<VersionRule>,
}

pub fn discover_managers(sections: &AgentSections) -> Vec<String> {
    sections.managers.keys().map(str::to_string).collect()
}

fn check_manager_plugin(item: &str, params: &Value, sections: &AgentSections) -> Result<Outcome, CheckError> {
    let params: ManagerParams = decode_params(MANAGERS_RULESET, params)?;
    Ok(check_manager(item, &params, &sections.managers))
}

pub fn check_manager(item: &str, params: &ManagerParams, section: &ManagerSection) -> Outcome {
    match is_item_vanished(item, section) {
        Err(stale) => return Outcome::Stale(stale),
        Ok(true) => return Outcome::Vanished,
        Ok(false) => {}
    }
    let Some(record) = section.get(item) else {
        return Outcome::Vanished;
    };

    let status = record.attribute("STATUS").unwrap_or_default();
    let mut results = vec![CheckResult::new(
        params.states.map_status(&MANAGER_STATES, status),
        format!("Status: {}", status),
    )];

    let (state, text) = check_version(record.attribute("INSTVER"), params.version.as_ref(), "Version");
    results.push(CheckResult::new(state, text));

    if let (Some(path), Some(name)) = (record.attribute("INSTPATH"), record.attribute("INSTNAME")) {
        results.push(CheckResult::ok(format!("Installation: {} ({})", path, name)));
    }

    results.extend(check_instances(record));
    Outcome::Results(results)
}

fn describe(instances: &[Instance]) -> String {
    instances
        .iter()
        .map(|instance| format!("{}={}", instance.name, instance.mode))
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_instances(record: &ManagerRecord) -> Option<CheckResult> {
    let instances = record.instances.as_slice();

    if record.attribute("HA") == Some("REPLICATED") {
        return Some(match instances.first() {
            Some(first) => CheckResult::ok(format!("Multi-Instance: {}={}", first.name, first.mode)),
            None => CheckResult::ok("High availability: replicated"),
        });
    }

    let standby = record.attribute("STANDBY").unwrap_or_default();
    match (standby, instances) {
        ("PERMITTED", [a, b]) => Some(CheckResult::ok(format!(
            "Multi-Instance: {}={} and {}={}",
            a.name, a.mode, b.name, b.mode
        ))),
        ("PERMITTED", [a]) => Some(CheckResult::new(
            State::Crit,
            format!("Multi-Instance: {}={} and missing partner", a.name, a.mode),
        )),
        ("PERMITTED", _) => Some(CheckResult::new(
            State::Crit,
            format!("Multi-Instance: unknown instances ({})", describe(instances)),
        )),
        ("NOT PERMITTED", [a]) => Some(CheckResult::ok(format!(
            "Single-Instance: {}={}",
            a.name, a.mode
        ))),
        ("NOT PERMITTED", _) => Some(CheckResult::new(
            State::Crit,
            format!("Single-Instance: unknown instances ({})", describe(instances)),
        )),
        ("NOT APPLICABLE", []) => None,
        ("NOT APPLICABLE", _) => Some(CheckResult::new(
            State::Crit,
            format!("Unknown instance setup: ({})", describe(instances)),
        )),
        (other, _) => Some(CheckResult::new(
            State::Crit,
            format!("Unknown STANDBY state: {}", other),
        )),
    }
}
