//! Check of the agent plugin itself: its version and the MQ tools it runs.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_params, CheckError, CheckPlugin};
use crate::check::{check_version, CheckResult, Outcome, State, VersionRule};
use crate::section::{AgentSections, PluginSection};

pub const PLUGIN_RULESET: &str = "ibm_mq_plugin";

const TOOLS: [&str; 2] = ["dspmq", "runmqsc"];

pub const PLUGIN_INFO_PLUGIN: CheckPlugin = CheckPlugin {
    name: "ibm_mq_plugin",
    service_name_template: "IBM MQ Plugin",
    ruleset_name: PLUGIN_RULESET,
    discover: discover_plugin,
    check: check_plugin_info_plugin,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginParams {
    #[serde(default)]
    pub version: Option<VersionRule>,
}

/// A single item-less service whenever the plugin reported anything.
pub fn discover_plugin(sections: &AgentSections) -> Vec<String> {
    if sections.plugin.is_empty() {
        Vec::new()
    } else {
        vec![String::new()]
    }
}

fn check_plugin_info_plugin(_item: &str, params: &Value, sections: &AgentSections) -> Result<Outcome, CheckError> {
    let params: PluginParams = decode_params(PLUGIN_RULESET, params)?;
    Ok(check_plugin_info(&params, &sections.plugin))
}

pub fn check_plugin_info(params: &PluginParams, section: &PluginSection) -> Outcome {
    let (state, text) = check_version(section.get("version"), params.version.as_ref(), "Plugin version");
    let mut results = vec![CheckResult::new(state, text)];

    for tool in TOOLS {
        results.push(match section.get(tool) {
            None => CheckResult::new(State::Unknown, format!("{}: no agent info", tool)),
            Some("OK") => CheckResult::ok(format!("{}: OK", tool)),
            Some(other) => CheckResult::new(State::Crit, format!("{}: {}", tool, other)),
        });
    }

    Outcome::Results(results)
}
