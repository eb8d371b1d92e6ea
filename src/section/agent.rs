//! Splitting of raw agent output into named sections.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::dspmq::parse_dspmq_output;
use super::models::{ManagerSection, PluginSection, Section};
use super::plugin_info::parse_plugin_info;
use super::runmqsc::parse_runmqsc_display_output;

pub const CHANNELS_SECTION: &str = "ibm_mq_channels";
pub const QUEUES_SECTION: &str = "ibm_mq_queues";
pub const MANAGERS_SECTION: &str = "ibm_mq_managers";
pub const PLUGIN_SECTION: &str = "ibm_mq_plugin";

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<<<(?P<name>[^:>]+)(?::[^>]*)?>>>\s*$").unwrap())
}

/// Group agent output lines by their `<<<name[:options]>>>` header.
///
/// Repeated headers append to the same section; lines before the first
/// header belong to no section and are dropped.
pub fn split_agent_output(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(name) = header_re().captures(line).and_then(|caps| caps.name("name")) {
            let name = name.as_str().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        match current.as_ref().and_then(|name| sections.get_mut(name)) {
            Some(lines) => lines.push(line.to_string()),
            None => tracing::debug!("agent output: line outside of any section"),
        }
    }

    sections
}

fn lines_of<'a>(raw: &'a BTreeMap<String, Vec<String>>, name: &str) -> &'a [String] {
    raw.get(name).map(Vec::as_slice).unwrap_or_default()
}

/// All IBM MQ sections of one agent dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgentSections {
    pub channels: Section,
    pub queues: Section,
    pub managers: ManagerSection,
    pub plugin: PluginSection,
}

impl AgentSections {
    pub fn from_agent_output(text: &str) -> Self {
        let raw = split_agent_output(text);

        let sections = Self {
            channels: parse_runmqsc_display_output(lines_of(&raw, CHANNELS_SECTION), "CHANNEL"),
            queues: parse_runmqsc_display_output(lines_of(&raw, QUEUES_SECTION), "QUEUE"),
            managers: parse_dspmq_output(lines_of(&raw, MANAGERS_SECTION)),
            plugin: parse_plugin_info(lines_of(&raw, PLUGIN_SECTION)),
        };

        tracing::debug!(
            "parsed {} channel, {} queue records",
            sections.channels.len(),
            sections.queues.len()
        );
        sections
    }
}
