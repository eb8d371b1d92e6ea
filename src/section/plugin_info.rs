//! Parser for the agent plugin's self-report (`key:value` lines).

use super::models::PluginSection;

pub fn parse_plugin_info<S: AsRef<str>>(lines: &[S]) -> PluginSection {
    let mut section = PluginSection::default();
    for line in lines {
        match line.as_ref().split_once(':') {
            Some((key, value)) => section.insert(key.trim(), value.trim()),
            None => tracing::debug!("plugin info: ignoring line {:?}", line.as_ref()),
        }
    }
    section
}
