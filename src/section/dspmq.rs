//! Parser for `dspmq -o all -x` output.
//!
//! ```text
//! QMNAME(MY.TEST)     STATUS(Running) DEFAULT(NO) STANDBY(Permitted) INSTNAME(Installation1) INSTPATH(/opt/mqm) INSTVER(9.1.0.4) HA() DRROLE()
//!     INSTANCE(sb112233) MODE(Active)
//!     INSTANCE(sb112255) MODE(Standby)
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::models::{AttributeRecord, Instance, ManagerRecord, ManagerSection};

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)(?P<key>[A-Z]+)\(").unwrap())
}

/// Split a line into its `KEY(value)` attributes.
///
/// A value runs up to the last `)` before the next key, so values with
/// parentheses (e.g. Windows install paths) stay intact.
fn split_attributes(line: &str) -> AttributeRecord {
    let keys: Vec<_> = key_re()
        .captures_iter(line)
        .filter_map(|caps| caps.name("key"))
        .collect();

    let mut attributes = AttributeRecord::new();
    for (idx, key) in keys.iter().enumerate() {
        let start = key.end() + 1;
        let end = keys.get(idx + 1).map_or(line.len(), |next| next.start());
        let raw = line[start..end].trim_end();
        let Some(value) = raw.strip_suffix(')') else {
            tracing::debug!("dspmq: unterminated value for {}", key.as_str());
            continue;
        };
        attributes.insert(key.as_str().to_string(), value.trim().to_string());
    }
    attributes
}

/// Parse `dspmq` output into a [`ManagerSection`].
///
/// `STATUS`, `STANDBY` and `HA` are normalised to upper case since `dspmq`
/// prints them capitalised (`Running`, `Not permitted`).
pub fn parse_dspmq_output<S: AsRef<str>>(lines: &[S]) -> ManagerSection {
    let mut section = ManagerSection::new();
    let mut current: Option<String> = None;

    for line in lines {
        let line = line.as_ref();
        let trimmed = line.trim_start();

        if trimmed.starts_with("QMNAME(") {
            let mut attributes = split_attributes(trimmed);
            let Some(name) = attributes.remove("QMNAME") else {
                continue;
            };
            for key in ["STATUS", "STANDBY", "HA"] {
                if let Some(value) = attributes.get_mut(key) {
                    *value = value.to_uppercase();
                }
            }
            section.insert(
                name.clone(),
                ManagerRecord {
                    attributes,
                    instances: Vec::new(),
                },
            );
            current = Some(name);
        } else if trimmed.starts_with("INSTANCE(") {
            let Some(record) = current.as_deref().and_then(|name| section.get_mut(name)) else {
                tracing::debug!("dspmq: instance line without queue manager: {}", line);
                continue;
            };
            let mut attributes = split_attributes(trimmed);
            if let Some(name) = attributes.remove("INSTANCE") {
                let mode = attributes.remove("MODE").unwrap_or_default();
                record.instances.push(Instance { name, mode });
            }
        }
    }

    section
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multi_instance() {
        let lines = [
            "QMNAME(THE.RUNNING.ONE)                                   STATUS(Running) DEFAULT(NO) STANDBY(Permitted) INSTNAME(Installation1) INSTPATH(/opt/mqm) INSTVER(8.0.0.6) HA() DRROLE()",
            "    INSTANCE(sb008) MODE(Active)",
            "    INSTANCE(sb009) MODE(Standby)",
            "QMNAME(THE.ENDED.ONE)                                     STATUS(Ended normally) DEFAULT(NO) STANDBY(Not applicable) INSTNAME(Installation1) INSTPATH(/opt/mqm) INSTVER(8.0.0.6) HA() DRROLE()",
        ];
        let section = parse_dspmq_output(&lines);
        assert_eq!(
            section.keys().collect::<Vec<_>>(),
            vec!["THE.ENDED.ONE", "THE.RUNNING.ONE"]
        );

        let running = section.get("THE.RUNNING.ONE").unwrap();
        assert_eq!(running.attribute("STATUS"), Some("RUNNING"));
        assert_eq!(running.attribute("STANDBY"), Some("PERMITTED"));
        assert_eq!(running.attribute("INSTVER"), Some("8.0.0.6"));
        assert_eq!(running.attribute("INSTPATH"), Some("/opt/mqm"));
        assert_eq!(running.attribute("HA"), Some(""));
        assert_eq!(
            running.instances,
            vec![
                Instance {
                    name: "sb008".to_string(),
                    mode: "Active".to_string()
                },
                Instance {
                    name: "sb009".to_string(),
                    mode: "Standby".to_string()
                },
            ]
        );

        let ended = section.get("THE.ENDED.ONE").unwrap();
        assert_eq!(ended.attribute("STATUS"), Some("ENDED NORMALLY"));
        assert!(ended.instances.is_empty());
    }

    #[test]
    fn test_values_with_parentheses() {
        let attributes = split_attributes(
            r"QMNAME(WIN.QM) STATUS(Running) INSTPATH(C:\Program Files (x86)\IBM\MQ) INSTVER(9.1.0.0)",
        );
        assert_eq!(attributes["INSTPATH"], r"C:\Program Files (x86)\IBM\MQ");
        assert_eq!(attributes["INSTVER"], "9.1.0.0");
    }

    #[test]
    fn test_orphan_instance_is_ignored() {
        let lines = ["    INSTANCE(sb008) MODE(Active)", "garbage"];
        assert!(parse_dspmq_output(&lines).is_empty());
    }
}
