//! Parser for `runmqsc` DISPLAY output.
//!
//! The agent runs `runmqsc` once per queue manager and prefixes each run with
//! an intro line `QMNAME(..) STATUS(..) NOW(..)`. Every displayed object is
//! printed as a block of `KEY(value)` attributes, one or two per line, and
//! blocks are separated by `AMQnnnn: ...` messages.

use std::sync::OnceLock;

use regex::Regex;

use super::models::{AttributeRecord, Section};

/// Column from which a second `KEY(` marks a two-column attribute line.
const SECOND_COLUMN_SEARCH_FROM: usize = 39;

/// Column at which two-column attribute lines are split.
const SECOND_COLUMN_START: usize = 40;

/// Object name prefixes of MQ internal objects, never recorded.
const INTERNAL_OBJECT_PREFIXES: [&str; 2] = ["SYSTEM", "AMQ.MQEXPLORER"];

/// Classification of a single output line.
#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    /// Start of the output of one queue manager.
    Intro {
        qmgr: &'a str,
        status: &'a str,
        now: &'a str,
    },
    /// `AMQnnnn:` message or the last line: closes the open block.
    Boundary,
    /// One or two `KEY(value)` pairs.
    Attributes(Vec<(&'a str, &'a str)>),
    Other,
}

fn intro_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^QMNAME\((?P<qmgr>.*?)\)\s*STATUS\((?P<status>.*?)\)\s*NOW\((?P<now>.*)\)")
            .unwrap()
    })
}

fn group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^AMQ\d+\w?: [^.]*\.").unwrap())
}

fn key_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[A-Z0-9]+\(").unwrap())
}

fn second_column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" [A-Z0-9]+\(").unwrap())
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?P<key>[A-Z0-9]+)\((?P<val>.*)\)").unwrap())
}

/// Byte offset of the `n`-th character, or the string length.
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(idx, _)| idx)
}

fn key_value(s: &str) -> Option<(&str, &str)> {
    let caps = key_value_re().captures(s)?;
    let key = caps.name("key")?.as_str();
    let value = caps.name("val")?.as_str().trim();
    Some((key, value))
}

fn classify(line: &str, is_last: bool) -> Line<'_> {
    if let Some(caps) = intro_re().captures(line) {
        if let (Some(qmgr), Some(status), Some(now)) =
            (caps.name("qmgr"), caps.name("status"), caps.name("now"))
        {
            return Line::Intro {
                qmgr: qmgr.as_str(),
                status: status.as_str(),
                now: now.as_str(),
            };
        }
    }

    if is_last || group_re().is_match(line) {
        return Line::Boundary;
    }

    if key_start_re().is_match(line) {
        let tail = &line[char_offset(line, SECOND_COLUMN_SEARCH_FROM)..];
        let pairs = if second_column_re().is_match(tail) {
            let (first, second) = line.split_at(char_offset(line, SECOND_COLUMN_START));
            [first, second].into_iter().filter_map(key_value).collect()
        } else {
            key_value(line).into_iter().collect()
        };
        return Line::Attributes(pairs);
    }

    Line::Other
}

fn is_internal_object(name: &str) -> bool {
    INTERNAL_OBJECT_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Commit the open attribute block to the section.
fn flush_block(
    section: &mut Section,
    qmgr: Option<&str>,
    group_by: &str,
    block: &mut AttributeRecord,
) {
    if block.is_empty() {
        return;
    }
    let attributes = std::mem::take(block);

    let Some(object) = attributes.get(group_by).cloned() else {
        tracing::debug!("runmqsc: dropping block without {} attribute", group_by);
        return;
    };
    if is_internal_object(&object) {
        tracing::debug!("runmqsc: skipping internal object {}", object);
        return;
    }
    let Some(qmgr) = qmgr else {
        tracing::debug!("runmqsc: dropping {} outside of any queue manager", object);
        return;
    };

    section.merge(format!("{}:{}", qmgr, object), attributes);
}

/// Parse `runmqsc` DISPLAY output into a [`Section`].
///
/// `group_by` names the attribute whose value identifies an object block,
/// e.g. `CHANNEL` or `QUEUE`. Unrecognised lines are skipped.
pub fn parse_runmqsc_display_output<S: AsRef<str>>(lines: &[S], group_by: &str) -> Section {
    let mut section = Section::new();
    let mut block = AttributeRecord::new();
    let mut qmgr: Option<&str> = None;
    let last = lines.len().saturating_sub(1);

    for (idx, line) in lines.iter().enumerate() {
        match classify(line.as_ref(), idx == last) {
            Line::Intro {
                qmgr: name,
                status,
                now,
            } => {
                flush_block(&mut section, qmgr, group_by, &mut block);
                qmgr = Some(name);
                let record = AttributeRecord::from([
                    ("STATUS".to_string(), status.to_string()),
                    ("NOW".to_string(), now.to_string()),
                ]);
                section.insert(name, record);
            }
            Line::Boundary => flush_block(&mut section, qmgr, group_by, &mut block),
            Line::Attributes(pairs) => {
                block.extend(
                    pairs
                        .into_iter()
                        .map(|(key, value)| (key.to_string(), value.to_string())),
                );
            }
            Line::Other => {}
        }
    }

    section
}
