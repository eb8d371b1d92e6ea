//! IBM MQ queue check: depth, message age, get/put activity, handles, queue time.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;

use super::{decode_params, find_item, CheckError, CheckPlugin};
use crate::check::render::{age, percent, timespan};
use crate::check::{check_levels, qmgr_of, CheckResult, Levels, Metric, Outcome, State};
use crate::section::{AgentSections, AttributeRecord, Section};

pub const QUEUES_RULESET: &str = "ibm_mq_queues";

const QMGR_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
const QUEUE_TIME_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

pub const QUEUE_PLUGIN: CheckPlugin = CheckPlugin {
    name: "ibm_mq_queues",
    service_name_template: "IBM MQ Queue %s",
    ruleset_name: QUEUES_RULESET,
    discover: discover_queues,
    check: check_queue_plugin,
};

/// Upper and lower `[warn, crit]` pairs for process counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BoundLevels {
    #[serde(default)]
    pub upper: Option<(f64, f64)>,
    #[serde(default)]
    pub lower: Option<(f64, f64)>,
}

/// Queue thresholds; ages and queue times in seconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueParams {
    #[serde(default)]
    pub curdepth: Option<(f64, f64)>,
    #[serde(default)]
    pub curdepth_perc: Option<(f64, f64)>,
    #[serde(default)]
    pub msgage: Option<(f64, f64)>,
    #[serde(default)]
    pub lgetage: Option<(f64, f64)>,
    #[serde(default)]
    pub lputage: Option<(f64, f64)>,
    #[serde(default)]
    pub ipprocs: BoundLevels,
    #[serde(default)]
    pub opprocs: BoundLevels,
    #[serde(default)]
    pub qtime: Option<(f64, f64)>,
}

pub fn discover_queues(sections: &AgentSections) -> Vec<String> {
    sections.queues.object_keys().map(str::to_string).collect()
}

fn check_queue_plugin(item: &str, params: &Value, sections: &AgentSections) -> Result<Outcome, CheckError> {
    let params: QueueParams = decode_params(QUEUES_RULESET, params)?;
    Ok(check_queue(item, &params, &sections.queues))
}

pub fn check_queue(item: &str, params: &QueueParams, section: &Section) -> Outcome {
    let attrs = match find_item(item, section) {
        Ok(attrs) => attrs,
        Err(outcome) => return outcome,
    };
    let now = section
        .qmgr_time(qmgr_of(item))
        .and_then(|now| DateTime::parse_from_str(now, QMGR_TIME_FORMAT).ok());

    let mut results = Vec::new();
    results.extend(check_depth(attrs, params));
    results.extend(check_msgage(attrs, params));
    results.extend(check_last_access(attrs, now.as_ref(), Access::Get, params.lgetage));
    results.extend(check_last_access(attrs, now.as_ref(), Access::Put, params.lputage));
    results.extend(check_procs(attrs, "IPPROCS", "Open input count", "reading", &params.ipprocs));
    results.extend(check_procs(attrs, "OPPROCS", "Open output count", "writing", &params.opprocs));
    results.extend(check_qtime(attrs, params));

    if results.is_empty() {
        results.push(CheckResult::new(State::Unknown, "No queue data"));
    }
    Outcome::Results(results)
}

fn number(attrs: &AttributeRecord, key: &str) -> Option<f64> {
    let raw = attrs.get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!("{}: not a number: {:?}", key, raw);
            None
        }
    }
}

fn check_depth(attrs: &AttributeRecord, params: &QueueParams) -> Option<CheckResult> {
    let curdepth = number(attrs, "CURDEPTH")?;
    let maxdepth = number(attrs, "MAXDEPTH").filter(|max| *max > 0.0);

    let mut state = State::Ok;
    let mut text = format!("Queue depth: {}", curdepth);
    let mut triggered = Vec::new();

    if let Some((warn, crit)) = params.curdepth {
        let depth_state = Levels::upper(warn, crit).evaluate(&curdepth);
        if depth_state != State::Ok {
            state = state.worst(depth_state);
            triggered.push(format!("{}/{}", warn, crit));
        }
    }

    if let Some(maxdepth) = maxdepth {
        let used = curdepth / maxdepth * 100.0;
        text.push_str(&format!(" ({})", percent(used)));
        if let Some((warn, crit)) = params.curdepth_perc {
            let perc_state = Levels::upper(warn, crit).evaluate(&used);
            if perc_state != State::Ok {
                state = state.worst(perc_state);
                triggered.push(format!("{}/{}", percent(warn), percent(crit)));
            }
        }
    }

    if !triggered.is_empty() {
        text.push_str(&format!(" (warn/crit at {})", triggered.join(" and ")));
    }

    let metric = Metric::new("curdepth", curdepth)
        .with_levels(params.curdepth)
        .with_bounds(Some(0.0), maxdepth);
    Some(CheckResult::new(state, text).with_metric(metric))
}

fn check_msgage(attrs: &AttributeRecord, params: &QueueParams) -> Option<CheckResult> {
    if attrs.get("MSGAGE")?.is_empty() {
        return Some(CheckResult::ok("Oldest message: n/a"));
    }
    let msgage = number(attrs, "MSGAGE")?;
    let (state, levels_text) = check_levels(msgage, params.msgage, None, age);
    let metric = Metric::new("msgage", msgage).with_levels(params.msgage);
    Some(CheckResult::new(state, format!("Oldest message: {}{}", age(msgage), levels_text)).with_metric(metric))
}

#[derive(Debug, Clone, Copy)]
enum Access {
    Get,
    Put,
}

impl Access {
    fn keys(self) -> (&'static str, &'static str) {
        match self {
            Self::Get => ("LGETDATE", "LGETTIME"),
            Self::Put => ("LPUTDATE", "LPUTTIME"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
        }
    }

    fn metric(self) -> &'static str {
        match self {
            Self::Get => "lgetage",
            Self::Put => "lputage",
        }
    }
}

/// Parse a queue's last access time in the queue manager's time zone.
fn access_time(date: &str, time: &str, now: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), QUEUE_TIME_FORMAT).ok()?;
    now.offset().from_local_datetime(&naive).single()
}

fn check_last_access(
    attrs: &AttributeRecord,
    now: Option<&DateTime<FixedOffset>>,
    access: Access,
    levels: Option<(f64, f64)>,
) -> Option<CheckResult> {
    let (date_key, time_key) = access.keys();
    let date = attrs.get(date_key)?;
    let time = attrs.get(time_key).map_or("", String::as_str);
    if date.is_empty() {
        return Some(CheckResult::ok(format!("Last {}: no {} operations", access.label(), access.label())));
    }

    let Some(now) = now else {
        tracing::debug!("{}: no queue manager time to compare with", date_key);
        return None;
    };
    let Some(then) = access_time(date, time, now) else {
        tracing::debug!("{}: cannot parse {:?} {:?}", date_key, date, time);
        return None;
    };

    let secs = (*now - then).num_seconds() as f64;
    let (state, levels_text) = check_levels(secs, levels, None, age);
    let metric = Metric::new(access.metric(), secs).with_levels(levels);
    Some(
        CheckResult::new(state, format!("Last {}: {}{}", access.label(), age(secs), levels_text))
            .with_metric(metric),
    )
}

fn check_procs(
    attrs: &AttributeRecord,
    key: &str,
    label: &str,
    metric_name: &str,
    levels: &BoundLevels,
) -> Option<CheckResult> {
    let count = number(attrs, key)?;
    let (state, levels_text) = check_levels(count, levels.upper, levels.lower, |v| v.to_string());
    let metric = Metric::new(metric_name, count).with_levels(levels.upper);
    Some(CheckResult::new(state, format!("{}: {}{}", label, count, levels_text)).with_metric(metric))
}

fn check_qtime(attrs: &AttributeRecord, params: &QueueParams) -> Vec<CheckResult> {
    let Some(qtime) = attrs.get("QTIME") else {
        return Vec::new();
    };
    let (short, long) = qtime.split_once(',').unwrap_or((qtime.as_str(), ""));

    [("short term", "qtime_short", short), ("long term", "qtime_long", long)]
        .into_iter()
        .map(|(term, metric_name, raw)| {
            let label = format!("Avg. queue time ({})", term);
            let raw = raw.trim();
            if raw.is_empty() {
                return CheckResult::ok(format!("{}: n/a", label));
            }
            let Ok(micros) = raw.parse::<f64>() else {
                tracing::debug!("QTIME: not a number: {:?}", raw);
                return CheckResult::ok(format!("{}: n/a", label));
            };
            let secs = micros / 1_000_000.0;
            let (state, levels_text) = check_levels(secs, params.qtime, None, timespan);
            let metric = Metric::new(metric_name, secs).with_levels(params.qtime);
            CheckResult::new(state, format!("{}: {}{}", label, timespan(secs), levels_text)).with_metric(metric)
        })
        .collect()
}
