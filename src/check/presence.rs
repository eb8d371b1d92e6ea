//! Vanished vs. stale decision for items missing from the agent output.

use thiserror::Error;

use crate::section::{ManagerSection, Section, DEFAULT_QMGR_STATUS};

/// The item is missing because its queue manager is not running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Stale because queue manager {status}")]
pub struct Stale {
    pub status: String,
}

/// Lookup of items and queue manager states in a parsed section.
pub trait ItemLookup {
    fn has_item(&self, key: &str) -> bool;

    /// Recorded status of the queue manager, if it has a record.
    fn qmgr_status(&self, qmgr: &str) -> Option<&str>;
}

impl ItemLookup for Section {
    fn has_item(&self, key: &str) -> bool {
        self.contains(key)
    }

    fn qmgr_status(&self, qmgr: &str) -> Option<&str> {
        self.get(qmgr)
            .and_then(|record| record.get("STATUS"))
            .map(String::as_str)
    }
}

impl ItemLookup for ManagerSection {
    fn has_item(&self, key: &str) -> bool {
        self.contains(key)
    }

    fn qmgr_status(&self, qmgr: &str) -> Option<&str> {
        self.get(qmgr).and_then(|record| record.attribute("STATUS"))
    }
}

/// Queue manager part of an item key (`"QM1:CHAN1"` -> `"QM1"`).
pub fn qmgr_of(item: &str) -> &str {
    item.split_once(':').map_or(item, |(qmgr, _)| qmgr)
}

/// Decide whether a missing item vanished.
///
/// Returns `Ok(false)` if the item is present and `Ok(true)` if it is absent
/// while its queue manager runs. A queue manager without a record of its
/// own counts as running. Any other queue manager status yields [`Stale`].
pub fn is_item_vanished<L: ItemLookup + ?Sized>(item: &str, section: &L) -> Result<bool, Stale> {
    if section.has_item(item) {
        return Ok(false);
    }

    let qmgr = qmgr_of(item);
    let status = section.qmgr_status(qmgr).unwrap_or(DEFAULT_QMGR_STATUS);
    if status == DEFAULT_QMGR_STATUS {
        tracing::debug!("{} vanished, queue manager {} is running", item, qmgr);
        return Ok(true);
    }

    Err(Stale {
        status: status.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(entries: Vec<(&str, Vec<(&str, &str)>)>) -> Section {
        Section::from_pairs(entries)
    }

    #[test]
    fn test_present_item_never_vanished() {
        let section = section(vec![
            ("QM1", vec![("STATUS", "ENDED NORMALLY")]),
            ("QM1:CHAN1", vec![("CHLTYPE", "SDR")]),
        ]);
        assert_eq!(is_item_vanished("QM1:CHAN1", &section), Ok(false));
    }

    #[test]
    fn test_vanished_when_qmgr_running() {
        let section = section(vec![("QM1", vec![("STATUS", "RUNNING")])]);
        assert_eq!(is_item_vanished("QM1:CHAN1", &section), Ok(true));
    }

    #[test]
    fn test_vanished_when_qmgr_unknown() {
        let section = section(vec![]);
        assert_eq!(is_item_vanished("QM1:CHAN1", &section), Ok(true));
        assert_eq!(is_item_vanished("QM1", &section), Ok(true));
    }

    #[test]
    fn test_stale_when_qmgr_not_running() {
        let section = section(vec![("QM1", vec![("STATUS", "ENDED NORMALLY")])]);
        let stale = is_item_vanished("QM1:CHAN1", &section).unwrap_err();
        assert_eq!(stale.status, "ENDED NORMALLY");
        assert_eq!(stale.to_string(), "Stale because queue manager ENDED NORMALLY");
    }

    #[test]
    fn test_qmgr_of() {
        assert_eq!(qmgr_of("QM1:APP.IN"), "QM1");
        assert_eq!(qmgr_of("QM1:A:B"), "QM1");
        assert_eq!(qmgr_of("QM1"), "QM1");
    }
}
