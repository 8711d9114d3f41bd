//! Check-in records and the sparse per-contract history.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome the user reported for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInStatus {
    Completed,
    Missed,
}

/// One acted-on day. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub day_number: u32,
    pub status: CheckInStatus,
    pub timestamp: DateTime<Utc>,
    /// Whether the user has seen the outcome for this day.
    #[serde(default)]
    pub revealed: bool,
}

/// Sparse mapping from day number to record.
///
/// A day without a record has not been reported. Elapsed unreported days
/// whose implicit miss has been revealed are tracked in `auto_revealed`
/// instead of being written as records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInHistory {
    #[serde(default)]
    records: BTreeMap<u32, CheckInRecord>,
    #[serde(default)]
    auto_revealed: BTreeSet<u32>,
}

impl CheckInHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day_number: u32) -> Option<&CheckInRecord> {
        self.records.get(&day_number)
    }

    pub fn is_auto_revealed(&self, day_number: u32) -> bool {
        self.auto_revealed.contains(&day_number)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.auto_revealed.is_empty()
    }

    /// Keys outside `[1, duration]`, i.e. malformed input from storage.
    pub fn out_of_range_days(&self, duration: u32) -> Vec<u32> {
        self.records
            .keys()
            .chain(self.auto_revealed.iter())
            .copied()
            .filter(|d| *d == 0 || *d > duration)
            .collect()
    }

    /// Insert a record. Crate-private: only the reveal controller writes.
    pub(crate) fn insert(&mut self, record: CheckInRecord) {
        self.records.insert(record.day_number, record);
    }

    pub(crate) fn mark_revealed(&mut self, day_number: u32) -> bool {
        match self.records.get_mut(&day_number) {
            Some(record) => {
                record.revealed = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_auto_revealed(&mut self, day_number: u32) {
        self.auto_revealed.insert(day_number);
    }
}

impl FromIterator<CheckInRecord> for CheckInHistory {
    fn from_iter<I: IntoIterator<Item = CheckInRecord>>(iter: I) -> Self {
        let mut history = CheckInHistory::new();
        for record in iter {
            history.insert(record);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, status: CheckInStatus) -> CheckInRecord {
        CheckInRecord {
            day_number: day,
            status,
            timestamp: Utc::now(),
            revealed: false,
        }
    }

    #[test]
    fn test_history_serde_roundtrip_keeps_integer_keys() {
        let mut history: CheckInHistory = vec![
            record(1, CheckInStatus::Completed),
            record(3, CheckInStatus::Missed),
        ]
        .into_iter()
        .collect();
        history.mark_auto_revealed(2);

        let json = serde_json::to_string(&history).unwrap();
        let back: CheckInHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
        assert!(back.is_auto_revealed(2));
        assert_eq!(back.get(3).unwrap().status, CheckInStatus::Missed);
    }

    #[test]
    fn test_missing_fields_default() {
        let back: CheckInHistory = serde_json::from_str("{}").unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn test_out_of_range_days() {
        let history: CheckInHistory = vec![
            record(0, CheckInStatus::Completed),
            record(4, CheckInStatus::Completed),
            record(9, CheckInStatus::Missed),
        ]
        .into_iter()
        .collect();
        assert_eq!(history.out_of_range_days(7), vec![0, 9]);
    }

    #[test]
    fn test_mark_revealed_requires_record() {
        let mut history = CheckInHistory::new();
        assert!(!history.mark_revealed(1));
        history.insert(record(1, CheckInStatus::Completed));
        assert!(history.mark_revealed(1));
        assert!(history.get(1).unwrap().revealed);
    }
}
