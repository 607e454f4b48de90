//! Transition history tracking.
//!
//! Every edge an engine follows is recorded with its label, a timestamp
//! and the recovery attempt count at the time it was taken.

use super::transition::TransitionLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of records an engine keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Record of a single followed transition.
///
/// # Example
///
/// ```rust
/// use ftsm::core::{TransitionLabel, TransitionRecord};
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: "ready".to_string(),
///     label: TransitionLabel::Run,
///     to: "running".to_string(),
///     timestamp: Utc::now(),
///     attempt: 0,
/// };
/// assert_eq!(record.label, TransitionLabel::Run);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: String,
    /// The label the handler returned
    pub label: TransitionLabel,
    /// The state being entered
    pub to: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Recovery attempts counted when the transition was taken
    pub attempt: u32,
}

/// Bounded, ordered history of transitions.
///
/// Once `limit` records are held the oldest one is dropped for each new
/// record, so an engine that ticks forever keeps constant memory.
///
/// # Example
///
/// ```rust
/// use ftsm::core::{TransitionHistory, TransitionLabel, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::new(8);
/// history.push(TransitionRecord {
///     from: "init".to_string(),
///     label: TransitionLabel::Initialised,
///     to: "configuring".to_string(),
///     timestamp: Utc::now(),
///     attempt: 0,
/// });
///
/// assert_eq!(history.get_path(), vec!["init", "configuring"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: usize,
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl TransitionHistory {
    /// Create an empty history holding at most `limit` records (minimum one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            records: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    pub fn push(&mut self, record: TransitionRecord) {
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// States traversed: the first record's source, then every target.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|record| record.to.as_str()));
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
