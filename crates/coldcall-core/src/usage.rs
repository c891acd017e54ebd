//! Lifetime skip/switch counters per student.
//!
//! Absent entries read as zero. The store never enforces the skip limit
//! itself; that is the reconciler's job, so the check runs against the state
//! that is about to be applied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub skips: u32,
    pub switches: u32,
}

impl Usage {
    pub fn is_zero(&self) -> bool {
        self.skips == 0 && self.switches == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageStore {
    counts: BTreeMap<String, Usage>,
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for `email`, `{0, 0}` when the student has never made a request.
    pub fn get(&self, email: &str) -> Usage {
        self.counts.get(email).copied().unwrap_or_default()
    }

    /// The stored entry, if any. Distinguishes "never requested" from zero.
    pub fn entry(&self, email: &str) -> Option<Usage> {
        self.counts.get(email).copied()
    }

    /// Insert a loaded entry. All-zero entries are dropped.
    pub fn insert(&mut self, email: &str, usage: Usage) {
        if usage.is_zero() {
            self.counts.remove(email);
        } else {
            self.counts.insert(email.to_string(), usage);
        }
    }

    /// Increment `skips`. Returns the new count.
    pub fn record_skip(&mut self, email: &str) -> u32 {
        let entry = self.counts.entry(email.to_string()).or_default();
        entry.skips += 1;
        entry.skips
    }

    /// Increment `switches`. Returns the new count.
    pub fn record_switch(&mut self, email: &str) -> u32 {
        let entry = self.counts.entry(email.to_string()).or_default();
        entry.switches += 1;
        entry.switches
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
