//! Same-day cache of reconciled requests.
//!
//! Once a request's source message is marked processed it no longer comes
//! back from the mail source, so later runs on the same day rely on this
//! cache to see it. A cache written on an earlier day is stale: its contents
//! are handed back to the caller for folding into settled usage and the file
//! is then discarded.

use crate::error::Result;
use crate::types::Request;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCache {
    pub date: NaiveDate,
    #[serde(default)]
    pub skips: BTreeSet<Request>,
    #[serde(default)]
    pub switches: BTreeSet<Request>,
}

/// Outcome of reading the cache file for `today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLoad {
    /// No usable cache: missing, unreadable, or stale with nothing in it.
    Empty,
    /// Written today.
    Fresh(RequestCache),
    /// Written on an earlier day and not yet folded into usage.
    Stale(RequestCache),
}

impl CacheLoad {
    pub fn fresh(&self) -> Option<&RequestCache> {
        match self {
            CacheLoad::Fresh(c) => Some(c),
            _ => None,
        }
    }
}

impl RequestCache {
    pub fn is_empty(&self) -> bool {
        self.skips.is_empty() && self.switches.is_empty()
    }

    pub fn load(path: &Path, today: NaiveDate) -> Result<CacheLoad> {
        if !path.exists() {
            return Ok(CacheLoad::Empty);
        }
        let data = std::fs::read_to_string(path)?;
        let cache: RequestCache = match serde_yaml::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable request cache");
                return Ok(CacheLoad::Empty);
            }
        };

        if cache.date == today {
            return Ok(CacheLoad::Fresh(cache));
        }
        if cache.is_empty() {
            return Ok(CacheLoad::Empty);
        }
        Ok(CacheLoad::Stale(cache))
    }

    /// Overwrite the cache with today's sets. Does nothing when both are empty.
    pub fn save(
        path: &Path,
        skips: &BTreeSet<Request>,
        switches: &BTreeSet<Request>,
        today: NaiveDate,
    ) -> Result<bool> {
        if skips.is_empty() && switches.is_empty() {
            return Ok(false);
        }
        let cache = RequestCache {
            date: today,
            skips: skips.clone(),
            switches: switches.clone(),
        };
        let data = serde_yaml::to_string(&cache)?;
        crate::io::atomic_write(path, data.as_bytes())?;
        Ok(true)
    }

    pub fn discard(path: &Path) -> Result<bool> {
        crate::io::remove_if_exists(path)
    }
}

/// Union of pending and cached requests, deduplicated by full identity.
pub fn union(pending: &BTreeSet<Request>, cached: &BTreeSet<Request>) -> BTreeSet<Request> {
    pending.union(cached).cloned().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
