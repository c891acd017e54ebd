use super::inbox::Inbox;
use crate::cache::{self, CacheLoad, RequestCache};
use crate::config::Config;
use crate::error::{ColdCallError, Result};
use crate::mail::MailSource;
use crate::paths;
use crate::reconcile::{reconcile, MAX_SECTIONS};
use crate::roster::Roster;
use crate::shuffle::shuffle;
use crate::types::{Notice, Request, RequestKind, SectionId};
use crate::usage::{Usage, UsageStore};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One section's shuffled candidates plus what reconciliation did on the way.
#[derive(Debug, Clone, Serialize)]
pub struct CallList {
    pub section: SectionId,
    pub names: Vec<String>,
    pub notices: Vec<Notice>,
    /// Settled usage plus today's requests as applied for this section.
    #[serde(skip)]
    pub usage: UsageStore,
    #[serde(skip)]
    pub consumed: BTreeSet<Request>,
}

/// Per-student view of settled counts and what today's requests add.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub name: String,
    pub email: String,
    pub section: SectionId,
    pub settled: Usage,
    pub today: Usage,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State for one pass of the pipeline.
///
/// Usage in the roster file is settled through yesterday. Today's requests
/// that took effect live only in the cache, so every same-day session starts
/// from the same settled counts and rebuilding a list never double-counts.
/// Requests no built list used stay in the mailbox until their section runs.
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    config: Config,
    today: NaiveDate,
    roster: Roster,
    settled: UsageStore,
    folded_from: Option<NaiveDate>,
    cached: BTreeSet<Request>,
    skips: BTreeSet<Request>,
    switches: BTreeSet<Request>,
}

impl Session {
    /// Load roster and cache, fold a stale cache into settled usage and merge
    /// the cached requests with `inbox`. Nothing is written.
    pub fn open(root: &Path, config: &Config, inbox: &Inbox, today: NaiveDate) -> Result<Self> {
        let (roster, mut settled) = Roster::load(&config.roster_path(root))?;
        let sections = roster.sections();
        if sections.len() > MAX_SECTIONS {
            return Err(ColdCallError::UnsupportedSections(sections.len()));
        }

        let mut folded_from = None;
        let (cached_skips, cached_switches) =
            match RequestCache::load(&paths::cache_path(root), today)? {
                CacheLoad::Fresh(c) => (c.skips, c.switches),
                CacheLoad::Stale(c) => {
                    fold_stale(&roster, &c, &mut settled, config.skip_limit);
                    folded_from = Some(c.date);
                    (BTreeSet::new(), BTreeSet::new())
                }
                CacheLoad::Empty => (BTreeSet::new(), BTreeSet::new()),
            };

        Ok(Self {
            root: root.to_path_buf(),
            config: config.clone(),
            today,
            skips: cache::union(&inbox.skips, &cached_skips),
            switches: cache::union(&inbox.switches, &cached_switches),
            cached: cached_skips.into_iter().chain(cached_switches).collect(),
            roster,
            settled,
            folded_from,
        })
    }

    pub fn sections(&self) -> Vec<SectionId> {
        self.roster.sections().into_iter().collect()
    }

    /// Date of the stale cache folded into settled usage, if one was.
    pub fn folded_from(&self) -> Option<NaiveDate> {
        self.folded_from
    }

    /// Reconcile and shuffle the candidates for `section`.
    pub fn build<R: Rng + ?Sized>(&self, section: &SectionId, rng: &mut R) -> Result<CallList> {
        let mut usage = self.settled.clone();
        let reconciled = reconcile(
            &self.roster.students,
            &self.skips,
            &self.switches,
            &mut usage,
            section,
            self.config.skip_limit,
        )?;

        let mut candidates = reconciled.candidates;
        shuffle(&mut candidates, rng);

        Ok(CallList {
            section: section.clone(),
            names: candidates.into_iter().map(|s| s.name).collect(),
            notices: reconciled.notices,
            usage,
            consumed: reconciled.consumed,
        })
    }

    /// Write `call_list_<section>.csv`. Only names leave the process.
    pub fn emit(&self, list: &CallList) -> Result<PathBuf> {
        let path = paths::call_list_path(
            &self.config.output_path(&self.root),
            list.section.as_str(),
        );
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["name"])?;
        for name in &list.names {
            writer.write_record([name])?;
        }
        let data = writer.into_inner().map_err(|e| e.into_error())?;
        crate::io::atomic_write(&path, &data)?;
        Ok(path)
    }

    /// Persist settled usage (if a stale cache was folded), then cache and
    /// mark processed the requests that `built` lists consumed. Returns how
    /// many fetched requests were left in the mailbox.
    pub fn commit<'a, S, I>(&self, source: &mut S, inbox: &Inbox, built: I) -> Result<usize>
    where
        S: MailSource + ?Sized,
        I: IntoIterator<Item = &'a CallList>,
    {
        if let Some(date) = self.folded_from {
            self.roster
                .save(&self.config.roster_path(&self.root), &self.settled)?;
            tracing::info!(%date, "folded stale request cache into roster usage");
        }

        let mut consumed = self.cached.clone();
        for list in built {
            consumed.extend(list.consumed.iter().cloned());
        }
        let (skips, switches): (BTreeSet<Request>, BTreeSet<Request>) = consumed
            .iter()
            .cloned()
            .partition(|r| r.kind == RequestKind::Skip);

        let cache_path = paths::cache_path(&self.root);
        if !RequestCache::save(&cache_path, &skips, &switches, self.today)? {
            RequestCache::discard(&cache_path)?;
        }

        let mut pending = 0;
        for request in inbox.skips.iter().chain(&inbox.switches) {
            if consumed.contains(request) {
                source.mark_processed(&request.message_id)?;
            } else {
                pending += 1;
            }
        }
        if pending > 0 {
            tracing::info!(pending, "requests left in the mailbox for a later run");
        }
        Ok(pending)
    }

    /// Settled counts and today's additions for every student, roster order.
    pub fn ledger(&self) -> Vec<LedgerRow> {
        let skipped = emails(&self.skips);
        let switched = emails(&self.switches);
        self.roster
            .students
            .iter()
            .map(|s| LedgerRow {
                name: s.name.clone(),
                email: s.email.clone(),
                section: s.section.clone(),
                settled: self.settled.get(&s.email),
                today: Usage {
                    skips: u32::from(skipped.contains(s.email.as_str())),
                    switches: u32::from(switched.contains(s.email.as_str())),
                },
            })
            .collect()
    }
}

fn emails(requests: &BTreeSet<Request>) -> BTreeSet<&str> {
    requests.iter().map(|r| r.email.as_str()).collect()
}

/// Count a stale day's requests into `usage`: at most one skip and one
/// switch per rostered student, skips only while allowance remains.
fn fold_stale(roster: &Roster, stale: &RequestCache, usage: &mut UsageStore, limit: u32) {
    for email in emails(&stale.skips) {
        let Some(student) = roster.find(email) else {
            continue;
        };
        if usage.get(email).skips >= limit {
            tracing::warn!(student = %student.email, limit, "stale skip not counted, allowance used up");
            continue;
        }
        usage.record_skip(email);
    }
    for email in emails(&stale.switches) {
        if roster.find(email).is_some() {
            usage.record_switch(email);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
