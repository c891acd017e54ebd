//! Derives a section's cold-call candidates from the roster and the day's
//! skip/switch requests.
//!
//! Skips are resolved first, against the target section's own students.
//! Switches are resolved second and assume exactly two sections: a switcher
//! leaves their own section and joins the other one.

use crate::error::{ColdCallError, Result};
use crate::types::{Notice, Request, SectionId, Student};
use crate::usage::UsageStore;
use std::collections::BTreeSet;

/// Largest number of sections the switch rule is defined for.
pub const MAX_SECTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub candidates: Vec<Student>,
    pub notices: Vec<Notice>,
    /// Requests that took effect on this section's list.
    pub consumed: BTreeSet<Request>,
}

/// What a pass did besides choosing candidates.
#[derive(Debug, Default)]
pub struct Effects {
    pub notices: Vec<Notice>,
    pub consumed: BTreeSet<Request>,
}

impl Effects {
    /// Mark every request from `email` as consumed. Returns false if there
    /// were none.
    fn consume(&mut self, requests: &BTreeSet<Request>, email: &str) -> bool {
        let mut matched = false;
        for r in requests.iter().filter(|r| r.email == email) {
            self.consumed.insert(r.clone());
            matched = true;
        }
        matched
    }
}

/// Remove target-section students who asked to skip and still have
/// allowance left. Other sections pass through untouched and their skips
/// are not consumed.
pub fn apply_skips(
    roster: &[Student],
    skips: &BTreeSet<Request>,
    usage: &mut UsageStore,
    target: &SectionId,
    limit: u32,
    effects: &mut Effects,
) -> Vec<Student> {
    let mut kept = Vec::with_capacity(roster.len());

    for student in roster {
        if &student.section != target || !effects.consume(skips, &student.email) {
            kept.push(student.clone());
            continue;
        }

        if usage.get(&student.email).skips >= limit {
            tracing::warn!(student = %student.email, limit, "skip denied, allowance used up");
            effects.notices.push(Notice::SkipDenied {
                name: student.name.clone(),
                email: student.email.clone(),
                limit,
            });
            kept.push(student.clone());
            continue;
        }

        let count = usage.record_skip(&student.email);
        tracing::info!(student = %student.email, count, "skip applied");
        effects.notices.push(Notice::SkipApplied {
            name: student.name.clone(),
            email: student.email.clone(),
            count,
        });
    }

    kept
}

/// Keep same-section students who did not switch out and add other-section
/// students who switched in. Every matched switch is recorded.
pub fn apply_switches(
    roster: &[Student],
    switches: &BTreeSet<Request>,
    usage: &mut UsageStore,
    target: &SectionId,
    effects: &mut Effects,
) -> Vec<Student> {
    let mut kept = Vec::with_capacity(roster.len());

    for student in roster {
        let switched = effects.consume(switches, &student.email);
        if switched {
            let count = usage.record_switch(&student.email);
            tracing::info!(student = %student.email, count, "switch recorded");
            effects.notices.push(Notice::SwitchRecorded {
                name: student.name.clone(),
                email: student.email.clone(),
                count,
            });
        }

        let home = &student.section == target;
        if home != switched {
            kept.push(student.clone());
        }
    }

    kept
}

/// Check that `target` is one of at most two sections present in `roster`.
pub fn check_sections(roster: &[Student], target: &SectionId) -> Result<()> {
    let sections: BTreeSet<&SectionId> = roster.iter().map(|s| &s.section).collect();
    if sections.len() > MAX_SECTIONS {
        return Err(ColdCallError::UnsupportedSections(sections.len()));
    }
    if !sections.contains(target) {
        return Err(ColdCallError::UnknownSection(target.to_string()));
    }
    Ok(())
}

/// Run skips then switches for `target`, mutating `usage` in place.
pub fn reconcile(
    roster: &[Student],
    skips: &BTreeSet<Request>,
    switches: &BTreeSet<Request>,
    usage: &mut UsageStore,
    target: &SectionId,
    limit: u32,
) -> Result<Reconciliation> {
    check_sections(roster, target)?;

    let mut effects = Effects::default();
    let after_skips = apply_skips(roster, skips, usage, target, limit, &mut effects);
    let candidates = apply_switches(&after_skips, switches, usage, target, &mut effects);

    Ok(Reconciliation {
        candidates,
        notices: effects.notices,
        consumed: effects.consumed,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestKind;
    use crate::usage::Usage;

    fn roster() -> Vec<Student> {
        vec![
            Student::new("Alice", "alice@x.edu", "a"),
            Student::new("Bob", "bob@x.edu", "b"),
            Student::new("Cara", "cara@x.edu", "a"),
            Student::new("Dan", "dan@x.edu", "b"),
        ]
    }

    fn reqs(kind: RequestKind, emails: &[&str]) -> BTreeSet<Request> {
        emails
            .iter()
            .enumerate()
            .map(|(i, e)| Request::new(format!("{kind}-{i}"), e, kind))
            .collect()
    }

    fn names(students: &[Student]) -> Vec<&str> {
        students.iter().map(|s| s.name.as_str()).collect()
    }

    fn section(s: &str) -> SectionId {
        SectionId::new(s)
    }

    #[test]
    fn untouched_students_stay() {
        let mut usage = UsageStore::new();
        let out = reconcile(
            &roster(),
            &BTreeSet::new(),
            &BTreeSet::new(),
            &mut usage,
            &section("a"),
            5,
        )
        .unwrap();
        assert_eq!(names(&out.candidates), ["Alice", "Cara"]);
        assert!(out.notices.is_empty());
        assert!(usage.is_empty());
    }

    #[test]
    fn end_to_end_skip_and_switch() {
        let roster = vec![
            Student::new("Alice", "alice@x.edu", "A"),
            Student::new("Bob", "bob@x.edu", "B"),
        ];
        let mut usage = UsageStore::new();
        let out = reconcile(
            &roster,
            &reqs(RequestKind::Skip, &["alice@x.edu"]),
            &reqs(RequestKind::Switch, &["bob@x.edu"]),
            &mut usage,
            &section("A"),
            5,
        )
        .unwrap();

        assert_eq!(names(&out.candidates), ["Bob"]);
        assert_eq!(
            usage.entry("alice@x.edu"),
            Some(Usage {
                skips: 1,
                switches: 0
            })
        );
        assert_eq!(
            usage.entry("bob@x.edu"),
            Some(Usage {
                skips: 0,
                switches: 1
            })
        );
    }

    #[test]
    fn first_skip_removes_and_counts_one() {
        let mut usage = UsageStore::new();
        let mut effects = Effects::default();
        let out = apply_skips(
            &roster(),
            &reqs(RequestKind::Skip, &["cara@x.edu"]),
            &mut usage,
            &section("a"),
            5,
            &mut effects,
        );
        assert_eq!(names(&out), ["Alice", "Bob", "Dan"]);
        assert_eq!(usage.get("cara@x.edu").skips, 1);
        assert_eq!(effects.consumed.len(), 1);
        assert_eq!(
            effects.notices,
            [Notice::SkipApplied {
                name: "Cara".into(),
                email: "cara@x.edu".into(),
                count: 1
            }]
        );
    }

    #[test]
    fn skip_at_limit_is_denied() {
        let mut usage = UsageStore::new();
        usage.insert(
            "alice@x.edu",
            Usage {
                skips: 5,
                switches: 0,
            },
        );
        let mut effects = Effects::default();
        let out = apply_skips(
            &roster(),
            &reqs(RequestKind::Skip, &["alice@x.edu"]),
            &mut usage,
            &section("a"),
            5,
            &mut effects,
        );
        assert!(names(&out).contains(&"Alice"));
        assert_eq!(usage.get("alice@x.edu").skips, 5);
        assert!(matches!(effects.notices[0], Notice::SkipDenied { limit: 5, .. }));
        // the denial was reported, so the request is used up
        assert_eq!(effects.consumed.len(), 1);
    }

    #[test]
    fn skip_from_other_section_is_ignored() {
        let mut usage = UsageStore::new();
        let mut effects = Effects::default();
        let out = apply_skips(
            &roster(),
            &reqs(RequestKind::Skip, &["bob@x.edu"]),
            &mut usage,
            &section("a"),
            5,
            &mut effects,
        );
        assert_eq!(out.len(), 4);
        assert!(usage.is_empty());
        assert!(effects.notices.is_empty());
        assert!(effects.consumed.is_empty());
    }

    #[test]
    fn duplicate_skip_requests_count_once() {
        let mut usage = UsageStore::new();
        let mut effects = Effects::default();
        let skips: BTreeSet<Request> = [
            Request::new("1", "alice@x.edu", RequestKind::Skip),
            Request::new("2", "alice@x.edu", RequestKind::Skip),
        ]
        .into_iter()
        .collect();
        apply_skips(&roster(), &skips, &mut usage, &section("a"), 5, &mut effects);
        assert_eq!(usage.get("alice@x.edu").skips, 1);
        assert_eq!(effects.consumed, skips);
    }

    #[test]
    fn switch_is_symmetric_across_sections() {
        let switches = reqs(RequestKind::Switch, &["alice@x.edu"]);

        let mut usage = UsageStore::new();
        let for_a = reconcile(&roster(), &BTreeSet::new(), &switches, &mut usage, &section("a"), 5)
            .unwrap();
        assert_eq!(names(&for_a.candidates), ["Cara"]);

        let mut usage = UsageStore::new();
        let for_b = reconcile(&roster(), &BTreeSet::new(), &switches, &mut usage, &section("b"), 5)
            .unwrap();
        assert_eq!(names(&for_b.candidates), ["Alice", "Bob", "Dan"]);
    }

    #[test]
    fn switches_are_uncapped() {
        let mut usage = UsageStore::new();
        usage.insert(
            "bob@x.edu",
            Usage {
                skips: 5,
                switches: 40,
            },
        );
        let mut effects = Effects::default();
        let out = apply_switches(
            &roster(),
            &reqs(RequestKind::Switch, &["bob@x.edu"]),
            &mut usage,
            &section("a"),
            &mut effects,
        );
        assert_eq!(names(&out), ["Alice", "Bob", "Cara"]);
        assert_eq!(usage.get("bob@x.edu").switches, 41);
    }

    #[test]
    fn skipped_student_does_not_switch_back_in() {
        let mut usage = UsageStore::new();
        let out = reconcile(
            &roster(),
            &reqs(RequestKind::Skip, &["alice@x.edu"]),
            &reqs(RequestKind::Switch, &["alice@x.edu"]),
            &mut usage,
            &section("a"),
            5,
        )
        .unwrap();
        assert_eq!(names(&out.candidates), ["Cara"]);
        assert_eq!(usage.get("alice@x.edu").switches, 0);
    }

    #[test]
    fn rerun_from_same_settled_usage_is_idempotent() {
        let settled = UsageStore::new();
        let skips = reqs(RequestKind::Skip, &["alice@x.edu"]);
        let switches = reqs(RequestKind::Switch, &["dan@x.edu"]);

        let mut first = settled.clone();
        let a = reconcile(&roster(), &skips, &switches, &mut first, &section("a"), 5).unwrap();
        let mut second = settled.clone();
        let b = reconcile(&roster(), &skips, &switches, &mut second, &section("a"), 5).unwrap();

        assert_eq!(a, b);
        assert_eq!(first, second);
        assert_eq!(first.get("alice@x.edu").skips, 1);
    }

    #[test]
    fn only_effective_requests_are_consumed() {
        let mut usage = UsageStore::new();
        let skips = reqs(RequestKind::Skip, &["alice@x.edu", "bob@x.edu", "zed@x.edu"]);
        let switches = reqs(RequestKind::Switch, &["dan@x.edu", "zed@x.edu"]);
        let out = reconcile(&roster(), &skips, &switches, &mut usage, &section("a"), 5).unwrap();

        let consumed: Vec<&str> = out.consumed.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(consumed, ["alice@x.edu", "dan@x.edu"]);
    }

    #[test]
    fn unknown_target_section_fails() {
        let mut usage = UsageStore::new();
        let err = reconcile(
            &roster(),
            &BTreeSet::new(),
            &BTreeSet::new(),
            &mut usage,
            &section("c"),
            5,
        )
        .unwrap_err();
        assert!(matches!(err, ColdCallError::UnknownSection(_)));
    }

    #[test]
    fn three_sections_fail_fast() {
        let mut roster = roster();
        roster.push(Student::new("Eve", "eve@x.edu", "c"));
        let mut usage = UsageStore::new();
        let err = reconcile(
            &roster,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &mut usage,
            &section("a"),
            5,
        )
        .unwrap_err();
        assert!(matches!(err, ColdCallError::UnsupportedSections(3)));
    }
}
