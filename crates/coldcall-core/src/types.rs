use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SectionId
// ---------------------------------------------------------------------------

/// A class section name, normalized to lowercase with surrounding whitespace
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// One row of the course roster. Identity is the lowercased email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub email: String,
    pub section: SectionId,
}

impl Student {
    pub fn new(name: &str, email: &str, section: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            section: SectionId::new(section),
        }
    }
}

// ---------------------------------------------------------------------------
// RequestKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Skip,
    Switch,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Skip => "skip",
            RequestKind::Switch => "switch",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A skip or switch request parsed from one mail message.
///
/// Ordering is by `(message_id, email, kind)`, which is also the identity used
/// when pending requests are unioned with the same-day cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Request {
    pub message_id: String,
    pub email: String,
    pub kind: RequestKind,
}

impl Request {
    pub fn new(message_id: impl Into<String>, email: &str, kind: RequestKind) -> Self {
        Self {
            message_id: message_id.into(),
            email: email.trim().to_lowercase(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// Operator-facing record of something reconciliation did to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    SkipApplied { name: String, email: String, count: u32 },
    SkipDenied { name: String, email: String, limit: u32 },
    SwitchRecorded { name: String, email: String, count: u32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SkipApplied { name, count, .. } => {
                let noun = if *count == 1 { "skip" } else { "skips" };
                write!(f, "{name} has now used {count} {noun}")
            }
            Notice::SkipDenied { name, limit, .. } => {
                write!(f, "{name} attempted to use a skip but has used all {limit}")
            }
            Notice::SwitchRecorded { name, count, .. } => {
                let noun = if *count == 1 { "time" } else { "times" };
                write!(f, "{name} has now switched {count} {noun}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_fields_are_normalized() {
        let s = Student::new("  Alice Smith ", " Alice@X.EDU ", " A ");
        assert_eq!(s.name, "Alice Smith");
        assert_eq!(s.email, "alice@x.edu");
        assert_eq!(s.section.as_str(), "a");
    }

    #[test]
    fn request_kind_display() {
        assert_eq!(RequestKind::Skip.to_string(), "skip");
        assert_eq!(RequestKind::Switch.to_string(), "switch");
    }

    #[test]
    fn request_identity_includes_message_id() {
        let a = Request::new("1", "bob@x.edu", RequestKind::Switch);
        let b = Request::new("2", "bob@x.edu", RequestKind::Switch);
        assert_ne!(a, b);
        assert_eq!(a, Request::new("1", "BOB@x.edu", RequestKind::Switch));
    }

    #[test]
    fn notice_display() {
        let n = Notice::SkipApplied {
            name: "Alice".into(),
            email: "alice@x.edu".into(),
            count: 1,
        };
        assert_eq!(n.to_string(), "Alice has now used 1 skip");
        let n = Notice::SwitchRecorded {
            name: "Bob".into(),
            email: "bob@x.edu".into(),
            count: 3,
        };
        assert_eq!(n.to_string(), "Bob has now switched 3 times");
    }
}
