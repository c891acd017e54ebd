//! Mail source abstraction and the on-disk mailbox implementation.
//!
//! A mailbox directory holds `inbox/` with one raw RFC 822 message per file
//! and `processed/` where consumed messages are moved. Message ids are the
//! file names.

use crate::error::{ColdCallError, Result};
use crate::paths;
use mailparse::MailHeaderMap;
use std::path::{Path, PathBuf};

/// The headers reconciliation cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub subject: String,
}

pub trait MailSource {
    fn list_ids(&mut self) -> Result<Vec<String>>;
    fn fetch(&mut self, id: &str) -> Result<Message>;
    fn mark_processed(&mut self, id: &str) -> Result<()>;
    fn mark_deleted(&mut self, id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Maildir
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Maildir {
    inbox: PathBuf,
    processed: PathBuf,
}

impl Maildir {
    /// Open an existing mailbox. A missing inbox means the source is unreachable.
    pub fn open(mailbox: &Path) -> Result<Self> {
        let inbox = paths::inbox_dir(mailbox);
        if !inbox.is_dir() {
            return Err(ColdCallError::Connectivity(format!(
                "no inbox at {}",
                inbox.display()
            )));
        }
        Ok(Self {
            inbox,
            processed: paths::processed_dir(mailbox),
        })
    }

    /// Create the mailbox layout. Idempotent.
    pub fn init(mailbox: &Path) -> Result<()> {
        crate::io::ensure_dir(&paths::inbox_dir(mailbox))?;
        crate::io::ensure_dir(&paths::processed_dir(mailbox))
    }

    fn message_path(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(|c: char| c == '/' || c == '\\') || id.starts_with('.') {
            return Err(ColdCallError::MessageNotFound(id.to_string()));
        }
        let path = self.inbox.join(id);
        if !path.is_file() {
            return Err(ColdCallError::MessageNotFound(id.to_string()));
        }
        Ok(path)
    }
}

impl MailSource for Maildir {
    fn list_ids(&mut self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.inbox)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "skipping message with a non-UTF-8 file name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            ids.push(name);
        }
        ids.sort();
        Ok(ids)
    }

    fn fetch(&mut self, id: &str) -> Result<Message> {
        let raw = std::fs::read(self.message_path(id)?)?;
        let (headers, _) = mailparse::parse_headers(&raw)?;
        Ok(Message {
            id: id.to_string(),
            from: headers.get_first_value("From").unwrap_or_default(),
            subject: headers.get_first_value("Subject").unwrap_or_default(),
        })
    }

    fn mark_processed(&mut self, id: &str) -> Result<()> {
        let from = self.message_path(id)?;
        crate::io::ensure_dir(&self.processed)?;
        std::fs::rename(from, self.processed.join(id))?;
        Ok(())
    }

    fn mark_deleted(&mut self, id: &str) -> Result<()> {
        std::fs::remove_file(self.message_path(id)?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory source for tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
