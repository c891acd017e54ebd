use crate::classifier::{classify, sender_address, Classification};
use crate::config::Config;
use crate::error::Result;
use crate::mail::{MailSource, Message};
use crate::types::{Request, RequestKind};
use std::collections::BTreeSet;

/// Operator decision for a message the classifier could not place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triage {
    Delete,
    Skip,
    Switch,
}

/// Requests pending from the mail source for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inbox {
    pub skips: BTreeSet<Request>,
    pub switches: BTreeSet<Request>,
    /// Messages deleted as spam or by triage.
    pub deleted: usize,
}

impl Inbox {
    pub fn is_empty(&self) -> bool {
        self.skips.is_empty() && self.switches.is_empty()
    }

    fn push(&mut self, message: &Message, kind: RequestKind) {
        let request = Request::new(message.id.clone(), &sender_address(&message.from), kind);
        match kind {
            RequestKind::Skip => self.skips.insert(request),
            RequestKind::Switch => self.switches.insert(request),
        };
    }
}

/// Classify every message in `source`.
///
/// Spam is deleted as soon as it is seen. Unknown in-domain messages are
/// collected and handed to `triage` once the scan is done.
pub fn fetch_requests<S, F>(source: &mut S, config: &Config, mut triage: F) -> Result<Inbox>
where
    S: MailSource + ?Sized,
    F: FnMut(&Message) -> Result<Triage>,
{
    let mut inbox = Inbox::default();
    let mut unknowns = Vec::new();

    for id in source.list_ids()? {
        let message = source.fetch(&id)?;
        match classify(&message.from, &message.subject, config) {
            Classification::Spam => {
                tracing::info!(id = %message.id, from = %message.from, "deleting spam");
                source.mark_deleted(&message.id)?;
                inbox.deleted += 1;
            }
            Classification::Skip => inbox.push(&message, RequestKind::Skip),
            Classification::Switch => inbox.push(&message, RequestKind::Switch),
            Classification::Unknown => unknowns.push(message),
        }
    }

    for message in unknowns {
        match triage(&message)? {
            Triage::Delete => {
                source.mark_deleted(&message.id)?;
                inbox.deleted += 1;
            }
            Triage::Skip => inbox.push(&message, RequestKind::Skip),
            Triage::Switch => inbox.push(&message, RequestKind::Switch),
        }
    }

    tracing::debug!(
        skips = inbox.skips.len(),
        switches = inbox.switches.len(),
        deleted = inbox.deleted,
        "fetched requests"
    );
    Ok(inbox)
}
