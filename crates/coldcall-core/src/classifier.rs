//! Sorts incoming messages into skip, switch, spam, or "needs a human".

use crate::config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Sender is outside the institutional domain.
    Spam,
    Skip,
    Switch,
    /// In-domain sender with an unrecognized subject.
    Unknown,
}

/// Lowercase and drop every whitespace character.
pub fn normalize_subject(subject: &str) -> String {
    subject
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Bare lowercased address from a `From` header, display name discarded.
pub fn sender_address(from: &str) -> String {
    let parsed = mailparse::addrparse(from).ok().and_then(|list| {
        list.iter().find_map(|addr| match addr {
            mailparse::MailAddr::Single(info) => Some(info.addr.clone()),
            mailparse::MailAddr::Group(group) => group.addrs.first().map(|i| i.addr.clone()),
        })
    });
    parsed
        .unwrap_or_else(|| from.to_string())
        .trim()
        .to_lowercase()
}

fn in_domain(address: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('@').to_lowercase();
    if domain.is_empty() {
        return false;
    }
    match address.rsplit_once('@') {
        Some((local, host)) => !local.is_empty() && host == domain,
        None => false,
    }
}

pub fn classify(from: &str, subject: &str, config: &Config) -> Classification {
    if !in_domain(&sender_address(from), &config.domain) {
        return Classification::Spam;
    }
    let subject = normalize_subject(subject);
    if subject == config.skip_subject() {
        Classification::Skip
    } else if subject == config.switch_subject() {
        Classification::Switch
    } else {
        Classification::Unknown
    }
}
