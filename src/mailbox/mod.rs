// SPDX-License-Identifier: MIT
//! Submission mailbox — the single-slot hand-off between the editor and the
//! polling browser extension.
//!
//! The extension cannot be pushed to, so every companion response embeds the
//! current slot. A poll carrying the `cph-submit: true` header is the
//! submission-claiming client: it consumes the slot, but its own response
//! still shows the pre-clear snapshot — the clear is only visible on the
//! next poll. That ordering is part of the wire contract; do not reorder.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ─── Wire types ───────────────────────────────────────────────────────────────

/// A staged "submit this source" payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub url: String,
    pub problem_name: String,
    pub source_code: String,
    pub language_id: i64,
}

/// Current mailbox slot. Serializes to exactly `{"empty":true}` or
/// `{"empty":false,"url":…,"problemName":…,"sourceCode":…,"languageId":…}` —
/// the byte contract the browser extension parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxEntry {
    Empty,
    Pending(PendingSubmission),
}

impl MailboxEntry {
    pub fn is_empty(&self) -> bool {
        matches!(self, MailboxEntry::Empty)
    }
}

impl Serialize for MailboxEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MailboxEntry::Empty => {
                let mut s = serializer.serialize_struct("MailboxEntry", 1)?;
                s.serialize_field("empty", &true)?;
                s.end()
            }
            MailboxEntry::Pending(p) => {
                let mut s = serializer.serialize_struct("MailboxEntry", 5)?;
                s.serialize_field("empty", &false)?;
                s.serialize_field("url", &p.url)?;
                s.serialize_field("problemName", &p.problem_name)?;
                s.serialize_field("sourceCode", &p.source_code)?;
                s.serialize_field("languageId", &p.language_id)?;
                s.end()
            }
        }
    }
}

// ─── SubmitMailbox ────────────────────────────────────────────────────────────

/// Process-wide single-slot store. Last write wins; a flagged take resets the
/// slot to empty. Interleaved request handlers only ever hold the lock for a
/// read-or-swap, so no hand-off is ever lost.
#[derive(Debug, Default)]
pub struct SubmitMailbox {
    slot: Mutex<Option<PendingSubmission>>,
}

impl SubmitMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<PendingSubmission>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage a submission, replacing any previous one unconditionally.
    pub fn store(&self, submission: PendingSubmission) {
        *self.slot() = Some(submission);
    }

    /// Current slot without mutation.
    pub fn peek(&self) -> MailboxEntry {
        match &*self.slot() {
            Some(p) => MailboxEntry::Pending(p.clone()),
            None => MailboxEntry::Empty,
        }
    }

    /// With the flag set, capture the slot and reset it to empty; without the
    /// flag, behave exactly like [`peek`](Self::peek).
    pub fn take_if_submit_flag(&self, has_flag: bool) -> MailboxEntry {
        if !has_flag {
            return self.peek();
        }
        match self.slot().take() {
            Some(p) => MailboxEntry::Pending(p),
            None => MailboxEntry::Empty,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str) -> PendingSubmission {
        PendingSubmission {
            url: format!("https://codeforces.com/contest/1512/problem/{name}"),
            problem_name: name.to_string(),
            source_code: "int main() {}".to_string(),
            language_id: 54,
        }
    }

    #[test]
    fn starts_empty() {
        assert!(SubmitMailbox::new().peek().is_empty());
    }

    #[test]
    fn last_write_wins_and_peek_does_not_mutate() {
        let mailbox = SubmitMailbox::new();
        mailbox.store(submission("A"));
        mailbox.store(submission("B"));
        assert_eq!(mailbox.peek(), MailboxEntry::Pending(submission("B")));
        // Re-peek returns the same entry.
        assert_eq!(mailbox.peek(), MailboxEntry::Pending(submission("B")));
    }

    #[test]
    fn unflagged_take_never_changes_state() {
        let mailbox = SubmitMailbox::new();
        assert!(mailbox.take_if_submit_flag(false).is_empty());

        mailbox.store(submission("A"));
        assert_eq!(
            mailbox.take_if_submit_flag(false),
            MailboxEntry::Pending(submission("A"))
        );
        assert_eq!(mailbox.peek(), MailboxEntry::Pending(submission("A")));
    }

    #[test]
    fn flagged_take_returns_entry_and_clears() {
        let mailbox = SubmitMailbox::new();
        mailbox.store(submission("A"));
        assert_eq!(
            mailbox.take_if_submit_flag(true),
            MailboxEntry::Pending(submission("A"))
        );
        assert!(mailbox.peek().is_empty());
    }

    #[test]
    fn flagged_take_on_empty_is_idempotent() {
        let mailbox = SubmitMailbox::new();
        mailbox.store(submission("A"));
        mailbox.take_if_submit_flag(true);
        assert!(mailbox.take_if_submit_flag(true).is_empty());
        assert!(mailbox.take_if_submit_flag(true).is_empty());
    }

    #[test]
    fn empty_wire_shape_is_exact() {
        let json = serde_json::to_string(&MailboxEntry::Empty).unwrap();
        assert_eq!(json, r#"{"empty":true}"#);
    }

    #[test]
    fn pending_wire_shape_is_exact() {
        let entry = MailboxEntry::Pending(PendingSubmission {
            url: "https://codeforces.com/contest/1512/problem/B".to_string(),
            problem_name: "1512B".to_string(),
            source_code: "print(1)".to_string(),
            language_id: 31,
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"empty":false,"url":"https://codeforces.com/contest/1512/problem/B","problemName":"1512B","sourceCode":"print(1)","languageId":31}"#
        );
    }
}
