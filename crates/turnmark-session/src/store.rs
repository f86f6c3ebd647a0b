//! Session record store.
//!
//! The store is the page view's memory of user turns. It outlives the host's
//! element churn: records bind to identity tokens, and every cycle the store
//! re-finds each record's element by token first and by exact text second.
//! A record that cannot be found is kept and projected as a placeholder; the
//! "missing" state is recomputed each cycle, never stored.

use serde::Serialize;
use tracing::{debug, trace};
use turnmark_core::text::truncate_str;
use turnmark_dom::HostTree;

use crate::record::{RenderTarget, TurnRecord, TurnSnapshot};

/// Maximum bytes of turn text echoed into log fields.
const LOG_TEXT_BYTES: usize = 48;

/// Outcome of one revalidation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationReport {
    /// Records whose bound element is still live with the same text.
    pub live: usize,
    /// Records re-found by text scan and bound to a new element.
    pub rebound: usize,
    /// Records with no matching live element.
    pub missing: usize,
}

/// Ordered, deduplicated turn records for one page view.
#[derive(Debug)]
pub struct SessionStore {
    records: Vec<TurnRecord>,
    next_ordinal: u64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// An empty store. The first record gets ordinal 1.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_ordinal: 1,
        }
    }

    /// Records in ordinal order.
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget every record. Ordinals keep counting from where they were.
    pub fn clear(&mut self) {
        if !self.records.is_empty() {
            debug!(records = self.records.len(), "clearing session store");
        }
        self.records.clear();
    }

    /// Whether a record with this text or logical id already exists.
    fn contains(&self, text: &str, host_id: Option<&str>) -> bool {
        self.records.iter().any(|r| {
            r.text() == text || host_id.is_some_and(|id| r.id().as_str() == id)
        })
    }

    /// Re-find every record's element in the live tree.
    ///
    /// Token lookup first, confirmed by text equality against this cycle's
    /// snapshot; otherwise a linear text scan over the snapshot, rebinding
    /// the record to the element found.
    pub fn revalidate<T: HostTree + ?Sized>(
        &mut self,
        tree: &mut T,
        snapshot: &TurnSnapshot,
    ) -> RevalidationReport {
        let mut report = RevalidationReport::default();
        for record in &mut self.records {
            let by_token = record
                .bound()
                .and_then(|token| tree.find_by_identity(token))
                .and_then(|handle| snapshot.find_handle(handle))
                .is_some_and(|located| located.text == record.text());
            if by_token {
                report.live += 1;
                continue;
            }

            match snapshot.find_text(record.text()) {
                Some(located) => match tree.tag_identity(located.handle) {
                    Some(token) => {
                        trace!(ordinal = record.ordinal(), %token, "rebound turn record");
                        record.rebind(token);
                        report.rebound += 1;
                    }
                    None => report.missing += 1,
                },
                None => report.missing += 1,
            }
        }
        report
    }

    /// Append a record for every new, non-blank turn in the snapshot.
    ///
    /// Candidates are processed in document order; one matching an existing
    /// record's text or logical id is dropped. Returns how many were added.
    pub fn ingest<T: HostTree + ?Sized>(&mut self, tree: &mut T, snapshot: &TurnSnapshot) -> usize {
        let mut added = 0;
        for located in snapshot.turns() {
            let text = located.text.trim();
            if text.is_empty() || self.contains(text, located.host_id.as_deref()) {
                continue;
            }
            let token = tree.tag_identity(located.handle);
            let ordinal = self.next_ordinal;
            self.next_ordinal += 1;
            debug!(
                ordinal,
                text = truncate_str(text, LOG_TEXT_BYTES),
                "new turn record"
            );
            self.records.push(TurnRecord::new(
                located.host_id.clone(),
                text.to_owned(),
                token,
                ordinal,
            ));
            added += 1;
        }
        added
    }

    /// Where a record should render: its bound element if still live with
    /// the same text, else any located element with the same text, else a
    /// placeholder.
    pub fn resolve_target<T: HostTree + ?Sized>(
        &self,
        tree: &T,
        snapshot: &TurnSnapshot,
        record: &TurnRecord,
    ) -> RenderTarget {
        let bound = record
            .bound()
            .and_then(|token| tree.find_by_identity(token))
            .filter(|handle| {
                snapshot
                    .find_handle(*handle)
                    .is_some_and(|located| located.text == record.text())
            });
        match bound.or_else(|| snapshot.find_text(record.text()).map(|l| l.handle)) {
            Some(handle) => RenderTarget::Live(handle),
            None => RenderTarget::Placeholder(record.text().to_owned()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
