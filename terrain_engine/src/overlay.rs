//! Boundary to the detail panel that shows a picked record.
//!
//! The panel integrates with navigation history: opening pushes an entry so
//! a platform "back" closes it, and an explicit close rewrites the top entry
//! so a later "back" has nothing to reopen.

use serde::Serialize;

use crate::markers::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayContent {
    /// Content looked up by the presentation layer.
    Key { category: CategoryId, key: String },
    /// Content assembled by the caller.
    Explicit { body: String },
}

pub trait DetailOverlayBridge {
    fn open(&mut self, content: OverlayContent, now: f64);
    fn close(&mut self, now: f64);
    fn is_open(&self) -> bool;
    /// Closed no more than `within` seconds before `now`.
    fn just_closed(&self, now: f64, within: f64) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HistoryOp {
    Push { content: OverlayContent },
    Pop,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HistoryEntry {
    Detail(OverlayContent),
    /// Left behind by an explicit close.
    Neutral,
}

/// In-process history-backed overlay. Records every history operation so a
/// front end can mirror them onto a real navigation stack.
#[derive(Debug, Clone, Default)]
pub struct HistoryOverlay {
    entries: Vec<HistoryEntry>,
    current: Option<OverlayContent>,
    closed_at: Option<f64>,
    pending: Vec<HistoryOp>,
}

impl HistoryOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&OverlayContent> {
        self.current.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Back navigation. Closes the panel when its entry is on top; returns
    /// whether anything happened.
    pub fn back(&mut self, now: f64) -> bool {
        match self.entries.last() {
            Some(HistoryEntry::Detail(_)) if self.current.is_some() => {
                self.entries.pop();
                self.pending.push(HistoryOp::Pop);
                self.current = None;
                self.closed_at = Some(now);
                log::debug!("overlay closed by back navigation");
                true
            }
            Some(HistoryEntry::Neutral) => {
                self.entries.pop();
                self.pending.push(HistoryOp::Pop);
                false
            }
            _ => false,
        }
    }

    /// History operations since the last call.
    pub fn take_ops(&mut self) -> Vec<HistoryOp> {
        std::mem::take(&mut self.pending)
    }
}

impl DetailOverlayBridge for HistoryOverlay {
    fn open(&mut self, content: OverlayContent, _now: f64) {
        self.entries.push(HistoryEntry::Detail(content.clone()));
        self.pending.push(HistoryOp::Push {
            content: content.clone(),
        });
        log::debug!("overlay opened: {content:?}");
        self.current = Some(content);
    }

    fn close(&mut self, now: f64) {
        if self.current.take().is_none() {
            return;
        }
        if let Some(top) = self.entries.last_mut() {
            *top = HistoryEntry::Neutral;
            self.pending.push(HistoryOp::Replace);
        }
        self.closed_at = Some(now);
        log::debug!("overlay closed");
    }

    fn is_open(&self) -> bool {
        self.current.is_some()
    }

    fn just_closed(&self, now: f64, within: f64) -> bool {
        self.closed_at
            .is_some_and(|closed| now >= closed && now - closed <= within)
    }
}
