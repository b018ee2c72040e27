//! Focus Trap
//!
//! Keyboard containment for the open panel. A trap is created fresh on
//! every open and consumed on close; the focusable list is captured once
//! at activation and not re-validated while the panel stays open.

use vellum_dom::{Document, NodeId};

/// Outcome of returning focus on deactivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRestore {
    /// Focus moved back to the trigger
    Restored(NodeId),
    /// The trigger left the document; nothing was focused
    Detached(NodeId),
    /// No trigger was recorded
    NoTrigger,
}

/// Active focus trap context
#[derive(Debug, Clone)]
pub struct FocusTrap {
    container: NodeId,
    focusables: Vec<NodeId>,
    trigger: Option<NodeId>,
}

impl FocusTrap {
    /// Capture the tabbable descendants of `container` (minus those marked
    /// with `skip_attr`) and move focus to the first of them.
    pub fn activate(doc: &mut Document, container: NodeId, trigger: Option<NodeId>, skip_attr: &str) -> Self {
        let focusables: Vec<NodeId> = doc.tabbable_within(container)
            .into_iter()
            .filter(|&n| doc.tree().closest_with_attr(n, skip_attr).is_none())
            .collect();

        if let Some(&first) = focusables.first() {
            doc.focus(first);
        }
        tracing::debug!("focus trap active with {} focusable element(s)", focusables.len());

        Self { container, focusables, trigger }
    }

    pub fn focusables(&self) -> &[NodeId] {
        &self.focusables
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    /// Handle a Tab keypress. Focus always stays inside the trap: moving
    /// past either end wraps, focus found outside the list re-enters at the
    /// matching end, and an empty trap pins focus to the container.
    /// Returns true when the default action must be prevented (always, while
    /// the trap is active).
    pub fn handle_tab(&self, doc: &mut Document, backward: bool) -> bool {
        if self.focusables.is_empty() {
            doc.focus(self.container);
            return true;
        }

        let last = self.focusables.len() - 1;
        let position = doc.active_element()
            .and_then(|active| self.focusables.iter().position(|&n| n == active));

        let next = match (position, backward) {
            (Some(0), true) => last,
            (Some(p), true) => p - 1,
            (Some(p), false) if p == last => 0,
            (Some(p), false) => p + 1,
            (None, true) => last,
            (None, false) => 0,
        };
        doc.focus(self.focusables[next]);
        true
    }

    /// Drop the trap and return focus to the trigger if it is still in the
    /// document.
    pub fn deactivate(self, doc: &mut Document) -> FocusRestore {
        match self.trigger {
            Some(trigger) if doc.is_connected(trigger) => {
                doc.focus(trigger);
                FocusRestore::Restored(trigger)
            }
            Some(trigger) => {
                tracing::debug!("trigger {:?} detached, skipping focus restore", trigger);
                FocusRestore::Detached(trigger)
            }
            None => FocusRestore::NoTrigger,
        }
    }
}
