//! Panel state machine bookkeeping
//!
//! `closed → opening → open → closing → closed`, per panel, plus the single
//! active slug that enforces exclusivity.

use std::collections::HashMap;

use vellum_dom::NodeId;

use crate::{Direction, FocusTrap};

/// Lifecycle phase of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl PanelPhase {
    /// Mid-transition
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// Observable state of one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub slug: String,
    pub phase: PanelPhase,
    /// Carries the active marker
    pub active: bool,
    /// Direction marker from the most recent open
    pub slide_direction: Option<Direction>,
    pub aria_hidden: bool,
}

/// Why a pipeline runs; decides whether it writes history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Trigger, close button, backdrop, Escape or a programmatic call
    User,
    /// popstate / hashchange / initial load: the URL is already right
    History,
    /// In-page nav link that writes its own fragment
    Navigation,
    /// Closing the previous panel on the way to opening another
    Superseded,
}

impl Origin {
    pub(crate) fn writes_on_open(self) -> bool {
        !matches!(self, Self::History)
    }

    pub(crate) fn writes_on_close(self) -> bool {
        matches!(self, Self::User)
    }
}

/// Engine-wide mutable state
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub active_slug: Option<String>,
    pub phases: HashMap<String, PanelPhase>,
    pub directions: HashMap<String, Direction>,
    pub trap: Option<FocusTrap>,
    pub holds_lock: bool,
    pub attached: bool,
    pub destroyed: bool,
}

impl EngineState {
    pub fn phase(&self, slug: &str) -> PanelPhase {
        self.phases.get(slug).copied().unwrap_or_default()
    }

    pub fn set_phase(&mut self, slug: &str, phase: PanelPhase) {
        tracing::debug!("panel {}: {:?} -> {:?}", slug, self.phase(slug), phase);
        self.phases.insert(slug.to_string(), phase);
    }

    /// Phase of the active panel, `Closed` if none
    pub fn active_phase(&self) -> PanelPhase {
        self.active_slug.as_deref().map(|s| self.phase(s)).unwrap_or_default()
    }

    /// `slug` is active and not on its way out
    pub fn is_open_or_opening(&self, slug: &str) -> bool {
        self.active_slug.as_deref() == Some(slug)
            && matches!(self.phase(slug), PanelPhase::Opening | PanelPhase::Open)
    }

    /// Trigger recorded for the current open
    pub fn trigger(&self) -> Option<NodeId> {
        self.trap.as_ref().and_then(FocusTrap::trigger)
    }
}
