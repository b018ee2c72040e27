//! Vellum Panel
//!
//! Exclusive slide-in overlay panels for a single page.
//!
//! # Features
//! - One panel open at a time; switching fully closes the previous one first
//! - Reference-counted scroll lock shared by every engine on the page
//! - Focus trap with restoration to the triggering element
//! - Slide/fade transitions with a reduced-motion snap path
//! - `#zone-<slug>` URL fragments kept in sync with back/forward navigation
//!
//! # Example
//! ```rust,ignore
//! use std::{cell::RefCell, rc::Rc};
//! use vellum_dom::Page;
//! use vellum_panel::{PanelConfig, PanelEngine};
//!
//! let page = Rc::new(RefCell::new(Page::new("https://example.com/")?));
//! // ... build markup carrying the attribute contract ...
//! let engine = PanelEngine::new(page.clone(), PanelConfig::default())?;
//! engine.attach();
//! engine.dispatch(&mut event);      // forward raw events
//! engine.frame(now_ms);             // forward animation frames
//! ```

mod config;
mod registry;
mod direction;
mod scroll_lock;
mod focus_trap;
mod history_sync;
mod state;
mod engine;
pub mod animation;
pub mod observer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vellum_dom::NodeId;

pub use config::{AttributeContract, PanelConfig, TimingConfig};
pub use registry::{PanelElements, PanelRegistry};
pub use direction::direction_for_trigger;
pub use scroll_lock::ScrollLock;
pub use focus_trap::{FocusRestore, FocusTrap};
pub use history_sync::{HistorySync, Route};
pub use state::{PanelPhase, PanelState};
pub use engine::PanelEngine;
pub use observer::{ContentLoader, LazyContent, PanelObserver};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Side a panel slides in from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Horizontal offscreen offset, in percent of the content width
    pub fn offscreen_percent(self) -> f64 {
        match self {
            Self::Left => -100.0,
            Self::Right => 100.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// Required sub-region of a panel container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Content,
    Backdrop,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::Backdrop => "backdrop",
        })
    }
}

/// Panel engine error
///
/// Only construction and configuration fail; runtime conditions such as
/// unknown slugs or detached triggers are no-ops.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("Panel \"{slug}\" is missing its {region} region")]
    MissingRegion { slug: String, region: Region },

    #[error("Panel element {0:?} has an empty slug")]
    MissingSlug(NodeId),

    #[error("Duplicate panel slug: {0}")]
    DuplicateSlug(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
