//! Vellum DOM - host page model
//!
//! A small, deterministic model of the browser surfaces an overlay panel
//! engine touches:
//! - Arena DOM tree with attributes, class lists and inline styles
//! - Document focus (active element) and sequential tab navigation
//! - Element geometry and window metrics
//! - Session history with a fragment-aware location
//! - UI events with `preventDefault` semantics

mod node;
mod tree;
mod document;
mod geometry;
mod focus;
mod window;
mod history;
mod events;
mod page;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::DomTree;
pub use document::Document;
pub use geometry::DOMRect;
pub use focus::{TabIndex, is_tabbable};
pub use window::Window;
pub use history::{History, HistoryEntry, Location};
pub use events::{Key, KeyboardEvent, PointerEvent, NavigationEvent, UiEvent};
pub use page::Page;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Invalid node: {0:?}")]
    InvalidNode(NodeId),

    #[error("Cannot insert {child:?} into its own subtree at {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
