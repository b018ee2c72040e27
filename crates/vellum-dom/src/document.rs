//! Document - High-level document API

use std::collections::HashMap;

use crate::focus::is_tabbable;
use crate::{DOMRect, DomError, DomTree, ElementData, NodeId};

/// HTML Document
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Cached reference to <body> element
    body_element: NodeId,
    /// Focused element; `None` means the body has focus
    active_element: Option<NodeId>,
    /// Layout boxes in document coordinates
    layout: HashMap<NodeId, DOMRect>,
}

impl Document {
    /// Create a document with `<html><head/><body/></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Fresh nodes under the root cannot violate hierarchy rules.
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            body_element: body,
            active_element: None,
            layout: HashMap::new(),
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.element(id)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.tree.element_mut(id)
    }

    /// Create an element with `attrs` and append it to `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let id = self.tree.create_element(tag);
        if let Some(el) = self.tree.element_mut(id) {
            for (name, value) in attrs {
                el.set_attr(name, value);
            }
        }
        self.tree.append_child(parent, id)?;
        Ok(id)
    }

    /// Remove `id` from the document. Focus inside the removed subtree
    /// falls back to the body.
    pub fn remove(&mut self, id: NodeId) {
        self.tree.detach(id);
        if let Some(active) = self.active_element {
            if !self.tree.is_connected(active) {
                tracing::debug!("focused element {:?} removed, focus returns to body", active);
                self.active_element = None;
            }
        }
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(ElementData::id) == Some(id))
    }

    /// Connected elements carrying `attr`, in document order
    pub fn query_attr(&self, attr: &str) -> Vec<NodeId> {
        self.query_attr_in(self.tree.root(), attr)
    }

    /// Elements below `root` carrying `attr`, in document order
    pub fn query_attr_in(&self, root: NodeId, attr: &str) -> Vec<NodeId> {
        self.tree.descendants(root)
            .into_iter()
            .filter(|&n| self.tree.element(n).is_some_and(|e| e.has_attr(attr)))
            .collect()
    }

    /// First connected element whose `attr` equals `value`
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Option<NodeId> {
        self.query_attr(attr)
            .into_iter()
            .find(|&n| self.attr(n, attr) == Some(value))
    }

    /// Attribute value on an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.tree.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.tree.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Inline style value on an element, `""` if unset
    pub fn style(&self, id: NodeId, property: &str) -> &str {
        self.tree.element(id).and_then(|e| e.style(property)).unwrap_or("")
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(el) = self.tree.element_mut(id) {
            el.set_style(property, value);
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Focused element (`None` when the body has focus)
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Programmatically focus `id`. Like `HTMLElement.focus()`, any
    /// connected element accepts programmatic focus.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if id == self.body_element {
            self.active_element = None;
            return true;
        }
        if self.tree.element(id).is_none() || !self.tree.is_connected(id) {
            return false;
        }
        self.active_element = Some(id);
        true
    }

    /// Tabbable descendants of `root`, in document order
    pub fn tabbable_within(&self, root: NodeId) -> Vec<NodeId> {
        self.tree.descendants(root)
            .into_iter()
            .filter(|&n| self.tree.element(n).is_some_and(is_tabbable))
            .collect()
    }

    /// Default Tab navigation: move focus to the next (or previous)
    /// tabbable element in document order. Leaving either end returns
    /// focus to the body.
    pub fn move_focus_sequential(&mut self, forward: bool) -> Option<NodeId> {
        let order = self.tabbable_within(self.body_element);
        let position = self.active_element
            .and_then(|active| order.iter().position(|&n| n == active));

        let next = match (position, forward) {
            (None, true) => order.first().copied(),
            (None, false) => order.last().copied(),
            (Some(p), true) => order.get(p + 1).copied(),
            (Some(p), false) => p.checked_sub(1).and_then(|i| order.get(i).copied()),
        };
        self.active_element = next;
        next
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Assign a layout box (document coordinates) to `id`
    pub fn set_layout(&mut self, id: NodeId, rect: DOMRect) {
        self.layout.insert(id, rect);
    }

    /// Layout box of `id` (document coordinates)
    pub fn layout(&self, id: NodeId) -> Option<DOMRect> {
        self.layout.get(&id).copied()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
