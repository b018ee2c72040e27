//! Page - document, window and session history of one browsing context
//!
//! Also carries the browser default actions that scripts can prevent:
//! sequential Tab navigation and same-document fragment links, which
//! scroll to their anchor. `push_state` never scrolls.

use crate::{
    DOMRect, Document, DomError, History, Key, KeyboardEvent, NavigationEvent, NodeId,
    PointerEvent, UiEvent, Window,
};

/// A loaded page
pub struct Page {
    pub document: Document,
    pub window: Window,
    pub history: History,
}

impl Page {
    /// Create an empty page at `url` with a default-sized window
    pub fn new(url: &str) -> Result<Self, DomError> {
        Ok(Self {
            document: Document::new(),
            window: Window::default(),
            history: History::new(url)?,
        })
    }

    /// `location.hash`
    pub fn hash(&self) -> String {
        self.history.location().hash()
    }

    /// `element.getBoundingClientRect()`
    pub fn bounding_client_rect(&self, id: NodeId) -> Option<DOMRect> {
        if !self.document.is_connected(id) {
            return None;
        }
        self.document
            .layout(id)
            .map(|rect| rect.translated(0.0, -self.window.scroll_y()))
    }

    /// `history.pushState(null, "", fragment)`. Never scrolls.
    pub fn push_fragment(&mut self, fragment: &str) -> Result<(), DomError> {
        self.history.push_state(None, fragment)
    }

    /// Same-document fragment navigation (a followed `href="#x"` link):
    /// scrolls to the matching anchor, pushes an entry and yields the
    /// resulting `hashchange`.
    pub fn navigate_fragment(&mut self, fragment: &str) -> Result<UiEvent, DomError> {
        let id = fragment.trim_start_matches('#');
        if let Some(anchor) = self.document.get_element_by_id(id) {
            self.scroll_into_view(anchor);
        }
        self.history.push_state(None, fragment)?;
        Ok(UiEvent::HashChange(NavigationEvent { fragment: self.hash() }))
    }

    /// Scroll so the top of `id`'s layout box meets the viewport top
    pub fn scroll_into_view(&mut self, id: NodeId) {
        if let Some(rect) = self.document.layout(id) {
            self.window.scroll_to(rect.top());
        }
    }

    /// `history.back()`, yielding the `popstate` it fires
    pub fn back(&mut self) -> Option<UiEvent> {
        self.history.back()?;
        Some(UiEvent::PopState(NavigationEvent { fragment: self.hash() }))
    }

    /// `history.forward()`, yielding the `popstate` it fires
    pub fn forward(&mut self) -> Option<UiEvent> {
        self.history.forward()?;
        Some(UiEvent::PopState(NavigationEvent { fragment: self.hash() }))
    }

    /// `keydown` targeted at the focused element
    pub fn key_event(&self, key: Key, shift: bool) -> UiEvent {
        UiEvent::KeyDown(KeyboardEvent::new(key, shift, self.document.active_element()))
    }

    /// `click` on `target`
    pub fn click_event(&self, target: NodeId) -> UiEvent {
        UiEvent::Click(PointerEvent::new(target))
    }

    /// Run the browser default action for an event scripts did not
    /// cancel. Returns any follow-up event the action fires.
    pub fn default_action(&mut self, event: &UiEvent) -> Option<UiEvent> {
        if event.is_default_prevented() {
            return None;
        }
        match event {
            UiEvent::KeyDown(k) if k.key == Key::Tab => {
                self.document.move_focus_sequential(!k.shift);
                None
            }
            UiEvent::Click(p) => {
                let tree = self.document.tree();
                let link = tree.inclusive_ancestors(p.target).find(|&n| {
                    tree.element(n)
                        .is_some_and(|e| e.tag == "a" && e.get_attr("href").is_some_and(|h| h.starts_with('#')))
                })?;
                let href = self.document.attr(link, "href")?.to_string();
                match self.navigate_fragment(&href) {
                    Ok(event) => Some(event),
                    Err(err) => {
                        tracing::warn!("fragment navigation to {} failed: {}", href, err);
                        None
                    }
                }
            }
            _ => None,
        }
    }
}
