//! UI Events
//!
//! Keyboard, pointer and navigation events delivered to page scripts.

use crate::NodeId;

/// Keyboard key (`KeyboardEvent.key`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    Enter,
    Space,
    Character(char),
    Other(String),
}

impl Key {
    /// Map a DOM `key` string
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Other(other.to_string()),
                }
            }
        }
    }
}

/// `keydown` event
#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    pub key: Key,
    pub shift: bool,
    /// Focused element at dispatch time (`None` = body)
    pub target: Option<NodeId>,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key: Key, shift: bool, target: Option<NodeId>) -> Self {
        Self { key, shift, target, default_prevented: false }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// `click` event
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub target: NodeId,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn new(target: NodeId) -> Self {
        Self { target, default_prevented: false }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// `popstate` / `hashchange` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// `location.hash` after the navigation
    pub fragment: String,
}

/// Events a page forwards to its scripts
#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyDown(KeyboardEvent),
    Click(PointerEvent),
    PopState(NavigationEvent),
    HashChange(NavigationEvent),
}

impl UiEvent {
    /// Check if default was prevented (navigation events are not cancelable)
    pub fn is_default_prevented(&self) -> bool {
        match self {
            Self::KeyDown(e) => e.is_default_prevented(),
            Self::Click(e) => e.is_default_prevented(),
            Self::PopState(_) | Self::HashChange(_) => false,
        }
    }
}
