//! History Sync
//!
//! Maps the open panel onto the reserved `#<zone_prefix><slug>` fragment
//! namespace and back. Fragments are written with `pushState`, which
//! changes the URL without the native scroll-to-anchor jump.
//!
//! Slugs are opaque text. `location.hash` holds them percent-encoded, so
//! fragments are encoded on the way out and decoded on the way in.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use vellum_dom::{DomError, Page};

use crate::PanelConfig;

/// Characters the URL parser escapes inside a fragment
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// What a URL fragment means to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A panel should be open
    Zone(String),
    /// The neutral fragment, or no fragment at all
    Neutral,
    /// Some other in-page fragment
    Other(String),
}

/// Fragment binding for one engine
#[derive(Debug, Clone)]
pub struct HistorySync {
    /// `#` + zone prefix
    zone: String,
    neutral: String,
}

impl HistorySync {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            zone: format!("#{}", config.zone_prefix),
            neutral: config.neutral_fragment.clone(),
        }
    }

    /// Fragment for an open panel, in the form `location.hash` reports it
    pub fn fragment_for(&self, slug: &str) -> String {
        format!("{}{}", self.zone, utf8_percent_encode(slug, FRAGMENT))
    }

    /// Fragment for "no panel open"
    pub fn neutral(&self) -> &str {
        &self.neutral
    }

    /// Classify a `location.hash` value
    pub fn route(&self, fragment: &str) -> Route {
        if fragment.is_empty() || fragment == "#" || fragment == self.neutral {
            return Route::Neutral;
        }
        match fragment.strip_prefix(self.zone.as_str()) {
            Some(slug) if !slug.is_empty() => match percent_decode_str(slug).decode_utf8() {
                Ok(slug) => Route::Zone(slug.into_owned()),
                Err(_) => {
                    tracing::debug!("history: {} is not a UTF-8 slug", fragment);
                    Route::Other(fragment.to_string())
                }
            },
            _ => Route::Other(fragment.to_string()),
        }
    }

    /// Push `fragment` unless it is already current. Returns whether an
    /// entry was pushed.
    pub fn write(&self, page: &mut Page, fragment: &str) -> Result<bool, DomError> {
        // Already-encoded input passes through unchanged: `%` is not in the set
        let fragment = utf8_percent_encode(fragment, FRAGMENT).to_string();
        if page.hash() == fragment {
            return Ok(false);
        }
        page.push_fragment(&fragment)?;
        tracing::debug!("history: pushed {}", fragment);
        Ok(true)
    }
}
