//! Engine configuration
//!
//! The DOM attribute contract, fragment namespace, direction heuristic
//! and transition timing. Every field has a default, so a JSON document
//! only needs the keys it overrides.

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::{Direction, PanelError};

/// Attribute names and marker classes the engine reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeContract {
    /// On triggers: slug of the panel to open
    pub trigger: String,
    /// On triggers: optional preferred slide direction
    pub trigger_direction: String,
    /// On panel containers: the panel's own slug
    pub panel: String,
    /// Content region inside a panel
    pub content: String,
    /// Backdrop region inside a panel
    pub backdrop: String,
    /// Close-button region(s) inside a panel
    pub close: String,
    /// Root container receiving `root_active_class`
    pub root: String,
    /// Excludes an element from the focus trap
    pub focus_skip: String,
    /// In-page navigation links
    pub nav_link: String,
    /// Direction marker written on the opened panel
    pub slide_from: String,
    /// Class on the opened panel
    pub active_class: String,
    /// Class on the root container while any panel is open
    pub root_active_class: String,
}

impl Default for AttributeContract {
    fn default() -> Self {
        Self {
            trigger: "data-panel-trigger".into(),
            trigger_direction: "data-panel-direction".into(),
            panel: "data-panel".into(),
            content: "data-panel-content".into(),
            backdrop: "data-panel-backdrop".into(),
            close: "data-panel-close".into(),
            root: "data-panel-root".into(),
            focus_skip: "data-focus-skip".into(),
            nav_link: "data-scroll".into(),
            slide_from: "data-slide-from".into(),
            active_class: "is-active".into(),
            root_active_class: "has-active-panel".into(),
        }
    }
}

/// Transition durations and curves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub content_ms: f64,
    pub backdrop_enter_ms: f64,
    pub backdrop_exit_ms: f64,
    /// Content opacity at the offscreen end of the slide
    pub content_offscreen_opacity: f64,
    pub enter_easing: Easing,
    pub exit_easing: Easing,
    pub backdrop_enter_easing: Easing,
    pub backdrop_exit_easing: Easing,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            content_ms: 600.0,
            backdrop_enter_ms: 500.0,
            backdrop_exit_ms: 400.0,
            content_offscreen_opacity: 0.85,
            enter_easing: Easing::Power2Out,
            exit_easing: Easing::Power2In,
            backdrop_enter_easing: Easing::Power1Out,
            backdrop_exit_easing: Easing::Power1In,
        }
    }
}

/// Panel engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub attributes: AttributeContract,
    /// Fragment prefix for open panels, without `#`
    pub zone_prefix: String,
    /// Fragment meaning "no panel open", with `#`
    pub neutral_fragment: String,
    /// Below this viewport width panels always slide from the right
    pub small_viewport_width: f64,
    /// Direction used when no trigger can be identified (deep links)
    pub fallback_direction: Direction,
    pub timing: TimingConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            attributes: AttributeContract::default(),
            zone_prefix: "zone-".into(),
            neutral_fragment: "#home".into(),
            small_viewport_width: 768.0,
            fallback_direction: Direction::Right,
            timing: TimingConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, PanelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot honour
    pub fn validate(&self) -> Result<(), PanelError> {
        let a = &self.attributes;
        let names = [
            ("trigger", &a.trigger),
            ("trigger_direction", &a.trigger_direction),
            ("panel", &a.panel),
            ("content", &a.content),
            ("backdrop", &a.backdrop),
            ("close", &a.close),
            ("root", &a.root),
            ("focus_skip", &a.focus_skip),
            ("nav_link", &a.nav_link),
            ("slide_from", &a.slide_from),
            ("active_class", &a.active_class),
            ("root_active_class", &a.root_active_class),
        ];
        if let Some((field, _)) = names.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(PanelError::InvalidConfig(format!("attributes.{} is empty", field)));
        }

        if self.zone_prefix.is_empty() || self.zone_prefix.starts_with('#') {
            return Err(PanelError::InvalidConfig(
                "zone_prefix must be non-empty and must not start with '#'".into(),
            ));
        }
        if !self.neutral_fragment.starts_with('#') || self.neutral_fragment.len() < 2 {
            return Err(PanelError::InvalidConfig(
                "neutral_fragment must look like \"#section\"".into(),
            ));
        }
        if self.neutral_fragment[1..].starts_with(&self.zone_prefix) {
            return Err(PanelError::InvalidConfig(format!(
                "neutral_fragment {} collides with the zone namespace",
                self.neutral_fragment
            )));
        }

        let t = &self.timing;
        if [t.content_ms, t.backdrop_enter_ms, t.backdrop_exit_ms].iter().any(|&ms| !(ms > 0.0)) {
            return Err(PanelError::InvalidConfig("durations must be positive".into()));
        }
        if !(0.0..=1.0).contains(&t.content_offscreen_opacity) {
            return Err(PanelError::InvalidConfig(
                "content_offscreen_opacity must be within 0..=1".into(),
            ));
        }
        Ok(())
    }
}
