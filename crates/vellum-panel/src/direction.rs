//! Slide direction heuristic

use vellum_dom::{NodeId, Page};

use crate::{Direction, PanelConfig};

/// Direction a panel opened from `trigger` slides in from.
///
/// An explicit preference on the trigger wins. Otherwise small viewports
/// always slide from the right, and wider ones slide from the side of the
/// viewport the trigger's horizontal center lies on. Triggers without
/// layout fall back to `config.fallback_direction`.
pub fn direction_for_trigger(page: &Page, trigger: NodeId, config: &PanelConfig) -> Direction {
    let preferred = page.document
        .attr(trigger, &config.attributes.trigger_direction)
        .and_then(|value| value.parse().ok());
    if let Some(direction) = preferred {
        return direction;
    }

    let viewport = page.window.inner_width();
    if viewport < config.small_viewport_width {
        return Direction::Right;
    }

    match page.bounding_client_rect(trigger) {
        Some(rect) if rect.center_x() < viewport / 2.0 => Direction::Left,
        Some(_) => Direction::Right,
        None => config.fallback_direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_dom::DOMRect;

    fn page_with_trigger(x: f64, attrs: &[(&str, &str)]) -> (Page, NodeId) {
        let mut page = Page::new("https://example.com/").unwrap();
        let body = page.document.body();
        let trigger = page.document.append_element(body, "a", attrs).unwrap();
        page.document.set_layout(trigger, DOMRect::from_xywh(x, 300.0, 200.0, 100.0));
        (page, trigger)
    }

    #[test]
    fn test_left_half_slides_from_left() {
        let config = PanelConfig::default();
        let (page, trigger) = page_with_trigger(100.0, &[]);
        assert_eq!(direction_for_trigger(&page, trigger, &config), Direction::Left);

        let (page, trigger) = page_with_trigger(900.0, &[]);
        assert_eq!(direction_for_trigger(&page, trigger, &config), Direction::Right);
    }

    #[test]
    fn test_small_viewport_always_right() {
        let config = PanelConfig::default();
        let (mut page, trigger) = page_with_trigger(10.0, &[]);
        page.window.resize(600.0, 900.0);
        assert_eq!(direction_for_trigger(&page, trigger, &config), Direction::Right);
    }

    #[test]
    fn test_preference_and_fallback() {
        let mut config = PanelConfig::default();
        let (page, trigger) = page_with_trigger(900.0, &[("data-panel-direction", "left")]);
        assert_eq!(direction_for_trigger(&page, trigger, &config), Direction::Left);

        config.fallback_direction = Direction::Left;
        let mut page = Page::new("https://example.com/").unwrap();
        let body = page.document.body();
        let unlaid = page.document.append_element(body, "a", &[]).unwrap();
        assert_eq!(direction_for_trigger(&page, unlaid, &config), Direction::Left);
    }
}
