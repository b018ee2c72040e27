//! Integration tests - panel engine driven through page events
//!
//! Events go through `PanelEngine::dispatch` first and then through the
//! page's default action, the way a browser runs script listeners before
//! default behaviour.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vellum_dom::{DOMRect, Key, NodeId, Page, UiEvent};
use vellum_panel::{
    Direction, LazyContent, PanelConfig, PanelEngine, PanelError, PanelObserver, PanelPhase,
    ScrollLock,
};

// ============================================================================
// FIXTURE
// ============================================================================

struct Fixture {
    page: Rc<RefCell<Page>>,
    engine: PanelEngine,
    lock: ScrollLock,
    now: Cell<f64>,
    map_trigger: NodeId,
    ink_trigger: NodeId,
    zone_link: NodeId,
    map: NodeId,
    map_content: NodeId,
    map_backdrop: NodeId,
    map_close: NodeId,
    contact_link: NodeId,
    map_input: NodeId,
    contact: NodeId,
}

/// Two panels (`map`, `ink`) under a root container, two triggers on
/// opposite halves of the viewport and a section to scroll to.
fn build_page(page: &mut Page) -> [NodeId; 10] {
    page.window.set_scrollbar_width(15.0);
    let doc = &mut page.document;
    let body = doc.body();

    let header = doc.append_element(body, "header", &[]).unwrap();
    let map_trigger = doc
        .append_element(header, "a", &[("href", "#zone-map"), ("data-panel-trigger", "map")])
        .unwrap();
    doc.set_layout(map_trigger, DOMRect::from_xywh(100.0, 20.0, 200.0, 40.0));
    let ink_trigger = doc.append_element(header, "button", &[("data-panel-trigger", "ink")]).unwrap();
    doc.set_layout(ink_trigger, DOMRect::from_xywh(900.0, 20.0, 200.0, 40.0));
    let zone_link = doc
        .append_element(header, "a", &[("href", "#zone-ink"), ("data-scroll", "")])
        .unwrap();
    doc.set_layout(zone_link, DOMRect::from_xywh(1000.0, 20.0, 100.0, 40.0));

    let main = doc.append_element(body, "main", &[("data-panel-root", "")]).unwrap();

    let map = doc.append_element(main, "section", &[("data-panel", "map")]).unwrap();
    let map_backdrop = doc.append_element(map, "div", &[("data-panel-backdrop", "")]).unwrap();
    let map_content = doc.append_element(map, "div", &[("data-panel-content", "")]).unwrap();
    let map_close = doc.append_element(map_content, "button", &[("data-panel-close", "")]).unwrap();
    let contact_link = doc
        .append_element(map_content, "a", &[("href", "#contact"), ("data-scroll", "")])
        .unwrap();
    let map_input = doc.append_element(map_content, "input", &[("type", "text")]).unwrap();
    doc.append_element(map_content, "button", &[("data-focus-skip", "")]).unwrap();

    let ink = doc.append_element(main, "section", &[("data-panel", "ink")]).unwrap();
    doc.append_element(ink, "div", &[("data-panel-backdrop", "")]).unwrap();
    let ink_content = doc.append_element(ink, "div", &[("data-panel-content", "")]).unwrap();
    doc.append_element(ink_content, "button", &[("data-panel-close", "")]).unwrap();

    let contact = doc.append_element(main, "section", &[("id", "contact")]).unwrap();
    doc.set_layout(contact, DOMRect::from_xywh(0.0, 2000.0, 1280.0, 600.0));

    [map_trigger, ink_trigger, zone_link, map, map_content, map_backdrop, map_close, contact_link, map_input, contact]
}

impl Fixture {
    fn new(url: &str) -> Self {
        Self::with_page(url, |_| {})
    }

    fn with_page(url: &str, prepare: impl FnOnce(&mut Page)) -> Self {
        let mut page = Page::new(url).unwrap();
        let [map_trigger, ink_trigger, zone_link, map, map_content, map_backdrop, map_close, contact_link, map_input, contact] =
            build_page(&mut page);
        prepare(&mut page);

        let page = Rc::new(RefCell::new(page));
        let lock = ScrollLock::new();
        let engine = PanelEngine::with_scroll_lock(page.clone(), PanelConfig::default(), lock.clone()).unwrap();
        engine.attach();

        Self {
            page,
            engine,
            lock,
            now: Cell::new(0.0),
            map_trigger,
            ink_trigger,
            zone_link,
            map,
            map_content,
            map_backdrop,
            map_close,
            contact_link,
            map_input,
            contact,
        }
    }

    /// Dispatch to the engine, then run the default action and dispatch
    /// whatever it fires.
    fn fire(&self, mut event: UiEvent) -> UiEvent {
        self.engine.dispatch(&mut event);
        let follow_up = self.page.borrow_mut().default_action(&event);
        if let Some(mut follow_up) = follow_up {
            self.engine.dispatch(&mut follow_up);
        }
        event
    }

    fn click(&self, target: NodeId) -> UiEvent {
        let event = self.page.borrow().click_event(target);
        self.fire(event)
    }

    fn key(&self, key: Key, shift: bool) -> UiEvent {
        let event = self.page.borrow().key_event(key, shift);
        self.fire(event)
    }

    fn back(&self) {
        let event = self.page.borrow_mut().back().unwrap();
        self.fire(event);
    }

    fn forward(&self) {
        let event = self.page.borrow_mut().forward().unwrap();
        self.fire(event);
    }

    fn frame(&self) {
        self.now.set(self.now.get() + 700.0);
        self.engine.frame(self.now.get());
    }

    /// Pump frames until nothing is running
    fn settle(&self) {
        for _ in 0..16 {
            if self.engine.is_settled() {
                return;
            }
            self.frame();
        }
        panic!("engine did not settle");
    }

    fn hash(&self) -> String {
        self.page.borrow().hash()
    }

    fn history_len(&self) -> usize {
        self.page.borrow().history.length()
    }

    fn focused(&self) -> Option<NodeId> {
        self.page.borrow().document.active_element()
    }

    fn body_style(&self, property: &str) -> String {
        let page = self.page.borrow();
        page.document.style(page.document.body(), property).to_string()
    }

    fn phase(&self, slug: &str) -> PanelPhase {
        self.engine.panel_state(slug).unwrap().phase
    }

    fn active_panels(&self) -> usize {
        ["map", "ink"]
            .iter()
            .filter(|slug| self.engine.panel_state(slug).unwrap().active)
            .count()
    }
}

// ============================================================================
// OPEN / CLOSE LIFECYCLE
// ============================================================================

#[test]
fn test_trigger_click_opens_panel() {
    let f = Fixture::new("https://example.com/");
    let event = f.click(f.map_trigger);
    assert!(event.is_default_prevented());

    assert_eq!(f.engine.active_slug().as_deref(), Some("map"));
    assert_eq!(f.phase("map"), PanelPhase::Opening);
    assert!(f.engine.is_transitioning());

    let state = f.engine.panel_state("map").unwrap();
    assert!(state.active);
    assert!(!state.aria_hidden);
    assert_eq!(state.slide_direction, Some(Direction::Left));
    assert_eq!(f.page.borrow().document.attr(f.map, "data-slide-from"), Some("left"));
    assert!(f.engine.panel_state("ink").unwrap().aria_hidden);

    // Scroll locked with scrollbar compensation, focus moved inside
    assert_eq!(f.lock.refcount(), 1);
    assert_eq!(f.body_style("overflow"), "hidden");
    assert_eq!(f.body_style("padding-right"), "15px");
    assert_eq!(f.focused(), Some(f.map_close));

    // History is written once the panel has settled
    assert_eq!(f.hash(), "");
    f.settle();
    assert_eq!(f.phase("map"), PanelPhase::Open);
    assert_eq!(f.hash(), "#zone-map");
    assert_eq!(f.history_len(), 2);
    assert_eq!(f.page.borrow().window.scroll_y(), 0.0);
}

#[test]
fn test_enter_transition_slides_from_trigger_side() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);

    let content_style = |property: &str| {
        let page = f.page.borrow();
        page.document.style(f.map_content, property).to_string()
    };
    assert_eq!(content_style("transform"), "translateX(-100%)");
    assert_eq!(content_style("opacity"), "0.85");

    f.settle();
    assert_eq!(content_style("transform"), "translateX(0%)");
    assert_eq!(content_style("opacity"), "1");
    assert_eq!(f.page.borrow().document.style(f.map_backdrop, "opacity"), "1");
}

#[test]
fn test_escape_closes_and_releases_after_transition() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();

    f.key(Key::Escape, false);
    assert_eq!(f.phase("map"), PanelPhase::Closing);

    // Nothing is released until the exit transition completes
    f.frame();
    assert!(f.lock.is_locked());
    assert_eq!(f.hash(), "#zone-map");

    f.settle();
    assert_eq!(f.phase("map"), PanelPhase::Closed);
    assert_eq!(f.engine.active_slug(), None);
    assert!(!f.lock.is_locked());
    assert_eq!(f.body_style("overflow"), "");
    assert_eq!(f.body_style("padding-right"), "");
    assert_eq!(f.focused(), Some(f.map_trigger));
    assert_eq!(f.hash(), "#home");
    assert_eq!(f.history_len(), 3);

    let state = f.engine.panel_state("map").unwrap();
    assert!(!state.active);
    assert!(!state.aria_hidden);
    assert!(!f.engine.panel_state("ink").unwrap().aria_hidden);
}

#[test]
fn test_close_button_and_backdrop() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();

    // Clicks inside the content are not backdrop clicks
    let event = f.click(f.map_input);
    assert!(!event.is_default_prevented());
    assert_eq!(f.phase("map"), PanelPhase::Open);

    f.click(f.map_backdrop);
    assert_eq!(f.phase("map"), PanelPhase::Closing);
    f.settle();
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.focused(), Some(f.map_trigger));

    f.click(f.map_trigger);
    f.settle();
    assert_eq!(f.focused(), Some(f.map_close));
    let event = f.click(f.map_close);
    assert!(event.is_default_prevented());
    f.settle();
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.focused(), Some(f.map_trigger));
    assert_eq!(f.lock.refcount(), 0);
}

#[test]
fn test_keyboard_activation_of_trigger() {
    let f = Fixture::new("https://example.com/");
    f.page.borrow_mut().document.focus(f.ink_trigger);

    let event = f.key(Key::Enter, false);
    assert!(event.is_default_prevented());
    assert_eq!(f.engine.active_slug().as_deref(), Some("ink"));
    assert_eq!(f.engine.panel_state("ink").unwrap().slide_direction, Some(Direction::Right));
    f.settle();

    f.key(Key::Escape, false);
    f.settle();
    assert_eq!(f.focused(), Some(f.ink_trigger));
}

// ============================================================================
// EXCLUSIVITY AND IDEMPOTENCE
// ============================================================================

#[test]
fn test_switching_panels_closes_previous_first() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();

    f.click(f.ink_trigger);
    assert_eq!(f.phase("map"), PanelPhase::Closing);
    assert_eq!(f.phase("ink"), PanelPhase::Closed);

    for _ in 0..16 {
        assert!(f.active_panels() <= 1);
        assert!(f.lock.refcount() <= 1);
        if f.engine.is_settled() {
            break;
        }
        f.frame();
    }

    assert_eq!(f.engine.active_slug().as_deref(), Some("ink"));
    assert_eq!(f.phase("map"), PanelPhase::Closed);
    assert_eq!(f.phase("ink"), PanelPhase::Open);
    assert_eq!(f.lock.refcount(), 1);
    assert_eq!(f.engine.trigger_element(), Some(f.ink_trigger));

    // No neutral entry between the two panels
    assert_eq!(f.hash(), "#zone-ink");
    assert_eq!(f.history_len(), 3);
    f.back();
    assert_eq!(f.hash(), "#zone-map");
}

#[test]
fn test_repeated_open_and_close_are_noops() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.click(f.map_trigger);
    f.engine.open("map", Direction::Right);
    assert_eq!(f.lock.refcount(), 1);
    f.settle();
    assert_eq!(f.history_len(), 2);
    assert_eq!(f.engine.panel_state("map").unwrap().slide_direction, Some(Direction::Left));

    f.engine.close();
    f.engine.close();
    f.key(Key::Escape, false);
    f.settle();
    assert_eq!(f.lock.refcount(), 0);
    assert_eq!(f.history_len(), 3);

    f.engine.close();
    f.settle();
    assert_eq!(f.lock.refcount(), 0);
    assert_eq!(f.history_len(), 3);
}

#[test]
fn test_close_requested_while_opening() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.frame();
    f.key(Key::Escape, false);
    assert_eq!(f.phase("map"), PanelPhase::Opening);

    f.settle();
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.lock.refcount(), 0);
    assert_eq!(f.focused(), Some(f.map_trigger));
    assert_eq!(f.hash(), "#home");
}

#[test]
fn test_unknown_slug_is_noop() {
    let f = Fixture::new("https://example.com/");
    f.engine.open("nope", Direction::Left);
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.lock.refcount(), 0);
    assert!(f.engine.panel_state("nope").is_none());

    let f = Fixture::new("https://example.com/#zone-nope");
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.history_len(), 1);
}

// ============================================================================
// FOCUS TRAP
// ============================================================================

#[test]
fn test_tab_wraps_within_panel() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();
    assert_eq!(f.focused(), Some(f.map_close));

    assert!(f.key(Key::Tab, false).is_default_prevented());
    assert_eq!(f.focused(), Some(f.contact_link));
    f.key(Key::Tab, false);
    assert_eq!(f.focused(), Some(f.map_input));

    // The skip-marked button is never reached
    f.key(Key::Tab, false);
    assert_eq!(f.focused(), Some(f.map_close));

    f.key(Key::Tab, true);
    assert_eq!(f.focused(), Some(f.map_input));
}

#[test]
fn test_tab_untouched_while_closed() {
    let f = Fixture::new("https://example.com/");
    let event = f.key(Key::Tab, false);
    assert!(!event.is_default_prevented());
    assert_eq!(f.focused(), Some(f.map_trigger));
}

#[test]
fn test_detached_trigger_skips_focus_restore() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();

    f.page.borrow_mut().document.remove(f.map_trigger);
    f.key(Key::Escape, false);
    f.settle();

    assert_eq!(f.engine.active_slug(), None);
    assert_ne!(f.focused(), Some(f.map_trigger));
    assert!(!f.lock.is_locked());
}

// ============================================================================
// HISTORY
// ============================================================================

#[test]
fn test_back_and_forward_drive_panels() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();
    f.key(Key::Escape, false);
    f.settle();
    assert_eq!(f.history_len(), 3);

    f.back();
    assert_eq!(f.hash(), "#zone-map");
    f.settle();
    assert_eq!(f.engine.active_slug().as_deref(), Some("map"));

    f.back();
    assert_eq!(f.hash(), "");
    f.settle();
    assert_eq!(f.engine.active_slug(), None);
    assert!(!f.lock.is_locked());

    f.forward();
    f.settle();
    assert_eq!(f.engine.active_slug().as_deref(), Some("map"));

    // History-driven transitions never add entries
    assert_eq!(f.history_len(), 3);
    assert_eq!(f.hash(), "#zone-map");
}

#[test]
fn test_initial_zone_fragment_opens_panel() {
    let f = Fixture::new("https://example.com/#zone-map");
    assert_eq!(f.engine.active_slug().as_deref(), Some("map"));
    assert_eq!(f.engine.panel_state("map").unwrap().slide_direction, Some(Direction::Left));
    f.settle();
    assert_eq!(f.phase("map"), PanelPhase::Open);
    assert_eq!(f.history_len(), 1);

    // Attaching again does not reopen or duplicate anything
    f.engine.attach();
    assert_eq!(f.lock.refcount(), 1);
}

#[test]
fn test_initial_neutral_or_foreign_fragment_opens_nothing() {
    for url in ["https://example.com/", "https://example.com/#home", "https://example.com/#contact"] {
        let f = Fixture::new(url);
        assert_eq!(f.engine.active_slug(), None, "{}", url);
        assert!(!f.lock.is_locked());
    }
}

#[test]
fn test_hashchange_to_zone_opens_panel() {
    let f = Fixture::new("https://example.com/");
    let event = f.page.borrow_mut().navigate_fragment("#zone-ink").unwrap();
    f.fire(event);
    f.settle();
    assert_eq!(f.engine.active_slug().as_deref(), Some("ink"));
    assert_eq!(f.history_len(), 2);
}

/// An extra panel and trigger for `slug` under the fixture's root
fn add_panel(page: &mut Page, slug: &str) {
    let doc = &mut page.document;
    let body = doc.body();
    doc.append_element(body, "button", &[("data-panel-trigger", slug)]).unwrap();

    let main = doc.query_attr("data-panel-root")[0];
    let panel = doc.append_element(main, "section", &[("data-panel", slug)]).unwrap();
    doc.append_element(panel, "div", &[("data-panel-backdrop", "")]).unwrap();
    let content = doc.append_element(panel, "div", &[("data-panel-content", "")]).unwrap();
    doc.append_element(content, "button", &[("data-panel-close", "")]).unwrap();
}

#[test]
fn test_encoded_slug_survives_back_and_forward() {
    for (slug, fragment) in [("digital ink", "#zone-digital%20ink"), ("café", "#zone-caf%C3%A9")] {
        let f = Fixture::with_page("https://example.com/", |page| add_panel(page, slug));
        let trigger = f.page.borrow().document.find_by_attr("data-panel-trigger", slug).unwrap();

        f.click(trigger);
        f.settle();
        assert_eq!(f.hash(), fragment);
        assert_eq!(f.history_len(), 2);

        f.key(Key::Escape, false);
        f.settle();
        assert_eq!(f.hash(), "#home");
        assert_eq!(f.focused(), Some(trigger));

        f.back();
        f.settle();
        assert_eq!(f.engine.active_slug().as_deref(), Some(slug));
        assert_eq!(f.hash(), fragment);
        assert_eq!(f.history_len(), 3);

        f.back();
        f.settle();
        assert_eq!(f.engine.active_slug(), None);

        f.forward();
        f.settle();
        assert_eq!(f.engine.active_slug().as_deref(), Some(slug));
        assert_eq!(f.history_len(), 3);
    }
}

#[test]
fn test_deep_link_to_encoded_slug() {
    for (slug, url) in [
        ("café", "https://example.com/#zone-caf%C3%A9"),
        ("digital ink", "https://example.com/#zone-digital ink"),
    ] {
        let f = Fixture::with_page(url, |page| add_panel(page, slug));
        f.settle();
        assert_eq!(f.engine.active_slug().as_deref(), Some(slug));
        assert_eq!(f.history_len(), 1);
    }
}

// ============================================================================
// NAVIGATION LINKS
// ============================================================================

#[test]
fn test_nav_link_closes_panel_and_scrolls() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.settle();

    let event = f.click(f.contact_link);
    assert!(event.is_default_prevented());
    assert_eq!(f.page.borrow().window.scroll_y(), 2000.0);
    assert_eq!(f.hash(), "#contact");

    f.settle();
    assert_eq!(f.engine.active_slug(), None);
    assert!(!f.lock.is_locked());
    assert_eq!(f.hash(), "#contact");
    assert_eq!(f.history_len(), 3);
    assert_eq!(f.page.borrow().document.layout(f.contact).map(|r| r.top()), Some(2000.0));
}

#[test]
fn test_zone_nav_link_opens_panel() {
    let f = Fixture::new("https://example.com/");
    let event = f.click(f.zone_link);
    assert!(event.is_default_prevented());
    f.settle();

    assert_eq!(f.engine.active_slug().as_deref(), Some("ink"));
    assert_eq!(f.engine.panel_state("ink").unwrap().slide_direction, Some(Direction::Right));
    assert_eq!(f.hash(), "#zone-ink");
    assert_eq!(f.page.borrow().window.scroll_y(), 0.0);
}

// ============================================================================
// REDUCED MOTION
// ============================================================================

#[test]
fn test_reduced_motion_settles_synchronously() {
    let f = Fixture::with_page("https://example.com/", |page| page.window.set_reduced_motion(true));

    f.click(f.map_trigger);
    assert!(f.engine.is_settled());
    assert_eq!(f.phase("map"), PanelPhase::Open);
    assert_eq!(f.hash(), "#zone-map");
    assert_eq!(f.page.borrow().document.style(f.map_content, "transform"), "translateX(0%)");

    f.click(f.ink_trigger);
    assert_eq!(f.phase("map"), PanelPhase::Closed);
    assert_eq!(f.phase("ink"), PanelPhase::Open);
    assert_eq!(f.lock.refcount(), 1);

    f.key(Key::Escape, false);
    assert_eq!(f.engine.active_slug(), None);
    assert!(!f.lock.is_locked());
    assert_eq!(f.focused(), Some(f.ink_trigger));
    assert_eq!(f.hash(), "#home");
    assert_eq!(f.page.borrow().document.style(f.map_content, "opacity"), "0");
}

/// Page state seen by observers each time a transition settles
struct Trace {
    lock: ScrollLock,
    log: Rc<RefCell<Vec<String>>>,
}

impl Trace {
    fn record(&self, event: &str, slug: &str, page: &Page) {
        let hidden: Vec<&str> = page
            .document
            .query_attr("data-panel")
            .into_iter()
            .map(|panel| page.document.attr(panel, "aria-hidden").unwrap_or("-"))
            .collect();
        self.log.borrow_mut().push(format!(
            "{} {} lock={} hidden={:?} focus={:?} hash={} entries={}",
            event,
            slug,
            self.lock.refcount(),
            hidden,
            page.document.active_element(),
            page.hash(),
            page.history.length(),
        ));
    }
}

impl PanelObserver for Trace {
    fn panel_opened(&mut self, slug: &str, page: &mut Page) {
        self.record("opened", slug, page);
    }

    fn panel_closed(&mut self, slug: &str, page: &mut Page) {
        self.record("closed", slug, page);
    }
}

fn settled_trace(reduced_motion: bool) -> Vec<String> {
    let f = Fixture::with_page("https://example.com/", |page| page.window.set_reduced_motion(reduced_motion));
    let log = Rc::new(RefCell::new(Vec::new()));
    f.engine.add_observer(Trace { lock: f.lock.clone(), log: log.clone() });

    f.click(f.map_trigger);
    f.settle();
    f.click(f.ink_trigger);
    f.settle();
    f.key(Key::Escape, false);
    f.settle();
    f.back();
    f.settle();
    log.take()
}

#[test]
fn test_reduced_motion_keeps_side_effect_order() {
    let animated = settled_trace(false);
    let reduced = settled_trace(true);
    assert_eq!(animated.len(), 5);
    assert_eq!(reduced, animated);

    for entry in &animated {
        if entry.starts_with("opened") {
            assert!(entry.contains("lock=1"), "{}", entry);
        } else {
            assert!(entry.contains("lock=0"), "{}", entry);
        }
    }
    assert!(animated[0].ends_with("hash=#zone-map entries=2"));
    assert!(animated[3].ends_with("hash=#home entries=4"));
}

// ============================================================================
// SHARED SCROLL LOCK
// ============================================================================

#[test]
fn test_scroll_lock_shared_between_engines() {
    let f = Fixture::with_page("https://example.com/", |page| {
        let body = page.document.body();
        page.document.set_style(body, "overflow", "scroll");
        page.document.set_style(body, "padding-right", "4px");

        let drawer = page.document.append_element(body, "aside", &[("data-drawer", "menu")]).unwrap();
        page.document.append_element(drawer, "div", &[("data-drawer-backdrop", "")]).unwrap();
        page.document.append_element(drawer, "nav", &[("data-drawer-content", "")]).unwrap();
    });

    let mut config = PanelConfig::default();
    config.attributes.trigger = "data-drawer-trigger".into();
    config.attributes.panel = "data-drawer".into();
    config.attributes.content = "data-drawer-content".into();
    config.attributes.backdrop = "data-drawer-backdrop".into();
    config.attributes.close = "data-drawer-close".into();
    config.neutral_fragment = "#top".into();
    config.zone_prefix = "drawer-".into();
    let drawers = PanelEngine::with_scroll_lock(f.page.clone(), config, f.lock.clone()).unwrap();
    assert!(drawers.scroll_lock().ptr_eq(f.engine.scroll_lock()));

    f.engine.open("map", Direction::Left);
    drawers.open("menu", Direction::Right);
    assert_eq!(f.lock.refcount(), 2);

    f.settle();
    f.engine.close();
    f.settle();
    assert_eq!(f.lock.refcount(), 1);
    assert_eq!(f.body_style("overflow"), "hidden");

    // The drawer finishes opening before its queued close runs
    drawers.close();
    for now in [10_000.0, 20_000.0, 30_000.0, 40_000.0] {
        drawers.frame(now);
    }
    assert!(drawers.is_settled());
    assert_eq!(f.lock.refcount(), 0);
    assert_eq!(f.body_style("overflow"), "scroll");
    assert_eq!(f.body_style("padding-right"), "4px");
}

// ============================================================================
// OBSERVERS
// ============================================================================

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl PanelObserver for Recorder {
    fn panel_opened(&mut self, slug: &str, _page: &mut Page) {
        self.0.borrow_mut().push(format!("opened {}", slug));
    }

    fn panel_closed(&mut self, slug: &str, _page: &mut Page) {
        self.0.borrow_mut().push(format!("closed {}", slug));
    }
}

#[test]
fn test_observers_hear_settled_transitions() {
    let f = Fixture::new("https://example.com/");
    let recorder = Recorder::default();
    f.engine.add_observer(recorder.clone());

    let loads = Rc::new(Cell::new(0));
    let content = f.map_content;
    let counter = loads.clone();
    f.engine.add_observer(LazyContent::new("map", move |_: &str, page: &mut Page| -> anyhow::Result<()> {
        counter.set(counter.get() + 1);
        page.document.append_element(content, "p", &[("data-story", "")])?;
        Ok(())
    }));

    f.click(f.map_trigger);
    assert!(recorder.0.borrow().is_empty());
    f.settle();
    f.click(f.ink_trigger);
    f.settle();
    f.key(Key::Escape, false);
    f.settle();
    f.click(f.map_trigger);
    f.settle();

    assert_eq!(
        *recorder.0.borrow(),
        ["opened map", "closed map", "opened ink", "closed ink", "opened map"]
    );
    assert_eq!(loads.get(), 1);
    let stories = f.page.borrow().document.query_attr_in(f.map_content, "data-story").len();
    assert_eq!(stories, 1);
}

// ============================================================================
// CONSTRUCTION AND TEARDOWN
// ============================================================================

#[test]
fn test_missing_region_fails_construction() {
    let mut page = Page::new("https://example.com/").unwrap();
    let body = page.document.body();
    let panel = page.document.append_element(body, "section", &[("data-panel", "map")]).unwrap();
    page.document.append_element(panel, "div", &[("data-panel-content", "")]).unwrap();

    let result = PanelEngine::new(Rc::new(RefCell::new(page)), PanelConfig::default());
    assert!(matches!(result, Err(PanelError::MissingRegion { .. })));
}

#[test]
fn test_invalid_config_fails_construction() {
    let page = Rc::new(RefCell::new(Page::new("https://example.com/").unwrap()));
    let mut config = PanelConfig::default();
    config.zone_prefix = String::new();
    assert!(matches!(PanelEngine::new(page, config), Err(PanelError::InvalidConfig(_))));
}

#[test]
fn test_destroy_mid_transition() {
    let f = Fixture::new("https://example.com/");
    f.click(f.map_trigger);
    f.frame();
    assert!(f.lock.is_locked());

    f.engine.destroy();
    assert_eq!(f.engine.active_slug(), None);
    assert!(!f.lock.is_locked());
    assert_eq!(f.body_style("overflow"), "");
    assert!(!f.engine.panel_state("map").unwrap().active);
    assert_eq!(f.hash(), "");

    // Listeners are gone
    let event = f.click(f.map_trigger);
    assert!(!event.is_default_prevented());
    f.frame();
    f.frame();
    assert_eq!(f.engine.active_slug(), None);
    assert_eq!(f.lock.refcount(), 0);

    f.engine.destroy();
    assert_eq!(f.lock.refcount(), 0);
}
