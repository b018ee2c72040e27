//! Panel Engine - state owner and event router
//!
//! Hosts forward raw events (`dispatch`) and animation frames (`frame`);
//! the engine is the only thing that mutates panel state.
//!
//! Open and close are `async` pipelines run on a single-threaded
//! executor. A pipeline holds the gate for its whole duration, including
//! the wait on its transition, so an open never interleaves with another
//! panel's open or close. Resource release happens strictly after the
//! exit transition's completion signal.

use std::cell::RefCell;
use std::rc::Rc;

use smol::LocalExecutor;
use smol::lock::Mutex;
use vellum_dom::{Key, KeyboardEvent, NodeId, Page, PointerEvent, UiEvent};

use crate::animation::Animator;
use crate::state::{EngineState, Origin};
use crate::{
    Direction, FocusTrap, HistorySync, PanelConfig, PanelError, PanelObserver, PanelPhase,
    PanelRegistry, PanelState, Route, ScrollLock, direction_for_trigger,
};

/// Overlay panel engine for one attribute contract on one page
pub struct PanelEngine {
    inner: Rc<Inner>,
    executor: LocalExecutor<'static>,
}

struct Inner {
    page: Rc<RefCell<Page>>,
    config: PanelConfig,
    registry: PanelRegistry,
    history: HistorySync,
    scroll_lock: ScrollLock,
    animator: RefCell<Animator>,
    state: RefCell<EngineState>,
    /// Serialises open/close pipelines
    gate: Mutex<()>,
    observers: RefCell<Vec<Box<dyn PanelObserver>>>,
}

impl PanelEngine {
    /// Build an engine sharing the page-wide [`ScrollLock::global`] lock
    pub fn new(page: Rc<RefCell<Page>>, config: PanelConfig) -> Result<Self, PanelError> {
        Self::with_scroll_lock(page, config, ScrollLock::global())
    }

    /// Build an engine on an explicitly injected scroll lock
    pub fn with_scroll_lock(
        page: Rc<RefCell<Page>>,
        config: PanelConfig,
        scroll_lock: ScrollLock,
    ) -> Result<Self, PanelError> {
        config.validate()?;
        let registry = PanelRegistry::scan(&page.borrow().document, &config.attributes)?;
        let history = HistorySync::new(&config);

        {
            let mut page = page.borrow_mut();
            registry.mark_closed(&mut page.document, &config.attributes);
        }
        tracing::info!("panel engine {} ready with {} panel(s)", crate::VERSION, registry.len());

        Ok(Self {
            inner: Rc::new(Inner {
                page,
                config,
                registry,
                history,
                scroll_lock,
                animator: RefCell::new(Animator::new()),
                state: RefCell::new(EngineState::default()),
                gate: Mutex::new(()),
                observers: RefCell::new(Vec::new()),
            }),
            executor: LocalExecutor::new(),
        })
    }

    /// Register a collaborator for settled open/close notifications
    pub fn add_observer(&self, observer: impl PanelObserver + 'static) {
        self.inner.observers.borrow_mut().push(Box::new(observer));
    }

    /// Start listening. Resolves the initial URL: only an explicit zone
    /// fragment opens a panel. Calling again is a no-op.
    pub fn attach(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.attached || state.destroyed {
                return;
            }
            state.attached = true;
        }
        let fragment = self.inner.page.borrow().hash();
        tracing::debug!("attached; initial fragment {:?}", fragment);
        self.handle_navigation(&fragment, true);
        self.run_until_stalled();
    }

    /// Forward a raw page event. Cancels the default action where the
    /// engine takes over (trigger activation, trapped Tab, handled links).
    pub fn dispatch(&self, event: &mut UiEvent) {
        if !self.inner.state.borrow().attached {
            return;
        }
        match event {
            UiEvent::KeyDown(key) => self.handle_key(key),
            UiEvent::Click(click) => self.handle_click(click),
            UiEvent::PopState(nav) | UiEvent::HashChange(nav) => {
                let fragment = nav.fragment.clone();
                self.handle_navigation(&fragment, false);
            }
        }
        self.run_until_stalled();
    }

    /// Forward an animation frame timestamp (milliseconds)
    pub fn frame(&self, now_ms: f64) {
        {
            let mut page = self.inner.page.borrow_mut();
            self.inner.animator.borrow_mut().advance(&mut page.document, now_ms);
        }
        self.run_until_stalled();
    }

    /// Open `slug` sliding from `direction`. Unknown slugs and the already
    /// active slug are no-ops.
    pub fn open(&self, slug: &str, direction: Direction) {
        self.spawn_open(slug.to_string(), direction, None, Origin::User);
        self.run_until_stalled();
    }

    /// Open the panel `trigger` points at, as if it were activated
    pub fn open_from(&self, trigger: NodeId) {
        self.activate_trigger(trigger);
        self.run_until_stalled();
    }

    /// Close the active panel. Safe at any time, including mid-transition.
    pub fn close(&self) {
        self.spawn_close(Origin::User);
        self.run_until_stalled();
    }

    /// Tear down: cancel running transitions, release this engine's
    /// scroll-lock hold, reset panel markers and stop listening.
    pub fn destroy(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.attached = false;
        }

        // Cancelled pipelines stop at their completion; queued ones stop at the gate.
        self.inner.animator.borrow_mut().cancel_all();
        self.run_until_stalled();

        let mut page = self.inner.page.borrow_mut();
        let mut state = self.inner.state.borrow_mut();
        if std::mem::take(&mut state.holds_lock) {
            self.inner.scroll_lock.release(&mut page);
        }
        if let Some(trap) = state.trap.take() {
            trap.deactivate(&mut page.document);
        }
        self.inner.registry.mark_closed(&mut page.document, &self.inner.config.attributes);
        state.active_slug = None;
        for phase in state.phases.values_mut() {
            *phase = PanelPhase::Closed;
        }
        tracing::info!("panel engine destroyed");
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn active_slug(&self) -> Option<String> {
        self.inner.state.borrow().active_slug.clone()
    }

    /// Active panel is mid-transition
    pub fn is_transitioning(&self) -> bool {
        self.inner.state.borrow().active_phase().is_transitioning()
    }

    /// No transition is running or pending
    pub fn is_settled(&self) -> bool {
        self.inner.animator.borrow().is_idle() && !self.is_transitioning()
    }

    /// Observable state of `slug`
    pub fn panel_state(&self, slug: &str) -> Option<PanelState> {
        let panel = self.inner.registry.get(slug)?;
        let page = self.inner.page.borrow();
        let el = page.document.element(panel.container)?;
        let attrs = &self.inner.config.attributes;
        Some(PanelState {
            slug: slug.to_string(),
            phase: self.inner.state.borrow().phase(slug),
            active: el.has_class(&attrs.active_class),
            slide_direction: el.get_attr(&attrs.slide_from).and_then(|v| v.parse().ok()),
            aria_hidden: el.get_attr("aria-hidden") == Some("true"),
        })
    }

    /// Trigger recorded for the current open
    pub fn trigger_element(&self) -> Option<NodeId> {
        self.inner.state.borrow().trigger()
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.inner.registry
    }

    pub fn history(&self) -> &HistorySync {
        &self.inner.history
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.inner.scroll_lock
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    fn run_until_stalled(&self) {
        while self.executor.try_tick() {}
    }

    fn spawn_open(&self, slug: String, direction: Direction, trigger: Option<NodeId>, origin: Origin) {
        self.executor
            .spawn(self.inner.clone().open(slug, direction, trigger, origin))
            .detach();
    }

    fn spawn_close(&self, origin: Origin) {
        self.executor.spawn(self.inner.clone().close(origin)).detach();
    }

    fn trigger_at(&self, node: NodeId) -> Option<NodeId> {
        let page = self.inner.page.borrow();
        page.document.tree().closest_with_attr(node, &self.inner.config.attributes.trigger)
    }

    fn activate_trigger(&self, trigger: NodeId) {
        let (slug, direction) = {
            let page = self.inner.page.borrow();
            let Some(slug) = page.document.attr(trigger, &self.inner.config.attributes.trigger) else {
                return;
            };
            (slug.trim().to_string(), direction_for_trigger(&page, trigger, &self.inner.config))
        };
        self.spawn_open(slug, direction, Some(trigger), Origin::User);
    }

    fn handle_key(&self, key: &mut KeyboardEvent) {
        let active = self.inner.state.borrow().active_slug.is_some();
        match key.key {
            Key::Escape if active => self.spawn_close(Origin::User),
            Key::Tab if active => {
                let state = self.inner.state.borrow();
                if let Some(trap) = state.trap.as_ref() {
                    let mut page = self.inner.page.borrow_mut();
                    if trap.handle_tab(&mut page.document, key.shift) {
                        key.prevent_default();
                    }
                }
            }
            Key::Enter | Key::Space => {
                if let Some(trigger) = key.target.and_then(|t| self.trigger_at(t)) {
                    key.prevent_default();
                    self.activate_trigger(trigger);
                }
            }
            _ => {}
        }
    }

    fn handle_click(&self, click: &mut PointerEvent) {
        let target = click.target;
        if let Some(trigger) = self.trigger_at(target) {
            click.prevent_default();
            self.activate_trigger(trigger);
            return;
        }

        let (on_close, on_backdrop, nav_link) = {
            let page = self.inner.page.borrow();
            let tree = page.document.tree();
            let state = self.inner.state.borrow();
            let active = state.active_slug.as_deref().and_then(|s| self.inner.registry.get(s));

            let on_close = active
                .is_some_and(|p| p.close_buttons.iter().any(|&b| tree.contains(b, target)));
            let on_backdrop = active
                .is_some_and(|p| tree.contains(p.backdrop, target) && !tree.contains(p.content, target));
            let nav_link = tree
                .closest_with_attr(target, &self.inner.config.attributes.nav_link)
                .and_then(|link| {
                    let href = page.document.attr(link, "href")?;
                    href.starts_with('#').then(|| (link, href.to_string()))
                });
            (on_close, on_backdrop, nav_link)
        };

        if on_close || on_backdrop {
            click.prevent_default();
            self.spawn_close(Origin::User);
        } else if let Some((link, href)) = nav_link {
            self.handle_nav_link(click, link, &href);
        }
    }

    /// In-page navigation link: zone links open their panel, anything else
    /// closes the open panel and scrolls to the link target.
    fn handle_nav_link(&self, click: &mut PointerEvent, link: NodeId, href: &str) {
        match self.inner.history.route(href) {
            Route::Zone(slug) => {
                if !self.inner.registry.contains(&slug) {
                    return;
                }
                click.prevent_default();
                let direction = direction_for_trigger(&self.inner.page.borrow(), link, &self.inner.config);
                self.spawn_open(slug, direction, Some(link), Origin::Navigation);
            }
            Route::Neutral | Route::Other(_) => {
                let target = self.inner.page.borrow().document.get_element_by_id(&href[1..]);
                let Some(target) = target else { return };
                click.prevent_default();

                if self.inner.state.borrow().active_slug.is_some() {
                    self.spawn_close(Origin::Navigation);
                }
                let mut page = self.inner.page.borrow_mut();
                page.scroll_into_view(target);
                self.inner.write_history(&mut page, href);
            }
        }
    }

    /// popstate / hashchange / initial load
    fn handle_navigation(&self, fragment: &str, initial: bool) {
        match self.inner.history.route(fragment) {
            Route::Zone(slug) => {
                let direction = {
                    let page = self.inner.page.borrow();
                    let config = &self.inner.config;
                    self.inner.registry
                        .trigger_for(&page.document, &config.attributes, &slug)
                        .map(|t| direction_for_trigger(&page, t, config))
                        .unwrap_or(config.fallback_direction)
                };
                self.spawn_open(slug, direction, None, Origin::History);
            }
            Route::Neutral | Route::Other(_) if !initial => self.spawn_close(Origin::History),
            _ => {}
        }
    }
}

impl Inner {
    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    async fn open(self: Rc<Self>, slug: String, direction: Direction, trigger: Option<NodeId>, origin: Origin) {
        if !self.registry.contains(&slug) {
            tracing::debug!("open({}) ignored: no such panel", slug);
            return;
        }
        if self.state.borrow().is_open_or_opening(&slug) {
            return;
        }

        let _gate = self.gate.lock().await;
        {
            let state = self.state.borrow();
            if state.destroyed || state.is_open_or_opening(&slug) {
                return;
            }
        }
        if self.state.borrow().active_slug.is_some() {
            self.close_locked(Origin::Superseded).await;
            if self.is_destroyed() {
                return;
            }
        }
        self.open_locked(&slug, direction, trigger, origin).await;
    }

    async fn close(self: Rc<Self>, origin: Origin) {
        {
            let state = self.state.borrow();
            if state.destroyed || state.active_slug.is_none() || state.active_phase() == PanelPhase::Closing {
                return;
            }
        }

        let _gate = self.gate.lock().await;
        if self.is_destroyed() {
            return;
        }
        self.close_locked(origin).await;
    }

    /// Caller holds the gate and no panel is active
    async fn open_locked(&self, slug: &str, direction: Direction, trigger: Option<NodeId>, origin: Origin) {
        let Some(panel) = self.registry.get(slug) else { return };
        let attrs = &self.config.attributes;

        let completion = {
            let mut page = self.page.borrow_mut();
            let mut state = self.state.borrow_mut();

            let trigger = trigger
                .or_else(|| page.document.active_element())
                .filter(|&t| !page.document.tree().contains(panel.container, t));

            state.active_slug = Some(slug.to_string());
            state.directions.insert(slug.to_string(), direction);
            state.set_phase(slug, PanelPhase::Opening);

            self.scroll_lock.acquire(&mut page);
            state.holds_lock = true;
            self.registry.mark_open(&mut page.document, attrs, slug, direction);
            state.trap = Some(FocusTrap::activate(&mut page.document, panel.content, trigger, &attrs.focus_skip));

            let reduced = page.window.prefers_reduced_motion();
            self.animator.borrow_mut().enter(&mut page.document, panel, direction, &self.config.timing, reduced)
        };

        if !completion.finished().await || self.is_destroyed() {
            return;
        }

        {
            let mut page = self.page.borrow_mut();
            self.state.borrow_mut().set_phase(slug, PanelPhase::Open);
            if origin.writes_on_open() {
                self.write_history(&mut page, &self.history.fragment_for(slug));
            }
        }
        tracing::debug!("panel {} open (from {})", slug, direction);
        self.notify(slug, true);
    }

    /// Caller holds the gate
    async fn close_locked(&self, origin: Origin) {
        let Some(slug) = self.state.borrow().active_slug.clone() else { return };
        let Some(panel) = self.registry.get(&slug) else { return };

        let completion = {
            let mut page = self.page.borrow_mut();
            let mut state = self.state.borrow_mut();
            if state.phase(&slug) == PanelPhase::Closing {
                return;
            }
            state.set_phase(&slug, PanelPhase::Closing);
            let direction = state.directions.get(&slug).copied().unwrap_or(self.config.fallback_direction);

            let reduced = page.window.prefers_reduced_motion();
            self.animator.borrow_mut().exit(&mut page.document, panel, direction, &self.config.timing, reduced)
        };

        if !completion.finished().await || self.is_destroyed() {
            return;
        }

        {
            let mut page = self.page.borrow_mut();
            let mut state = self.state.borrow_mut();
            if std::mem::take(&mut state.holds_lock) {
                self.scroll_lock.release(&mut page);
            }
            self.registry.mark_closed(&mut page.document, &self.config.attributes);
            if let Some(trap) = state.trap.take() {
                trap.deactivate(&mut page.document);
            }
            if origin.writes_on_close() {
                self.write_history(&mut page, self.history.neutral());
            }
            state.set_phase(&slug, PanelPhase::Closed);
            state.active_slug = None;
        }
        tracing::debug!("panel {} closed", slug);
        self.notify(&slug, false);
    }

    fn write_history(&self, page: &mut Page, fragment: &str) {
        if let Err(err) = self.history.write(page, fragment) {
            tracing::warn!("could not push {}: {}", fragment, err);
        }
    }

    fn notify(&self, slug: &str, opened: bool) {
        let mut page = self.page.borrow_mut();
        for observer in self.observers.borrow_mut().iter_mut() {
            if opened {
                observer.panel_opened(slug, &mut page);
            } else {
                observer.panel_closed(slug, &mut page);
            }
        }
    }
}
