//! Scroll Lock
//!
//! Reference-counted suppression of page scrolling. One lock exists per
//! page and every panel engine on that page shares it, so overlapping or
//! rapid open/close sequences from independent engines stay balanced.

use std::cell::RefCell;
use std::rc::Rc;

use vellum_dom::Page;

/// Lock bookkeeping
#[derive(Debug, Default)]
struct ScrollLockState {
    refcount: usize,
    /// Inline `overflow` on <body> before the first acquire
    saved_overflow: String,
    /// Inline `padding-right` on <body> before the first acquire
    saved_padding_right: String,
}

thread_local! {
    static GLOBAL: ScrollLock = ScrollLock::new();
}

/// Shared scroll lock handle
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    state: Rc<RefCell<ScrollLockState>>,
}

impl ScrollLock {
    /// A fresh, independent lock
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock shared by every engine on this (UI) thread
    pub fn global() -> Self {
        GLOBAL.with(Clone::clone)
    }

    /// Take a hold on the lock. The 0→1 transition saves the body's inline
    /// `overflow`/`padding-right`, pads the body by the scrollbar width to
    /// avoid a layout shift, and hides overflow. Returns the new count.
    pub fn acquire(&self, page: &mut Page) -> usize {
        let mut state = self.state.borrow_mut();
        if state.refcount == 0 {
            let body = page.document.body();
            state.saved_overflow = page.document.style(body, "overflow").to_string();
            state.saved_padding_right = page.document.style(body, "padding-right").to_string();

            let scrollbar = page.window.inner_width() - page.window.client_width();
            if scrollbar > 0.0 {
                page.document.set_style(body, "padding-right", &format!("{}px", scrollbar));
            }
            page.document.set_style(body, "overflow", "hidden");
            tracing::debug!("scroll locked (scrollbar compensation {}px)", scrollbar.max(0.0));
        }
        state.refcount += 1;
        state.refcount
    }

    /// Drop a hold. Only reaching exactly zero restores the saved inline
    /// values verbatim. Releasing an unheld lock is a caller defect: it is
    /// logged and otherwise ignored.
    pub fn release(&self, page: &mut Page) -> usize {
        let mut state = self.state.borrow_mut();
        if state.refcount == 0 {
            tracing::error!("scroll lock released more times than acquired; ignoring");
            return 0;
        }
        state.refcount -= 1;
        if state.refcount == 0 {
            let body = page.document.body();
            page.document.set_style(body, "overflow", &state.saved_overflow);
            page.document.set_style(body, "padding-right", &state.saved_padding_right);
            tracing::debug!("scroll unlocked");
        }
        state.refcount
    }

    pub fn refcount(&self) -> usize {
        self.state.borrow().refcount
    }

    pub fn is_locked(&self) -> bool {
        self.refcount() > 0
    }

    /// Whether two handles refer to the same lock
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
