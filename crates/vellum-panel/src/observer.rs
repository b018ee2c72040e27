//! Open/close notifications for collaborators outside the engine
//!
//! Observers hear about a panel only after its pipeline has settled. They
//! may touch the page but have no handle on engine state, so a failing
//! collaborator cannot corrupt it.

use vellum_dom::Page;

/// Receives settled open/close notifications
pub trait PanelObserver {
    /// `slug` finished opening
    fn panel_opened(&mut self, _slug: &str, _page: &mut Page) {}

    /// `slug` finished closing and every resource was released
    fn panel_closed(&mut self, _slug: &str, _page: &mut Page) {}
}

/// Populates a panel's content on demand
pub trait ContentLoader {
    fn load(&mut self, slug: &str, page: &mut Page) -> anyhow::Result<()>;
}

impl<F> ContentLoader for F
where
    F: FnMut(&str, &mut Page) -> anyhow::Result<()>,
{
    fn load(&mut self, slug: &str, page: &mut Page) -> anyhow::Result<()> {
        self(slug, page)
    }
}

/// Loads one panel's content the first time it opens. A failed load is
/// logged and clears the initialised flag, so the next open retries.
pub struct LazyContent<L> {
    slug: String,
    loader: L,
    initialized: bool,
    attempts: usize,
}

impl<L: ContentLoader> LazyContent<L> {
    pub fn new(slug: &str, loader: L) -> Self {
        Self { slug: slug.to_string(), loader, initialized: false, attempts: 0 }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Load attempts so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl<L: ContentLoader> PanelObserver for LazyContent<L> {
    fn panel_opened(&mut self, slug: &str, page: &mut Page) {
        if slug != self.slug || self.initialized {
            return;
        }
        self.initialized = true;
        self.attempts += 1;
        if let Err(err) = self.loader.load(slug, page) {
            tracing::error!("content for panel {} failed to load: {:#}", slug, err);
            self.initialized = false;
        }
    }
}
