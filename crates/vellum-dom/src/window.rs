//! Window metrics
//!
//! Viewport size, scrollbar gutter, scroll offset and the
//! `prefers-reduced-motion` media query.

/// Browser window state
#[derive(Debug, Clone)]
pub struct Window {
    inner_width: f64,
    inner_height: f64,
    /// Width taken by the vertical scrollbar (0 for overlay scrollbars)
    scrollbar_width: f64,
    scroll_y: f64,
    reduced_motion: bool,
}

impl Window {
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            inner_width,
            inner_height,
            scrollbar_width: 0.0,
            scroll_y: 0.0,
            reduced_motion: false,
        }
    }

    /// `window.innerWidth`
    pub fn inner_width(&self) -> f64 {
        self.inner_width
    }

    /// `window.innerHeight`
    pub fn inner_height(&self) -> f64 {
        self.inner_height
    }

    /// `document.documentElement.clientWidth`
    pub fn client_width(&self) -> f64 {
        (self.inner_width - self.scrollbar_width).max(0.0)
    }

    pub fn resize(&mut self, inner_width: f64, inner_height: f64) {
        self.inner_width = inner_width;
        self.inner_height = inner_height;
    }

    pub fn set_scrollbar_width(&mut self, width: f64) {
        self.scrollbar_width = width.max(0.0);
    }

    /// `window.scrollY`
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    /// `matchMedia("(prefers-reduced-motion: reduce)").matches`
    pub fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn set_reduced_motion(&mut self, reduce: bool) {
        self.reduced_motion = reduce;
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}
