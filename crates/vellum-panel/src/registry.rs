//! Panel registry
//!
//! Resolves the attribute contract against the document once, at
//! construction, and owns the DOM markers that reflect panel state.

use std::collections::HashSet;

use vellum_dom::{Document, NodeId};

use crate::{AttributeContract, Direction, PanelError, Region};

/// Elements making up one panel. The engine references these; the page
/// owns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelElements {
    pub slug: String,
    pub container: NodeId,
    pub content: NodeId,
    pub backdrop: NodeId,
    pub close_buttons: Vec<NodeId>,
}

/// All panels governed by one engine
#[derive(Debug, Clone)]
pub struct PanelRegistry {
    root: NodeId,
    panels: Vec<PanelElements>,
}

impl PanelRegistry {
    /// Scan `doc` for panel containers. Missing content or backdrop regions
    /// are markup/engine contract mismatches and fail the scan.
    pub fn scan(doc: &Document, contract: &AttributeContract) -> Result<Self, PanelError> {
        let root = doc.query_attr(&contract.root).first().copied().unwrap_or_else(|| {
            tracing::debug!("no [{}] container, using <body> as panel root", contract.root);
            doc.body()
        });

        let mut seen = HashSet::new();
        let mut panels = Vec::new();
        for container in doc.query_attr(&contract.panel) {
            let slug = doc.attr(container, &contract.panel).unwrap_or("").trim().to_string();
            if slug.is_empty() {
                return Err(PanelError::MissingSlug(container));
            }
            if !seen.insert(slug.clone()) {
                return Err(PanelError::DuplicateSlug(slug));
            }

            let region = |attr: &str, region: Region| {
                doc.query_attr_in(container, attr)
                    .first()
                    .copied()
                    .ok_or_else(|| PanelError::MissingRegion { slug: slug.clone(), region })
            };
            let content = region(&contract.content, Region::Content)?;
            let backdrop = region(&contract.backdrop, Region::Backdrop)?;
            let close_buttons = doc.query_attr_in(container, &contract.close);

            panels.push(PanelElements { slug, container, content, backdrop, close_buttons });
        }

        tracing::debug!("registered {} panel(s)", panels.len());
        Ok(Self { root, panels })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, slug: &str) -> Option<&PanelElements> {
        self.panels.iter().find(|p| p.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelElements> {
        self.panels.iter()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// First trigger in the document pointing at `slug`
    pub fn trigger_for(&self, doc: &Document, contract: &AttributeContract, slug: &str) -> Option<NodeId> {
        doc.find_by_attr(&contract.trigger, slug)
    }

    /// Mark `slug` as the open panel: active class and direction marker on
    /// it, `aria-hidden` on every sibling, marker class on the root.
    pub fn mark_open(&self, doc: &mut Document, contract: &AttributeContract, slug: &str, direction: Direction) {
        for panel in &self.panels {
            let Some(el) = doc.element_mut(panel.container) else { continue };
            if panel.slug == slug {
                el.add_class(&contract.active_class);
                el.set_attr(&contract.slide_from, direction.as_str());
                el.set_attr("aria-hidden", "false");
            } else {
                el.remove_class(&contract.active_class);
                el.set_attr("aria-hidden", "true");
            }
        }
        if let Some(root) = doc.element_mut(self.root) {
            root.add_class(&contract.root_active_class);
        }
    }

    /// Return every panel to the neutral (none open) markers
    pub fn mark_closed(&self, doc: &mut Document, contract: &AttributeContract) {
        for panel in &self.panels {
            if let Some(el) = doc.element_mut(panel.container) {
                el.remove_class(&contract.active_class);
                el.set_attr("aria-hidden", "false");
            }
        }
        if let Some(root) = doc.element_mut(self.root) {
            root.remove_class(&contract.root_active_class);
        }
    }
}
