//! Focus Management
//!
//! Focusability rules and tab index parsing.

use crate::ElementData;

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    NotFocusable,       // tabindex="-1"
    Sequential(i32),    // tabindex="0" or positive
}

impl TabIndex {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Some(Self::NotFocusable),
            Ok(n) => Some(Self::Sequential(n)),
            Err(_) => None,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

/// Whether `el` takes part in sequential (Tab) navigation.
///
/// Interactive elements are focusable unless disabled; an explicit
/// `tabindex` always wins. Unparseable tabindex values are ignored.
pub fn is_tabbable(el: &ElementData) -> bool {
    if el.has_attr("disabled") || el.has_attr("hidden") {
        return false;
    }
    if let Some(index) = el.get_attr("tabindex").and_then(TabIndex::parse) {
        return index.is_focusable();
    }
    match el.tag.as_str() {
        "a" | "area" => el.has_attr("href"),
        "button" | "select" | "textarea" | "iframe" | "summary" => true,
        "input" => el.get_attr("type") != Some("hidden"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        let mut el = ElementData::new(tag);
        for (name, value) in attrs {
            el.set_attr(name, value);
        }
        el
    }

    #[test]
    fn test_tab_index() {
        assert!(!TabIndex::parse("-1").unwrap().is_focusable());
        assert!(TabIndex::parse("0").unwrap().is_focusable());
        assert!(TabIndex::parse("5").unwrap().is_focusable());
        assert_eq!(TabIndex::parse("auto"), None);
    }

    #[test]
    fn test_tabbable_elements() {
        assert!(is_tabbable(&element("button", &[])));
        assert!(is_tabbable(&element("a", &[("href", "#zone-map")])));
        assert!(!is_tabbable(&element("a", &[])));
        assert!(!is_tabbable(&element("div", &[])));
        assert!(is_tabbable(&element("div", &[("tabindex", "0")])));
        assert!(!is_tabbable(&element("button", &[("tabindex", "-1")])));
        assert!(!is_tabbable(&element("button", &[("disabled", "")])));
        assert!(!is_tabbable(&element("input", &[("type", "hidden")])));
    }
}
