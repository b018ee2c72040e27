//! Example: Two panels driven by simulated page events
//!
//! Run with `RUST_LOG=vellum_panel=debug` to watch the state machine.

use std::cell::RefCell;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use vellum_dom::{DOMRect, Key, NodeId, Page, UiEvent};
use vellum_panel::{LazyContent, PanelConfig, PanelEngine};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut page = Page::new("https://vellum.example/")?;
    let [about, contact] = build_page(&mut page)?;
    let page = Rc::new(RefCell::new(page));

    let engine = PanelEngine::new(page.clone(), PanelConfig::default())?;
    engine.add_observer(LazyContent::new("contact", |slug: &str, page: &mut Page| -> anyhow::Result<()> {
        let panel = page.document.find_by_attr("data-panel", slug)
            .ok_or_else(|| anyhow::anyhow!("panel {} vanished", slug))?;
        page.document.append_element(panel, "form", &[("id", "contact-form")])?;
        Ok(())
    }));
    engine.attach();

    println!("Vellum panel v{}", vellum_panel::VERSION);

    let mut now = 0.0;
    let mut step = |label: &str, event: Option<UiEvent>| {
        if let Some(mut event) = event {
            engine.dispatch(&mut event);
            let follow_up = page.borrow_mut().default_action(&event);
            if let Some(mut follow_up) = follow_up {
                engine.dispatch(&mut follow_up);
            }
        }
        while !engine.is_settled() {
            now += 16.0;
            engine.frame(now);
        }
        let page = page.borrow();
        println!(
            "{:<24} active={:<9} url={}",
            label,
            engine.active_slug().unwrap_or_else(|| "-".into()),
            page.history.location().href(),
        );
    };

    let click = |target: NodeId| Some(page.borrow().click_event(target));
    let escape = || Some(page.borrow().key_event(Key::Escape, false));
    let back = || page.borrow_mut().back();
    let forward = || page.borrow_mut().forward();

    step("click about", click(about));
    step("click contact", click(contact));
    step("escape", escape());
    step("back", back());
    step("back", back());
    step("forward", forward());

    engine.destroy();
    Ok(())
}

/// Two triggers and their panels
fn build_page(page: &mut Page) -> anyhow::Result<[NodeId; 2]> {
    let doc = &mut page.document;
    let body = doc.body();

    let header = doc.append_element(body, "header", &[])?;
    let about = doc.append_element(header, "a", &[("href", "#zone-about"), ("data-panel-trigger", "about")])?;
    doc.set_layout(about, DOMRect::from_xywh(80.0, 24.0, 120.0, 32.0));
    let contact = doc.append_element(header, "button", &[("data-panel-trigger", "contact")])?;
    doc.set_layout(contact, DOMRect::from_xywh(1080.0, 24.0, 120.0, 32.0));

    let main = doc.append_element(body, "main", &[("data-panel-root", "")])?;
    for slug in ["about", "contact"] {
        let panel = doc.append_element(main, "section", &[("data-panel", slug)])?;
        doc.append_element(panel, "div", &[("data-panel-backdrop", "")])?;
        let content = doc.append_element(panel, "div", &[("data-panel-content", "")])?;
        doc.append_element(content, "button", &[("data-panel-close", "")])?;
    }
    Ok([about, contact])
}
