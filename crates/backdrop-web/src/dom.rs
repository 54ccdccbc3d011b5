use crate::constants::{CANVAS_FADE_MS, PROJECT_ATTR, PROJECT_SELECTOR};
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn html_element(document: &web::Document, id: &str) -> Option<web::HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Project key of the card an event target sits in, if any.
pub fn project_key_of(target: &web::EventTarget) -> Option<String> {
    let el = target.dyn_ref::<web::Element>()?;
    let card = el.closest(PROJECT_SELECTOR).ok()??;
    card.get_attribute(PROJECT_ATTR)
}

/// Start hidden with the fade transition in place.
pub fn prepare_container(container: &web::HtmlElement) {
    let style = container.style();
    let transition = format!("opacity {CANVAS_FADE_MS}ms ease, visibility {CANVAS_FADE_MS}ms ease");
    let _ = style.set_property("transition", &transition);
    set_container_visible(container, false);
}

pub fn set_container_visible(container: &web::HtmlElement, visible: bool) {
    let style = container.style();
    let _ = style.set_property("opacity", if visible { "1" } else { "0" });
    let _ = style.set_property("visibility", if visible { "visible" } else { "hidden" });
}

pub fn set_hidden(el: &web::HtmlElement, hidden: bool) {
    let _ = el
        .style()
        .set_property("display", if hidden { "none" } else { "" });
}
