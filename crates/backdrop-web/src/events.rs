use crate::constants::{BADGE_ATTR, CATEGORIES_ATTR, CATEGORY_ID, PROJECTS_ID, PROJECT_ATTR, PROJECT_SELECTOR, SEARCH_ID};
use crate::dom;
use backdrop_core::catalog::{group_by_status, Category, FilterState, Project, Status};
use backdrop_core::{active_key_from_host, ActiveKey};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn listen(target: &web::EventTarget, event: &str, handler: impl FnMut(web::Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("[events] could not listen for {event}: {e:?}");
    }
    closure.forget();
}

/// Hovering or touching a project card makes it the active key.
/// Leaving the project grid clears it.
pub fn wire_active_key(document: &web::Document, active_key: Rc<RefCell<ActiveKey>>) {
    let Some(grid) = document.get_element_by_id(PROJECTS_ID) else {
        log::warn!("[events] missing #{PROJECTS_ID}; backdrop stays on the home view");
        return;
    };
    for event in ["pointerover", "touchstart", "focusin"] {
        let key = active_key.clone();
        listen(&grid, event, move |ev| {
            let Some(target) = ev.target() else { return };
            if let Some(id) = dom::project_key_of(&target) {
                let next = active_key_from_host(Some(&id));
                let mut cur = key.borrow_mut();
                if *cur != next {
                    log::debug!("[events] active key -> {:?}", next);
                    *cur = next;
                }
            }
        });
    }
    let key = active_key;
    listen(&grid, "pointerleave", move |_| {
        *key.borrow_mut() = None;
    });
}

/// One card in the showcase and the element that displays it.
pub struct Card {
    pub project: Project,
    pub element: web::HtmlElement,
}

fn words(el: &web::Element, attr: &str, sep: char) -> Vec<String> {
    el.get_attribute(attr)
        .map(|s| {
            s.split(sep)
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Reads the catalog from the cards' data attributes.
pub fn read_cards(document: &web::Document) -> Vec<Card> {
    let Ok(list) = document.query_selector_all(PROJECT_SELECTOR) else {
        return Vec::new();
    };
    let mut cards = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        let Some(el) = list.item(i).and_then(|n| n.dyn_into::<web::HtmlElement>().ok()) else {
            continue;
        };
        let id = el.get_attribute(PROJECT_ATTR).unwrap_or_default();
        let status = el
            .get_attribute("data-status")
            .and_then(|s| Status::parse(&s))
            .unwrap_or(Status::Released);
        let project = Project {
            title: el.get_attribute("data-title").unwrap_or_else(|| id.clone()),
            blurb: el.get_attribute("data-blurb").unwrap_or_default(),
            tags: words(&el, "data-tags", ' '),
            stack: words(&el, "data-stack", ','),
            categories: words(&el, CATEGORIES_ATTR, ' ')
                .iter()
                .filter_map(|c| Category::parse(c))
                .collect(),
            status,
            id,
        };
        cards.push(Card { project, element: el });
    }
    cards
}

fn apply_filter(document: &web::Document, cards: &[Card], state: &FilterState) {
    let projects: Vec<Project> = cards.iter().map(|c| c.project.clone()).collect();
    let visible = state.apply(&projects);
    for card in cards {
        let shown = visible.iter().any(|p| p.id == card.project.id);
        dom::set_hidden(&card.element, !shown);
    }
    let groups = group_by_status(&visible);
    if let Ok(sections) = document.query_selector_all("[data-status-section]") {
        for i in 0..sections.length() {
            let Some(el) = sections.item(i).and_then(|n| n.dyn_into::<web::HtmlElement>().ok()) else {
                continue;
            };
            let status = el
                .get_attribute("data-status-section")
                .and_then(|s| Status::parse(&s));
            let empty = !groups.iter().any(|(s, _)| Some(*s) == status);
            dom::set_hidden(&el, empty);
        }
    }
}

fn search_input(document: &web::Document) -> Option<web::HtmlInputElement> {
    document
        .get_element_by_id(SEARCH_ID)
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
}

fn category_select(document: &web::Document) -> Option<web::HtmlSelectElement> {
    document
        .get_element_by_id(CATEGORY_ID)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
}

/// Search box, category selector and badge clicks all drive one filter state.
pub fn wire_filters(document: &web::Document, cards: Vec<Card>) {
    let cards = Rc::new(cards);
    let state = Rc::new(RefCell::new(FilterState::default()));

    if let Some(input) = search_input(document) {
        let (doc, cards, state) = (document.clone(), cards.clone(), state.clone());
        let field = input.clone();
        listen(&input, "input", move |_| {
            state.borrow_mut().query = field.value();
            apply_filter(&doc, &cards, &state.borrow());
        });
    }

    if let Some(select) = category_select(document) {
        let (doc, cards, state) = (document.clone(), cards.clone(), state.clone());
        let field = select.clone();
        listen(&select, "change", move |_| {
            state.borrow_mut().category = Category::parse(&field.value()).unwrap_or_default();
            apply_filter(&doc, &cards, &state.borrow());
        });
    }

    let doc = document.clone();
    listen(document, "click", move |ev| {
        let Some(badge) = ev
            .target()
            .and_then(|t| t.dyn_into::<web::Element>().ok())
            .and_then(|el| el.closest(&format!("[{BADGE_ATTR}]")).ok().flatten())
        else {
            return;
        };
        let label = badge.get_attribute(BADGE_ATTR).unwrap_or_default();
        ev.prevent_default();
        let mut s = state.borrow_mut();
        s.badge_click(&label);
        if let Some(input) = search_input(&doc) {
            input.set_value(&s.query);
        }
        if let Some(select) = category_select(&doc) {
            select.set_value(s.category.as_str());
        }
        apply_filter(&doc, &cards, &s);
    });
}

pub fn wire_resize(canvas: &web::HtmlCanvasElement) {
    let Some(window) = web::window() else { return };
    let canvas = canvas.clone();
    listen(&window, "resize", move |_| dom::sync_canvas_backing_size(&canvas));
}
