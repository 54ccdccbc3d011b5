use crate::constants::{GREETING_ROTATE_MS, HELLO_WORD_SELECTOR};
use backdrop_core::facts::{gather_facts, merge_greeting_words, GeoLookup, VisitorContext, GEO_LOOKUP_URL, GREETING_WORDS};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

async fn fetch_geo() -> Result<GeoLookup, JsValue> {
    let window = web::window().ok_or("no window")?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(GEO_LOOKUP_URL))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn visitor_context(window: &web::Window) -> VisitorContext {
    let navigator = window.navigator();
    let referrer = window
        .document()
        .map(|d| d.referrer())
        .filter(|r| !r.is_empty());
    VisitorContext {
        language: navigator.language(),
        user_agent: navigator.user_agent().ok(),
        hour: js_sys::Date::new_0().get_hours(),
        referrer,
    }
}

/// Rotate the greeting word and, once the lookup settles, mix visitor facts
/// into the rotation. Lookup failures leave the stock words in place.
pub fn start_greeting(document: &web::Document) {
    let Ok(Some(target)) = document.query_selector(HELLO_WORD_SELECTOR) else {
        return;
    };
    let Some(window) = web::window() else { return };

    let words = Rc::new(RefCell::new(
        GREETING_WORDS.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    ));
    let index = Rc::new(Cell::new(0usize));
    {
        let words = words.clone();
        let tick = Closure::wrap(Box::new(move || {
            let words = words.borrow();
            if words.is_empty() {
                return;
            }
            let i = (index.get() + 1) % words.len();
            index.set(i);
            target.set_text_content(Some(&words[i]));
        }) as Box<dyn FnMut()>);
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            GREETING_ROTATE_MS,
        ) {
            log::warn!("[facts] greeting rotation disabled: {e:?}");
        }
        tick.forget();
    }

    let ctx = visitor_context(&window);
    spawn_local(async move {
        let geo = match fetch_geo().await {
            Ok(geo) => Some(geo),
            Err(e) => {
                log::debug!("[facts] geo lookup failed: {e:?}");
                None
            }
        };
        let facts = gather_facts(geo.as_ref(), &ctx);
        let mut rng = rand::thread_rng();
        let merged = merge_greeting_words(&GREETING_WORDS, &facts, &mut rng);
        log::debug!("[facts] {} greeting words", merged.len());
        *words.borrow_mut() = merged;
    });
}
