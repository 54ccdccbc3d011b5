//! The river dialogue, played from the browser console.
//!
//! Each offered choice is published as a global function (`listen()`,
//! `step_in()`, ...) and removed again once it is no longer valid.
//! `adventure("name")` is the same thing for consoles that strip globals.

use backdrop_core::dialogue::{Adventure, DialogueSink, Script};
use std::cell::RefCell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

thread_local! {
    static ADVENTURE: RefCell<Adventure> = RefCell::new(Adventure::new(Script::river()));
    static PUBLISHED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct ConsoleSink;

impl DialogueSink for ConsoleSink {
    fn say(&mut self, text: &str) {
        log::info!("{text}");
    }

    fn offer(&mut self, choices: &[&str]) {
        let names: Vec<String> = choices.iter().map(|c| format!("{c}()")).collect();
        log::info!("> {}", names.join("   "));
        publish(choices);
    }

    fn finished(&mut self) {
        publish(&[]);
    }
}

fn publish(choices: &[&str]) {
    let global = js_sys::global();
    PUBLISHED.with(|published| {
        let mut published = published.borrow_mut();
        for name in published.drain(..) {
            let _ = js_sys::Reflect::delete_property(&global, &JsValue::from_str(&name));
        }
        for &name in choices {
            let owned = name.to_string();
            let closure = Closure::wrap(Box::new(move || {
                adventure(&owned);
            }) as Box<dyn FnMut()>);
            if js_sys::Reflect::set(&global, &JsValue::from_str(name), closure.as_ref()).is_ok() {
                published.push(name.to_string());
            }
            closure.forget();
        }
    });
}

/// Opening line of the dialogue; printed once at startup.
pub fn begin() {
    ADVENTURE.with(|a| {
        if let Err(e) = a.borrow_mut().start(&mut ConsoleSink) {
            log::warn!("[console] {e}");
        }
    });
}

#[wasm_bindgen]
pub fn adventure(choice: &str) {
    ADVENTURE.with(|a| {
        // Choice closures re-enter through here; a nested call is simply dropped.
        let Ok(mut adv) = a.try_borrow_mut() else { return };
        if let Err(e) = adv.choose(choice, &mut ConsoleSink) {
            log::info!("{e}");
        }
    });
}
