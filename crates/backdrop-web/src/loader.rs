//! Background fetching of scene assets.
//!
//! Every path is requested once per page load. The counters only ever grow,
//! which is what the readiness gate expects: a newly mounted group bumps
//! `total`, finished downloads (successful or not) bump `loaded`.

use backdrop_core::{AssetGroup, Compositor, LoadProgress};
use fnv::FnvHashSet;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

#[derive(Default)]
pub struct AssetLoader {
    requested: FnvHashSet<String>,
    groups_seen: FnvHashSet<AssetGroup>,
    loaded: Rc<Cell<u32>>,
    total: u32,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress::new(self.loaded.get(), self.total)
    }

    /// Queue downloads for any group the compositor has newly mounted.
    pub fn request_mounted(&mut self, compositor: &Compositor) {
        for group in compositor.mounted_asset_groups() {
            if !self.groups_seen.insert(group) {
                continue;
            }
            let paths = compositor.asset_paths(group);
            log::debug!("[loader] {:?}: {} assets", group, paths.len());
            for path in paths {
                self.request(path);
            }
        }
    }

    fn request(&mut self, path: String) {
        if !self.requested.insert(path.clone()) {
            return;
        }
        self.total += 1;
        let loaded = self.loaded.clone();
        spawn_local(async move {
            if let Err(e) = fetch_bytes(&path).await {
                log::warn!("[loader] {path}: {e:?}");
            }
            loaded.set(loaded.get() + 1);
        });
    }
}

async fn fetch_bytes(path: &str) -> Result<(), wasm_bindgen::JsValue> {
    let window = web::window().ok_or("no window")?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(path)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()).into());
    }
    JsFuture::from(resp.array_buffer()?).await?;
    Ok(())
}
