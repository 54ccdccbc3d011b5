#![cfg(target_arch = "wasm32")]
use backdrop_core::constants::camera_home;
use backdrop_core::{
    ActivationTable, ActiveKey, CameraRig, Compositor, FrameClock, ReadinessGate, Viewpoints,
};
use instant::Instant;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod console;
mod constants;
mod dom;
mod events;
mod facts;
mod frame;
mod loader;
mod render;

pub use console::adventure;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("backdrop-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    // Page features that work without the canvas come first.
    events::wire_filters(&document, events::read_cards(&document));
    facts::start_greeting(&document);
    console::begin();

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(constants::CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let container = dom::html_element(&document, constants::CONTAINER_ID)
        .or_else(|| canvas.clone().dyn_into::<web::HtmlElement>().ok())
        .ok_or_else(|| anyhow::anyhow!("missing #{}", constants::CONTAINER_ID))?;
    dom::prepare_container(&container);

    dom::sync_canvas_backing_size(&canvas);
    events::wire_resize(&canvas);

    let active_key: Rc<RefCell<ActiveKey>> = Rc::new(RefCell::new(None));
    events::wire_active_key(&document, active_key.clone());

    // Layouts are seeded per page load; everything downstream is deterministic.
    let seed: u64 = rand::thread_rng().gen();
    let gpu = frame::init_gpu(&canvas).await;

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        active_key,
        canvas,
        container,
        clock: FrameClock::default(),
        rig: CameraRig::new(Viewpoints::default(), camera_home()),
        compositor: Compositor::new(ActivationTable::default(), seed),
        gate: ReadinessGate::default(),
        loader: loader::AssetLoader::new(),
        batch: render::SceneBatch::new(),
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
