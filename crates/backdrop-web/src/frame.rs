use crate::constants::MAX_FRAME_DELTA_SEC;
use crate::dom;
use crate::loader::AssetLoader;
use crate::render::{GpuState, SceneBatch};
use backdrop_core::{ActiveKey, CameraRig, Compositor, FrameClock, ReadinessGate};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub active_key: Rc<RefCell<ActiveKey>>,
    pub canvas: web::HtmlCanvasElement,
    pub container: web::HtmlElement,

    pub clock: FrameClock,
    pub rig: CameraRig,
    pub compositor: Compositor,
    pub gate: ReadinessGate,
    pub loader: AssetLoader,

    pub batch: SceneBatch,
    pub gpu: Option<GpuState<'a>>,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DELTA_SEC);
        self.last_instant = now;
        self.clock.advance(dt);

        // Read once so every consumer sees the same key this frame.
        let key = *self.active_key.borrow();

        if self.rig.set_key(key) {
            log::debug!("[frame] camera heading for {:?}", key);
        }
        self.rig.step(self.clock.delta);

        if let Some(directive) = self.compositor.step(&self.clock, key, self.rig.eye()) {
            self.rig.apply_directive(&directive);
        }

        self.loader.request_mounted(&self.compositor);
        if let Some(ready) = self.gate.update(key, self.loader.progress(), self.clock.elapsed) {
            dom::set_container_visible(&self.container, ready);
        }

        let dirty = take_dirty(&mut self.compositor);
        if dirty {
            self.batch.rebuild(&self.compositor);
        }

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            let camera = self.rig.camera(g.aspect());
            if let Err(e) = g.render(&camera, &self.batch, dirty) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

/// Clears every layer's upload flag; true when anything changed.
fn take_dirty(compositor: &mut Compositor) -> bool {
    let mut dirty = compositor.starfield_mut().buffers_mut().take_dirty();
    dirty |= compositor.breather_mut().buffers_mut().take_dirty();
    dirty |= compositor.wavefield_mut().buffers_mut().take_dirty();
    dirty |= compositor.polygons_mut().buffers_mut().take_dirty();
    dirty |= compositor.models_mut().take_dirty();
    if let Some(posters) = compositor.posters_mut() {
        dirty |= posters.take_dirty();
    }
    // The choreography animates every frame it is mounted.
    dirty | compositor.choreography().is_some()
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
