use js_sys::{Array, Function};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_carousel_core::{
    Carousel, CarouselConfig, EffectOverrides, Engine, EventDisposition, InputEvent,
    MotionPreference, TargetId,
};

#[wasm_bindgen]
pub struct VizijCarousel {
    core: Carousel,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Reduced-motion query backed by a JS callback, e.g.
/// `() => matchMedia("(prefers-reduced-motion: reduce)").matches`.
struct JsMotionQuery {
    f: Function,
}

impl MotionPreference for JsMotionQuery {
    fn prefers_reduced_motion(&self) -> bool {
        match self.f.call0(&JsValue::UNDEFINED) {
            Ok(v) => v.is_truthy(),
            // A throwing query is treated as "no preference".
            Err(_) => false,
        }
    }
}

fn parse_config(config: JsValue) -> Result<CarouselConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        return Ok(CarouselConfig::default());
    }
    if let Some(text) = config.as_string() {
        return CarouselConfig::from_json(&text)
            .map_err(|e| JsError::new(&format!("config error: {e}")));
    }
    swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
}

fn consumed(d: EventDisposition) -> bool {
    d.is_consumed()
}

#[wasm_bindgen]
impl VizijCarousel {
    /// Create a carousel over `item_count` items.
    ///
    /// `config` is a (partial) CarouselConfig object, a JSON string, or
    /// undefined/null for defaults. `reduced_motion` is a boolean or a
    /// function returning one; it is sampled once.
    ///
    ///   new VizijCarousel(6, { spacing: 0.1 }, () => mq.matches)
    #[wasm_bindgen(constructor)]
    pub fn new(
        item_count: u32,
        config: JsValue,
        reduced_motion: JsValue,
    ) -> Result<VizijCarousel, JsError> {
        console_error_panic_hook::set_once();

        let cfg = parse_config(config)?;
        let core = if let Some(f) = reduced_motion.dyn_ref::<Function>() {
            let query = JsMotionQuery { f: f.clone() };
            Carousel::start(Engine::new(), item_count as usize, cfg, &query)
        } else {
            let reduced = reduced_motion.as_bool().unwrap_or(false);
            Carousel::start(Engine::new(), item_count as usize, cfg, &reduced)
        }
        .map_err(|e| JsError::new(&format!("carousel start error: {e}")))?;

        Ok(VizijCarousel { core })
    }

    /// False when reduced motion left the carousel inert.
    #[wasm_bindgen(js_name = is_active)]
    pub fn is_active(&self) -> bool {
        self.core.is_active()
    }

    #[wasm_bindgen(js_name = item_count)]
    pub fn item_count(&self) -> u32 {
        self.core.item_count() as u32
    }

    #[wasm_bindgen(js_name = pointer_enter)]
    pub fn pointer_enter(&mut self) {
        self.core.handle(InputEvent::PointerEnter);
    }

    #[wasm_bindgen(js_name = pointer_leave)]
    pub fn pointer_leave(&mut self) {
        self.core.handle(InputEvent::PointerLeave);
    }

    /// Report the visible fraction of the carousel region (IntersectionObserver ratio).
    #[wasm_bindgen]
    pub fn visibility(&mut self, fraction: f64) {
        self.core
            .handle(InputEvent::VisibilityChanged { fraction });
    }

    /// Feed a wheel delta. Returns true when the page should `preventDefault()`.
    #[wasm_bindgen]
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        consumed(self.core.handle(InputEvent::Wheel { delta_y }))
    }

    #[wasm_bindgen(js_name = touch_start)]
    pub fn touch_start(&mut self, y: f64) {
        self.core.handle(InputEvent::TouchStart { y });
    }

    /// Feed a touch position. Returns true when the page should `preventDefault()`.
    #[wasm_bindgen(js_name = touch_move)]
    pub fn touch_move(&mut self, y: f64) -> bool {
        consumed(self.core.handle(InputEvent::TouchMove { y }))
    }

    /// "Next" button.
    #[wasm_bindgen]
    pub fn next(&mut self) -> bool {
        consumed(self.core.handle(InputEvent::Advance))
    }

    /// "Previous" button.
    #[wasm_bindgen]
    pub fn prev(&mut self) -> bool {
        consumed(self.core.handle(InputEvent::Retreat))
    }

    /// Dispatch a serialized InputEvent (`{ kind: "wheel", delta_y: 120 }`).
    /// Returns true when the event was consumed.
    #[wasm_bindgen]
    pub fn dispatch(&mut self, event: JsValue) -> Result<bool, JsError> {
        let ev: InputEvent =
            swb::from_value(event).map_err(|e| JsError::new(&format!("event error: {e}")))?;
        Ok(consumed(self.core.handle(ev)))
    }

    /// Step by dt (seconds). Returns Outputs JSON (`{ changes, events }`).
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f64) -> Result<JsValue, JsError> {
        let out = self.core.update(dt);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Current CarouselSnapshot as a JS object.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        swb::to_value(&self.core.snapshot())
            .map_err(|e| JsError::new(&format!("snapshot error: {e}")))
    }

    /// Play a named effect (`"reveal"`, `"staggerChildren"`) on item indices.
    /// `overrides` is an optional partial effect config. Returns the timeline id.
    #[wasm_bindgen(js_name = play_effect)]
    pub fn play_effect(
        &mut self,
        name: String,
        targets: Array,
        overrides: JsValue,
    ) -> Result<u32, JsError> {
        let overrides: EffectOverrides = if jsvalue_is_undefined_or_null(&overrides) {
            EffectOverrides::default()
        } else {
            swb::from_value(overrides)
                .map_err(|e| JsError::new(&format!("effect overrides error: {e}")))?
        };
        let mut ids = Vec::with_capacity(targets.length() as usize);
        for v in targets.iter() {
            let n = v
                .as_f64()
                .ok_or_else(|| JsError::new("play_effect: targets must be item indices"))?;
            ids.push(TargetId(n as u32));
        }
        let engine = self.core.engine_mut();
        let timeline = engine
            .effect(&name, &ids, &overrides)
            .map_err(|e| JsError::new(&format!("effect error: {e}")))?;
        Ok(engine.play(timeline).0)
    }

    /// Pause or resume every timeline the engine runs (intro fade, effects).
    /// The scrub transition follows user input and keeps running.
    #[wasm_bindgen(js_name = set_paused)]
    pub fn set_paused(&mut self, paused: bool) {
        let engine = self.core.engine_mut();
        if paused {
            engine.pause_all();
        } else {
            engine.play_all();
        }
    }

    /// Speed of engine timelines (intro fade, effects). Scrubbing is not scaled.
    #[wasm_bindgen(js_name = set_time_scale)]
    pub fn set_time_scale(&mut self, scale: f64) {
        self.core.engine_mut().set_time_scale(scale);
    }

    /// Return to iteration 0 and cursor 0.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.core.reset();
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
