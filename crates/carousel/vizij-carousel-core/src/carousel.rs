//! Carousel facade: start-up policy, event routing and per-frame stepping.
//!
//! `InputEvent` → gate → normalizer → scrub controller, then once per frame
//! `update(dt)` steps the engine and the controller, renders the loop and
//! returns the property changes and events for the host.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CarouselConfig;
use crate::engine::Engine;
use crate::error::{CarouselError, Result};
use crate::gate::InteractionGate;
use crate::ids::{TargetId, TimelineId};
use crate::input::{EventDisposition, InputEvent, InputNormalizer};
use crate::outputs::Outputs;
use crate::scrub::{ScrubController, ScrubOutcome};
use crate::seamless_loop;
use crate::store::{Frame, ItemState, Prop};
use crate::timeline::Timeline;

/// Source of the user's reduced-motion preference. Sampled once at start.
pub trait MotionPreference {
    fn prefers_reduced_motion(&self) -> bool;
}

impl MotionPreference for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

impl<F> MotionPreference for F
where
    F: Fn() -> bool,
{
    fn prefers_reduced_motion(&self) -> bool {
        self()
    }
}

/// Serializable view of the carousel state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselSnapshot {
    pub active: bool,
    pub iteration: u32,
    pub target: f64,
    pub scrub_time: f64,
    pub accumulator: f64,
    pub loop_time: f64,
    pub loop_total_time: f64,
    pub loop_duration: f64,
    pub hovered: bool,
    pub visible: bool,
    pub items: Vec<ItemState>,
}

#[derive(Debug)]
pub enum Carousel {
    Active(Box<ActiveCarousel>),
    /// Reduced motion: items show their final state and input is ignored.
    Inert(InertCarousel),
}

impl Carousel {
    /// Build the carousel for `item_count` items (targets `0..item_count`).
    pub fn start(
        mut engine: Engine,
        item_count: usize,
        config: CarouselConfig,
        motion: &dyn MotionPreference,
    ) -> Result<Self> {
        config.validate()?;
        if item_count == 0 {
            return Err(CarouselError::EmptyItems);
        }
        let items: Vec<TargetId> = (0..item_count as u32).map(TargetId).collect();
        let reduced = motion.prefers_reduced_motion();
        engine.set_reduced_motion(reduced);

        if reduced {
            for &item in &items {
                for prop in [Prop::Opacity, Prop::Scale, Prop::XPercent, Prop::ContentOpacity] {
                    engine.set(item, prop, prop.rest_value());
                }
            }
            debug!(items = item_count, "reduced motion; carousel inert");
            return Ok(Carousel::Inert(InertCarousel {
                engine,
                items,
                outputs: Outputs::default(),
            }));
        }

        let seamless = seamless_loop::build(&items, config.spacing, config.boundary_nudge())?;
        let intro = engine.play(intro_fade(&items, &config));
        let controller = ScrubController::new(seamless, &config);
        let normalizer = InputNormalizer::new(config.spacing, &config.input);
        let gate = InteractionGate::new(config.visibility_threshold, false);
        debug!(
            items = item_count,
            duration = controller.duration(),
            "carousel started"
        );
        Ok(Carousel::Active(Box::new(ActiveCarousel {
            engine,
            controller,
            normalizer,
            gate,
            items,
            intro,
            frame: Frame::new(),
            outputs: Outputs::default(),
        })))
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Carousel::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveCarousel> {
        match self {
            Carousel::Active(a) => Some(a),
            Carousel::Inert(_) => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveCarousel> {
        match self {
            Carousel::Active(a) => Some(a),
            Carousel::Inert(_) => None,
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> EventDisposition {
        match self {
            Carousel::Active(a) => a.handle(event),
            Carousel::Inert(_) => EventDisposition::Ignored,
        }
    }

    pub fn update(&mut self, dt: f64) -> &Outputs {
        match self {
            Carousel::Active(a) => a.update(dt),
            Carousel::Inert(i) => i.update(dt),
        }
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        match self {
            Carousel::Active(a) => a.snapshot(),
            Carousel::Inert(i) => i.snapshot(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Carousel::Active(a) => a.items.len(),
            Carousel::Inert(i) => i.items.len(),
        }
    }

    pub fn item_state(&self, index: usize) -> Option<ItemState> {
        let target = TargetId(u32::try_from(index).ok()?);
        (index < self.item_count()).then(|| self.engine().item_state(target))
    }

    pub fn engine(&self) -> &Engine {
        match self {
            Carousel::Active(a) => &a.engine,
            Carousel::Inert(i) => &i.engine,
        }
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        match self {
            Carousel::Active(a) => &mut a.engine,
            Carousel::Inert(i) => &mut i.engine,
        }
    }

    /// Back to the initial cursor (no-op when inert).
    pub fn reset(&mut self) {
        if let Carousel::Active(a) = self {
            a.reset();
        }
    }
}

/// Item contents fade in once at start.
fn intro_fade(items: &[TargetId], config: &CarouselConfig) -> Timeline {
    let mut tl = Timeline::new();
    for &item in items {
        tl.set(item, Prop::ContentOpacity, 0.0);
        tl.to(
            item,
            Prop::ContentOpacity,
            1.0,
            config.intro.duration,
            config.intro.ease,
            config.intro.delay,
        );
    }
    tl
}

#[derive(Debug)]
pub struct ActiveCarousel {
    engine: Engine,
    controller: ScrubController,
    normalizer: InputNormalizer,
    gate: InteractionGate,
    items: Vec<TargetId>,
    intro: TimelineId,
    frame: Frame,
    outputs: Outputs,
}

impl ActiveCarousel {
    #[inline]
    pub fn controller(&self) -> &ScrubController {
        &self.controller
    }

    #[inline]
    pub fn normalizer(&self) -> &InputNormalizer {
        &self.normalizer
    }

    #[inline]
    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    /// Id of the intro fade while it is still playing.
    pub fn intro(&self) -> Option<TimelineId> {
        self.engine.is_playing(self.intro).then_some(self.intro)
    }

    /// Move the cursor by `delta` from the last requested position.
    pub fn scrub_by(&mut self, delta: f64) -> ScrubOutcome {
        let to = self.controller.target() + delta;
        self.controller.scrub_to(to)
    }

    pub fn handle(&mut self, event: InputEvent) -> EventDisposition {
        trace!(?event, "input");
        match event {
            InputEvent::PointerEnter => {
                self.gate.pointer_enter();
                EventDisposition::Ignored
            }
            InputEvent::PointerLeave => {
                self.gate.pointer_leave();
                EventDisposition::Ignored
            }
            InputEvent::VisibilityChanged { fraction } => {
                self.gate.set_visible_fraction(fraction);
                EventDisposition::Ignored
            }
            InputEvent::Wheel { delta_y } => {
                if !self.gate.allows_wheel() {
                    return EventDisposition::Ignored;
                }
                if let Some(delta) = self.normalizer.wheel(delta_y) {
                    self.scrub_by(delta);
                }
                EventDisposition::Consumed
            }
            InputEvent::TouchStart { y } => {
                if self.gate.allows_touch() {
                    self.normalizer.touch_start(y);
                }
                EventDisposition::Ignored
            }
            InputEvent::TouchMove { y } => {
                if !self.gate.allows_touch() {
                    return EventDisposition::Ignored;
                }
                match self.normalizer.touch_move(y) {
                    Some(delta) => {
                        self.scrub_by(delta);
                        EventDisposition::Consumed
                    }
                    None => EventDisposition::Ignored,
                }
            }
            InputEvent::Advance | InputEvent::Retreat => {
                if !self.gate.allows_buttons() {
                    return EventDisposition::Ignored;
                }
                let delta = if event == InputEvent::Advance {
                    self.normalizer.advance()
                } else {
                    self.normalizer.retreat()
                };
                self.scrub_by(delta);
                EventDisposition::Consumed
            }
        }
    }

    pub fn update(&mut self, dt: f64) -> &Outputs {
        self.outputs.clear();
        self.engine.update(dt);
        self.controller.update(dt);
        self.frame.clear();
        self.controller.seamless_loop().render(&mut self.frame);
        self.engine.commit(&self.frame);
        self.outputs.changes = self.engine.drain_changes();
        self.outputs.events.extend(self.controller.drain_events());
        &self.outputs
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        let lp = self.controller.seamless_loop();
        CarouselSnapshot {
            active: true,
            iteration: self.controller.iteration(),
            target: self.controller.target(),
            scrub_time: self.controller.scrub_time(),
            accumulator: self.normalizer.accumulator(),
            loop_time: lp.time(),
            loop_total_time: lp.total_time(),
            loop_duration: lp.duration(),
            hovered: self.gate.is_hovered(),
            visible: self.gate.is_visible(),
            items: self
                .items
                .iter()
                .map(|&t| self.engine.item_state(t))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.normalizer.reset();
    }
}

#[derive(Debug)]
pub struct InertCarousel {
    engine: Engine,
    items: Vec<TargetId>,
    outputs: Outputs,
}

impl InertCarousel {
    /// Emits the rest state on the first call, nothing afterwards.
    pub fn update(&mut self, dt: f64) -> &Outputs {
        self.outputs.clear();
        self.engine.update(dt);
        self.outputs.changes = self.engine.drain_changes();
        &self.outputs
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            active: false,
            iteration: 0,
            target: 0.0,
            scrub_time: 0.0,
            accumulator: 0.0,
            loop_time: 0.0,
            loop_total_time: 0.0,
            loop_duration: 0.0,
            hovered: false,
            visible: false,
            items: self
                .items
                .iter()
                .map(|&t| self.engine.item_state(t))
                .collect(),
        }
    }
}
