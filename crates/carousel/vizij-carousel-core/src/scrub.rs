//! Scrub controller: the virtual-time cursor over a seamless loop.
//!
//! Requests are absolute cursor times. A request inside the current cycle
//! retargets a short eased transition (`ScrubTween`) that drives the loop's
//! local time; a request outside it wraps the loop by whole cycles instead.
//! The iteration counter stays in `0..K`; when it rolls over, the cursor is
//! re-based by `D * K` so positions stay comparable to `D * iteration`.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CarouselConfig;
use crate::ease::{lerp, Ease};
use crate::outputs::{CarouselEvent, WrapDirection};
use crate::playhead::RepeatBoundary;
use crate::seamless_loop::SeamlessLoop;

/// Snap `x` to the nearest multiple of `increment`; ties go toward +∞.
pub fn snap(x: f64, increment: f64) -> f64 {
    if !(increment.is_finite() && increment > 0.0) {
        return x;
    }
    let v = (x / increment + 0.5).floor() * increment;
    // drop the representation noise of the multiplication
    (v * 1e12).round() / 1e12
}

/// Progress of one `step` of the transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScrubStep {
    Idle,
    Moved,
    Settled,
}

/// Eased transition of the scrub value toward a target. Retargeting re-bases
/// from the live value, never from the previous target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrubTween {
    value: f64,
    from: f64,
    to: f64,
    elapsed: f64,
    duration: f64,
    ease: Ease,
    running: bool,
}

impl ScrubTween {
    pub fn new(duration: f64, ease: Ease) -> Self {
        Self {
            value: 0.0,
            from: 0.0,
            to: 0.0,
            elapsed: 0.0,
            duration: duration.max(0.0),
            ease,
            running: false,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Restart toward `to` from the current value.
    pub fn retarget(&mut self, to: f64) {
        self.from = self.value;
        self.to = to;
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Shift every stored time by `offset` without moving visually.
    pub fn rebase(&mut self, offset: f64) {
        self.value += offset;
        self.from += offset;
        self.to += offset;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn step(&mut self, dt: f64) -> ScrubStep {
        if !self.running {
            return ScrubStep::Idle;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.value = self.to;
            self.running = false;
            return ScrubStep::Settled;
        }
        let k = self.ease.apply(self.elapsed / self.duration);
        self.value = lerp(self.from, self.to, k);
        ScrubStep::Moved
    }
}

/// What a single `scrub_to` request did.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrubOutcome {
    Retargeted { target: f64 },
    WrappedForward { iteration: u32 },
    WrappedBackward { iteration: u32 },
}

#[derive(Clone, Debug)]
pub struct ScrubController {
    seamless: SeamlessLoop,
    iteration: u32,
    cycle: u32,
    target: f64,
    spacing: f64,
    scrub: ScrubTween,
    events: Vec<CarouselEvent>,
}

impl ScrubController {
    pub fn new(seamless: SeamlessLoop, cfg: &CarouselConfig) -> Self {
        Self {
            spacing: seamless.layout().spacing,
            seamless,
            iteration: 0,
            cycle: cfg.iteration_cycle.max(1),
            target: 0.0,
            scrub: ScrubTween::new(cfg.scrub.duration, cfg.scrub.ease),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Iteration range K.
    #[inline]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Last snapped cursor request.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Live value of the eased transition.
    #[inline]
    pub fn scrub_time(&self) -> f64 {
        self.scrub.value()
    }

    #[inline]
    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_running()
    }

    #[inline]
    pub fn seamless_loop(&self) -> &SeamlessLoop {
        &self.seamless
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.seamless.duration()
    }

    /// Request an absolute cursor time. One call wraps at most once.
    pub fn scrub_to(&mut self, time: f64) -> ScrubOutcome {
        let d = self.seamless.duration();
        let progress = (time - d * self.iteration as f64) / d;
        if progress > 1.0 {
            self.wrap_forward()
        } else if progress < 0.0 {
            self.wrap_backward()
        } else {
            self.target = snap(time, self.spacing);
            self.scrub.retarget(self.target);
            trace!(
                target = self.target,
                from = self.scrub.value(),
                "scrub retargeted"
            );
            ScrubOutcome::Retargeted {
                target: self.target,
            }
        }
    }

    fn wrap_forward(&mut self) -> ScrubOutcome {
        let d = self.seamless.duration();
        self.iteration += 1;
        let total = self.seamless.total_time() + d;
        let crossing = self.seamless.set_total_time(total);
        self.note_boundary(crossing);
        self.scrub.pause();
        if self.iteration >= self.cycle {
            self.iteration = 0;
            self.rebase(-d * self.cycle as f64);
        }
        debug!(iteration = self.iteration, total, "wrapped forward");
        self.wrapped(WrapDirection::Forward)
    }

    fn wrap_backward(&mut self) -> ScrubOutcome {
        if self.iteration == 0 {
            let d = self.seamless.duration();
            let span = d * self.cycle as f64;
            self.iteration = self.cycle - 1;
            let crossing = self
                .seamless
                .set_total_time(self.seamless.total_time() + span);
            self.note_boundary(crossing);
            self.rebase(span);
        } else {
            self.iteration -= 1;
        }
        self.scrub.pause();
        debug!(
            iteration = self.iteration,
            total = self.seamless.total_time(),
            "wrapped backward"
        );
        self.wrapped(WrapDirection::Backward)
    }

    fn wrapped(&mut self, direction: WrapDirection) -> ScrubOutcome {
        self.events.push(CarouselEvent::Wrapped {
            direction,
            iteration: self.iteration,
        });
        match direction {
            WrapDirection::Forward => ScrubOutcome::WrappedForward {
                iteration: self.iteration,
            },
            WrapDirection::Backward => ScrubOutcome::WrappedBackward {
                iteration: self.iteration,
            },
        }
    }

    fn rebase(&mut self, offset: f64) {
        self.target += offset;
        self.scrub.rebase(offset);
    }

    fn note_boundary(&mut self, crossing: Option<RepeatBoundary>) {
        if let Some(b) = crossing {
            trace!(repeat = b.repeat, nudged = b.nudged, "loop repeat boundary");
            self.events.push(CarouselEvent::LoopRepeated {
                repeat: b.repeat,
                nudged: b.nudged,
            });
        }
    }

    /// Advance the transition and move the loop with it.
    pub fn update(&mut self, dt: f64) -> ScrubStep {
        let step = self.scrub.step(dt);
        if step != ScrubStep::Idle {
            let local = self.scrub.value() - self.seamless.duration() * self.iteration as f64;
            // the transition owns the position; a nudge here would leave
            // the loop off the cursor once it settles on a cycle edge
            let crossing = self.seamless.seek_time(local);
            self.note_boundary(crossing);
        }
        if step == ScrubStep::Settled {
            self.events.push(CarouselEvent::ScrubSettled {
                time: self.scrub.value(),
            });
        }
        step
    }

    /// Back to iteration 0 with the cursor and loop at their origin.
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.target = 0.0;
        self.scrub = ScrubTween::new(self.scrub.duration, self.scrub.ease);
        self.seamless.restart();
        self.seamless.pause();
        self.events.clear();
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, CarouselEvent> {
        self.events.drain(..)
    }
}
