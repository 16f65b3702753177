//! Seamless loop builder.
//!
//! Items are choreographed on a "raw" timeline: every slot starts a pulse
//! (scale/opacity in then out) and a horizontal sweep, one slot every
//! `spacing`. The raw sequence is padded with `overlap` extra slots on both
//! sides so that its state at `window_start` and at `loop_time` is visually
//! identical. The loop itself is a forever-repeating playhead of duration
//! `D = N * spacing` whose local time maps onto the raw time pointer through
//! two linear segments:
//!
//! ```text
//! local  0 ───────────── seg1 ──────────────┬──────── seg2 ──────── D
//! raw    phase ─────────────────► loop_time │ window_start ─► phase
//! ```
//!
//! Local `0` and local `D` land on the same raw time, so repeating the loop
//! never shows a seam.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ease::Ease;
use crate::error::{CarouselError, Result};
use crate::ids::TargetId;
use crate::playhead::{BoundaryNudge, Playhead, Repeat, RepeatBoundary};
use crate::store::{Frame, ItemState, Prop};
use crate::timeline::{Timeline, Tween};

/// Length of the fade-in half of the pulse (the yoyo doubles it).
pub const PULSE_DURATION: f64 = 0.5;
/// Time an item takes to cross from one side to the other.
pub const SWEEP_DURATION: f64 = 1.0;
/// Horizontal extent of the sweep in percent of the item width.
pub const SWEEP_EXTENT: f32 = 400.0;

/// Smallest spacing accepted; the overlap padding grows as `1 / spacing`.
pub const MIN_SPACING: f64 = 1e-3;
/// Upper bound on `item_count + 2 * overlap`.
pub const MAX_SLOTS: usize = 1 << 14;

const PHASE_EPS: f64 = 1e-9;

/// Linear mapping of a span of loop time onto a span of raw time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Loop-local start.
    pub start: f64,
    pub duration: f64,
    pub raw_from: f64,
    pub raw_to: f64,
}

impl Segment {
    #[inline]
    fn raw_at(&self, local: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.raw_to;
        }
        let k = ((local - self.start) / self.duration).clamp(0.0, 1.0);
        self.raw_from + (self.raw_to - self.raw_from) * k
    }
}

/// Derived timing of a loop for `item_count` items at `spacing`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopLayout {
    pub item_count: usize,
    pub spacing: f64,
    /// Padding slots on each side of the raw sequence.
    pub overlap: usize,
    /// Raw slots: `item_count + 2 * overlap`.
    pub slots: usize,
    pub start_time: f64,
    pub loop_time: f64,
    pub window_start: f64,
    /// Raw time shown at local time 0 (`start_time` folded into the window).
    pub phase: f64,
    /// Cycle duration D.
    pub duration: f64,
    segments: Vec<Segment>,
}

impl LoopLayout {
    pub fn new(item_count: usize, spacing: f64) -> Result<Self> {
        if item_count == 0 {
            return Err(CarouselError::EmptyItems);
        }
        if !(spacing.is_finite() && spacing >= MIN_SPACING) {
            return Err(CarouselError::InvalidSpacing { spacing });
        }
        let n = item_count as f64;
        let o = (1.0 / spacing).ceil();
        let slots = n + 2.0 * o;
        if slots > MAX_SLOTS as f64 {
            return Err(CarouselError::TooManySlots {
                slots,
                max: MAX_SLOTS,
            });
        }
        let overlap = o as usize;
        let start_time = n * spacing + PULSE_DURATION;
        let loop_time = (n + o) * spacing + SWEEP_DURATION;
        let window_start = o * spacing + SWEEP_DURATION;
        let duration = loop_time - window_start;

        let mut offset = (start_time - window_start).rem_euclid(duration);
        if duration - offset < PHASE_EPS {
            offset = 0.0;
        }
        let phase = window_start + offset;

        let mut segments = Vec::with_capacity(2);
        let seg1 = loop_time - phase;
        if seg1 > 0.0 {
            segments.push(Segment {
                start: 0.0,
                duration: seg1,
                raw_from: phase,
                raw_to: loop_time,
            });
        }
        let seg2 = phase - window_start;
        if seg2 > 0.0 {
            segments.push(Segment {
                start: seg1.max(0.0),
                duration: seg2,
                raw_from: window_start,
                raw_to: phase,
            });
        }

        Ok(Self {
            item_count,
            spacing,
            overlap,
            slots: item_count + 2 * overlap,
            start_time,
            loop_time,
            window_start,
            phase,
            duration,
            segments,
        })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Raw choreography time shown at loop-local time `local` (clamped to `[0, D]`).
    pub fn raw_time(&self, local: f64) -> f64 {
        let local = local.clamp(0.0, self.duration);
        let mut raw = self.phase;
        for seg in &self.segments {
            if local >= seg.start {
                raw = seg.raw_at(local);
            }
        }
        raw
    }

    /// Raw start time of the `i`-th item's first pass, `i` in `0..=item_count`.
    pub fn label(&self, i: usize) -> Option<f64> {
        (i <= self.item_count).then_some(i as f64 * self.spacing)
    }

    /// Whether consecutive passes of the same item never overlap. Below this
    /// the wrap inside the cycle can show.
    #[inline]
    pub fn is_seamless(&self) -> bool {
        self.duration + PHASE_EPS >= SWEEP_DURATION
    }
}

/// Forever-repeating loop over a raw item choreography.
#[derive(Clone, Debug)]
pub struct SeamlessLoop {
    layout: LoopLayout,
    items: Vec<TargetId>,
    raw: Timeline,
    playhead: Playhead,
}

/// Build the loop for `items` (in display order).
pub fn build(items: &[TargetId], spacing: f64, nudge: BoundaryNudge) -> Result<SeamlessLoop> {
    let layout = LoopLayout::new(items.len(), spacing)?;
    let mut raw = Timeline::new();
    for &item in items {
        raw.set(item, Prop::XPercent, SWEEP_EXTENT);
        raw.set(item, Prop::Opacity, 0.0);
        raw.set(item, Prop::Scale, 0.0);
    }
    for slot in 0..layout.slots {
        let item = items[slot % items.len()];
        let at = slot as f64 * spacing;
        let pulse = Tween::new(item, PULSE_DURATION)
            .range(Prop::Scale, 0.0, 1.0)
            .range(Prop::Opacity, 0.0, 1.0)
            .ease(Ease::Power1In)
            .yoyo(1);
        raw.add(pulse, at);
        raw.from_to(
            item,
            &[(Prop::XPercent, SWEEP_EXTENT, -SWEEP_EXTENT)],
            SWEEP_DURATION,
            Ease::Linear,
            at,
        );
    }

    if !layout.is_seamless() {
        warn!(
            items = items.len(),
            spacing, "loop cycle is shorter than one sweep; the wrap may be visible"
        );
    }
    debug!(
        items = items.len(),
        spacing,
        overlap = layout.overlap,
        duration = layout.duration,
        phase = layout.phase,
        "seamless loop built"
    );

    let playhead = Playhead::new(layout.duration, Repeat::Forever)
        .with_nudge(nudge)
        .paused();
    Ok(SeamlessLoop {
        layout,
        items: items.to_vec(),
        raw,
        playhead,
    })
}

impl SeamlessLoop {
    #[inline]
    pub fn layout(&self) -> &LoopLayout {
        &self.layout
    }

    #[inline]
    pub fn items(&self) -> &[TargetId] {
        &self.items
    }

    #[inline]
    pub fn raw(&self) -> &Timeline {
        &self.raw
    }

    #[inline]
    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    /// Cycle duration D.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.layout.duration
    }

    /// Local time within the current repeat.
    #[inline]
    pub fn time(&self) -> f64 {
        self.playhead.time()
    }

    pub fn set_time(&mut self, local: f64) -> Option<RepeatBoundary> {
        self.playhead.set_time(local)
    }

    /// Position the loop at `local` in the current repeat without the
    /// boundary nudge.
    pub fn seek_time(&mut self, local: f64) -> Option<RepeatBoundary> {
        self.playhead.seek_time(local)
    }

    #[inline]
    pub fn total_time(&self) -> f64 {
        self.playhead.total_time()
    }

    pub fn set_total_time(&mut self, total: f64) -> Option<RepeatBoundary> {
        self.playhead.set_total_time(total)
    }

    #[inline]
    pub fn repeat_index(&self) -> i64 {
        self.playhead.repeat_index()
    }

    pub fn pause(&mut self) {
        self.playhead.pause();
    }

    pub fn play(&mut self) {
        self.playhead.play();
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.playhead.is_paused()
    }

    /// Rewind to total time 0 and play.
    pub fn restart(&mut self) {
        self.playhead.restart();
    }

    /// Free-run the loop (no-op while paused).
    pub fn advance(&mut self, dt: f64) -> Option<RepeatBoundary> {
        self.playhead.advance(dt)
    }

    /// Render the current state of every item into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        self.render_local(self.time(), frame);
    }

    /// Render the state at a loop-local time.
    pub fn render_local(&self, local: f64, frame: &mut Frame) {
        self.raw.render(self.layout.raw_time(local), frame);
    }

    pub fn item_state(&self, index: usize) -> Option<ItemState> {
        let target = *self.items.get(index)?;
        let mut frame = Frame::new();
        self.render(&mut frame);
        Some(frame.item_state(target))
    }

    /// States of all items at an absolute total time, leaving the loop untouched.
    pub fn sample_total(&self, total: f64) -> Vec<ItemState> {
        let mut probe = self.playhead.clone();
        probe.set_total_time(total);
        let mut frame = Frame::new();
        self.render_local(probe.time(), &mut frame);
        self.states(&frame)
    }

    /// States of all items at a raw choreography time.
    pub fn sample_raw(&self, raw_time: f64) -> Vec<ItemState> {
        let mut frame = Frame::new();
        self.raw.render(raw_time, &mut frame);
        self.states(&frame)
    }

    fn states(&self, frame: &Frame) -> Vec<ItemState> {
        self.items.iter().map(|&t| frame.item_state(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: u32) -> Vec<TargetId> {
        (0..n).map(TargetId).collect()
    }

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "left={a} right={b}");
    }

    #[test]
    fn layout_for_six_items() {
        let l = LoopLayout::new(6, 0.1).unwrap();
        assert_eq!(l.overlap, 10);
        assert_eq!(l.slots, 26);
        approx(l.start_time, 1.1);
        approx(l.loop_time, 2.6);
        approx(l.window_start, 2.0);
        approx(l.duration, 0.6);
        // 1.1 lies before the window and folds to 2.3
        approx(l.phase, 2.3);
        assert_eq!(l.segments().len(), 2);
        assert!(!l.is_seamless());
    }

    #[test]
    fn local_ends_map_to_same_raw_time() {
        let l = LoopLayout::new(12, 0.1).unwrap();
        approx(l.raw_time(0.0), l.phase);
        approx(l.raw_time(l.duration), l.phase);
        let seg1 = l.loop_time - l.phase;
        approx(l.raw_time(seg1 - 1e-6), l.loop_time - 1e-6);
        approx(l.raw_time(seg1 + 1e-6), l.window_start + 1e-6);
    }

    #[test]
    fn phase_inside_window_uses_start_time() {
        let l = LoopLayout::new(20, 0.1).unwrap();
        approx(l.start_time, 2.5);
        approx(l.phase, 2.5);
    }

    #[test]
    fn labels_cover_first_pass() {
        let l = LoopLayout::new(6, 0.1).unwrap();
        approx(l.label(0).unwrap(), 0.0);
        approx(l.label(6).unwrap(), 0.6);
        assert!(l.label(7).is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            build(&[], 0.1, BoundaryNudge::default()),
            Err(CarouselError::EmptyItems)
        ));
        assert!(matches!(
            build(&items(3), 0.0, BoundaryNudge::default()),
            Err(CarouselError::InvalidSpacing { .. })
        ));
        assert!(matches!(
            build(&items(3), f64::NAN, BoundaryNudge::default()),
            Err(CarouselError::InvalidSpacing { .. })
        ));
    }

    #[test]
    fn tiny_spacing_is_rejected_before_allocating() {
        assert!(matches!(
            LoopLayout::new(3, 1e-12),
            Err(CarouselError::InvalidSpacing { .. })
        ));
        assert!(matches!(
            LoopLayout::new(3, 1e-7),
            Err(CarouselError::InvalidSpacing { .. })
        ));
        let l = LoopLayout::new(3, MIN_SPACING).unwrap();
        assert_eq!(l.slots, 3 + 2 * 1000);
        assert!(matches!(
            LoopLayout::new(MAX_SLOTS, 0.1),
            Err(CarouselError::TooManySlots { .. })
        ));
    }

    #[test]
    fn items_start_hidden_off_to_the_side() {
        let lp = build(&items(12), 0.1, BoundaryNudge::default()).unwrap();
        let states = lp.sample_raw(0.0);
        // slot 0 has started at time 0, everything else shows its base state
        assert_eq!(states[0].opacity, 0.0);
        assert_eq!(states[5].x_percent, SWEEP_EXTENT);
        assert_eq!(states[5].scale, 0.0);
        assert!(lp.is_paused());
    }
}
