//! Engine: owns the property store, the timelines it plays, and the effects
//! registry.
//!
//! There is no ambient global instance; hosts construct an `Engine` and move
//! it into whatever drives it (usually a `Carousel`).
//!
//! Methods:
//! - play / pause / resume / seek / stop per timeline
//! - update (advance → render → commit → retire completed timelines)
//! - set / commit for values written outside played timelines
//! - pause_all / play_all / set_time_scale as global controls

use tracing::trace;

use crate::effects::{EffectOverrides, EffectRegistry};
use crate::error::Result;
use crate::ids::{IdAllocator, TargetId, TimelineId};
use crate::outputs::Change;
use crate::playhead::{Playhead, Repeat};
use crate::store::{Frame, ItemState, Prop, PropertyStore};
use crate::timeline::Timeline;

#[derive(Debug)]
struct Active {
    id: TimelineId,
    timeline: Timeline,
    playhead: Playhead,
}

#[derive(Debug)]
pub struct Engine {
    ids: IdAllocator,
    store: PropertyStore,
    frame: Frame,
    active: Vec<Active>,
    effects: EffectRegistry,
    time_scale: f64,
    paused_all: bool,
    reduced_motion: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_registry(EffectRegistry::default())
    }

    pub fn with_registry(effects: EffectRegistry) -> Self {
        Self {
            ids: IdAllocator::new(),
            store: PropertyStore::new(),
            frame: Frame::new(),
            active: Vec::new(),
            effects,
            time_scale: 1.0,
            paused_all: false,
            reduced_motion: false,
        }
    }

    /// Preference handed to effects when they build.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    #[inline]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    #[inline]
    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    #[inline]
    pub fn effects_mut(&mut self) -> &mut EffectRegistry {
        &mut self.effects
    }

    /// Build a named effect for `targets`.
    pub fn effect(
        &self,
        name: &str,
        targets: &[TargetId],
        overrides: &EffectOverrides,
    ) -> Result<Timeline> {
        self.effects
            .build(name, targets, overrides, self.reduced_motion)
    }

    /// Start playing a timeline once. Its state at time 0 is rendered and
    /// committed immediately.
    pub fn play(&mut self, timeline: Timeline) -> TimelineId {
        let id = self.ids.alloc_timeline();
        let playhead = Playhead::new(timeline.duration(), Repeat::Count(0));
        self.frame.clear();
        timeline.render(0.0, &mut self.frame);
        self.store.commit(&self.frame);
        trace!(?id, duration = playhead.duration(), "timeline started");
        self.active.push(Active {
            id,
            timeline,
            playhead,
        });
        id
    }

    fn find_mut(&mut self, id: TimelineId) -> Option<&mut Active> {
        self.active.iter_mut().find(|a| a.id == id)
    }

    pub fn pause(&mut self, id: TimelineId) -> bool {
        match self.find_mut(id) {
            Some(a) => {
                a.playhead.pause();
                true
            }
            None => false,
        }
    }

    pub fn resume(&mut self, id: TimelineId) -> bool {
        match self.find_mut(id) {
            Some(a) => {
                a.playhead.play();
                true
            }
            None => false,
        }
    }

    /// Seek a timeline; it renders at the new time on the next update.
    pub fn seek(&mut self, id: TimelineId, time: f64) -> bool {
        match self.find_mut(id) {
            Some(a) => {
                a.playhead.set_total_time(time);
                true
            }
            None => false,
        }
    }

    /// Drop a timeline without rendering it again.
    pub fn stop(&mut self, id: TimelineId) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.id != id);
        before != self.active.len()
    }

    pub fn playhead(&self, id: TimelineId) -> Option<&Playhead> {
        self.active.iter().find(|a| a.id == id).map(|a| &a.playhead)
    }

    #[inline]
    pub fn is_playing(&self, id: TimelineId) -> bool {
        self.active.iter().any(|a| a.id == id)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Advance every running timeline by `dt`, render them in play order and
    /// commit the result. Completed timelines render their final state once
    /// and are then retired.
    pub fn update(&mut self, dt: f64) {
        let dt = if self.paused_all {
            0.0
        } else {
            dt * self.time_scale
        };
        self.frame.clear();
        for a in &mut self.active {
            a.playhead.advance(dt);
            a.timeline.render(a.playhead.time(), &mut self.frame);
        }
        self.store.commit(&self.frame);
        self.active.retain(|a| {
            let done = a.playhead.is_complete();
            if done {
                trace!(id = ?a.id, "timeline completed");
            }
            !done
        });
    }

    /// Write one value directly.
    pub fn set(&mut self, target: TargetId, prop: Prop, value: f32) {
        self.store.write(target, prop, value);
    }

    /// Commit a frame rendered outside the engine.
    pub fn commit(&mut self, frame: &Frame) {
        self.store.commit(frame);
    }

    /// Values changed since the last drain, sorted by target then property.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        self.store
            .drain_changes()
            .into_iter()
            .map(|(target, prop, value)| Change {
                target,
                prop,
                value,
            })
            .collect()
    }

    #[inline]
    pub fn value(&self, target: TargetId, prop: Prop) -> Option<f32> {
        self.store.get(target, prop)
    }

    #[inline]
    pub fn item_state(&self, target: TargetId) -> ItemState {
        self.store.item_state(target)
    }

    #[inline]
    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    pub fn pause_all(&mut self) {
        self.paused_all = true;
    }

    pub fn play_all(&mut self) {
        self.paused_all = false;
    }

    #[inline]
    pub fn is_paused_all(&self) -> bool {
        self.paused_all
    }

    /// Global speed multiplier applied to every played timeline. The carousel's
    /// scrub transition is driven outside the engine and is not affected.
    pub fn set_time_scale(&mut self, multiplier: f64) {
        self.time_scale = multiplier.max(0.0);
    }

    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::Ease;

    fn fade(target: TargetId) -> Timeline {
        let mut tl = Timeline::new();
        tl.set(target, Prop::ContentOpacity, 0.0);
        tl.to(target, Prop::ContentOpacity, 1.0, 1.0, Ease::Linear, 0.0);
        tl
    }

    #[test]
    fn play_renders_initial_state() {
        let mut engine = Engine::new();
        engine.play(fade(TargetId(0)));
        assert_eq!(engine.value(TargetId(0), Prop::ContentOpacity), Some(0.0));
        let changes = engine.drain_changes();
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn completed_timelines_commit_final_state_and_retire() {
        let mut engine = Engine::new();
        let id = engine.play(fade(TargetId(0)));
        engine.update(0.5);
        assert_eq!(engine.value(TargetId(0), Prop::ContentOpacity), Some(0.5));
        assert!(engine.is_playing(id));
        engine.update(0.75);
        assert_eq!(engine.value(TargetId(0), Prop::ContentOpacity), Some(1.0));
        assert!(!engine.is_playing(id));
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn global_controls_scale_and_freeze_time() {
        let mut engine = Engine::new();
        let id = engine.play(fade(TargetId(1)));
        engine.set_time_scale(2.0);
        engine.update(0.25);
        assert_eq!(engine.value(TargetId(1), Prop::ContentOpacity), Some(0.5));
        engine.pause_all();
        engine.update(1.0);
        assert_eq!(engine.value(TargetId(1), Prop::ContentOpacity), Some(0.5));
        engine.play_all();
        engine.pause(id);
        engine.update(1.0);
        assert_eq!(engine.value(TargetId(1), Prop::ContentOpacity), Some(0.5));
        engine.resume(id);
        engine.seek(id, 0.75);
        engine.update(0.0);
        assert_eq!(engine.value(TargetId(1), Prop::ContentOpacity), Some(0.75));
    }

    #[test]
    fn effects_follow_reduced_motion() {
        let mut engine = Engine::new();
        engine.set_reduced_motion(true);
        let tl = engine
            .effect("reveal", &[TargetId(4)], &EffectOverrides::default())
            .unwrap();
        let id = engine.play(tl);
        assert_eq!(engine.value(TargetId(4), Prop::Opacity), Some(1.0));
        engine.update(0.016);
        assert!(!engine.is_playing(id));
    }
}
