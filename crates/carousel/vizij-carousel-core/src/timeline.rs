//! Tweens and timelines.
//!
//! A [`Timeline`] is a list of base values plus tweens placed at offsets.
//! Rendering at time `t` writes the base values first, then every tween whose
//! start is `<= t` in insertion order, so later children overwrite earlier
//! ones on shared properties. Tweens never render before they start.

use serde::{Deserialize, Serialize};

use crate::ease::{lerp, Ease};
use crate::ids::TargetId;
use crate::store::{Frame, Prop};

/// One property animated by a tween.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropRange {
    pub prop: Prop,
    pub from: f32,
    pub to: f32,
}

/// Animation of one target over `duration`, optionally repeated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub target: TargetId,
    pub ranges: Vec<PropRange>,
    pub duration: f64,
    #[serde(default)]
    pub ease: Ease,
    /// Extra iterations after the first.
    #[serde(default)]
    pub repeat: u32,
    /// Odd iterations play backwards.
    #[serde(default)]
    pub yoyo: bool,
}

impl Tween {
    pub fn new(target: TargetId, duration: f64) -> Self {
        Self {
            target,
            ranges: Vec::new(),
            duration: duration.max(0.0),
            ease: Ease::Linear,
            repeat: 0,
            yoyo: false,
        }
    }

    pub fn range(mut self, prop: Prop, from: f32, to: f32) -> Self {
        self.ranges.push(PropRange { prop, from, to });
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Play forward, then back, `repeat` extra times.
    pub fn yoyo(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self.yoyo = true;
        self
    }

    /// Length including repeats.
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.duration * (self.repeat as f64 + 1.0)
    }

    /// Eased progress at a local time (time since the tween started).
    pub fn progress_at(&self, local: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let total = self.total_duration();
        let local = local.clamp(0.0, total);
        let mut cycle = (local / self.duration).floor();
        let mut p = (local - cycle * self.duration) / self.duration;
        // The very end belongs to the last iteration at full progress.
        if cycle > self.repeat as f64 {
            cycle = self.repeat as f64;
            p = 1.0;
        }
        if self.yoyo && (cycle as u64) % 2 == 1 {
            p = 1.0 - p;
        }
        self.ease.apply(p)
    }

    pub fn render(&self, local: f64, frame: &mut Frame) {
        let k = self.progress_at(local);
        for r in &self.ranges {
            let v = lerp(r.from as f64, r.to as f64, k) as f32;
            frame.write(self.target, r.prop, v);
        }
    }
}

/// A tween placed at an offset inside a timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub at: f64,
    pub tween: Tween,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseValue {
    pub target: TargetId,
    pub prop: Prop,
    pub value: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    base: Vec<BaseValue>,
    children: Vec<Child>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value written before any child renders.
    pub fn set(&mut self, target: TargetId, prop: Prop, value: f32) -> &mut Self {
        if let Some(b) = self
            .base
            .iter_mut()
            .find(|b| b.target == target && b.prop == prop)
        {
            b.value = value;
        } else {
            self.base.push(BaseValue {
                target,
                prop,
                value,
            });
        }
        self
    }

    /// Insert a tween at `at`.
    pub fn add(&mut self, tween: Tween, at: f64) -> &mut Self {
        self.children.push(Child {
            at: at.max(0.0),
            tween,
        });
        self
    }

    /// Explicit from/to tween on several properties of one target.
    pub fn from_to(
        &mut self,
        target: TargetId,
        ranges: &[(Prop, f32, f32)],
        duration: f64,
        ease: Ease,
        at: f64,
    ) -> &mut Self {
        let tween = ranges
            .iter()
            .fold(Tween::new(target, duration).ease(ease), |t, &(p, a, b)| {
                t.range(p, a, b)
            });
        self.add(tween, at)
    }

    /// Tween one property to `value`, starting from its base value (or its
    /// rest value when the timeline sets none).
    pub fn to(
        &mut self,
        target: TargetId,
        prop: Prop,
        value: f32,
        duration: f64,
        ease: Ease,
        at: f64,
    ) -> &mut Self {
        let from = self.base_value(target, prop).unwrap_or(prop.rest_value());
        self.from_to(target, &[(prop, from, value)], duration, ease, at)
    }

    pub fn base_value(&self, target: TargetId, prop: Prop) -> Option<f32> {
        self.base
            .iter()
            .find(|b| b.target == target && b.prop == prop)
            .map(|b| b.value)
    }

    /// End of the last child.
    pub fn duration(&self) -> f64 {
        self.children
            .iter()
            .map(|c| c.at + c.tween.total_duration())
            .fold(0.0, f64::max)
    }

    #[inline]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.base.is_empty()
    }

    pub fn render(&self, time: f64, frame: &mut Frame) {
        for b in &self.base {
            frame.write(b.target, b.prop, b.value);
        }
        for child in &self.children {
            if child.at <= time {
                child.tween.render(time - child.at, frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "left={a} right={b}");
    }

    #[test]
    fn yoyo_returns_to_start() {
        let t = Tween::new(TargetId(0), 0.5)
            .range(Prop::Opacity, 0.0, 1.0)
            .ease(Ease::Power1In)
            .yoyo(1);
        approx(t.total_duration(), 1.0);
        approx(t.progress_at(0.0), 0.0);
        approx(t.progress_at(0.25), 0.25);
        approx(t.progress_at(0.5), 1.0);
        // reverse half mirrors the forward half
        approx(t.progress_at(0.75), t.progress_at(0.25));
        approx(t.progress_at(1.0), 0.0);
        approx(t.progress_at(5.0), 0.0);
    }

    #[test]
    fn children_do_not_render_before_start() {
        let mut tl = Timeline::new();
        tl.set(TargetId(0), Prop::XPercent, 400.0);
        tl.from_to(
            TargetId(0),
            &[(Prop::XPercent, 400.0, -400.0)],
            1.0,
            Ease::Linear,
            2.0,
        );
        let mut frame = Frame::new();
        tl.render(1.0, &mut frame);
        assert_eq!(frame.get(TargetId(0), Prop::XPercent), Some(400.0));
        let mut frame = Frame::new();
        tl.render(2.5, &mut frame);
        assert_eq!(frame.get(TargetId(0), Prop::XPercent), Some(0.0));
        approx(tl.duration(), 3.0);
    }

    #[test]
    fn later_children_win() {
        let mut tl = Timeline::new();
        tl.from_to(TargetId(1), &[(Prop::Scale, 0.0, 1.0)], 1.0, Ease::Linear, 0.0);
        tl.from_to(TargetId(1), &[(Prop::Scale, 5.0, 5.0)], 1.0, Ease::Linear, 0.5);
        let mut frame = Frame::new();
        tl.render(0.25, &mut frame);
        assert_eq!(frame.get(TargetId(1), Prop::Scale), Some(0.25));
        tl.render(0.75, &mut frame);
        assert_eq!(frame.get(TargetId(1), Prop::Scale), Some(5.0));
    }

    #[test]
    fn to_starts_from_base_value() {
        let mut tl = Timeline::new();
        tl.set(TargetId(2), Prop::ContentOpacity, 0.0);
        tl.to(TargetId(2), Prop::ContentOpacity, 1.0, 0.5, Ease::Linear, 0.1);
        let child = &tl.children()[0];
        assert_eq!(child.tween.ranges[0].from, 0.0);
        assert_eq!(child.tween.ranges[0].to, 1.0);
        approx(tl.duration(), 0.6);
    }
}
