//! Playhead: local/total time bookkeeping for finite and repeating timelines.
//!
//! `total_time` is the absolute elapsed time and is never wrapped. The local
//! time is derived from it: `total = repeat * duration + local`. A total that
//! lands exactly on a boundary belongs to the end of the previous repeat.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Play `n` extra times after the first pass.
    Count(u32),
    Forever,
}

/// Numerical guard for repeat boundaries: when continuous motion crosses a
/// boundary and the local time sits within `tolerance` of the duration, the
/// total time is pulled back by `nudge` so the boundary is neither skipped
/// nor reported twice.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryNudge {
    pub tolerance: f64,
    pub nudge: f64,
}

impl Default for BoundaryNudge {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            nudge: 0.01,
        }
    }
}

/// Reported when the repeat index changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatBoundary {
    /// Repeat index after the crossing.
    pub repeat: i64,
    /// Whether the boundary nudge was applied.
    pub nudged: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playhead {
    duration: f64,
    total_time: f64,
    repeat: Repeat,
    paused: bool,
    time_scale: f64,
    nudge: Option<BoundaryNudge>,
}

impl Playhead {
    pub fn new(duration: f64, repeat: Repeat) -> Self {
        Self {
            duration: duration.max(0.0),
            total_time: 0.0,
            repeat,
            paused: false,
            time_scale: 1.0,
            nudge: None,
        }
    }

    pub fn with_nudge(mut self, nudge: BoundaryNudge) -> Self {
        self.nudge = Some(nudge);
        self
    }

    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Length including repeats; `None` when repeating forever.
    pub fn total_duration(&self) -> Option<f64> {
        match self.repeat {
            Repeat::Count(n) => Some(self.duration * (n as f64 + 1.0)),
            Repeat::Forever => None,
        }
    }

    #[inline]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Local time within the current repeat.
    #[inline]
    pub fn time(&self) -> f64 {
        self.split(self.total_time).1
    }

    #[inline]
    pub fn repeat_index(&self) -> i64 {
        self.split(self.total_time).0
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    /// Rewind to zero and play.
    pub fn restart(&mut self) {
        self.total_time = 0.0;
        self.paused = false;
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }

    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_complete(&self) -> bool {
        match self.total_duration() {
            Some(total) => self.total_time >= total,
            None => false,
        }
    }

    /// Seek the absolute time. Seeks report crossings but never nudge: a jump
    /// by whole cycles must land exactly where it was asked to.
    pub fn set_total_time(&mut self, total: f64) -> Option<RepeatBoundary> {
        let before = self.repeat_index();
        self.total_time = total;
        let after = self.repeat_index();
        (before != after).then_some(RepeatBoundary {
            repeat: after,
            nudged: false,
        })
    }

    /// Move to a local time relative to the current repeat. Values outside
    /// `[0, duration]` spill into neighbouring repeats.
    pub fn set_time(&mut self, local: f64) -> Option<RepeatBoundary> {
        let base = self.repeat_index() as f64 * self.duration;
        self.move_to(base + local)
    }

    /// Like `set_time`, but a seek: crossings are reported, never nudged.
    /// Used when something else positions the playhead every frame.
    pub fn seek_time(&mut self, local: f64) -> Option<RepeatBoundary> {
        let base = self.repeat_index() as f64 * self.duration;
        self.set_total_time(base + local)
    }

    /// Advance by `dt` (scaled) unless paused.
    pub fn advance(&mut self, dt: f64) -> Option<RepeatBoundary> {
        if self.paused {
            return None;
        }
        let mut next = self.total_time + dt * self.time_scale;
        if let Some(end) = self.total_duration() {
            next = next.clamp(0.0, end);
        }
        self.move_to(next)
    }

    fn move_to(&mut self, total: f64) -> Option<RepeatBoundary> {
        let before = self.repeat_index();
        self.total_time = total;
        let (after, local) = self.split(total);
        if before == after {
            return None;
        }
        let mut nudged = false;
        if let Some(n) = self.nudge {
            if (local - self.duration).abs() < n.tolerance {
                self.total_time -= n.nudge;
                nudged = true;
            }
        }
        Some(RepeatBoundary {
            repeat: self.repeat_index(),
            nudged,
        })
    }

    fn split(&self, total: f64) -> (i64, f64) {
        let d = self.duration;
        if d <= 0.0 {
            return (0, 0.0);
        }
        let total = match self.total_duration() {
            Some(end) => total.clamp(0.0, end),
            None => total,
        };
        let mut repeat = (total / d).floor();
        let mut local = total - repeat * d;
        if total > 0.0 && local <= 0.0 {
            repeat -= 1.0;
            local = d;
        }
        (repeat as i64, local.clamp(0.0, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "left={a} right={b}");
    }

    #[test]
    fn boundary_belongs_to_previous_repeat() {
        let mut p = Playhead::new(2.0, Repeat::Forever);
        p.set_total_time(4.0);
        assert_eq!(p.repeat_index(), 1);
        approx(p.time(), 2.0);
        p.set_total_time(4.5);
        assert_eq!(p.repeat_index(), 2);
        approx(p.time(), 0.5);
    }

    #[test]
    fn negative_totals_wrap_backward() {
        let mut p = Playhead::new(2.0, Repeat::Forever);
        p.set_total_time(-0.5);
        assert_eq!(p.repeat_index(), -1);
        approx(p.time(), 1.5);
    }

    #[test]
    fn finite_playhead_clamps_and_completes() {
        let mut p = Playhead::new(1.0, Repeat::Count(1));
        approx(p.total_duration().unwrap(), 2.0);
        p.advance(5.0);
        assert!(p.is_complete());
        approx(p.total_time(), 2.0);
        approx(p.time(), 1.0);
    }

    #[test]
    fn paused_playhead_does_not_advance() {
        let mut p = Playhead::new(1.0, Repeat::Forever).paused();
        assert!(p.advance(0.3).is_none());
        approx(p.total_time(), 0.0);
        p.play();
        p.set_time_scale(2.0);
        p.advance(0.3);
        approx(p.total_time(), 0.6);
        p.restart();
        approx(p.total_time(), 0.0);
    }

    #[test]
    fn landing_on_boundary_is_nudged_back() {
        let mut p = Playhead::new(1.0, Repeat::Forever).with_nudge(BoundaryNudge::default());
        p.set_total_time(0.5);
        let crossing = p.advance(1.5).expect("crossed");
        assert!(crossing.nudged);
        approx(p.total_time(), 1.99);
        assert_eq!(crossing.repeat, 1);
    }

    #[test]
    fn crossing_mid_cycle_is_not_nudged() {
        let mut p = Playhead::new(1.0, Repeat::Forever).with_nudge(BoundaryNudge::default());
        p.set_total_time(0.9);
        let crossing = p.advance(0.3).expect("crossed");
        assert!(!crossing.nudged);
        approx(p.time(), 0.2);
    }

    #[test]
    fn seeks_by_whole_cycles_are_exact() {
        let mut p = Playhead::new(0.6, Repeat::Forever).with_nudge(BoundaryNudge::default());
        let crossing = p.set_total_time(6.0).expect("crossed");
        assert!(!crossing.nudged);
        approx(p.total_time(), 6.0);
    }

    #[test]
    fn relative_seek_onto_boundary_is_exact() {
        let mut p = Playhead::new(0.6, Repeat::Forever).with_nudge(BoundaryNudge::default());
        p.set_total_time(0.7);
        let crossing = p.seek_time(0.0).expect("crossed");
        assert!(!crossing.nudged);
        approx(p.total_time(), 0.6);
        approx(p.time(), 0.6);
        assert_eq!(crossing.repeat, 0);
    }

    #[test]
    fn set_time_is_relative_to_current_repeat() {
        let mut p = Playhead::new(1.0, Repeat::Forever);
        p.set_total_time(3.25);
        p.set_time(0.75);
        approx(p.total_time(), 3.75);
        p.set_time(-0.25);
        approx(p.total_time(), 2.75);
        assert_eq!(p.repeat_index(), 2);
    }
}
