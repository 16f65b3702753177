//! Input contracts and normalization.
//!
//! Hosts translate their native events into [`InputEvent`]s. The
//! [`InputNormalizer`] turns wheel, touch and button input into one signed
//! cursor delta in timeline units.

use serde::{Deserialize, Serialize};

use crate::config::InputCfg;

/// Host event delivered to the carousel.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    PointerEnter,
    PointerLeave,
    /// Fraction of the carousel region currently on screen, in [0, 1].
    VisibilityChanged { fraction: f64 },
    Wheel { delta_y: f64 },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    /// "next" button.
    Advance,
    /// "previous" button.
    Retreat,
}

/// Whether the host should suppress the native default for an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

impl EventDisposition {
    #[inline]
    pub fn is_consumed(self) -> bool {
        matches!(self, EventDisposition::Consumed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputNormalizer {
    spacing: f64,
    wheel_divisor: f64,
    touch_divisor: f64,
    touch_threshold: f64,
    accumulator: f64,
    touch_ref: Option<f64>,
}

impl InputNormalizer {
    pub fn new(spacing: f64, cfg: &InputCfg) -> Self {
        Self {
            spacing,
            wheel_divisor: cfg.wheel_divisor,
            touch_divisor: cfg.touch_divisor,
            touch_threshold: cfg.touch_threshold,
            accumulator: 0.0,
            touch_ref: None,
        }
    }

    /// Wheel motion not yet large enough to make a whole step.
    #[inline]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    #[inline]
    pub fn touch_reference(&self) -> Option<f64> {
        self.touch_ref
    }

    /// Accumulate a wheel delta; returns whole steps of `spacing` once the
    /// accumulator reaches one.
    pub fn wheel(&mut self, delta_y: f64) -> Option<f64> {
        self.accumulator += delta_y / self.wheel_divisor;
        if self.accumulator.abs() < self.spacing {
            return None;
        }
        let mut steps = (self.accumulator / self.spacing).trunc();
        self.accumulator -= steps * self.spacing;
        // float division can leave a full step behind
        if self.accumulator.abs() >= self.spacing {
            let extra = self.accumulator.signum();
            steps += extra;
            self.accumulator -= extra * self.spacing;
        }
        Some(steps * self.spacing)
    }

    pub fn touch_start(&mut self, y: f64) {
        self.touch_ref = Some(y);
    }

    /// Incremental drag: returns `-dy / divisor` once the finger moved more
    /// than the threshold since the reference, then moves the reference.
    pub fn touch_move(&mut self, y: f64) -> Option<f64> {
        let Some(reference) = self.touch_ref else {
            self.touch_ref = Some(y);
            return None;
        };
        let dy = y - reference;
        if dy.abs() <= self.touch_threshold {
            return None;
        }
        self.touch_ref = Some(y);
        Some(-dy / self.touch_divisor)
    }

    #[inline]
    pub fn advance(&self) -> f64 {
        self.spacing
    }

    #[inline]
    pub fn retreat(&self) -> f64 {
        -self.spacing
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.touch_ref = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> InputNormalizer {
        InputNormalizer::new(0.1, &InputCfg::default())
    }

    #[test]
    fn wheel_accumulates_sub_step_motion() {
        let mut n = normalizer();
        // 40 / 800 = 0.05, half a step
        assert_eq!(n.wheel(40.0), None);
        assert!((n.accumulator() - 0.05).abs() < 1e-12);
        let step = n.wheel(40.0).expect("one step");
        assert!((step - 0.1).abs() < 1e-12);
        assert!(n.accumulator().abs() < 0.1);
    }

    #[test]
    fn wheel_emits_whole_steps_and_keeps_remainder() {
        let mut n = normalizer();
        // 0.3125 → three steps, 0.0125 left
        let step = n.wheel(250.0).expect("steps");
        assert!((step - 0.3).abs() < 1e-9);
        assert!((n.accumulator() - 0.0125).abs() < 1e-9);
        let step = n.wheel(-250.0).expect("steps");
        assert!(step <= -0.2 + 1e-9);
        assert!(n.accumulator().abs() < 0.1);
    }

    #[test]
    fn touch_below_threshold_keeps_reference() {
        let mut n = normalizer();
        n.touch_start(100.0);
        assert_eq!(n.touch_move(103.0), None);
        assert_eq!(n.touch_reference(), Some(100.0));
        let step = n.touch_move(110.0).expect("moved");
        assert!((step + 10.0 / 800.0).abs() < 1e-12);
        assert_eq!(n.touch_reference(), Some(110.0));
    }

    #[test]
    fn touch_move_without_start_only_sets_reference() {
        let mut n = normalizer();
        assert_eq!(n.touch_move(50.0), None);
        assert_eq!(n.touch_reference(), Some(50.0));
    }

    #[test]
    fn buttons_are_one_spacing() {
        let n = normalizer();
        assert_eq!(n.advance(), 0.1);
        assert_eq!(n.retreat(), -0.1);
    }

    #[test]
    fn events_use_kind_tag() {
        let ev: InputEvent = serde_json::from_str(r#"{ "kind": "wheel", "delta_y": 120 }"#).unwrap();
        assert_eq!(ev, InputEvent::Wheel { delta_y: 120.0 });
        let ev: InputEvent = serde_json::from_str(r#"{ "kind": "advance" }"#).unwrap();
        assert_eq!(ev, InputEvent::Advance);
    }
}
