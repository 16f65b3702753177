//! Output contracts from the carousel core.
//!
//! Outputs carry only the property values that changed this frame plus a
//! separate list of semantic events. Adapters (Bevy/WASM) apply changes to
//! the host and forward events.

use serde::{Deserialize, Serialize};

use crate::ids::TargetId;
use crate::store::Prop;

/// One changed property value this frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetId,
    pub prop: Prop,
    pub value: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapDirection {
    Forward,
    Backward,
}

/// Discrete semantic signals emitted while handling input or stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CarouselEvent {
    /// The cursor left the current cycle and the loop moved by whole cycles.
    Wrapped {
        direction: WrapDirection,
        iteration: u32,
    },
    /// The loop playhead crossed a repeat boundary.
    LoopRepeated { repeat: i64, nudged: bool },
    /// The scrub transition reached its target.
    ScrubSettled { time: f64 },
}

/// Outputs returned by `Carousel::update()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CarouselEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CarouselEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Latest value of one property in this frame's changes.
    pub fn change_for(&self, target: TargetId, prop: Prop) -> Option<f32> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.target == target && c.prop == prop)
            .map(|c| c.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let ev = CarouselEvent::Wrapped {
            direction: WrapDirection::Backward,
            iteration: 9,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "wrapped");
        assert_eq!(json["direction"], "backward");
        assert_eq!(json["iteration"], 9);
    }

    #[test]
    fn clear_empties_both_lists() {
        let mut out = Outputs::default();
        out.push_change(Change {
            target: TargetId(0),
            prop: Prop::Opacity,
            value: 1.0,
        });
        out.push_event(CarouselEvent::ScrubSettled { time: 0.1 });
        assert!(!out.is_empty());
        assert_eq!(out.change_for(TargetId(0), Prop::Opacity), Some(1.0));
        out.clear();
        assert!(out.is_empty());
    }
}
