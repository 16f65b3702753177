//! Animated properties, per-frame values, and the persistent property store.
//!
//! Timelines render into a [`Frame`] (last writer wins); the frame is then
//! committed into the [`PropertyStore`], which records which values actually
//! changed so adapters only receive deltas.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::ids::TargetId;

/// Visual property of a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prop {
    Opacity,
    Scale,
    /// Horizontal offset in percent of the target's own width.
    XPercent,
    /// Vertical offset in pixels (used by reveal effects).
    Y,
    /// Opacity of the target's inner content (card image).
    ContentOpacity,
}

impl Prop {
    /// Value a target shows when nothing animates it.
    #[inline]
    pub fn rest_value(self) -> f32 {
        match self {
            Prop::Opacity | Prop::Scale | Prop::ContentOpacity => 1.0,
            Prop::XPercent | Prop::Y => 0.0,
        }
    }
}

/// Values written during one render pass.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    values: HashMap<(TargetId, Prop), f32>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn write(&mut self, target: TargetId, prop: Prop, value: f32) {
        self.values.insert((target, prop), value);
    }

    #[inline]
    pub fn get(&self, target: TargetId, prop: Prop) -> Option<f32> {
        self.values.get(&(target, prop)).copied()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetId, Prop, f32)> + '_ {
        self.values.iter().map(|(&(t, p), &v)| (t, p, v))
    }

    /// Read back a whole item state; props never written fall back to rest values.
    pub fn item_state(&self, target: TargetId) -> ItemState {
        ItemState::from_lookup(|prop| self.get(target, prop))
    }
}

/// Last committed value of every animated property.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    values: HashMap<(TargetId, Prop), f32>,
    dirty: HashSet<(TargetId, Prop)>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, target: TargetId, prop: Prop) -> Option<f32> {
        self.values.get(&(target, prop)).copied()
    }

    /// Write one value. Returns true when it differs from the stored one.
    pub fn write(&mut self, target: TargetId, prop: Prop, value: f32) -> bool {
        let key = (target, prop);
        let changed = self.values.get(&key) != Some(&value);
        if changed {
            self.values.insert(key, value);
            self.dirty.insert(key);
        }
        changed
    }

    /// Commit a rendered frame.
    pub fn commit(&mut self, frame: &Frame) {
        for (target, prop, value) in frame.iter() {
            self.write(target, prop, value);
        }
    }

    /// Take the values changed since the last drain, sorted by (target, prop).
    pub fn drain_changes(&mut self) -> Vec<(TargetId, Prop, f32)> {
        let mut keys: Vec<(TargetId, Prop)> = self.dirty.drain().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|(t, p)| self.values.get(&(t, p)).map(|v| (t, p, *v)))
            .collect()
    }

    #[inline]
    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn item_state(&self, target: TargetId) -> ItemState {
        ItemState::from_lookup(|prop| self.get(target, prop))
    }
}

/// Rendered visual state of one carousel item.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub opacity: f32,
    pub scale: f32,
    pub x_percent: f32,
    pub content_opacity: f32,
}

impl ItemState {
    /// Static final state shown when motion is reduced.
    pub fn at_rest() -> Self {
        Self {
            opacity: Prop::Opacity.rest_value(),
            scale: Prop::Scale.rest_value(),
            x_percent: Prop::XPercent.rest_value(),
            content_opacity: Prop::ContentOpacity.rest_value(),
        }
    }

    fn from_lookup(get: impl Fn(Prop) -> Option<f32>) -> Self {
        let read = |p: Prop| get(p).unwrap_or_else(|| p.rest_value());
        Self {
            opacity: read(Prop::Opacity),
            scale: read(Prop::Scale),
            x_percent: read(Prop::XPercent),
            content_opacity: read(Prop::ContentOpacity),
        }
    }

    #[inline]
    pub fn is_visible(&self, eps: f32) -> bool {
        self.opacity > eps && self.scale > eps
    }

    /// Equal as far as a viewer can tell: opacity matches and, when the item
    /// can be seen at all, so do scale and position.
    pub fn visually_eq(&self, other: &ItemState, eps: f32) -> bool {
        if (self.opacity - other.opacity).abs() > eps {
            return false;
        }
        if !self.is_visible(eps) && !other.is_visible(eps) {
            return true;
        }
        (self.scale - other.scale).abs() <= eps && (self.x_percent - other.x_percent).abs() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_reports_only_real_changes() {
        let mut store = PropertyStore::new();
        assert!(store.write(TargetId(0), Prop::Opacity, 0.5));
        assert!(!store.write(TargetId(0), Prop::Opacity, 0.5));
        let mut frame = Frame::new();
        frame.write(TargetId(0), Prop::Opacity, 0.5);
        frame.write(TargetId(1), Prop::Scale, 0.25);
        store.commit(&frame);
        let changes = store.drain_changes();
        assert_eq!(
            changes,
            vec![
                (TargetId(0), Prop::Opacity, 0.5),
                (TargetId(1), Prop::Scale, 0.25)
            ]
        );
        assert!(!store.has_changes());
    }

    #[test]
    fn invisible_items_compare_equal_regardless_of_position() {
        let a = ItemState {
            opacity: 0.0,
            scale: 0.0,
            x_percent: 400.0,
            content_opacity: 1.0,
        };
        let b = ItemState {
            x_percent: -400.0,
            ..a
        };
        assert!(a.visually_eq(&b, 1e-3));
        let c = ItemState {
            opacity: 0.5,
            scale: 0.5,
            ..a
        };
        let d = ItemState {
            x_percent: 10.0,
            ..c
        };
        assert!(!c.visually_eq(&d, 1e-3));
    }

    #[test]
    fn missing_props_fall_back_to_rest() {
        let frame = Frame::new();
        assert_eq!(frame.item_state(TargetId(3)), ItemState::at_rest());
    }
}
