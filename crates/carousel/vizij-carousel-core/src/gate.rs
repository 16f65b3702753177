//! Interaction gate: decides whether input may move the cursor.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionGate {
    hovered: bool,
    visible: bool,
    reduced_motion: bool,
    threshold: f64,
}

impl InteractionGate {
    /// `reduced_motion` is sampled once and never changes afterwards.
    pub fn new(threshold: f64, reduced_motion: bool) -> Self {
        Self {
            hovered: false,
            visible: false,
            reduced_motion,
            threshold,
        }
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    /// Record the visible fraction of the carousel region.
    pub fn set_visible_fraction(&mut self, fraction: f64) {
        self.visible = fraction >= self.threshold;
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    #[inline]
    pub fn allows_wheel(&self) -> bool {
        self.hovered && self.visible && !self.reduced_motion
    }

    /// Touch counts as hovering once the region is visible.
    #[inline]
    pub fn allows_touch(&self) -> bool {
        self.visible && !self.reduced_motion
    }

    /// Buttons are explicit activations; only reduced motion blocks them.
    #[inline]
    pub fn allows_buttons(&self) -> bool {
        !self.reduced_motion
    }
}
