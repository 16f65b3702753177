use bevy::prelude::*;

/// Marks the entity that renders carousel item `index` (0-based, insertion order).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselItem {
    pub index: usize,
}
