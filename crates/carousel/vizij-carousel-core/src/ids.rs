//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Animated target (a carousel item or any host element the engine writes to).
/// Carousel items use their insertion index as id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Timeline played by the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub u32);

/// Monotonic allocator for TimelineId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_timeline: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_timeline(&mut self) -> TimelineId {
        let id = TimelineId(self.next_timeline);
        self.next_timeline = self.next_timeline.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_timeline(), TimelineId(0));
        assert_eq!(alloc.alloc_timeline(), TimelineId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_timeline(), TimelineId(0));
    }
}
