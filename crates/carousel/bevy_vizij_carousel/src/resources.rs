use bevy::prelude::*;
use vizij_carousel_core::{Carousel, CarouselConfig, CarouselEvent, Change, InputEvent};

/// The running carousel. Absent when start-up failed (e.g. zero items).
#[derive(Resource)]
pub struct CarouselResource(pub Carousel);

/// Start-up parameters, read once when the plugin is built.
#[derive(Resource, Debug, Clone)]
pub struct CarouselSettings {
    pub config: CarouselConfig,
    pub item_count: usize,
    pub reduced_motion: bool,
    /// World units per 100 % of horizontal item offset.
    pub item_width: f32,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            config: CarouselConfig::default(),
            item_count: 6,
            reduced_motion: false,
            item_width: 200.0,
        }
    }
}

/// Screen-space rectangle (logical pixels, y down) the carousel occupies.
/// Drives hover and visibility reporting.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CarouselRegion(pub Rect);

/// Host input routed into the carousel. Send these to drive it directly
/// (buttons, custom gestures) in addition to the built-in wheel/touch mapping.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CarouselInput(pub InputEvent);

/// Semantic events forwarded from the core each frame.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CarouselSignal(pub CarouselEvent);

/// Changes staged by the tick system and applied in a separate system
/// (keeps ordering explicit: Compute -> Apply).
#[derive(Resource, Default)]
pub struct PendingChanges {
    pub changes: Vec<Change>,
}

/// Pixels per wheel "line" when the platform reports line-based scrolling.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WheelLineHeight(pub f32);

impl Default for WheelLineHeight {
    fn default() -> Self {
        Self(40.0)
    }
}
