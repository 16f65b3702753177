//! Bevy adapter for `vizij-carousel-core`.
//!
//! Add [`VizijCarouselPlugin`], spawn one entity per item with a
//! [`CarouselItem`] and a `Transform` (optionally a `Sprite`), and insert a
//! [`CarouselRegion`] for hover/visibility. Wheel and touch input are mapped
//! automatically; buttons send [`CarouselInput`] events.

use bevy::input::mouse::MouseWheel;
use bevy::input::touch::TouchInput;
use bevy::log::{debug, warn};
use bevy::prelude::*;
use vizij_carousel_core::{Carousel, Engine};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::CarouselItem;
pub use resources::{
    CarouselInput, CarouselRegion, CarouselResource, CarouselSettings, CarouselSignal,
    PendingChanges, WheelLineHeight,
};

#[derive(Default)]
pub struct VizijCarouselPlugin {
    pub settings: CarouselSettings,
}

impl Plugin for VizijCarouselPlugin {
    fn build(&self, app: &mut App) {
        let settings = self.settings.clone();
        // MinimalPlugins has no InputPlugin; registering twice is a no-op.
        app.add_event::<MouseWheel>()
            .add_event::<TouchInput>()
            .add_event::<CarouselInput>()
            .add_event::<CarouselSignal>()
            .init_resource::<PendingChanges>()
            .init_resource::<WheelLineHeight>();

        match Carousel::start(
            Engine::new(),
            settings.item_count,
            settings.config.clone(),
            &settings.reduced_motion,
        ) {
            Ok(carousel) => {
                debug!(
                    items = settings.item_count,
                    active = carousel.is_active(),
                    "carousel ready"
                );
                app.insert_resource(CarouselResource(carousel));
            }
            Err(e) => {
                warn!("carousel not started: {e}");
            }
        }

        app.insert_resource(settings).add_systems(
            Update,
            (
                (
                    systems::region_tracking_system,
                    systems::wheel_input_system,
                    systems::touch_input_system,
                ),
                systems::dispatch_input_system,
                systems::tick_carousel_system,
                systems::apply_changes_system,
            )
                .chain(),
        );
    }
}
