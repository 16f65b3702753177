use bevy::color::Alpha;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::HashMap;

use crate::components::CarouselItem;
use crate::resources::{
    CarouselInput, CarouselRegion, CarouselResource, CarouselSettings, CarouselSignal,
    PendingChanges, WheelLineHeight,
};
use vizij_carousel_core::{Change, InputEvent, Prop};

/// Visible share of `region` inside a `width`×`height` window.
pub fn visible_fraction(region: Rect, width: f32, height: f32) -> f64 {
    let area = region.width() * region.height();
    if area <= 0.0 {
        return 0.0;
    }
    let screen = Rect::new(0.0, 0.0, width, height);
    let overlap = region.intersect(screen).size().max(Vec2::ZERO);
    f64::from((overlap.x * overlap.y) / area)
}

/// Emits PointerEnter/Leave and VisibilityChanged when the cursor or the
/// window geometry changes relative to the CarouselRegion.
pub fn region_tracking_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    region: Option<Res<CarouselRegion>>,
    mut hovered: Local<bool>,
    mut last_fraction: Local<Option<f64>>,
    mut input: EventWriter<CarouselInput>,
) {
    let (Ok(window), Some(region)) = (windows.get_single(), region) else {
        return;
    };

    let fraction = visible_fraction(region.0, window.width(), window.height());
    if *last_fraction != Some(fraction) {
        *last_fraction = Some(fraction);
        input.send(CarouselInput(InputEvent::VisibilityChanged { fraction }));
    }

    let inside = window
        .cursor_position()
        .is_some_and(|p| region.0.contains(p));
    if inside != *hovered {
        *hovered = inside;
        input.send(CarouselInput(if inside {
            InputEvent::PointerEnter
        } else {
            InputEvent::PointerLeave
        }));
    }
}

/// Mouse wheel to `InputEvent::Wheel`. Bevy reports "scroll up" as positive
/// y; the carousel expects page-style deltas where positive means down.
pub fn wheel_input_system(
    mut wheel: EventReader<MouseWheel>,
    line_height: Res<WheelLineHeight>,
    mut input: EventWriter<CarouselInput>,
) {
    for ev in wheel.read() {
        let pixels = match ev.unit {
            MouseScrollUnit::Line => ev.y * line_height.0,
            MouseScrollUnit::Pixel => ev.y,
        };
        input.send(CarouselInput(InputEvent::Wheel {
            delta_y: -f64::from(pixels),
        }));
    }
}

/// Touches to `TouchStart`/`TouchMove`. Only a touch that starts inside the
/// CarouselRegion drives the carousel, and only that touch id until it ends.
/// Without a region the whole window counts.
pub fn touch_input_system(
    mut touches: EventReader<TouchInput>,
    region: Option<Res<CarouselRegion>>,
    mut tracked: Local<Option<u64>>,
    mut input: EventWriter<CarouselInput>,
) {
    for t in touches.read() {
        let y = f64::from(t.position.y);
        match t.phase {
            TouchPhase::Started => {
                let inside = region.as_ref().map_or(true, |r| r.0.contains(t.position));
                if inside {
                    *tracked = Some(t.id);
                    input.send(CarouselInput(InputEvent::TouchStart { y }));
                }
            }
            TouchPhase::Moved if *tracked == Some(t.id) => {
                input.send(CarouselInput(InputEvent::TouchMove { y }));
            }
            TouchPhase::Ended | TouchPhase::Canceled if *tracked == Some(t.id) => {
                *tracked = None;
            }
            _ => {}
        }
    }
}

pub fn dispatch_input_system(
    carousel: Option<ResMut<CarouselResource>>,
    mut input: EventReader<CarouselInput>,
) {
    let Some(mut carousel) = carousel else {
        input.clear();
        return;
    };
    for CarouselInput(ev) in input.read() {
        carousel.0.handle(*ev);
    }
}

/// Steps the carousel with the frame delta and stages its changes.
pub fn tick_carousel_system(
    carousel: Option<ResMut<CarouselResource>>,
    time: Res<Time>,
    mut pending: ResMut<PendingChanges>,
    mut signals: EventWriter<CarouselSignal>,
) {
    let Some(mut carousel) = carousel else {
        return;
    };
    let out = carousel.0.update(f64::from(time.delta_seconds()));
    pending.changes.extend(out.changes.iter().copied());
    for ev in &out.events {
        signals.send(CarouselSignal(ev.clone()));
    }
}

/// Writes staged changes to item entities: `x_percent` and `y` move the
/// Transform, `scale` scales it uniformly, `opacity` drives the sprite alpha.
/// `content_opacity` has no sprite counterpart and is left to host systems
/// reading `CarouselResource`.
pub fn apply_changes_system(
    mut pending: ResMut<PendingChanges>,
    settings: Res<CarouselSettings>,
    mut items: Query<(&CarouselItem, &mut Transform, Option<&mut Sprite>)>,
) {
    if pending.changes.is_empty() {
        return;
    }
    let mut by_index: HashMap<usize, Vec<Change>> = HashMap::new();
    for change in pending.changes.drain(..) {
        by_index
            .entry(change.target.0 as usize)
            .or_default()
            .push(change);
    }
    for (item, mut tf, mut sprite) in items.iter_mut() {
        let Some(changes) = by_index.get(&item.index) else {
            continue;
        };
        for c in changes {
            match c.prop {
                Prop::XPercent => tf.translation.x = c.value / 100.0 * settings.item_width,
                // screen y grows downward, world y upward
                Prop::Y => tf.translation.y = -c.value,
                Prop::Scale => tf.scale = Vec3::splat(c.value),
                Prop::Opacity => {
                    if let Some(sprite) = sprite.as_deref_mut() {
                        sprite.color.set_alpha(c.value);
                    }
                }
                Prop::ContentOpacity => {}
            }
        }
    }
}
