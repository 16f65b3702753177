//! Vizij Carousel Core (engine-agnostic)
//!
//! Seamless-loop carousel controller: an endlessly wrapping conveyor of items
//! driven by one virtual timeline that the user scrubs with wheel, touch and
//! button input. This crate owns the timing model (tweens, timelines,
//! playheads), the loop builder, the scrub controller, input normalization
//! and gating, plus a small named-effects registry. Adapters (Bevy/WASM)
//! feed `InputEvent`s in and apply `Outputs` to their host.

pub mod carousel;
pub mod config;
pub mod ease;
pub mod effects;
pub mod engine;
pub mod error;
pub mod gate;
pub mod ids;
pub mod input;
pub mod outputs;
pub mod playhead;
pub mod scrub;
pub mod seamless_loop;
pub mod store;
pub mod timeline;

// Re-exports for consumers (adapters)
pub use carousel::{ActiveCarousel, Carousel, CarouselSnapshot, InertCarousel, MotionPreference};
pub use config::{CarouselConfig, InputCfg, IntroCfg, RepeatCfg, ScrubCfg};
pub use ease::Ease;
pub use effects::{EffectConfig, EffectFn, EffectOverrides, EffectRegistry};
pub use engine::Engine;
pub use error::{CarouselError, Result};
pub use gate::InteractionGate;
pub use ids::{TargetId, TimelineId};
pub use input::{EventDisposition, InputEvent, InputNormalizer};
pub use outputs::{CarouselEvent, Change, Outputs, WrapDirection};
pub use playhead::{BoundaryNudge, Playhead, Repeat, RepeatBoundary};
pub use scrub::{snap, ScrubController, ScrubOutcome, ScrubStep, ScrubTween};
pub use seamless_loop::{LoopLayout, SeamlessLoop};
pub use store::{Frame, ItemState, Prop, PropertyStore};
pub use timeline::{Timeline, Tween};
