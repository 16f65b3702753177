//! Core configuration for vizij-carousel-core.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::error::{CarouselError, Result};
use crate::playhead::BoundaryNudge;
use crate::seamless_loop::MIN_SPACING;

/// Carousel tuning. Every field has a default, so hosts may pass a partial
/// JSON object (or nothing at all).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Virtual-time distance between the starts of consecutive items.
    pub spacing: f64,
    /// Iteration counter range K. A fixed choice, not derived from the item
    /// count or spacing.
    pub iteration_cycle: u32,
    /// Fraction of the carousel region that must be on screen for input to count.
    pub visibility_threshold: f64,
    pub scrub: ScrubCfg,
    pub input: InputCfg,
    pub intro: IntroCfg,
    pub repeat: RepeatCfg,
}

/// Eased transition that chases the requested cursor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubCfg {
    pub duration: f64,
    pub ease: Ease,
}

/// Input normalization constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// Wheel delta units per unit of timeline motion.
    pub wheel_divisor: f64,
    /// Touch pixels per unit of timeline motion.
    pub touch_divisor: f64,
    /// Touch movement (pixels) ignored as noise.
    pub touch_threshold: f64,
}

/// Fade-in of item contents played once at start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroCfg {
    pub delay: f64,
    pub duration: f64,
    pub ease: Ease,
}

/// Repeat-boundary handling of the loop playhead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatCfg {
    /// How close to the cycle end counts as "landed on the boundary".
    pub boundary_tolerance: f64,
    /// Backward nudge applied to the total time when that happens.
    pub nudge: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            spacing: 0.1,
            iteration_cycle: 10,
            visibility_threshold: 0.25,
            scrub: ScrubCfg::default(),
            input: InputCfg::default(),
            intro: IntroCfg::default(),
            repeat: RepeatCfg::default(),
        }
    }
}

impl Default for ScrubCfg {
    fn default() -> Self {
        Self {
            duration: 0.45,
            ease: Ease::Power3Out,
        }
    }
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            wheel_divisor: 800.0,
            touch_divisor: 800.0,
            touch_threshold: 4.0,
        }
    }
}

impl Default for IntroCfg {
    fn default() -> Self {
        Self {
            delay: 0.1,
            duration: 0.5,
            ease: Ease::Power1Out,
        }
    }
}

impl Default for RepeatCfg {
    fn default() -> Self {
        Self {
            boundary_tolerance: 1e-9,
            nudge: 0.01,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CarouselError {
    CarouselError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be finite and >= 0")))
    }
}

impl CarouselConfig {
    /// Parse a (possibly partial) JSON object and validate it.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: CarouselConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.spacing.is_finite() && self.spacing >= MIN_SPACING) {
            return Err(CarouselError::InvalidSpacing {
                spacing: self.spacing,
            });
        }
        if self.iteration_cycle == 0 {
            return Err(invalid("iteration_cycle", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(invalid(
                "visibility_threshold",
                format!("{} not in [0, 1]", self.visibility_threshold),
            ));
        }
        non_negative("scrub.duration", self.scrub.duration)?;
        if !(self.input.wheel_divisor.is_finite() && self.input.wheel_divisor > 0.0) {
            return Err(invalid("input.wheel_divisor", "must be finite and > 0"));
        }
        if !(self.input.touch_divisor.is_finite() && self.input.touch_divisor > 0.0) {
            return Err(invalid("input.touch_divisor", "must be finite and > 0"));
        }
        non_negative("input.touch_threshold", self.input.touch_threshold)?;
        non_negative("intro.delay", self.intro.delay)?;
        non_negative("intro.duration", self.intro.duration)?;
        non_negative("repeat.boundary_tolerance", self.repeat.boundary_tolerance)?;
        non_negative("repeat.nudge", self.repeat.nudge)?;
        Ok(())
    }

    pub fn boundary_nudge(&self) -> BoundaryNudge {
        BoundaryNudge {
            tolerance: self.repeat.boundary_tolerance,
            nudge: self.repeat.nudge,
        }
    }
}
