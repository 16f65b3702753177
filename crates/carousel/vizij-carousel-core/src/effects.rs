//! Named, reusable effects.
//!
//! An effect turns a list of targets plus a config into a [`Timeline`]. The
//! registry is built once (with the built-in `reveal` and `staggerChildren`
//! effects) and looked up by name; hosts may register their own.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::error::{CarouselError, Result};
use crate::ids::TargetId;
use crate::store::Prop;
use crate::timeline::Timeline;

/// Fully resolved effect parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub duration: f64,
    pub ease: Ease,
    /// Vertical offset (pixels) the targets rise from.
    pub y: f32,
    /// Delay between consecutive targets.
    pub stagger: f64,
    pub delay: f64,
}

/// Per-call overrides merged over an effect's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectOverrides {
    pub duration: Option<f64>,
    pub ease: Option<Ease>,
    pub y: Option<f32>,
    pub stagger: Option<f64>,
    pub delay: Option<f64>,
}

impl EffectConfig {
    pub fn merged(&self, o: &EffectOverrides) -> EffectConfig {
        EffectConfig {
            duration: o.duration.unwrap_or(self.duration).max(0.0),
            ease: o.ease.unwrap_or(self.ease),
            y: o.y.unwrap_or(self.y),
            stagger: o.stagger.unwrap_or(self.stagger).max(0.0),
            delay: o.delay.unwrap_or(self.delay).max(0.0),
        }
    }
}

/// Builds a timeline for `targets`; the flag is the reduced-motion preference.
pub type EffectFn = fn(&[TargetId], &EffectConfig, bool) -> Timeline;

#[derive(Clone, Debug)]
struct EffectDef {
    defaults: EffectConfig,
    build: EffectFn,
}

#[derive(Clone, Debug)]
pub struct EffectRegistry {
    effects: HashMap<String, EffectDef>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register(
            "reveal",
            EffectConfig {
                duration: 0.6,
                ease: Ease::Power3Out,
                y: 24.0,
                stagger: 0.0,
                delay: 0.0,
            },
            rise_in,
        );
        reg.register(
            "staggerChildren",
            EffectConfig {
                duration: 0.5,
                ease: Ease::Power3Out,
                y: 16.0,
                stagger: 0.08,
                delay: 0.0,
            },
            rise_in,
        );
        reg
    }
}

impl EffectRegistry {
    /// Registry without built-ins.
    pub fn empty() -> Self {
        Self {
            effects: HashMap::new(),
        }
    }

    /// Register (or replace) an effect.
    pub fn register(&mut self, name: impl Into<String>, defaults: EffectConfig, build: EffectFn) {
        self.effects
            .insert(name.into(), EffectDef { defaults, build });
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    pub fn defaults(&self, name: &str) -> Option<&EffectConfig> {
        self.effects.get(name).map(|d| &d.defaults)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the named effect. Empty target lists give an empty timeline.
    pub fn build(
        &self,
        name: &str,
        targets: &[TargetId],
        overrides: &EffectOverrides,
        reduced_motion: bool,
    ) -> Result<Timeline> {
        let def = self
            .effects
            .get(name)
            .ok_or_else(|| CarouselError::UnknownEffect {
                name: name.to_string(),
            })?;
        if targets.is_empty() {
            return Ok(Timeline::new());
        }
        let cfg = def.defaults.merged(overrides);
        Ok((def.build)(targets, &cfg, reduced_motion))
    }
}

/// Fade in while rising from `cfg.y`, one target after another.
fn rise_in(targets: &[TargetId], cfg: &EffectConfig, reduced_motion: bool) -> Timeline {
    let mut tl = Timeline::new();
    for (i, &target) in targets.iter().enumerate() {
        if reduced_motion {
            tl.set(target, Prop::Opacity, 1.0);
            tl.set(target, Prop::Y, 0.0);
            continue;
        }
        tl.set(target, Prop::Opacity, 0.0);
        tl.set(target, Prop::Y, cfg.y);
        tl.from_to(
            target,
            &[(Prop::Opacity, 0.0, 1.0), (Prop::Y, cfg.y, 0.0)],
            cfg.duration,
            cfg.ease,
            cfg.delay + i as f64 * cfg.stagger,
        );
    }
    tl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Frame;

    fn targets(n: u32) -> Vec<TargetId> {
        (0..n).map(TargetId).collect()
    }

    #[test]
    fn reveal_rises_from_offset() {
        let reg = EffectRegistry::default();
        let tl = reg
            .build("reveal", &targets(1), &EffectOverrides::default(), false)
            .unwrap();
        let mut frame = Frame::new();
        tl.render(0.0, &mut frame);
        assert_eq!(frame.get(TargetId(0), Prop::Opacity), Some(0.0));
        assert_eq!(frame.get(TargetId(0), Prop::Y), Some(24.0));
        tl.render(0.6, &mut frame);
        assert_eq!(frame.get(TargetId(0), Prop::Opacity), Some(1.0));
        assert_eq!(frame.get(TargetId(0), Prop::Y), Some(0.0));
        assert!((tl.duration() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn stagger_children_offsets_each_target() {
        let reg = EffectRegistry::default();
        let tl = reg
            .build("staggerChildren", &targets(3), &EffectOverrides::default(), false)
            .unwrap();
        let starts: Vec<f64> = tl.children().iter().map(|c| c.at).collect();
        assert_eq!(starts.len(), 3);
        assert!((starts[1] - 0.08).abs() < 1e-12);
        assert!((starts[2] - 0.16).abs() < 1e-12);
        assert_eq!(tl.children()[0].tween.ranges[1].from, 16.0);
    }

    #[test]
    fn overrides_replace_defaults() {
        let reg = EffectRegistry::default();
        let o = EffectOverrides {
            duration: Some(1.0),
            stagger: Some(0.2),
            ..Default::default()
        };
        let tl = reg.build("reveal", &targets(2), &o, false).unwrap();
        assert!((tl.duration() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn reduced_motion_sets_final_state_only() {
        let reg = EffectRegistry::default();
        let tl = reg
            .build("staggerChildren", &targets(2), &EffectOverrides::default(), true)
            .unwrap();
        assert!(tl.children().is_empty());
        assert_eq!(tl.duration(), 0.0);
        let mut frame = Frame::new();
        tl.render(0.0, &mut frame);
        assert_eq!(frame.get(TargetId(1), Prop::Opacity), Some(1.0));
        assert_eq!(frame.get(TargetId(1), Prop::Y), Some(0.0));
    }

    #[test]
    fn empty_targets_and_unknown_names() {
        let reg = EffectRegistry::default();
        let tl = reg
            .build("reveal", &[], &EffectOverrides::default(), false)
            .unwrap();
        assert!(tl.is_empty());
        let err = reg
            .build("spin", &targets(1), &EffectOverrides::default(), false)
            .unwrap_err();
        assert!(matches!(err, CarouselError::UnknownEffect { .. }));
        assert_eq!(reg.names(), vec!["reveal", "staggerChildren"]);
    }
}
