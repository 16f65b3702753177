//! Easing curves and interpolation helpers.
//!
//! Names follow the tweening vocabulary hosts already use ("none",
//! "power1.in", "power3.out", ...). `powerN` curves have exponent N+1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CarouselError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    #[serde(rename = "none", alias = "linear")]
    Linear,
    #[serde(rename = "power1.in")]
    Power1In,
    #[serde(rename = "power1.out", alias = "power1")]
    Power1Out,
    #[serde(rename = "power3.in")]
    Power3In,
    /// Decelerating curve used by the scrub transition.
    #[serde(rename = "power3.out", alias = "power3", alias = "decelerate")]
    Power3Out,
}

impl Ease {
    /// Map linear progress in [0, 1] to eased progress. Input is clamped.
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => t * t,
            Ease::Power1Out => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Ease::Power3In => t * t * t * t,
            Ease::Power3Out => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv * inv
            }
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Ease::Linear => "none",
            Ease::Power1In => "power1.in",
            Ease::Power1Out => "power1.out",
            Ease::Power3In => "power3.in",
            Ease::Power3Out => "power3.out",
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ease {
    type Err = CarouselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "linear" => Ok(Ease::Linear),
            "power1.in" => Ok(Ease::Power1In),
            "power1" | "power1.out" => Ok(Ease::Power1Out),
            "power3.in" => Ok(Ease::Power3In),
            "power3" | "power3.out" | "decelerate" => Ok(Ease::Power3Out),
            _ => Err(CarouselError::UnknownEase { name: s.to_string() }),
        }
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for ease in [
            Ease::Linear,
            Ease::Power1In,
            Ease::Power1Out,
            Ease::Power3In,
            Ease::Power3Out,
        ] {
            assert_eq!(ease.apply(0.0), 0.0, "{ease}");
            assert_eq!(ease.apply(1.0), 1.0, "{ease}");
            assert_eq!(ease.apply(-3.0), 0.0, "{ease}");
            assert_eq!(ease.apply(7.0), 1.0, "{ease}");
        }
    }

    #[test]
    fn decelerate_front_loads_motion() {
        assert!(Ease::Power3Out.apply(0.25) > 0.6);
        assert!(Ease::Power1In.apply(0.5) < 0.5);
        assert!((Ease::Power1In.apply(0.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("power3".parse::<Ease>().unwrap(), Ease::Power3Out);
        assert_eq!("decelerate".parse::<Ease>().unwrap(), Ease::Power3Out);
        assert_eq!(" None ".parse::<Ease>().unwrap(), Ease::Linear);
        assert!("bounce".parse::<Ease>().is_err());
    }

    #[test]
    fn serde_uses_host_names() {
        let s = serde_json::to_string(&Ease::Power1In).unwrap();
        assert_eq!(s, "\"power1.in\"");
        let e: Ease = serde_json::from_str("\"power3\"").unwrap();
        assert_eq!(e, Ease::Power3Out);
    }
}
