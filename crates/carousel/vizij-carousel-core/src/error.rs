//! Error types for the carousel core.

/// Construction and lookup failures. Runtime input never fails; it is either
/// honored or ignored by the interaction gate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum CarouselError {
    /// The item list was empty at construction time.
    #[error("carousel requires at least one item")]
    EmptyItems,

    /// Spacing must be finite and at least `MIN_SPACING`.
    #[error(
        "invalid spacing {spacing}: must be finite and >= {}",
        crate::seamless_loop::MIN_SPACING
    )]
    InvalidSpacing { spacing: f64 },

    /// The padded loop would need more slots than the builder allows.
    #[error("loop needs {slots} slots, at most {max} allowed")]
    TooManySlots { slots: f64, max: usize },

    /// A configuration field failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Ease name not recognized by the parser.
    #[error("unknown ease: {name}")]
    UnknownEase { name: String },

    /// No effect registered under this name.
    #[error("unknown effect: {name}")]
    UnknownEffect { name: String },

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CarouselError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyItems
            | Self::InvalidSpacing { .. }
            | Self::TooManySlots { .. }
            | Self::InvalidConfig { .. } => "validation",
            Self::UnknownEase { .. } | Self::UnknownEffect { .. } => "lookup",
            Self::Json(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, CarouselError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(CarouselError::EmptyItems.category(), "validation");
        assert_eq!(
            CarouselError::UnknownEffect {
                name: "spin".into()
            }
            .category(),
            "lookup"
        );
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(CarouselError::from(json_err).category(), "serialization");
    }

    #[test]
    fn messages_name_the_offender() {
        let e = CarouselError::InvalidSpacing { spacing: -0.5 };
        assert!(e.to_string().contains("-0.5"));
        let e = CarouselError::InvalidConfig {
            field: "iteration_cycle",
            reason: "must be >= 1".into(),
        };
        assert!(e.to_string().contains("iteration_cycle"));
    }
}
