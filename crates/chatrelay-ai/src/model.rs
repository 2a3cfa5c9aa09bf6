//! The closed set of selectable models, arranged as a ring.

use std::fmt;
use std::str::FromStr;

/// Static metadata for a model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Position in the switch cycle.
    pub ordinal: u32,
    pub identifier: &'static str,
    pub supports_image_input: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelVariant {
    Gpt4Turbo,
    Gpt4VisionPreview,
    #[default]
    Gpt4Omni,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] = [
        ModelVariant::Gpt4Turbo,
        ModelVariant::Gpt4VisionPreview,
        ModelVariant::Gpt4Omni,
    ];

    pub const fn info(self) -> ModelInfo {
        match self {
            ModelVariant::Gpt4Turbo => ModelInfo {
                ordinal: 1,
                identifier: "gpt-4-turbo",
                supports_image_input: false,
            },
            ModelVariant::Gpt4VisionPreview => ModelInfo {
                ordinal: 2,
                identifier: "gpt-4-vision-preview",
                supports_image_input: true,
            },
            ModelVariant::Gpt4Omni => ModelInfo {
                ordinal: 3,
                identifier: "gpt-4o",
                supports_image_input: true,
            },
        }
    }

    pub const fn identifier(self) -> &'static str {
        self.info().identifier
    }

    pub const fn ordinal(self) -> u32 {
        self.info().ordinal
    }

    pub const fn supports_image_input(self) -> bool {
        self.info().supports_image_input
    }

    /// The variant with the next ordinal, wrapping to the lowest ordinal
    /// after the last one.
    pub fn next(self) -> ModelVariant {
        let wanted = self.ordinal() + 1;
        Self::ALL
            .into_iter()
            .find(|v| v.ordinal() == wanted)
            .unwrap_or_else(Self::first)
    }

    fn first() -> ModelVariant {
        Self::ALL
            .into_iter()
            .min_by_key(|v| v.ordinal())
            .unwrap_or_default()
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown model '{0}'")]
pub struct UnknownModel(pub String);

impl FromStr for ModelVariant {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.identifier() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
