// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::str::FromStr;

use colorous::Gradient;
use serde::de::{self, Deserialize, Deserializer};

/// The color palettes a heatmap can be drawn with.
#[derive(Clone, Copy)]
pub(crate) enum Palette {
    /// The classic thermal camera palette.
    Ironbow,

    /// One of the [colorous] gradients.
    Gradient(Gradient),
}

impl Default for Palette {
    fn default() -> Self {
        Self::Ironbow
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ironbow => f.write_str("Ironbow"),
            Self::Gradient(gradient) => f.debug_tuple("Gradient").field(gradient).finish(),
        }
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        // colorous gradients don't implement PartialEq, but their Debug output is their name.
        format!("{:?}", self) == format!("{:?}", other)
    }
}

const GRADIENTS: &[(&str, Gradient)] = &[
    ("BLUES", colorous::BLUES),
    ("BLUE_GREEN", colorous::BLUE_GREEN),
    ("BLUE_PURPLE", colorous::BLUE_PURPLE),
    ("BROWN_GREEN", colorous::BROWN_GREEN),
    ("CIVIDIS", colorous::CIVIDIS),
    ("COOL", colorous::COOL),
    ("CUBEHELIX", colorous::CUBEHELIX),
    ("GREENS", colorous::GREENS),
    ("GREEN_BLUE", colorous::GREEN_BLUE),
    ("GREYS", colorous::GREYS),
    ("INFERNO", colorous::INFERNO),
    ("MAGMA", colorous::MAGMA),
    ("ORANGES", colorous::ORANGES),
    ("ORANGE_RED", colorous::ORANGE_RED),
    ("PINK_GREEN", colorous::PINK_GREEN),
    ("PLASMA", colorous::PLASMA),
    ("PURPLES", colorous::PURPLES),
    ("PURPLE_BLUE", colorous::PURPLE_BLUE),
    ("PURPLE_BLUE_GREEN", colorous::PURPLE_BLUE_GREEN),
    ("PURPLE_GREEN", colorous::PURPLE_GREEN),
    ("PURPLE_ORANGE", colorous::PURPLE_ORANGE),
    ("PURPLE_RED", colorous::PURPLE_RED),
    ("RAINBOW", colorous::RAINBOW),
    ("REDS", colorous::REDS),
    ("RED_BLUE", colorous::RED_BLUE),
    ("RED_GREY", colorous::RED_GREY),
    ("RED_PURPLE", colorous::RED_PURPLE),
    ("RED_YELLOW_BLUE", colorous::RED_YELLOW_BLUE),
    ("RED_YELLOW_GREEN", colorous::RED_YELLOW_GREEN),
    ("SINEBOW", colorous::SINEBOW),
    ("SPECTRAL", colorous::SPECTRAL),
    ("TURBO", colorous::TURBO),
    ("VIRIDIS", colorous::VIRIDIS),
    ("WARM", colorous::WARM),
    ("YELLOW_GREEN", colorous::YELLOW_GREEN),
    ("YELLOW_GREEN_BLUE", colorous::YELLOW_GREEN_BLUE),
    ("YELLOW_ORANGE_BROWN", colorous::YELLOW_ORANGE_BROWN),
    ("YELLOW_ORANGE_RED", colorous::YELLOW_ORANGE_RED),
];

impl FromStr for Palette {
    type Err = &'static str;

    /// Palette names are case-insensitive, and spaces may be used in place of underscores.
    fn from_str(palette_name: &str) -> Result<Self, Self::Err> {
        let normalized = palette_name.to_uppercase().replace(' ', "_");
        if normalized == "IRONBOW" {
            return Ok(Self::Ironbow);
        }
        GRADIENTS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, gradient)| Self::Gradient(*gradient))
            .ok_or("Invalid palette name")
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let palette_name: String = Deserialize::deserialize(deserializer)?;
        palette_name.parse().map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&palette_name),
                &"\"ironbow\" or the name of a colorous gradient",
            )
        })
    }
}
