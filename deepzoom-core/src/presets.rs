//! Named viewport and palette presets.

use crate::{ParseError, Viewport};
use serde::{Deserialize, Serialize};

/// A named viewport in `s=<width>,r=<real>,i=<imag>,l=<limit>` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportPreset {
    pub name: &'static str,
    pub value: &'static str,
}

impl ViewportPreset {
    pub fn viewport(&self) -> Result<Viewport, ParseError> {
        Viewport::from_preset_str(self.value)
    }
}

pub static VIEWPORT_PRESETS: &[ViewportPreset] = &[
    ViewportPreset {
        name: "Default",
        value: "s=3.0,r=-0.75,i=0,l=1024",
    },
    ViewportPreset {
        name: "Seahorse Valley",
        value: "s=0.012,r=-0.7453,i=0.1127,l=2048",
    },
    ViewportPreset {
        name: "Elephant Valley",
        value: "s=0.005,r=0.28693186889504513,i=0.014286693904085048,l=4096",
    },
    ViewportPreset {
        name: "Deep Spiral",
        value: "s=1e-30,r=-0.743643887037158704752191506114774,i=0.131825904205311970493132056385139,l=8192",
    },
    ViewportPreset {
        name: "Needle",
        value: "s=4e-6,r=-1.9999117,i=0,l=2048",
    },
];

/// Look up a viewport preset by name and parse it.
pub fn viewport_preset(name: &str) -> Result<Viewport, ParseError> {
    VIEWPORT_PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| ParseError::UnknownPreset(name.to_string()))?
        .viewport()
}

/// Per output channel bit masks applied to averaged sample colours.
///
/// Output channel `j` is the largest byte of `rgb & masks[j]`, so the
/// identity is `ff0000,00ff00,0000ff`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelMasks(pub [u32; 3]);

impl Default for ChannelMasks {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ChannelMasks {
    pub const IDENTITY: ChannelMasks = ChannelMasks([0xff0000, 0x00ff00, 0x0000ff]);

    /// Parse three comma-joined six-digit hex masks.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParseError::ColorMask(value.to_string()));
        }
        let mut masks = [0u32; 3];
        for (mask, part) in masks.iter_mut().zip(parts) {
            if part.len() != 6 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ParseError::ColorMask(part.to_string()));
            }
            *mask = u32::from_str_radix(part, 16)
                .map_err(|_| ParseError::ColorMask(part.to_string()))?;
        }
        Ok(Self(masks))
    }

    /// Apply to a packed `0xRRGGBB` colour.
    pub fn apply(&self, rgb: u32) -> [u8; 3] {
        self.0.map(|mask| {
            let masked = rgb & mask;
            let bytes = [(masked >> 16) as u8, (masked >> 8) as u8, masked as u8];
            bytes.into_iter().max().unwrap_or(0)
        })
    }

    pub fn to_preset_string(&self) -> String {
        format!("{:06x},{:06x},{:06x}", self.0[0], self.0[1], self.0[2])
    }
}

/// A named channel filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PalettePreset {
    pub name: &'static str,
    pub masks: &'static str,
}

impl PalettePreset {
    pub fn channel_masks(&self) -> Result<ChannelMasks, ParseError> {
        ChannelMasks::parse(self.masks)
    }
}

pub static PALETTE_PRESETS: &[PalettePreset] = &[
    PalettePreset {
        name: "Natural",
        masks: "ff0000,00ff00,0000ff",
    },
    PalettePreset {
        name: "Swapped",
        masks: "0000ff,00ff00,ff0000",
    },
    PalettePreset {
        name: "Ember",
        masks: "ffffff,ff0000,000000",
    },
    PalettePreset {
        name: "Ice",
        masks: "000000,00ff00,ffffff",
    },
    PalettePreset {
        name: "Grayscale",
        masks: "ffffff,ffffff,ffffff",
    },
];

/// Look up a palette preset by name and parse its masks.
pub fn palette_preset(name: &str) -> Result<ChannelMasks, ParseError> {
    PALETTE_PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| ParseError::UnknownPreset(name.to_string()))?
        .channel_masks()
}
