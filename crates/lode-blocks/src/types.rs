use serde::{Deserialize, Serialize};

pub type BlockId = u16;

/// Block id 0 is always air.
pub const AIR: BlockId = 0;

/// One of the four independent 4-bit light channels stored per voxel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LightChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Sun = 3,
}

impl LightChannel {
    pub const ALL: [LightChannel; 4] = [
        LightChannel::Red,
        LightChannel::Green,
        LightChannel::Blue,
        LightChannel::Sun,
    ];
    pub const COLORS: [LightChannel; 3] =
        [LightChannel::Red, LightChannel::Green, LightChannel::Blue];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn shift(self) -> u16 {
        (self as u16) << 2
    }
}

/// Four light nibbles packed as R (bits 0-3), G (4-7), B (8-11), Sun (12-15).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Light(pub u16);

impl Light {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 15;

    #[inline]
    pub fn get(self, ch: LightChannel) -> u8 {
        ((self.0 >> ch.shift()) & 0xF) as u8
    }

    /// Stores `level` clamped to the 4-bit range.
    #[inline]
    pub fn set(&mut self, ch: LightChannel, level: u8) {
        let level = u16::from(level.min(Self::MAX));
        self.0 = (self.0 & !(0xF << ch.shift())) | (level << ch.shift());
    }

    #[inline]
    pub fn with(mut self, ch: LightChannel, level: u8) -> Self {
        self.set(ch, level);
        self
    }

    #[inline]
    pub fn red(self) -> u8 {
        self.get(LightChannel::Red)
    }

    #[inline]
    pub fn green(self) -> u8 {
        self.get(LightChannel::Green)
    }

    #[inline]
    pub fn blue(self) -> u8 {
        self.get(LightChannel::Blue)
    }

    #[inline]
    pub fn sun(self) -> u8 {
        self.get(LightChannel::Sun)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    pub block: BlockId,
    pub light: Light,
}

impl Voxel {
    pub const AIR: Voxel = Voxel {
        block: AIR,
        light: Light(0),
    };

    #[inline]
    pub const fn new(block: BlockId) -> Self {
        Voxel {
            block,
            light: Light(0),
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.block == AIR
    }
}

/// Per-channel emission of a block, each in `0..=15`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LightColor {
    #[serde(default)]
    pub r: u8,
    #[serde(default)]
    pub g: u8,
    #[serde(default)]
    pub b: u8,
}

impl LightColor {
    #[inline]
    pub fn clamped(self) -> Self {
        LightColor {
            r: self.r.min(Light::MAX),
            g: self.g.min(Light::MAX),
            b: self.b.min(Light::MAX),
        }
    }

    /// Level for a color channel; sunlight is never emitted by blocks.
    #[inline]
    pub fn get(self, ch: LightChannel) -> u8 {
        match ch {
            LightChannel::Red => self.r,
            LightChannel::Green => self.g,
            LightChannel::Blue => self.b,
            LightChannel::Sun => 0,
        }
    }

    #[inline]
    pub fn is_dark(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Atlas sprite ids per face; 0 means no sprite.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BlockSprites {
    pub right: u16,
    pub left: u16,
    pub top: u16,
    pub bottom: u16,
    pub front: u16,
    pub back: u16,
}
