use lode_blocks::LightChannel;

use crate::face::Face;

const POS_BITS: u32 = 5;
const FACE_SHIFT: u32 = 15;
const CORNER_SHIFT: u32 = 18;
const SPRITE_SHIFT: u32 = 20;
const LIGHT_BITS: u32 = 6;

pub const MAX_SPRITE: u16 = (1 << 12) - 1;
/// Largest summed corner light: four samples at level 15.
pub const MAX_CORNER_LIGHT: u8 = 60;

/// Two-word vertex.
///
/// Word A holds x, y, z (5 bits each), face (3 bits), corner (2 bits) and
/// sprite id (12 bits) from the low bit up. Word B holds the summed red,
/// green, blue and sun light of the corner, 6 bits each.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PackedVertex {
    pub a: u32,
    pub b: u32,
}

impl PackedVertex {
    /// Positions are local to the chunk and lie in `0..=16`.
    pub fn new(
        pos: (u32, u32, u32),
        face: Face,
        corner: u32,
        sprite: u16,
        light: [u8; 4],
    ) -> Self {
        debug_assert!(pos.0 <= 16 && pos.1 <= 16 && pos.2 <= 16);
        let mask = (1 << POS_BITS) - 1;
        let a = (pos.0 & mask)
            | (pos.1 & mask) << POS_BITS
            | (pos.2 & mask) << (2 * POS_BITS)
            | (face.index() as u32) << FACE_SHIFT
            | (corner & 3) << CORNER_SHIFT
            | u32::from(sprite.min(MAX_SPRITE)) << SPRITE_SHIFT;
        let mut b = 0;
        for (i, l) in light.iter().enumerate() {
            b |= u32::from((*l).min(MAX_CORNER_LIGHT)) << (i as u32 * LIGHT_BITS);
        }
        PackedVertex { a, b }
    }

    #[inline]
    pub fn pos(self) -> (u32, u32, u32) {
        let mask = (1 << POS_BITS) - 1;
        (
            self.a & mask,
            (self.a >> POS_BITS) & mask,
            (self.a >> (2 * POS_BITS)) & mask,
        )
    }

    #[inline]
    pub fn face(self) -> Face {
        Face::from_index(((self.a >> FACE_SHIFT) & 7) as usize)
    }

    #[inline]
    pub fn corner(self) -> u32 {
        (self.a >> CORNER_SHIFT) & 3
    }

    #[inline]
    pub fn sprite(self) -> u16 {
        (self.a >> SPRITE_SHIFT) as u16
    }

    #[inline]
    pub fn light(self, ch: LightChannel) -> u8 {
        ((self.b >> (ch.index() as u32 * LIGHT_BITS)) & ((1 << LIGHT_BITS) - 1)) as u8
    }
}
