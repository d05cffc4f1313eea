use std::collections::HashMap;

use crate::error::BlocksError;

/// Largest atlas side, in sprite cells, the packed vertex format supports.
pub const MAX_ATLAS_SIZE: usize = 254;

/// Square atlas layout assigning each distinct sprite a cell.
///
/// Ids start at 1 so that 0 can mean "no sprite". Sprite `id` lives in cell
/// `(id % size, id / size)`.
#[derive(Clone, Debug, Default)]
pub struct SpriteAtlas {
    names: Vec<String>,
    by_name: HashMap<String, u16>,
    size: usize,
}

impl SpriteAtlas {
    pub fn build<'a, I>(sprites: I) -> Result<Self, BlocksError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut by_name = HashMap::new();
        for name in sprites {
            if by_name.contains_key(name) {
                continue;
            }
            names.push(name.to_owned());
            by_name.insert(name.to_owned(), names.len() as u16);
        }
        let size = Self::side_for(names.len());
        if size > MAX_ATLAS_SIZE {
            return Err(BlocksError::AtlasOverflow {
                sprites: names.len(),
                size,
                max: MAX_ATLAS_SIZE,
            });
        }
        Ok(SpriteAtlas {
            names,
            by_name,
            size,
        })
    }

    /// Atlas side length in cells for `count` sprites plus the empty cell 0.
    #[inline]
    pub fn side_for(count: usize) -> usize {
        (count + 1).next_power_of_two().max(4) / 2
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn name(&self, id: u16) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.names.get(id as usize - 1).map(String::as_str)
    }

    #[inline]
    pub fn cell(&self, id: u16) -> (usize, usize) {
        let id = id as usize;
        (id % self.size, id / self.size)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
