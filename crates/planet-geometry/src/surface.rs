//! Terrain classes a sphere triangle can belong to.

use std::fmt;

/// Terrain class of a sphere triangle. The discriminant is the palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Surface {
    #[default]
    Water = 0,
    Sand = 1,
    Grass = 2,
    Rock = 3,
    Snow = 4,
}

impl Surface {
    /// Number of terrain classes.
    pub const COUNT: usize = 5;

    /// Every class in palette order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Water,
        Self::Sand,
        Self::Grass,
        Self::Rock,
        Self::Snow,
    ];

    /// Class for a palette index, if it names one.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Sand => "sand",
            Self::Grass => "grass",
            Self::Rock => "rock",
            Self::Snow => "snow",
        }
    }

    /// Default diffuse colour, linear RGB.
    #[must_use]
    pub const fn color(self) -> [f32; 3] {
        match self {
            Self::Water => [0.0, 0.0, 1.0],
            Self::Sand => [1.0, 1.0, 0.0],
            Self::Grass => [0.0, 1.0, 0.0],
            Self::Rock => [0.5, 0.5, 0.5],
            Self::Snow => [1.0, 1.0, 1.0],
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for surface in Surface::ALL {
            assert_eq!(Surface::from_index(surface.index()), Some(surface));
        }
        assert_eq!(Surface::from_index(Surface::COUNT), None);
    }
}
