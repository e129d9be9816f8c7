//! GIMP palette (`.gpl`) reader with exact colour lookup.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{GeometryError, GeometryResult};

/// Line that separates the header from the colour table.
const DATA_SECTION: &str = "#";

/// Ordered list of colours plus an exact RGBA → index map.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
    index: HashMap<u32, usize>,
}

/// Pack an RGBA colour into the lookup key.
#[must_use]
pub const fn rgba_key(rgba: [u8; 4]) -> u32 {
    u32::from_be_bytes(rgba)
}

impl Palette {
    /// Parse palette text.
    ///
    /// Everything up to and including the line consisting of `#` is header.
    /// Every following non-empty line must be `R G B comment`. Colours are
    /// opaque.
    pub fn parse(text: &str) -> GeometryResult<Self> {
        let mut palette = Self::default();
        let mut lines = text.lines().enumerate();

        // Skip header.
        for (_, line) in lines.by_ref() {
            if line.trim_end() == DATA_SECTION {
                break;
            }
        }

        for (number, line) in lines {
            let line_no = number + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() != 4 {
                return Err(GeometryError::PaletteFormat {
                    line: line_no,
                    text: line.to_string(),
                });
            }

            let mut rgba = [0, 0, 0, u8::MAX];
            for (component, token) in rgba.iter_mut().zip(&tokens[..3]) {
                *component = token.parse().map_err(|_| GeometryError::PaletteComponent {
                    line: line_no,
                    value: (*token).to_string(),
                })?;
            }

            tracing::debug!(
                r = rgba[0],
                g = rgba[1],
                b = rgba[2],
                comment = tokens[3],
                "Palette colour {}",
                palette.colors.len()
            );
            palette.push(rgba);
        }

        Ok(palette)
    }

    /// Read and parse a palette file.
    pub fn from_path(path: impl AsRef<Path>) -> GeometryResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading palette {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    fn push(&mut self, rgba: [u8; 4]) {
        self.index.insert(rgba_key(rgba), self.colors.len());
        self.colors.push(rgba);
    }

    /// Index of the colour that exactly matches `rgba`.
    #[must_use]
    pub fn index_of(&self, rgba: [u8; 4]) -> Option<usize> {
        self.index.get(&rgba_key(rgba)).copied()
    }

    #[must_use]
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl FromIterator<[u8; 3]> for Palette {
    fn from_iter<I: IntoIterator<Item = [u8; 3]>>(iter: I) -> Self {
        let mut palette = Self::default();
        for [r, g, b] in iter {
            palette.push([r, g, b, u8::MAX]);
        }
        palette
    }
}
