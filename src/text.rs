//! Text as vector outlines.
//!
//! Glyph outlines come from a TrueType/OpenType face through `ttf-parser`
//! and are appended to a [`VertexStorage`] in screen coordinates (y grows
//! downward), so text goes through the same rasterizer as every other
//! shape. Everything except [`FontStyle`] needs the `font` feature.

#[cfg(feature = "font")]
use std::sync::Arc;

#[cfg(feature = "font")]
use crate::basics::{PATH_CMD_CURVE3, PATH_CMD_CURVE4, PATH_CMD_LINE_TO, PATH_CMD_MOVE_TO};
#[cfg(feature = "font")]
use crate::error::{Error, Result};
#[cfg(feature = "font")]
use crate::vertex_storage::VertexStorage;

/// Em size in pixels of a fresh [`FontStyle`].
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Size and spacing of drawn text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Em size in pixels.
    pub size: f64,
    /// Extra advance after every character, in pixels.
    pub letter_space: f64,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            letter_space: 0.0,
        }
    }
}

// ============================================================================
// FontFace
// ============================================================================

/// A parsed font, cheap to clone.
#[cfg(feature = "font")]
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Arc<[u8]>,
    index: u32,
}

#[cfg(feature = "font")]
impl FontFace {
    /// Parse the first face in `data`.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_collection(data, 0)
    }

    /// Parse face `index` of a font collection.
    pub fn from_collection(data: Vec<u8>, index: u32) -> Result<Self> {
        ttf_parser::Face::parse(&data, index).map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self {
            data: data.into(),
            index,
        })
    }

    /// The data parsed once in the constructor, so this only fails if that
    /// changes.
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    /// Distance from the top of a line to the baseline at `style.size`.
    pub fn ascent(&self, style: &FontStyle) -> f64 {
        self.face()
            .map(|f| f.ascender() as f64 * style.size / f.units_per_em() as f64)
            .unwrap_or(0.0)
    }

    /// Advance width of `text` laid out on one line.
    pub fn measure(&self, text: &str, style: &FontStyle) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let scale = style.size / face.units_per_em() as f64;
        text.chars()
            .map(|ch| advance(&face, ch, scale) + style.letter_space)
            .sum()
    }

    /// Append the outlines of `text` to `path`, with the top-left corner of
    /// the line box at `(x, y)`. Returns the advance width.
    pub fn append_text(&self, path: &mut VertexStorage, text: &str, x: f64, y: f64, style: &FontStyle) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let scale = style.size / face.units_per_em() as f64;
        let baseline = y + face.ascender() as f64 * scale;
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(id) = face.glyph_index(ch) {
                let mut outline = OutlineCollector::new(path, pen_x, baseline, scale);
                face.outline_glyph(id, &mut outline);
            }
            pen_x += advance(&face, ch, scale) + style.letter_space;
        }
        pen_x - x
    }
}

#[cfg(feature = "font")]
fn advance(face: &ttf_parser::Face<'_>, ch: char, scale: f64) -> f64 {
    face.glyph_index(ch)
        .and_then(|id| face.glyph_hor_advance(id))
        .map(|a| a as f64 * scale)
        .unwrap_or(0.0)
}

// ============================================================================
// OutlineCollector
// ============================================================================

/// Writes glyph outlines into a path, flipping font units (y up) into
/// screen space around `baseline`.
#[cfg(feature = "font")]
struct OutlineCollector<'a> {
    path: &'a mut VertexStorage,
    x: f64,
    baseline: f64,
    scale: f64,
}

#[cfg(feature = "font")]
impl<'a> OutlineCollector<'a> {
    fn new(path: &'a mut VertexStorage, x: f64, baseline: f64, scale: f64) -> Self {
        Self {
            path,
            x,
            baseline,
            scale,
        }
    }

    fn push(&mut self, x: f32, y: f32, cmd: u32) {
        let px = self.x + x as f64 * self.scale;
        let py = self.baseline - y as f64 * self.scale;
        self.path.add_vertex(px, py, cmd);
    }
}

#[cfg(feature = "font")]
impl ttf_parser::OutlineBuilder for OutlineCollector<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(x, y, PATH_CMD_MOVE_TO);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y, PATH_CMD_LINE_TO);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1, PATH_CMD_CURVE3);
        self.push(x, y, PATH_CMD_CURVE3);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(x1, y1, PATH_CMD_CURVE4);
        self.push(x2, y2, PATH_CMD_CURVE4);
        self.push(x, y, PATH_CMD_CURVE4);
    }

    fn close(&mut self) {
        self.path.close_polygon();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = FontStyle::default();
        assert_eq!(style.size, DEFAULT_FONT_SIZE);
        assert_eq!(style.letter_space, 0.0);
    }

    #[cfg(feature = "font")]
    #[test]
    fn test_rejects_garbage() {
        let err = FontFace::from_bytes(vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::Font(_)));
    }

    #[cfg(feature = "font")]
    #[test]
    fn test_outline_flips_y_around_baseline() {
        use crate::basics::{PATH_CMD_END_POLY, PATH_FLAGS_CLOSE};
        use ttf_parser::OutlineBuilder;

        let mut path = VertexStorage::new();
        {
            let mut c = OutlineCollector::new(&mut path, 10.0, 20.0, 0.5);
            c.move_to(0.0, 0.0);
            c.line_to(10.0, 10.0);
            c.quad_to(20.0, 10.0, 20.0, 0.0);
            c.curve_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
            c.close();
        }
        assert_eq!(path.total_vertices(), 8);
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(path.vertex_at(0, &mut x, &mut y), PATH_CMD_MOVE_TO);
        assert_eq!((x, y), (10.0, 20.0));
        assert_eq!(path.vertex_at(1, &mut x, &mut y), PATH_CMD_LINE_TO);
        assert_eq!((x, y), (15.0, 15.0));
        assert_eq!(path.command(2), PATH_CMD_CURVE3);
        assert_eq!(path.command(4), PATH_CMD_CURVE4);
        assert_eq!(path.command(7), PATH_CMD_END_POLY | PATH_FLAGS_CLOSE);
    }
}
