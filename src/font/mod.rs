//! Font module root.
//!
//! Glyph meshes are built from **vector glyph outlines**:
//! - Open a TTF/OTF face (`FontFace`) or locate one on the system (`db`).
//! - Read glyph outlines as a command stream (move/line/quad/curve/close).
//! - Flatten curves (`flatten`) and assemble closed point rings (`outline`).
//! - Triangulate the rings into a front face (`tessellate`).
//!
//! The outline provider is behind `OutlineSource`, so the mesh pipeline can be driven
//! by a real face or by a scripted source.

pub mod db;
pub mod flatten;
pub mod outline;
pub mod tessellate;

use std::{fs, path::Path, sync::Arc};

pub use outline::Point2D;

/// One outline command, in font units (Y up).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2D),
    LineTo(Point2D),
    QuadTo { ctrl: Point2D, to: Point2D },
    CurveTo { ctrl1: Point2D, ctrl2: Point2D, to: Point2D },
    Close,
}

/// Horizontal per-glyph metrics.
///
/// All values are in **font units** (units-per-em).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GlyphHMetrics {
    /// Advance width in font units.
    pub advance_width: f32,
    pub left_side_bearing: f32,
}

/// Errors produced by the font subsystem.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("failed to read font file from disk: {0}")]
    ReadFailed(String),

    #[error("failed to parse font face")]
    ParseFailed,

    #[error("no fonts found on this system")]
    NoFontsAvailable,

    #[error("failed to resolve a font face for query: {0:?}")]
    ResolveFailed(db::FontQuery),

    #[error("tessellation failed: {0}")]
    Tessellation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where glyph outlines and metrics come from.
pub trait OutlineSource {
    /// Glyph id for `ch`, or `None` when the font has no glyph for it.
    fn glyph_index(&self, ch: char) -> Option<u16>;

    /// Outline of `glyph` as a command stream. Empty means "no visible ink".
    fn glyph_outline(&self, glyph: u16) -> Vec<PathCommand>;

    /// Horizontal metrics for `ch` (zero when the font has none).
    fn h_metrics(&self, ch: char) -> GlyphHMetrics;
}

/// A parsed-on-demand font face.
///
/// - `bytes` contains the full font file/collection.
/// - `index` selects the face within the collection.
///
/// The bytes are validated once on construction; each query re-parses the face
/// header, which `ttf-parser` does without allocating.
#[derive(Debug, Clone)]
pub struct FontFace {
    bytes: Arc<[u8]>,
    index: u32,
    units_per_em: f32,
}

impl FontFace {
    /// Read and validate the first face of the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        Self::from_file_with_index(path, 0)
    }

    pub fn from_file_with_index(path: impl AsRef<Path>, index: u32) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|_| FontError::ReadFailed(path.display().to_string()))?;
        Self::from_bytes(Arc::<[u8]>::from(data), index)
    }

    /// Validate `bytes` as a font and keep them.
    pub fn from_bytes(bytes: Arc<[u8]>, index: u32) -> Result<Self, FontError> {
        let parsed = ttf_parser::Face::parse(&bytes, index).map_err(|_| FontError::ParseFailed)?;
        let units_per_em = parsed.units_per_em() as f32;

        Ok(Self {
            bytes,
            index,
            units_per_em,
        })
    }

    #[inline]
    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    fn parsed(&self) -> Option<ttf_parser::Face<'_>> {
        // Validated in `from_bytes`; a failure here would mean the bytes changed.
        ttf_parser::Face::parse(&self.bytes, self.index).ok()
    }
}

impl OutlineSource for FontFace {
    fn glyph_index(&self, ch: char) -> Option<u16> {
        let gid = self.parsed()?.glyph_index(ch)?;
        // Glyph 0 is `.notdef`: some cmap formats map unknown codes to it.
        (gid.0 != 0).then_some(gid.0)
    }

    fn glyph_outline(&self, glyph: u16) -> Vec<PathCommand> {
        let Some(parsed) = self.parsed() else {
            return Vec::new();
        };

        let mut recorder = CommandRecorder::default();
        // `outline_glyph` returns None for glyphs without an outline; the recorder
        // is then left empty, which is exactly the "empty outline" signal.
        if parsed
            .outline_glyph(ttf_parser::GlyphId(glyph), &mut recorder)
            .is_none()
        {
            return Vec::new();
        }
        recorder.commands
    }

    fn h_metrics(&self, ch: char) -> GlyphHMetrics {
        let Some(parsed) = self.parsed() else {
            return GlyphHMetrics::default();
        };
        let Some(gid) = parsed.glyph_index(ch) else {
            return GlyphHMetrics::default();
        };

        GlyphHMetrics {
            advance_width: parsed.glyph_hor_advance(gid).unwrap_or(0) as f32,
            left_side_bearing: parsed.glyph_hor_side_bearing(gid).unwrap_or(0) as f32,
        }
    }
}

/// Records `ttf-parser` outline callbacks as `PathCommand`s.
#[derive(Debug, Default)]
struct CommandRecorder {
    commands: Vec<PathCommand>,
}

impl ttf_parser::OutlineBuilder for CommandRecorder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo(Point2D::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo(Point2D::new(x, y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::QuadTo {
            ctrl: Point2D::new(x1, y1),
            to: Point2D::new(x, y),
        });
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::CurveTo {
            ctrl1: Point2D::new(x1, y1),
            ctrl2: Point2D::new(x2, y2),
            to: Point2D::new(x, y),
        });
    }

    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
}
