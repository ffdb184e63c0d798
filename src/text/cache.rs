//! Per-character glyph mesh cache.
//!
//! One `GlyphMesh` per printable ASCII code (`SUPPORTED_CODES`), built eagerly on font
//! load and never rebuilt on its own:
//! - missing glyphs and empty outlines leave no entry (both are skipped at render time)
//! - each entry exclusively owns its uploaded buffers; dropping the entry releases them
//! - entries live in a `BTreeMap`, so teardown order is ascending code order

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::font::{FontError, FontFace, OutlineSource};
use crate::mesh::{Aabb2, MeshOptions, Vertex3D, build_glyph_mesh};

/// Character codes that get a cache slot: printable ASCII.
pub const SUPPORTED_CODES: RangeInclusive<u8> = 32..=126;

/// Uploads mesh data to the rendering backend.
pub trait MeshUploader {
    /// Owned handle to the uploaded vertex + index buffers. Dropping it releases them.
    type Buffers;

    fn upload(&mut self, label: &str, vertices: &[Vertex3D], indices: &[u32]) -> Self::Buffers;
}

/// A cached glyph: uploaded buffers plus the metrics layout needs.
#[derive(Debug)]
pub struct GlyphMesh<B> {
    pub buffers: B,
    pub index_count: u32,
    pub vertex_count: u32,
    /// Advance width in font units.
    pub advance: f32,
    /// Left side bearing in font units. Layout does not use it.
    pub left_side_bearing: f32,
    pub bounds: Aabb2,
}

/// What happened to one code during a load.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlyphStatus {
    Built,
    /// Already had an entry; nothing was rebuilt.
    Cached,
    /// The font has no glyph for this code.
    Missing,
    /// The glyph exists but has no visible contours.
    Empty,
    /// Tessellation failed; treated like an empty outline.
    Failed,
}

/// Summary of a font load.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub built: usize,
    pub missing: usize,
    pub empty: usize,
    pub failed: usize,
}

impl LoadReport {
    fn record(&mut self, status: GlyphStatus) {
        match status {
            GlyphStatus::Built => self.built += 1,
            GlyphStatus::Missing => self.missing += 1,
            GlyphStatus::Empty => self.empty += 1,
            GlyphStatus::Failed => self.failed += 1,
            GlyphStatus::Cached => {}
        }
    }
}

/// Mapping from character code to its built mesh.
#[derive(Debug)]
pub struct GlyphCache<B> {
    glyphs: BTreeMap<u8, GlyphMesh<B>>,
    options: MeshOptions,
}

impl<B> Default for GlyphCache<B> {
    fn default() -> Self {
        Self::new(MeshOptions::default())
    }
}

impl<B> GlyphCache<B> {
    pub fn new(options: MeshOptions) -> Self {
        Self {
            glyphs: BTreeMap::new(),
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Cached mesh for `ch`, if any. Characters outside `SUPPORTED_CODES` never have one.
    pub fn get(&self, ch: char) -> Option<&GlyphMesh<B>> {
        let code = u8::try_from(ch).ok()?;
        self.glyphs.get(&code)
    }

    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.get(ch).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Cached entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &GlyphMesh<B>)> + '_ {
        self.glyphs.iter().map(|(&code, mesh)| (code as char, mesh))
    }

    /// Drop every entry (and with it every buffer), in ascending code order.
    pub fn clear(&mut self) {
        while self.glyphs.pop_first().is_some() {}
    }

    /// Build and store the mesh for `code` unless it is missing, empty, or already cached.
    pub fn build_or_skip<S, U>(&mut self, code: u8, source: &S, uploader: &mut U) -> GlyphStatus
    where
        S: OutlineSource + ?Sized,
        U: MeshUploader<Buffers = B> + ?Sized,
    {
        if self.glyphs.contains_key(&code) {
            return GlyphStatus::Cached;
        }

        let ch = code as char;
        let Some(glyph) = source.glyph_index(ch) else {
            log::debug!("glyph {ch:?}: not in font");
            return GlyphStatus::Missing;
        };

        let commands = source.glyph_outline(glyph);
        if commands.is_empty() {
            log::debug!("glyph {ch:?}: empty outline");
            return GlyphStatus::Empty;
        }

        let mesh = match build_glyph_mesh(&commands, &self.options) {
            Ok(Some(mesh)) => mesh,
            Ok(None) => {
                log::debug!("glyph {ch:?}: no contours left after cleanup");
                return GlyphStatus::Empty;
            }
            Err(e) => {
                log::warn!("glyph {ch:?}: {e}");
                return GlyphStatus::Failed;
            }
        };

        let metrics = source.h_metrics(ch);
        let label = format!("glyph {ch:?}");
        let buffers = uploader.upload(&label, &mesh.vertices, &mesh.indices);

        log::debug!(
            "glyph {ch:?}: {} vertices, {} indices",
            mesh.vertex_count(),
            mesh.index_count()
        );

        self.glyphs.insert(
            code,
            GlyphMesh {
                buffers,
                index_count: mesh.index_count() as u32,
                vertex_count: mesh.vertex_count() as u32,
                advance: metrics.advance_width,
                left_side_bearing: metrics.left_side_bearing,
                bounds: mesh.bounds,
            },
        );
        GlyphStatus::Built
    }

    /// Replace the cache contents with meshes for every supported code of `source`.
    pub fn load_from_source<S, U>(&mut self, source: &S, uploader: &mut U) -> LoadReport
    where
        S: OutlineSource + ?Sized,
        U: MeshUploader<Buffers = B> + ?Sized,
    {
        self.clear();

        let mut report = LoadReport::default();
        for code in SUPPORTED_CODES {
            report.record(self.build_or_skip(code, source, uploader));
        }
        report
    }

    /// Open the font at `path` and build every supported glyph.
    ///
    /// Errors:
    /// - `ReadFailed` / `ParseFailed`: the file could not be read or is not a font.
    ///   The cache is left empty.
    pub fn load_font<U>(&mut self, path: impl AsRef<Path>, uploader: &mut U) -> Result<LoadReport, FontError>
    where
        U: MeshUploader<Buffers = B> + ?Sized,
    {
        let path = path.as_ref();
        log::info!("loading font {}", path.display());

        let face = match FontFace::from_file(path) {
            Ok(face) => face,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        let report = self.load_from_source(&face, uploader);
        log::info!(
            "font {}: {} glyphs built, {} missing, {} empty, {} failed",
            path.display(),
            report.built,
            report.missing,
            report.empty,
            report.failed
        );
        Ok(report)
    }
}
