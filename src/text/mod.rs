//! Extruded 3D text.
//!
//! - `cache`: per-character glyph meshes, built once per font load.
//! - `layout`: walks a string along one baseline and issues a draw per glyph.
//!
//! `TextRenderer3D` ties both to a mesh uploader and is the usual entrypoint:
//! `load_font(path)` once, then `render_text(...)` every frame.

pub mod cache;
pub mod layout;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::Path;

use glam::Mat4;

use crate::font::OutlineSource;
use crate::mesh::MeshOptions;
use cache::{GlyphCache, LoadReport, MeshUploader};
use layout::{DrawTarget, TextParams};

/// Glyph cache + uploader.
pub struct TextRenderer3D<U: MeshUploader> {
    uploader: U,
    cache: GlyphCache<U::Buffers>,
}

impl<U: MeshUploader> TextRenderer3D<U> {
    pub fn new(uploader: U) -> Self {
        Self::with_options(uploader, MeshOptions::default())
    }

    pub fn with_options(uploader: U, options: MeshOptions) -> Self {
        Self {
            uploader,
            cache: GlyphCache::new(options),
        }
    }

    /// Load the font at `path` and build meshes for every printable ASCII glyph.
    ///
    /// Returns `false` if the file can't be read or isn't a font; the cache is then empty.
    /// Glyphs missing from the font are not failures.
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.cache.load_font(path, &mut self.uploader) {
            Ok(_) => true,
            Err(e) => {
                log::error!("failed to load font {}: {e}", path.display());
                false
            }
        }
    }

    /// Build meshes from an already opened outline source.
    pub fn load_source<S: OutlineSource + ?Sized>(&mut self, source: &S) -> LoadReport {
        self.cache.load_from_source(source, &mut self.uploader)
    }

    /// Draw `text` into `target`. Returns the cursor position after the last glyph.
    pub fn render_text<'a, T>(
        &'a self,
        text: &str,
        params: &TextParams,
        base: Mat4,
        target: &mut T,
    ) -> f32
    where
        T: DrawTarget<'a, U::Buffers> + ?Sized,
    {
        layout::render_text(&self.cache, text, params, base, target)
    }

    /// Width of `text` at `scale`, under the same skip rule as `render_text`.
    pub fn measure_text(&self, text: &str, scale: f32) -> f32 {
        layout::measure_text(&self.cache, text, scale)
    }

    #[inline]
    pub fn cache(&self) -> &GlyphCache<U::Buffers> {
        &self.cache
    }

    #[inline]
    pub fn uploader(&self) -> &U {
        &self.uploader
    }
}
