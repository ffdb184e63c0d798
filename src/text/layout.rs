//! Single-baseline text layout over a `GlyphCache`.
//!
//! Layout model:
//! - One baseline at `origin_y`; the cursor starts at `origin_x` on every call.
//! - Pen advances by `advance * scale` after each drawn glyph.
//! - Characters without a cache entry are skipped entirely, advance included.
//! - No kerning, no shaping, no line breaks.
//!
//! Each drawn glyph gets its own transform:
//! `base * translate(cursor_x, origin_y, 0) * scale(scale, scale, depth_scale)`.

use glam::{Mat4, Vec3};

use crate::text::cache::GlyphCache;

/// Receives one indexed draw per glyph.
///
/// The lifetime lets targets keep borrowed buffers until they submit.
pub trait DrawTarget<'a, B: 'a> {
    fn draw_indexed(&mut self, buffers: &'a B, index_count: u32, transform: Mat4);
}

/// Placement of one `render_text` call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextParams {
    pub origin_x: f32,
    /// Baseline.
    pub origin_y: f32,
    /// Font units -> world units.
    pub scale: f32,
    /// Z scale applied to the unit-depth meshes.
    pub depth_scale: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            scale: 1.0,
            depth_scale: 1.0,
        }
    }
}

/// Model transform of one glyph placed at `cursor_x`.
#[inline]
pub fn glyph_transform(base: Mat4, cursor_x: f32, params: &TextParams) -> Mat4 {
    base * Mat4::from_translation(Vec3::new(cursor_x, params.origin_y, 0.0))
        * Mat4::from_scale(Vec3::new(params.scale, params.scale, params.depth_scale))
}

/// Issue one draw per cached glyph of `text`. Returns the final cursor position.
pub fn render_text<'a, B, T>(
    cache: &'a GlyphCache<B>,
    text: &str,
    params: &TextParams,
    base: Mat4,
    target: &mut T,
) -> f32
where
    B: 'a,
    T: DrawTarget<'a, B> + ?Sized,
{
    let mut cursor_x = params.origin_x;

    for ch in text.chars() {
        let Some(glyph) = cache.get(ch) else {
            continue;
        };

        target.draw_indexed(
            &glyph.buffers,
            glyph.index_count,
            glyph_transform(base, cursor_x, params),
        );
        cursor_x += glyph.advance * params.scale;
    }

    cursor_x
}

/// Width `render_text` would advance for `text` at `scale`.
pub fn measure_text<B>(cache: &GlyphCache<B>, text: &str, scale: f32) -> f32 {
    text.chars()
        .filter_map(|ch| cache.get(ch))
        .map(|g| g.advance * scale)
        .sum()
}
