//! Glyph outline triangulation.
//!
//! This module triangulates the front face of a glyph (all contours, outer rings and
//! holes together) using `lyon::tessellation::FillTessellator`.
//!
//! Index convention:
//! - Contour points are numbered in traversal order, concatenated across contours:
//!   the first contour occupies `[0, n0)`, the second `[n0, n0 + n1)`, and so on.
//! - Output triangles index into that numbering, so the extrusion step can emit one
//!   vertex per outline point and reuse the indices unchanged.
//!
//! Notes:
//! - Fonts are authored for non-zero winding; that's the default fill rule. Nested
//!   contours and holes fall out of the fill rule, no outer/hole classification needed.
//! - Self-intersecting contours make lyon create vertices at the crossings. Those have
//!   no outline point to map to; they are returned as `steiner_points` and numbered
//!   after the last contour point.
//! - Every triangle is emitted counter-clockwise in font space (Y up). This is the
//!   front-face convention the rest of the pipeline builds on.

use lyon::math::point;
use lyon::path::{EndpointId, Path};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

use crate::font::FontError;
use crate::font::outline::{GlyphOutline, Point2D};

/// Front-face triangulation of one glyph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Flat triangle list (3 indices per triangle), counter-clockwise.
    pub indices: Vec<u32>,
    /// Extra vertices created at self-intersections, indexed after the outline points.
    pub steiner_points: Vec<Point2D>,
}

impl Triangulation {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Maps lyon output vertices back to outline point indices.
struct SourceIndexCtor<'a> {
    /// `EndpointId` -> global outline point index (`u32::MAX` for ids we never emitted).
    endpoint_to_index: &'a [u32],
    first_steiner: u32,
    steiner_points: &'a mut Vec<Point2D>,
}

impl FillVertexConstructor<u32> for SourceIndexCtor<'_> {
    fn new_vertex(&mut self, v: FillVertex) -> u32 {
        if let Some(id) = v.as_endpoint_id() {
            match self.endpoint_to_index.get(id.0 as usize) {
                Some(&idx) if idx != u32::MAX => return idx,
                _ => {}
            }
        }

        let p = v.position();
        self.steiner_points.push(Point2D::new(p.x, p.y));
        self.first_steiner + (self.steiner_points.len() as u32 - 1)
    }
}

/// Build a closed lyon path from the outline, recording where each point landed.
///
/// `lyon::path::Path` numbers endpoints by their slot in its point storage, and a
/// closed sub-path stores an extra copy of its first point. The returned table maps
/// those endpoint ids to our contiguous numbering.
fn outline_to_path(outline: &GlyphOutline) -> (Path, Vec<u32>) {
    let mut builder = Path::builder();
    let mut endpoint_to_index = Vec::with_capacity(outline.point_count() + outline.contours.len());
    let mut next_index = 0u32;

    for contour in &outline.contours {
        let mut pts = contour.points().iter();
        let Some(first) = pts.next() else {
            continue;
        };

        let id = builder.begin(point(first.x, first.y));
        record(&mut endpoint_to_index, id, next_index);
        next_index += 1;

        for p in pts {
            let id = builder.line_to(point(p.x, p.y));
            record(&mut endpoint_to_index, id, next_index);
            next_index += 1;
        }

        builder.close();
    }

    (builder.build(), endpoint_to_index)
}

fn record(table: &mut Vec<u32>, id: EndpointId, index: u32) {
    let slot = id.0 as usize;
    if table.len() <= slot {
        table.resize(slot + 1, u32::MAX);
    }
    table[slot] = index;
}

fn signed_area2(a: Point2D, b: Point2D, c: Point2D) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Triangulate all contours of `outline` into a front-face index list.
///
/// Degenerate contours must already be removed (see `GlyphOutline::drop_degenerate`).
///
/// Errors:
/// - `FontError::Tessellation` if lyon rejects the geometry.
pub fn triangulate(outline: &GlyphOutline, fill_rule: FillRule) -> Result<Triangulation, FontError> {
    if outline.is_empty() {
        return Ok(Triangulation::default());
    }

    let (path, endpoint_to_index) = outline_to_path(outline);
    let point_count = outline.point_count() as u32;

    let mut steiner_points = Vec::new();
    let mut buffers: VertexBuffers<u32, u32> = VertexBuffers::new();

    // Lines only: the tolerance never applies, but keep lyon's default.
    let options = FillOptions::default().with_fill_rule(fill_rule);

    {
        let ctor = SourceIndexCtor {
            endpoint_to_index: &endpoint_to_index,
            first_steiner: point_count,
            steiner_points: &mut steiner_points,
        };
        let mut tess = FillTessellator::new();
        // `tessellate_with_ids` keeps endpoint ids on the emitted vertices;
        // plain `tessellate_path` drops them for paths without attributes.
        tess.tessellate_with_ids(
            path.id_iter(),
            &path,
            None,
            &options,
            &mut BuffersBuilder::new(&mut buffers, ctor),
        )
        .map_err(|e| FontError::Tessellation(format!("{e:?}")))?;
    }

    // lyon's vertex ids -> outline point indices.
    let positions: Vec<Point2D> = outline
        .points()
        .chain(steiner_points.iter().copied())
        .collect();

    let mut indices = Vec::with_capacity(buffers.indices.len());
    for tri in buffers.indices.chunks_exact(3) {
        let a = buffers.vertices[tri[0] as usize];
        let b = buffers.vertices[tri[1] as usize];
        let c = buffers.vertices[tri[2] as usize];

        let area = signed_area2(positions[a as usize], positions[b as usize], positions[c as usize]);
        if area < 0.0 {
            indices.extend_from_slice(&[a, c, b]);
        } else {
            indices.extend_from_slice(&[a, b, c]);
        }
    }

    Ok(Triangulation {
        indices,
        steiner_points,
    })
}
