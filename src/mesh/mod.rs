//! Extruded glyph meshes.
//!
//! Turns a triangulated glyph outline into a closed 3D solid:
//! - front face at z = 0, normal +Z
//! - back face at z = -depth, normal -Z, same triangles with reversed winding
//! - side walls joining each contour edge's front and back copies
//!
//! Vertex layout (order matters for index arithmetic):
//! - `[0, n)`: front copies of every outline point (contour order), then Steiner points
//! - `[back_base, 2 * back_base)`: back copies in the same order
//!
//! Index layout: front triangles ++ back triangles ++ side triangles.
//!
//! Depth is baked at `MeshOptions::extrusion_depth` (1.0 by default); callers scale Z
//! at draw time.

use lyon::tessellation::FillRule;

use crate::font::flatten::FlattenOptions;
use crate::font::outline::{DEDUP_EPSILON, GlyphOutline, Point2D, build_outline};
use crate::font::tessellate::{Triangulation, triangulate};
use crate::font::{FontError, PathCommand};

/// Interleaved GPU vertex: position + normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex3D {
    #[inline]
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Axis-aligned 2D bounds in font units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb2 {
    pub min: Point2D,
    pub max: Point2D,
}

impl Aabb2 {
    /// Bounds of `points`, or `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point2D>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Point2D::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                max: Point2D::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            },
        ))
    }
}

/// Glyph mesh build options.
#[derive(Debug, Clone, Copy)]
pub struct MeshOptions {
    pub flatten: FlattenOptions,

    /// Points closer than this (on both axes) are merged.
    pub dedup_epsilon: f32,

    /// Distance between front and back face.
    pub extrusion_depth: f32,

    /// TrueType/CFF outlines are authored for non-zero winding.
    pub fill_rule: FillRule,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            flatten: FlattenOptions::default(),
            dedup_epsilon: DEDUP_EPSILON,
            extrusion_depth: 1.0,
            fill_rule: FillRule::NonZero,
        }
    }
}

/// CPU-side extruded mesh, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,

    /// First back-face vertex; also the front-face vertex count.
    pub back_base: u32,

    /// Number of indices belonging to the front face (the back face has as many).
    pub front_index_count: usize,

    /// Bounds of the outline points.
    pub bounds: Aabb2,

    /// Smoothed side-wall normal per front vertex: the average of the normals of the
    /// two ring edges meeting there. Zero for Steiner points.
    pub side_normals: Vec<[f32; 3]>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Side-wall indices (everything after the two caps).
    pub fn side_indices(&self) -> &[u32] {
        &self.indices[2 * self.front_index_count..]
    }
}

/// Edge direction rotated +90° (`(-dy, dx)`), normalized.
///
/// Points away from the filled region for both ring kinds: out of clockwise outer rings,
/// into the hole for counter-clockwise inner rings. Zero-length edges give a zero normal.
fn edge_normal(a: Point2D, b: Point2D) -> [f32; 2] {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 0.0];
    }
    [-dy / len, dx / len]
}

fn normalize2(v: [f32; 2]) -> [f32; 2] {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len <= f32::EPSILON {
        [0.0, 0.0]
    } else {
        [v[0] / len, v[1] / len]
    }
}

/// Build the closed solid for `outline` from its front-face triangulation.
///
/// Returns `None` when the outline has no contours (nothing to extrude).
///
/// Degenerate contours must already be removed; `tri` must come from `triangulate`
/// on this same outline.
pub fn extrude_outline(outline: &GlyphOutline, tri: &Triangulation, depth: f32) -> Option<MeshData> {
    if outline.is_empty() || outline.contours.iter().any(|c| c.len() < 2) {
        return None;
    }

    let front_points: Vec<Point2D> = outline
        .points()
        .chain(tri.steiner_points.iter().copied())
        .collect();
    let bounds = Aabb2::from_points(outline.points())?;

    let n = front_points.len();
    let back_base = n as u32;

    // 1. Front, 2. back.
    let mut vertices = Vec::with_capacity(2 * n);
    vertices.extend(
        front_points
            .iter()
            .map(|p| Vertex3D::new([p.x, p.y, 0.0], [0.0, 0.0, 1.0])),
    );
    vertices.extend(
        front_points
            .iter()
            .map(|p| Vertex3D::new([p.x, p.y, -depth], [0.0, 0.0, -1.0])),
    );

    let edge_count: usize = outline.contours.iter().map(|c| c.len()).sum();
    let mut indices = Vec::with_capacity(2 * tri.indices.len() + 6 * edge_count);

    // 3. Front triangles as triangulated.
    indices.extend_from_slice(&tri.indices);

    // 4. Back triangles, offset and reversed.
    for t in tri.indices.chunks_exact(3) {
        indices.extend_from_slice(&[back_base + t[0], back_base + t[2], back_base + t[1]]);
    }

    // 5. Side walls, plus smoothed per-vertex side normals.
    let mut side_normals = vec![[0.0f32; 3]; n];
    let mut offset = 0u32;
    for contour in &outline.contours {
        let pts = contour.points();
        let mut acc = vec![[0.0f32; 2]; pts.len()];

        for (i, j) in contour.edges() {
            let (fi, fj) = (offset + i as u32, offset + j as u32);
            let (bi, bj) = (back_base + fi, back_base + fj);
            indices.extend_from_slice(&[fi, fj, bi, fj, bj, bi]);

            let en = edge_normal(pts[i], pts[j]);
            for k in [i, j] {
                acc[k][0] += en[0];
                acc[k][1] += en[1];
            }
        }

        for (k, v) in acc.into_iter().enumerate() {
            let [x, y] = normalize2(v);
            side_normals[offset as usize + k] = [x, y, 0.0];
        }
        offset += pts.len() as u32;
    }

    Some(MeshData {
        vertices,
        indices,
        back_base,
        front_index_count: tri.indices.len(),
        bounds,
        side_normals,
    })
}

/// Run the full pipeline for one glyph: contours, triangulation, extrusion.
///
/// - `Ok(None)`: empty outline (or nothing left after dropping degenerate contours).
/// - `Err(Tessellation)`: lyon rejected the geometry.
pub fn build_glyph_mesh(
    commands: &[PathCommand],
    opts: &MeshOptions,
) -> Result<Option<MeshData>, FontError> {
    let mut outline = build_outline(commands, opts.flatten, opts.dedup_epsilon);

    let dropped = outline.drop_degenerate();
    if dropped > 0 {
        log::warn!("dropped {dropped} degenerate contour(s)");
    }
    if outline.is_empty() {
        return Ok(None);
    }

    let tri = triangulate(&outline, opts.fill_rule)?;
    Ok(extrude_outline(&outline, &tri, opts.extrusion_depth))
}
