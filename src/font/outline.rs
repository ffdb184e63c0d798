//! Glyph outline assembly.
//!
//! Turns an outline command stream (`PathCommand`s from an `OutlineSource`) into
//! closed point rings:
//! - `MoveTo` starts a new contour.
//! - `LineTo` appends a point.
//! - `QuadTo` / `CurveTo` are flattened (see `font::flatten`) and appended.
//!
//! Every pushed point is checked against the contour's last point; near-coincident
//! points (both deltas below `DEDUP_EPSILON`) are dropped so the triangulator never
//! sees zero-length edges.
//!
//! Rings are implicitly closed: the last point connects back to the first. TrueType
//! outlines repeat the start point at the end of each contour; that closing point is
//! dropped as well.

use crate::font::PathCommand;
use crate::font::flatten::{FlattenOptions, flatten_cubic, flatten_quad};

/// Default tolerance for "same point" checks, in font units.
pub const DEDUP_EPSILON: f32 = 0.001;

/// A 2D point in font units (Y up).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinate deltas are below `epsilon`.
    #[inline]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// One closed ring of a glyph outline (outer boundary or hole).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    points: Vec<Point2D>,
}

impl Contour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a contour from raw points, applying the same dedup rules as `ContourBuilder`.
    pub fn from_points(points: impl IntoIterator<Item = Point2D>, epsilon: f32) -> Self {
        let mut contour = Self::new();
        for p in points {
            contour.push(p, epsilon);
        }
        contour.drop_closing_point(epsilon);
        contour
    }

    /// Append `p` unless it coincides with the current last point.
    pub fn push(&mut self, p: Point2D, epsilon: f32) {
        if let Some(&last) = self.points.last() {
            if last.approx_eq(p, epsilon) {
                return;
            }
        }
        self.points.push(p);
    }

    /// Drop a trailing point that repeats the first one (the ring closes implicitly).
    fn drop_closing_point(&mut self, epsilon: f32) {
        if self.points.len() > 1 {
            let first = self.points[0];
            if let Some(&last) = self.points.last() {
                if first.approx_eq(last, epsilon) {
                    self.points.pop();
                }
            }
        }
    }

    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than three distinct points: no area, and would corrupt triangulation.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// Iterate the ring's edges as `(i, next)` index pairs, wrapping at the end.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (i, (i + 1) % n))
    }
}

/// All contours of one glyph, in the order the font provides them.
///
/// An empty outline means "no visible ink" (e.g. space).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphOutline {
    pub contours: Vec<Contour>,
}

impl GlyphOutline {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Total point count across all contours (the front-face vertex count).
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Iterate every point in contour order; position `i` is the point's global index.
    pub fn points(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.contours.iter().flat_map(|c| c.points().iter().copied())
    }

    /// Remove contours with fewer than three points. Returns how many were removed.
    pub fn drop_degenerate(&mut self) -> usize {
        let before = self.contours.len();
        self.contours.retain(|c| !c.is_degenerate());
        before - self.contours.len()
    }
}

/// Builds a `GlyphOutline` from outline commands.
#[derive(Debug, Clone)]
pub struct ContourBuilder {
    contours: Vec<Contour>,
    current: Point2D,
    flatten: FlattenOptions,
    epsilon: f32,
}

impl Default for ContourBuilder {
    fn default() -> Self {
        Self::new(FlattenOptions::default(), DEDUP_EPSILON)
    }
}

impl ContourBuilder {
    pub fn new(flatten: FlattenOptions, epsilon: f32) -> Self {
        Self {
            contours: Vec::new(),
            current: Point2D::default(),
            flatten,
            epsilon,
        }
    }

    /// Start a new contour at `p`.
    pub fn move_to(&mut self, p: Point2D) {
        self.seal_current();
        let mut contour = Contour::new();
        contour.push(p, self.epsilon);
        self.contours.push(contour);
        self.current = p;
    }

    pub fn line_to(&mut self, p: Point2D) {
        let epsilon = self.epsilon;
        self.current_contour().push(p, epsilon);
        self.current = p;
    }

    pub fn quad_to(&mut self, ctrl: Point2D, to: Point2D) {
        let from = self.current;
        let (opts, epsilon) = (self.flatten, self.epsilon);
        let contour = self.current_contour();
        flatten_quad(from, ctrl, to, opts, &mut |p| contour.push(p, epsilon));
        self.current = to;
    }

    pub fn curve_to(&mut self, ctrl1: Point2D, ctrl2: Point2D, to: Point2D) {
        let from = self.current;
        let (opts, epsilon) = (self.flatten, self.epsilon);
        let contour = self.current_contour();
        flatten_cubic(from, ctrl1, ctrl2, to, opts, &mut |p| contour.push(p, epsilon));
        self.current = to;
    }

    pub fn close(&mut self) {
        self.seal_current();
    }

    pub fn apply(&mut self, cmd: &PathCommand) {
        match *cmd {
            PathCommand::MoveTo(p) => self.move_to(p),
            PathCommand::LineTo(p) => self.line_to(p),
            PathCommand::QuadTo { ctrl, to } => self.quad_to(ctrl, to),
            PathCommand::CurveTo { ctrl1, ctrl2, to } => self.curve_to(ctrl1, ctrl2, to),
            PathCommand::Close => self.close(),
        }
    }

    pub fn finish(mut self) -> GlyphOutline {
        self.seal_current();
        GlyphOutline::new(self.contours)
    }

    /// Segments without a preceding `MoveTo` start an implicit contour at the pen position.
    fn current_contour(&mut self) -> &mut Contour {
        if self.contours.is_empty() {
            let mut contour = Contour::new();
            contour.push(self.current, self.epsilon);
            self.contours.push(contour);
        }
        let last = self.contours.len() - 1;
        &mut self.contours[last]
    }

    fn seal_current(&mut self) {
        let epsilon = self.epsilon;
        if let Some(contour) = self.contours.last_mut() {
            contour.drop_closing_point(epsilon);
        }
    }
}

/// Run a whole command stream through a `ContourBuilder`.
pub fn build_outline(commands: &[PathCommand], flatten: FlattenOptions, epsilon: f32) -> GlyphOutline {
    let mut builder = ContourBuilder::new(flatten, epsilon);
    for cmd in commands {
        builder.apply(cmd);
    }
    builder.finish()
}
