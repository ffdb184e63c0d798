//! Curve flattening.
//!
//! Bezier segments from glyph outlines are approximated by polylines using recursive
//! midpoint subdivision (de Casteljau at t = 0.5).
//!
//! Termination:
//! - The flatness metric is the cross product of (control - end) with the chord.
//!   It is proportional to the control point's distance from the chord, scaled by
//!   the chord length, so no square root is needed.
//! - Recursion stops when the metric is below `tolerance` OR when `depth > max_depth`.
//!   The depth bound keeps pathological curves (near-coincident control points,
//!   huge coordinates) from recursing without limit. Extreme curvature may show
//!   facets; that is accepted.
//!
//! Output:
//! - Only the segment end points are emitted; the curve's start point is assumed to
//!   already be in the sequence being built.
//! - Sub-curves are visited left before right, so points come out in path order.
//! - A control point collinear with the chord emits exactly the end point.

use crate::font::outline::Point2D;

/// Flattening parameters.
///
/// Both values are in the same units as the outline (font units).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlattenOptions {
    pub tolerance: f32,
    pub max_depth: u32,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            max_depth: 5,
        }
    }
}

#[inline]
fn chord_deviation(ctrl: Point2D, from: Point2D, to: Point2D) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    ((ctrl.x - to.x) * dy - (ctrl.y - to.y) * dx).abs()
}

/// Flatten a quadratic Bezier, emitting every polyline point after `from`.
pub fn flatten_quad<F: FnMut(Point2D)>(
    from: Point2D,
    ctrl: Point2D,
    to: Point2D,
    opts: FlattenOptions,
    emit: &mut F,
) {
    quad_rec(from, ctrl, to, opts, 0, emit);
}

fn quad_rec<F: FnMut(Point2D)>(
    p0: Point2D,
    p1: Point2D,
    p2: Point2D,
    opts: FlattenOptions,
    depth: u32,
    emit: &mut F,
) {
    if chord_deviation(p1, p0, p2) < opts.tolerance || depth > opts.max_depth {
        emit(p2);
        return;
    }

    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let mid = p01.midpoint(p12);

    quad_rec(p0, p01, mid, opts, depth + 1, emit);
    quad_rec(mid, p12, p2, opts, depth + 1, emit);
}

/// Flatten a cubic Bezier (CFF outlines), emitting every polyline point after `from`.
///
/// Same termination rule as the quadratic case; the metric sums the deviation of
/// both control points.
pub fn flatten_cubic<F: FnMut(Point2D)>(
    from: Point2D,
    ctrl1: Point2D,
    ctrl2: Point2D,
    to: Point2D,
    opts: FlattenOptions,
    emit: &mut F,
) {
    cubic_rec(from, ctrl1, ctrl2, to, opts, 0, emit);
}

fn cubic_rec<F: FnMut(Point2D)>(
    p0: Point2D,
    p1: Point2D,
    p2: Point2D,
    p3: Point2D,
    opts: FlattenOptions,
    depth: u32,
    emit: &mut F,
) {
    let d = chord_deviation(p1, p0, p3) + chord_deviation(p2, p0, p3);
    if d < opts.tolerance || depth > opts.max_depth {
        emit(p3);
        return;
    }

    let p01 = p0.midpoint(p1);
    let p12 = p1.midpoint(p2);
    let p23 = p2.midpoint(p3);
    let p012 = p01.midpoint(p12);
    let p123 = p12.midpoint(p23);
    let mid = p012.midpoint(p123);

    cubic_rec(p0, p01, p012, mid, opts, depth + 1, emit);
    cubic_rec(mid, p123, p23, p3, opts, depth + 1, emit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point2D {
        Point2D::new(x, y)
    }

    fn collect_quad(from: Point2D, ctrl: Point2D, to: Point2D, opts: FlattenOptions) -> Vec<Point2D> {
        let mut out = vec![from];
        flatten_quad(from, ctrl, to, opts, &mut |q| out.push(q));
        out
    }

    fn quad_at(p0: Point2D, p1: Point2D, p2: Point2D, t: f32) -> Point2D {
        let u = 1.0 - t;
        p(
            u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
            u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
        )
    }

    fn distance_to_segment(q: Point2D, a: Point2D, b: Point2D) -> f32 {
        let (abx, aby) = (b.x - a.x, b.y - a.y);
        let len2 = abx * abx + aby * aby;
        let t = if len2 > 0.0 {
            (((q.x - a.x) * abx + (q.y - a.y) * aby) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (cx, cy) = (a.x + t * abx, a.y + t * aby);
        ((q.x - cx).powi(2) + (q.y - cy).powi(2)).sqrt()
    }

    #[test]
    fn collinear_control_yields_endpoints_only() {
        let pts = collect_quad(p(0.0, 0.0), p(5.0, 5.0), p(10.0, 10.0), FlattenOptions::default());
        assert_eq!(pts, vec![p(0.0, 0.0), p(10.0, 10.0)]);

        // Control point beyond the chord but still on its line.
        let pts = collect_quad(p(0.0, 0.0), p(20.0, 0.0), p(10.0, 0.0), FlattenOptions::default());
        assert_eq!(pts, vec![p(0.0, 0.0), p(10.0, 0.0)]);
    }

    #[test]
    fn ends_exactly_at_curve_end() {
        let to = p(100.0, 0.0);
        let pts = collect_quad(p(0.0, 0.0), p(50.0, 100.0), to, FlattenOptions::default());
        assert_eq!(*pts.last().unwrap(), to);
        assert!(pts.len() > 2);
    }

    #[test]
    fn deviation_within_tolerance_or_depth_limited() {
        let opts = FlattenOptions::default();
        let (p0, p1, p2) = (p(0.0, 0.0), p(50.0, 100.0), p(100.0, 0.0));
        let pts = collect_quad(p0, p1, p2, opts);

        let max_segments = 1usize << (opts.max_depth + 1);
        let mut max_dev = 0.0f32;
        for i in 0..=200 {
            let q = quad_at(p0, p1, p2, i as f32 / 200.0);
            let d = pts
                .windows(2)
                .map(|w| distance_to_segment(q, w[0], w[1]))
                .fold(f32::INFINITY, f32::min);
            max_dev = max_dev.max(d);
        }

        assert!(
            max_dev < opts.tolerance || pts.len() - 1 == max_segments,
            "max deviation {max_dev} with {} segments",
            pts.len() - 1
        );
    }

    #[test]
    fn recursion_is_bounded() {
        // Huge coordinates never satisfy the tolerance; depth must stop it.
        let opts = FlattenOptions::default();
        let pts = collect_quad(p(0.0, 0.0), p(1.0e6, 1.0e6), p(2.0e6, 0.0), opts);
        assert_eq!(pts.len() - 1, 1 << (opts.max_depth + 1));

        let mut n = 0;
        flatten_cubic(
            p(0.0, 0.0),
            p(0.0, 1.0e6),
            p(1.0e6, 1.0e6),
            p(1.0e6, 0.0),
            opts,
            &mut |_| n += 1,
        );
        assert_eq!(n, 1 << (opts.max_depth + 1));
    }

    #[test]
    fn points_follow_path_order() {
        let pts = collect_quad(p(0.0, 0.0), p(50.0, 100.0), p(100.0, 0.0), FlattenOptions::default());
        assert!(pts.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn straight_cubic_collapses() {
        let mut out = Vec::new();
        flatten_cubic(
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(20.0, 0.0),
            p(30.0, 0.0),
            FlattenOptions::default(),
            &mut |q| out.push(q),
        );
        assert_eq!(out, vec![p(30.0, 0.0)]);
    }
}
