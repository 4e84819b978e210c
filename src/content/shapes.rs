//! §4.E shape decomposition: circle, ellipse and arc broken into cubic
//! Bézier segments that the content-stream writer can drive through `m`/
//! `l`/`c`.
//!
//! The point/angle arithmetic is adapted from the teacher's
//! `svg/geometry.rs` (`Pair`, `Angle`, `Matrix2x2`), narrowed to `f32` since
//! that is this crate's real-number type (§4.A). The arc control-point
//! formula and the angle-splitting loop are grounded in libharu's
//! `InternalArc` and `HPDF_Page_Arc2`
//! (`examples/original_source/src/hpdf_page_operator.c`).

use std::f32::consts::PI;

use crate::error::{PdfError, PdfResult};

/// Control-point offset for a quarter-circle/ellipse cubic Bézier
/// approximation. See spec §4.E.
pub const KAPPA: f32 = 0.552;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    fn rotate(self, angle_radians: f32) -> Point {
        let (sin, cos) = angle_radians.sin_cos();
        Point { x: self.x * cos - self.y * sin, y: self.x * sin + self.y * cos }
    }

    fn translate(self, by: Point) -> Point {
        Point { x: self.x + by.x, y: self.y + by.y }
    }
}

/// One cubic Bézier segment: two control points and an end point. The
/// start point is always the caller's current point (or, for the first
/// segment of a fresh shape, the point explicitly moved to).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CubicSegment {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

/// Four quadrant segments that together trace a full circle or ellipse,
/// starting at the leftmost point and proceeding counterclockwise.
pub fn ellipse_quadrants(cx: f32, cy: f32, xray: f32, yray: f32) -> [CubicSegment; 4] {
    let kx = xray * KAPPA;
    let ky = yray * KAPPA;
    let left = Point::new(cx - xray, cy);
    let top = Point::new(cx, cy + yray);
    let right = Point::new(cx + xray, cy);
    let bottom = Point::new(cx, cy - yray);

    [
        CubicSegment {
            start: left,
            control1: Point::new(cx - xray, cy + ky),
            control2: Point::new(cx - kx, cy + yray),
            end: top,
        },
        CubicSegment {
            start: top,
            control1: Point::new(cx + kx, cy + yray),
            control2: Point::new(cx + xray, cy + ky),
            end: right,
        },
        CubicSegment {
            start: right,
            control1: Point::new(cx + xray, cy - ky),
            control2: Point::new(cx + kx, cy - yray),
            end: bottom,
        },
        CubicSegment {
            start: bottom,
            control1: Point::new(cx - kx, cy - yray),
            control2: Point::new(cx - xray, cy - ky),
            end: left,
        },
    ]
}

pub fn circle_quadrants(cx: f32, cy: f32, r: f32) -> [CubicSegment; 4] {
    ellipse_quadrants(cx, cy, r, r)
}

/// One segment of an arc, carrying whether it continues a previous segment
/// (in which case the caller must not re-`m`ove/`l`ine to its start point).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArcSegment {
    pub start: Point,
    pub segment: CubicSegment,
    pub is_continuation: bool,
}

/// Control points for one ≤90°-wide arc segment from `ang1` to `ang2`
/// (degrees), per the Whizkid/Cohen approximation in spec §4.E.
fn arc_control_points(r: f32, ang1: f32, ang2: f32) -> (Point, Point, Point, Point) {
    let delta = (90.0 - (ang1 + ang2) / 2.0) * PI / 180.0;
    let theta = (ang2 - ang1) / 2.0 * PI / 180.0;

    let p0 = Point::new(r * theta.cos(), r * theta.sin());
    let p2 = Point::new((4.0 * r - p0.x) / 3.0, (r - p0.x) * (p0.x - 3.0 * r) / (3.0 * p0.y));
    let p1 = Point::new(p2.x, -p2.y);
    let p3 = Point::new(p0.x, -p0.y);

    (p0.rotate(delta), p1.rotate(delta), p2.rotate(delta), p3.rotate(delta))
}

/// Decompose the arc `(cx, cy, r, ang1, ang2)` (degrees, measured the way
/// libharu measures them) into a fan of ≤90°-wide cubic segments.
///
/// Negative angles are normalized by adding multiples of 360 first. A
/// total span strictly greater than 360° is rejected: this is the
/// documented resolution of the open question in the original
/// implementation, which raised the same error but fell through and
/// produced nonsense geometry anyway.
pub fn arc(cx: f32, cy: f32, r: f32, ang1: f32, ang2: f32) -> PdfResult<Vec<ArcSegment>> {
    let mut ang1 = ang1;
    let mut ang2 = ang2;
    if ang1 < 0.0 {
        ang1 += 360.0;
    }
    if ang2 < 0.0 {
        ang2 += 360.0;
    }

    if (ang2 - ang1).abs() >= 360.0 {
        return Err(PdfError::OutOfRange { op: "Arc", detail: format!("angle span {} exceeds 360 degrees", ang2 - ang1) });
    }

    let mut segments = Vec::new();
    let mut current = ang1;
    let mut is_continuation = false;
    loop {
        if (current - ang2).abs() < 0.1 {
            break;
        }
        let next = if ang2 > current { (current + 90.0).min(ang2) } else { (current - 90.0).max(ang2) };

        let (p0, p1, p2, p3) = arc_control_points(r, current, next);
        let origin = Point::new(cx, cy);
        let start = p0.translate(origin);
        let segment = CubicSegment {
            start,
            control1: p1.translate(origin),
            control2: p2.translate(origin),
            end: p3.translate(origin),
        };
        segments.push(ArcSegment { start, segment, is_continuation });

        is_continuation = true;
        current = next;
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_quadrants_start_at_leftmost_point() {
        let quadrants = circle_quadrants(0.0, 0.0, 10.0);
        assert_eq!(quadrants[0].start, Point::new(-10.0, 0.0));
        assert_eq!(quadrants[3].end, Point::new(-10.0, 0.0));
    }

    #[test]
    fn circle_control_points_match_kappa_approximation() {
        let quadrants = circle_quadrants(0.0, 0.0, 10.0);
        let expected = 10.0 * KAPPA;
        assert!((quadrants[0].control1.y - expected).abs() < 6e-4 * 10.0);
    }

    #[test]
    fn arc_spanning_more_than_360_degrees_is_rejected() {
        assert!(arc(0.0, 0.0, 10.0, 0.0, 361.0).is_err());
    }

    #[test]
    fn arc_spanning_exactly_360_degrees_is_rejected() {
        assert!(arc(0.0, 0.0, 10.0, 0.0, 360.0).is_err());
    }

    #[test]
    fn arc_splits_wide_spans_into_quarter_turns() {
        let segments = arc(0.0, 0.0, 10.0, 0.0, 180.0).unwrap();
        assert_eq!(segments.len(), 2);
        assert!(!segments[0].is_continuation);
        assert!(segments[1].is_continuation);
    }

    #[test]
    fn arc_terminates_for_a_small_span() {
        let segments = arc(0.0, 0.0, 10.0, 10.0, 10.05).unwrap();
        assert!(segments.is_empty());
    }
}
