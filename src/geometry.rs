// Segment math in world space: projection, distances and the orientation-based
// intersection test used to reject self-crossing strokes.

use crate::types::Point;

/// A directed segment between two world points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Closest point to `p` on segment `a`-`b` (projection clamped to the segment).
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy)
}

pub fn point_segment_distance(p: Point, seg: &Segment) -> f64 {
    p.distance(closest_point_on_segment(p, seg.start, seg.end))
}

/// Minimum of the four endpoint-to-segment distances.
/// Not exact for crossing segments; crossings are caught by [`segments_intersect`].
pub fn segment_distance(a: &Segment, b: &Segment) -> f64 {
    point_segment_distance(a.start, b)
        .min(point_segment_distance(a.end, b))
        .min(point_segment_distance(b.start, a))
        .min(point_segment_distance(b.end, a))
}

/// Sign of the turn p -> q -> r. Magnitudes below `epsilon` count as collinear (0).
pub fn orientation(p: Point, q: Point, r: Point, epsilon: f64) -> i8 {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val.abs() < epsilon {
        0
    } else if val > 0.0 {
        1
    } else {
        -1
    }
}

/// True when `q` lies inside the bounding box of `p`-`r` (inclusive).
fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Classic orientation test with inclusive collinear overlap.
pub fn segments_intersect(a: &Segment, b: &Segment, epsilon: f64) -> bool {
    let (p1, p2, p3, p4) = (a.start, a.end, b.start, b.end);
    let o1 = orientation(p1, p2, p3, epsilon);
    let o2 = orientation(p1, p2, p4, epsilon);
    let o3 = orientation(p3, p4, p1, epsilon);
    let o4 = orientation(p3, p4, p2, epsilon);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p3, p2))
        || (o2 == 0 && on_segment(p1, p4, p2))
        || (o3 == 0 && on_segment(p3, p1, p4))
        || (o4 == 0 && on_segment(p3, p2, p4))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = seg(0.0, 0.0, 10.0, 10.0);
        let b = seg(0.0, 10.0, 10.0, 0.0);
        assert!(segments_intersect(&a, &b, EPS));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(0.0, 1.0, 10.0, 1.0);
        assert!(!segments_intersect(&a, &b, EPS));
    }

    #[test]
    fn collinear_overlap_and_touching_count() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        assert!(segments_intersect(&a, &seg(5.0, 0.0, 15.0, 0.0), EPS));
        assert!(segments_intersect(&a, &seg(10.0, 0.0, 10.0, 5.0), EPS));
        assert!(!segments_intersect(&a, &seg(11.0, 0.0, 15.0, 0.0), EPS));
    }

    #[test]
    fn intersection_is_symmetric() {
        let cases = [
            (seg(0.0, 0.0, 10.0, 10.0), seg(0.0, 10.0, 10.0, 0.0)),
            (seg(0.0, 0.0, 10.0, 0.0), seg(5.0, 0.0, 15.0, 0.0)),
            (seg(0.0, 0.0, 10.0, 0.0), seg(0.0, 1.0, 10.0, 1.0)),
            (seg(0.0, 0.0, 4.0, 4.0), seg(5.0, 5.0, 9.0, 1.0)),
            (seg(1.0, 1.0, 1.0, 1.0), seg(0.0, 0.0, 2.0, 2.0)),
            (seg(3.0, -2.0, 3.0, 7.0), seg(-1.0, 2.0, 8.0, 2.5)),
        ];
        for (a, b) in cases {
            assert_eq!(segments_intersect(&a, &b, EPS), segments_intersect(&b, &a, EPS));
        }
    }

    #[test]
    fn closest_point_clamps_to_ends() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Point::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Point::new(15.0, 3.0), a, b), b);
        assert_eq!(closest_point_on_segment(Point::new(4.0, 3.0), a, b), Point::new(4.0, 0.0));
        assert_eq!(closest_point_on_segment(Point::new(4.0, 3.0), a, a), a);
    }

    #[test]
    fn segment_distance_uses_endpoints() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(3.0, 4.0, 7.0, 8.0);
        assert!((segment_distance(&a, &b) - 4.0).abs() < 1e-12);
        assert!((segment_distance(&b, &a) - 4.0).abs() < 1e-12);
    }
}
