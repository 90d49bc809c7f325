// Polyline thinning: Douglas-Peucker, then a pass that merges very short steps.

use crate::types::{PixelPoint, Polyline};

/// Distance from `p` to the segment `a`-`b` (clamped to the segment).
fn deviation(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (px, py) = (p.x as f64, p.y as f64);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Ramer-Douglas-Peucker over index ranges with an explicit stack.
/// Keeps the point of maximum deviation while it exceeds `tolerance`.
pub fn douglas_peucker(points: &[PixelPoint], tolerance: f64) -> Polyline {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dev = 0.0;
        let mut index = start;
        for i in start + 1..end {
            let d = deviation(points[i], points[start], points[end]);
            if d > max_dev {
                max_dev = d;
                index = i;
            }
        }
        if max_dev > tolerance {
            keep[index] = true;
            ranges.push((start, index));
            ranges.push((index, end));
        }
    }

    points.iter().zip(keep).filter(|(_, k)| *k).map(|(p, _)| *p).collect()
}

/// Drop intermediate points closer than `min_length` to the last kept point.
/// The first and final points always survive.
pub fn merge_short_segments(points: &[PixelPoint], min_length: f64) -> Polyline {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = vec![points[0]];
    for (i, &p) in points.iter().enumerate().skip(1) {
        let last_kept = out[out.len() - 1];
        if p.distance(last_kept) >= min_length || i == points.len() - 1 {
            out.push(p);
        }
    }
    out
}

/// Douglas-Peucker followed by short-segment merging.
pub fn simplify(points: &[PixelPoint], tolerance: f64, min_segment_length: f64) -> Polyline {
    if points.len() <= 2 {
        return points.to_vec();
    }
    merge_short_segments(&douglas_peucker(points, tolerance), min_segment_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<PixelPoint> {
        raw.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    #[test]
    fn collinear_run_collapses_to_endpoints() {
        let line: Vec<_> = (0..50).map(|x| PixelPoint::new(x, 7)).collect();
        let out = douglas_peucker(&line, 2.5);
        assert_eq!(out, pts(&[(0, 7), (49, 7)]));
    }

    #[test]
    fn keeps_a_real_corner() {
        let mut line: Vec<_> = (0..=20).map(|x| PixelPoint::new(x, 0)).collect();
        line.extend((1..=20).map(|y| PixelPoint::new(20, y)));
        let out = douglas_peucker(&line, 2.5);
        assert_eq!(out, pts(&[(0, 0), (20, 0), (20, 20)]));
    }

    #[test]
    fn small_wobble_is_flattened() {
        let line = pts(&[(0, 0), (5, 1), (10, -1), (15, 2), (20, 0)]);
        assert_eq!(douglas_peucker(&line, 2.5), pts(&[(0, 0), (20, 0)]));
    }

    #[test]
    fn douglas_peucker_is_idempotent() {
        let line = pts(&[
            (0, 0), (3, 4), (6, 9), (9, 9), (12, 6), (15, 14), (18, 15), (21, 3), (24, 2), (30, 10),
        ]);
        let once = douglas_peucker(&line, 2.5);
        let twice = douglas_peucker(&once, 2.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn deep_zigzag_does_not_overflow() {
        // splits at almost every point
        let line: Vec<_> = (0..5_000).map(|i| PixelPoint::new(i, if i % 2 == 0 { 0 } else { 10 })).collect();
        let out = douglas_peucker(&line, 2.5);
        assert_eq!(out[0], line[0]);
        assert_eq!(out.last(), line.last());
        assert!(out.len() > 1000);
    }

    #[test]
    fn merge_keeps_final_point() {
        let line = pts(&[(0, 0), (2, 0), (6, 0), (7, 0), (12, 0), (13, 0)]);
        let out = merge_short_segments(&line, 5.0);
        assert_eq!(out, pts(&[(0, 0), (6, 0), (12, 0), (13, 0)]));
    }

    #[test]
    fn two_points_pass_through() {
        let line = pts(&[(0, 0), (1, 0)]);
        assert_eq!(simplify(&line, 2.5, 5.0), line);
    }
}
