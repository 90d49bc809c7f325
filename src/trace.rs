// Walks a cleaned skeleton into ordered pixel chains.
// Order: endpoints first, then junction branches, then whatever is left (closed loops).

use crate::types::{polyline_length, BinaryGrid, PixelPoint, Polyline};

/// Search order for the next pixel while walking (dx, dy).
const WALK_ORDER: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Skeleton pixels grouped by 8-neighbor count.
#[derive(Debug, Default, Clone)]
pub struct PixelClasses {
    /// Exactly one neighbor.
    pub endpoints: Vec<PixelPoint>,
    /// More than two neighbors.
    pub junctions: Vec<PixelPoint>,
}

pub fn classify(skeleton: &BinaryGrid) -> PixelClasses {
    let mut classes = PixelClasses::default();
    for p in skeleton.foreground() {
        match skeleton.neighbor_count(p.x, p.y) {
            1 => classes.endpoints.push(p),
            n if n > 2 => classes.junctions.push(p),
            _ => {}
        }
    }
    classes
}

/// Visited flags over the skeleton, same layout as the grid.
struct Visited {
    width: usize,
    flags: Vec<bool>,
}

impl Visited {
    fn new(grid: &BinaryGrid) -> Self {
        Self { width: grid.width, flags: vec![false; grid.width * grid.height] }
    }

    #[inline]
    fn get(&self, p: PixelPoint) -> bool {
        self.flags[p.y as usize * self.width + p.x as usize]
    }

    #[inline]
    fn mark(&mut self, p: PixelPoint) {
        self.flags[p.y as usize * self.width + p.x as usize] = true;
    }
}

/// Walk from `start`, always stepping to the first unvisited foreground neighbor
/// that is not the pixel we just came from.
fn walk(skeleton: &BinaryGrid, visited: &mut Visited, start: PixelPoint) -> Polyline {
    let mut line = Vec::new();
    let mut prev: Option<PixelPoint> = None;
    let mut current = Some(start);

    while let Some(p) = current {
        if visited.get(p) {
            break;
        }
        visited.mark(p);
        line.push(p);

        let next = WALK_ORDER.iter().map(|&(dx, dy)| PixelPoint::new(p.x + dx, p.y + dy)).find(|n| {
            skeleton.is_set(n.x, n.y) && !visited.get(*n) && Some(*n) != prev
        });
        prev = Some(p);
        current = next;
    }
    line
}

fn keep(line: &[PixelPoint], min_length: f64) -> bool {
    line.len() > 1 && polyline_length(line) > min_length
}

/// Trace every skeleton pixel into polylines. Lines no longer than `min_length` are dropped.
pub fn trace_polylines(skeleton: &BinaryGrid, min_length: f64) -> Vec<Polyline> {
    let classes = classify(skeleton);
    let mut visited = Visited::new(skeleton);
    let mut polylines = Vec::new();

    // 1) open ends
    for &start in &classes.endpoints {
        if !visited.get(start) {
            let line = walk(skeleton, &mut visited, start);
            if keep(&line, min_length) {
                polylines.push(line);
            }
        }
    }

    // 2) one branch per unvisited neighbor of each junction, each starting at the junction
    for &junction in &classes.junctions {
        if visited.get(junction) {
            continue;
        }
        visited.mark(junction);
        for &(dx, dy) in &WALK_ORDER {
            let n = PixelPoint::new(junction.x + dx, junction.y + dy);
            if !skeleton.is_set(n.x, n.y) || visited.get(n) {
                continue;
            }
            let mut line = vec![junction];
            line.extend(walk(skeleton, &mut visited, n));
            if keep(&line, min_length) {
                polylines.push(line);
            }
        }
    }

    // 3) loops with no endpoint or junction
    let seeds: Vec<PixelPoint> = skeleton.foreground().collect();
    for seed in seeds {
        if !visited.get(seed) {
            let line = walk(skeleton, &mut visited, seed);
            if keep(&line, min_length) {
                polylines.push(line);
            }
        }
    }

    polylines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_grid(w: usize, h: usize, pts: &[(i32, i32)]) -> BinaryGrid {
        let mut g = BinaryGrid::new(w, h);
        for &(x, y) in pts {
            g.set(x, y, true);
        }
        g
    }

    #[test]
    fn straight_line_is_one_polyline_from_an_end() {
        let pts: Vec<_> = (5..=25).map(|x| (x, 4)).collect();
        let g = line_grid(30, 10, &pts);
        let classes = classify(&g);
        assert_eq!(classes.endpoints.len(), 2);
        assert!(classes.junctions.is_empty());

        let lines = trace_polylines(&g, 5.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 21);
        assert_eq!(lines[0][0], PixelPoint::new(5, 4));
        assert_eq!(*lines[0].last().unwrap(), PixelPoint::new(25, 4));
    }

    #[test]
    fn consecutive_points_are_neighbors() {
        let pts: Vec<_> = (0..15).map(|i| (3 + i, 3 + i / 2)).collect();
        let g = line_grid(30, 20, &pts);
        for line in trace_polylines(&g, 0.0) {
            for w in line.windows(2) {
                assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
            }
        }
    }

    #[test]
    fn short_fragments_are_dropped() {
        let g = line_grid(20, 10, &[(2, 2), (3, 2), (4, 2)]);
        assert!(trace_polylines(&g, 5.0).is_empty());
    }

    #[test]
    fn closed_square_is_one_polyline() {
        let mut pts = Vec::new();
        for x in 5..=15 {
            pts.push((x, 5));
            pts.push((x, 15));
        }
        for y in 6..15 {
            pts.push((5, y));
            pts.push((15, y));
        }
        let g = line_grid(25, 25, &pts);
        assert!(classify(&g).endpoints.is_empty());
        let lines = trace_polylines(&g, 5.0);
        assert_eq!(lines.len(), 1);
        // the greedy walk may cut a corner diagonally
        assert!(lines[0].len() >= pts.len() - 4);
    }

    #[test]
    fn plus_sign_has_an_endpoint_per_arm() {
        let mut pts = Vec::new();
        for i in 2..=22 {
            pts.push((i, 12));
            if i != 12 {
                pts.push((12, i));
            }
        }
        let g = line_grid(25, 25, &pts);
        let classes = classify(&g);
        assert_eq!(classes.endpoints.len(), 4);
        assert!(!classes.junctions.is_empty());

        let lines = trace_polylines(&g, 5.0);
        let total: usize = lines.iter().map(|l| l.len()).sum();
        // every pixel lands in some polyline (the junction may appear more than once)
        assert!(total >= pts.len());
        assert!(lines.len() >= 2);
    }
}
