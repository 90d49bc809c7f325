// Uniform grid over skeleton segments for nearest-segment (snap) queries.
// The segments live in one flat arena; grid cells hold indices into it.

use std::collections::HashMap;

use tracing::warn;

use crate::geometry::{closest_point_on_segment, Segment};
use crate::transform::WorldTransform;
use crate::types::{Point, Polyline};

/// One polyline edge in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonSegment {
    pub start: Point,
    pub end: Point,
    pub length: f64,
    /// Set once traced; cleared only by a session reset.
    pub covered: bool,
}

impl SkeletonSegment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end, length: start.distance(end), covered: false }
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.start, self.end)
    }
}

/// Project every consecutive point pair of every polyline into world space.
pub fn segments_from_polylines(polylines: &[Polyline], transform: &WorldTransform) -> Vec<SkeletonSegment> {
    polylines
        .iter()
        .flat_map(|line| line.windows(2))
        .map(|w| SkeletonSegment::new(transform.apply(w[0]), transform.apply(w[1])))
        .collect()
}

type CellKey = (i64, i64);

/// Result of a snap query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    /// Snapped point when `on_path`, otherwise the query point unchanged.
    pub point: Point,
    pub on_path: bool,
    /// Arena index of the winning segment.
    pub segment: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl SpatialIndex {
    #[inline]
    fn cell_of(&self, v: f64) -> i64 {
        (v / self.cell_size).floor() as i64
    }

    /// Insert each segment into every cell its bounding box overlaps.
    ///
    /// `cell_size` must be finite and positive (see [`TraceConfig::validate`]);
    /// segments with non-finite coordinates are left out.
    ///
    /// [`TraceConfig::validate`]: crate::config::TraceConfig::validate
    pub fn build(segments: &[SkeletonSegment], cell_size: f64) -> Self {
        let mut index = Self { cell_size, cells: HashMap::new() };
        for (i, seg) in segments.iter().enumerate() {
            let (x0, x1) = (seg.start.x.min(seg.end.x), seg.start.x.max(seg.end.x));
            let (y0, y1) = (seg.start.y.min(seg.end.y), seg.start.y.max(seg.end.y));
            if ![x0, x1, y0, y1].iter().all(|v| v.is_finite()) {
                warn!(segment = i, "segment with non-finite coordinates not indexed");
                continue;
            }
            for cx in index.cell_of(x0)..=index.cell_of(x1) {
                for cy in index.cell_of(y0)..=index.cell_of(y1) {
                    index.cells.entry((cx, cy)).or_default().push(i);
                }
            }
        }
        index
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Nearest point on any segment in the 3x3 cell block around `point`, accepted only
    /// within `snap_distance`.
    pub fn snap(&self, segments: &[SkeletonSegment], point: Point, snap_distance: f64) -> Snap {
        let mut best = Snap { point, on_path: false, segment: None };
        let mut best_dist = f64::INFINITY;

        let (cx, cy) = (self.cell_of(point.x), self.cell_of(point.y));
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &i in bucket {
                    let seg = &segments[i];
                    let closest = closest_point_on_segment(point, seg.start, seg.end);
                    let d = point.distance(closest);
                    if d < best_dist && d <= snap_distance {
                        best_dist = d;
                        best = Snap { point: closest, on_path: true, segment: Some(i) };
                    }
                }
            }
        }
        best
    }
}
