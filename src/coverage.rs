// Which skeleton segments the stroke has already traced.
// Owns the segment arena; the spatial index refers into it by position.

use tracing::debug;

use crate::geometry::{segment_distance, Segment};
use crate::spatial::SkeletonSegment;

#[derive(Debug, Clone)]
pub struct CoverageTracker {
    segments: Vec<SkeletonSegment>,
    coverage_radius: f64,
    near_path_distance: f64,
}

impl CoverageTracker {
    pub fn new(segments: Vec<SkeletonSegment>, coverage_radius: f64, near_path_distance: f64) -> Self {
        Self { segments, coverage_radius, near_path_distance }
    }

    pub fn segments(&self) -> &[SkeletonSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flip `covered` on every segment within the coverage radius of `drawn`.
    /// Returns how many segments became covered.
    pub fn mark_covered(&mut self, drawn: &Segment) -> usize {
        let mut newly = 0;
        for seg in self.segments.iter_mut().filter(|s| !s.covered) {
            if segment_distance(drawn, &seg.segment()) <= self.coverage_radius {
                seg.covered = true;
                newly += 1;
            }
        }
        if newly > 0 {
            debug!(newly, covered = self.covered_count(), total = self.segments.len(), "segments covered");
        }
        newly
    }

    /// True if an uncovered segment lies within the near-path distance of `drawn`.
    /// Only used to waive an intersection rejection.
    pub fn has_nearby_uncovered_path(&self, drawn: &Segment) -> bool {
        self.segments
            .iter()
            .filter(|s| !s.covered)
            .any(|s| segment_distance(drawn, &s.segment()) <= self.near_path_distance)
    }

    pub fn reset(&mut self) {
        for seg in &mut self.segments {
            seg.covered = false;
        }
    }

    pub fn covered_count(&self) -> usize {
        self.segments.iter().filter(|s| s.covered).count()
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Length-weighted fraction of the skeleton traced, in [0,1]. Zero for an empty skeleton.
    pub fn covered_fraction(&self) -> f64 {
        let total = self.total_length();
        if total <= 0.0 {
            return 0.0;
        }
        let covered: f64 = self.segments.iter().filter(|s| s.covered).map(|s| s.length).sum();
        (covered / total).clamp(0.0, 1.0)
    }

    /// Replace segment geometry in place (same count and order), keeping `covered` flags.
    pub(crate) fn reproject(&mut self, mut map: impl FnMut(&SkeletonSegment) -> SkeletonSegment) {
        for seg in &mut self.segments {
            let covered = seg.covered;
            *seg = map(seg);
            seg.covered = covered;
        }
    }
}
