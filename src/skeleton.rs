// Silhouette -> simplified skeleton polylines.
// Runs once per shape at load time; every stage is a full-image pass.

use tracing::{debug, info};

use crate::config::TraceConfig;
use crate::mask::{build_mask, preprocess};
use crate::simplify::simplify;
use crate::thinning::{clean, zhang_suen};
use crate::trace::{classify, trace_polylines};
use crate::types::{BinaryGrid, Polyline, Silhouette};

/// Polylines plus what each stage produced, for logs and debug overlays.
#[derive(Debug, Clone)]
pub struct SkeletonReport {
    pub polylines: Vec<Polyline>,
    /// Cleaned 1-pixel-wide skeleton.
    pub skeleton: BinaryGrid,
    pub foreground_pixels: usize,
    pub skeleton_pixels: usize,
    pub endpoints: usize,
    pub junctions: usize,
    pub thinning_passes: usize,
}

/// Mask, preprocess, thin and clean. Returns the skeleton and the thinning pass count.
pub fn skeletonize(silhouette: &Silhouette, config: &TraceConfig) -> (BinaryGrid, usize) {
    let mask = build_mask(silhouette, config.alpha_threshold);
    let cleaned_mask = preprocess(&mask, config);
    let (thinned, passes) = zhang_suen(&cleaned_mask);
    (clean(&thinned, config.spur_prune_passes), passes)
}

pub fn build_skeleton_report(silhouette: &Silhouette, config: &TraceConfig) -> SkeletonReport {
    let foreground_pixels = silhouette.count_above(config.alpha_threshold);
    if foreground_pixels == 0 {
        info!("silhouette has no foreground; no drawable path");
        return SkeletonReport {
            polylines: Vec::new(),
            skeleton: BinaryGrid::new(silhouette.width, silhouette.height),
            foreground_pixels,
            skeleton_pixels: 0,
            endpoints: 0,
            junctions: 0,
            thinning_passes: 0,
        };
    }

    let (skeleton, thinning_passes) = skeletonize(silhouette, config);
    let classes = classify(&skeleton);
    let raw = trace_polylines(&skeleton, config.min_polyline_length);
    debug!(raw_polylines = raw.len(), "traced skeleton");

    let polylines: Vec<Polyline> = raw
        .iter()
        .map(|line| simplify(line, config.skeleton_tolerance, config.min_segment_length))
        .collect();

    let report = SkeletonReport {
        skeleton_pixels: skeleton.count_foreground(),
        endpoints: classes.endpoints.len(),
        junctions: classes.junctions.len(),
        polylines,
        skeleton,
        foreground_pixels,
        thinning_passes,
    };
    info!(
        polylines = report.polylines.len(),
        points = report.polylines.iter().map(Vec::len).sum::<usize>(),
        skeleton_pixels = report.skeleton_pixels,
        endpoints = report.endpoints,
        junctions = report.junctions,
        thinning_passes = report.thinning_passes,
        "skeleton built"
    );
    report
}

/// Simplified polylines for one silhouette. Empty when nothing is above the alpha threshold.
pub fn build_skeleton(silhouette: &Silhouette, config: &TraceConfig) -> Vec<Polyline> {
    build_skeleton_report(silhouette, config).polylines
}
