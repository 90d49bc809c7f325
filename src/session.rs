// The stroke state machine.
// Pointer-down must land on the path; moves extend one stroke, painting green and
// marking skeleton segments covered, until the stroke crosses itself or the pointer lifts.

use std::mem;

use tracing::{debug, info, warn};

use crate::config::TraceConfig;
use crate::coverage::CoverageTracker;
use crate::error::Result;
use crate::geometry::{segments_intersect, Segment};
use crate::paint::{paint_dot, paint_stroke, PaintSurface, RasterSurface, DRAWING_GREEN};
use crate::progress;
use crate::spatial::{segments_from_polylines, SkeletonSegment, Snap, SpatialIndex};
use crate::transform::WorldTransform;
use crate::types::{Point, Polyline, Silhouette};

// Sub-step sizing for painting a long move: step = clamp(d / 8, 1.5, 3).
const SUBSTEP_DIVISOR: f64 = 8.0;
const SUBSTEP_MIN: f64 = 1.5;
const SUBSTEP_MAX: f64 = 3.0;
// Moves no longer than this get no intermediate dots.
const DOT_MIN_DISTANCE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Drawing,
}

/// Why the last pointer event was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Pointer-down too far from any skeleton segment.
    NotOnPath,
    /// The stroke crossed itself (or an earlier stroke) with no unfinished path nearby.
    Intersection,
    /// The shape was completed; drawing stays off until a reset.
    DrawingDisabled,
}

pub struct DrawSession {
    config: TraceConfig,
    transform: WorldTransform,
    index: SpatialIndex,
    coverage: CoverageTracker,
    state: DrawState,
    stroke: Vec<Point>,
    history: Vec<Vec<Point>>,
    last_failure: Option<FailureReason>,
    silhouette: Option<Silhouette>,
    surface: Option<PaintSurface>,
    drawing_disabled: bool,
}

impl DrawSession {
    /// An empty session: nothing is on-path until [`DrawSession::begin_session`].
    ///
    /// Fails with [`InvalidConfig`](crate::error::Error::InvalidConfig) when `config` does not validate.
    pub fn new(config: TraceConfig) -> Result<Self> {
        config.validate()?;
        let coverage = CoverageTracker::new(Vec::new(), config.coverage_radius, config.near_drawable_distance);
        Ok(Self {
            config,
            transform: WorldTransform::identity(),
            index: SpatialIndex::default(),
            coverage,
            state: DrawState::Idle,
            stroke: Vec::new(),
            history: Vec::new(),
            last_failure: None,
            silhouette: None,
            surface: None,
            drawing_disabled: false,
        })
    }

    /// Discard everything from the previous shape and index `polylines` for `silhouette`.
    pub fn begin_session(&mut self, silhouette: Silhouette, polylines: &[Polyline], transform: WorldTransform) {
        let segments = segments_from_polylines(polylines, &transform);
        self.index = SpatialIndex::build(&segments, self.config.grid_size);
        self.coverage =
            CoverageTracker::new(segments, self.config.coverage_radius, self.config.near_drawable_distance);
        self.transform = transform;

        self.surface = match PaintSurface::new(silhouette.width, silhouette.height) {
            Ok(surface) => Some(surface),
            Err(e) => {
                warn!(error = %e, "painting disabled for this shape");
                None
            }
        };
        self.silhouette = Some(silhouette);

        self.state = DrawState::Idle;
        self.stroke.clear();
        self.history.clear();
        self.last_failure = None;
        self.drawing_disabled = false;

        info!(
            segments = self.coverage.segments().len(),
            cells = self.index.cell_count(),
            path_length = self.coverage.total_length(),
            scale = transform.scale,
            "session started"
        );
    }

    pub fn snap(&self, x: f64, y: f64) -> Snap {
        self.index.snap(self.coverage.segments(), Point::new(x, y), self.config.snap_distance)
    }

    /// Start a stroke at the snapped point. Refused when off-path or after completion.
    pub fn on_pointer_down(&mut self, x: f64, y: f64) -> bool {
        if self.drawing_disabled {
            debug!("pointer down ignored: drawing disabled");
            self.last_failure = Some(FailureReason::DrawingDisabled);
            return false;
        }

        let snap = self.snap(x, y);
        if !snap.on_path {
            debug!(x, y, "pointer down not on path");
            self.last_failure = Some(FailureReason::NotOnPath);
            return false;
        }

        self.state = DrawState::Drawing;
        self.stroke.clear();
        self.stroke.push(snap.point);
        self.last_failure = None;
        self.paint_dot_at(snap.point);
        debug!(x = snap.point.x, y = snap.point.y, "stroke started");
        true
    }

    /// Extend the stroke. False means the move crossed the stroke and the caller should
    /// run failure handling; the session is back to Idle.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        if self.state != DrawState::Drawing {
            return true;
        }
        let Some(&last) = self.stroke.last() else {
            return true;
        };

        // off-path points are used raw; only the first touch must be on the path
        let candidate = self.snap(x, y).point;
        let drawn = Segment::new(last, candidate);

        if self.crosses_stroke(&drawn) {
            debug!(x = candidate.x, y = candidate.y, "stroke intersects itself");
            self.last_failure = Some(FailureReason::Intersection);
            self.state = DrawState::Idle;
            return false;
        }

        if drawn.length() < self.config.min_movement_distance {
            return true;
        }

        self.paint_move(last, candidate);
        self.coverage.mark_covered(&drawn);
        self.stroke.push(candidate);
        true
    }

    /// End the gesture. Depending on `lift_ends_attempt` the stroke is dropped or kept as
    /// history for later intersection tests.
    pub fn on_pointer_up(&mut self) {
        if self.state != DrawState::Drawing {
            return;
        }
        self.state = DrawState::Idle;
        if self.config.lift_ends_attempt {
            self.stroke.clear();
            self.history.clear();
        } else {
            let stroke = mem::take(&mut self.stroke);
            if stroke.len() > 1 {
                self.history.push(stroke);
            }
        }
        debug!(history = self.history.len(), "stroke ended");
    }

    /// Full reset of the current attempt. Always safe to call.
    pub fn reset_drawing(&mut self) {
        self.state = DrawState::Idle;
        self.stroke.clear();
        self.history.clear();
        self.coverage.reset();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self.last_failure = None;
        self.drawing_disabled = false;
        debug!("drawing reset");
    }

    pub fn compute_progress(&self) -> f64 {
        match (self.surface.as_ref(), self.silhouette.as_ref()) {
            (Some(surface), Some(silhouette)) => progress::compute_progress(surface, silhouette, &self.config),
            _ => 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.compute_progress() >= self.config.completion_threshold
    }

    /// Paint the whole valid region green and stop accepting strokes until reset.
    pub fn paint_everything_complete(&mut self) {
        if let (Some(surface), Some(silhouette)) = (self.surface.as_mut(), self.silhouette.as_ref()) {
            progress::paint_everything_complete(surface, silhouette, &self.config);
        }
        self.state = DrawState::Idle;
        self.stroke.clear();
        self.drawing_disabled = true;
        info!("shape complete; drawing disabled");
    }

    /// Move everything into a new world space (viewport resize). Coverage is kept.
    pub fn update_transform(&mut self, transform: WorldTransform) {
        if transform == self.transform {
            return;
        }
        let old = self.transform;
        let remap = |p: Point| transform.apply_point(old.invert(p));

        self.coverage.reproject(|s| SkeletonSegment::new(remap(s.start), remap(s.end)));
        self.index = SpatialIndex::build(self.coverage.segments(), self.config.grid_size);
        for p in self.stroke.iter_mut().chain(self.history.iter_mut().flatten()) {
            *p = remap(*p);
        }
        self.transform = transform;
        debug!(scale = transform.scale, "transform updated");
    }

    /// True when `drawn` crosses history or an older part of the current stroke and no
    /// uncovered path lies near it.
    fn crosses_stroke(&self, drawn: &Segment) -> bool {
        let eps = self.config.intersection_epsilon;
        let older = self.stroke.len().saturating_sub(self.config.skip_recent_segments);

        let hits = |w: &[Point]| segments_intersect(drawn, &Segment::new(w[0], w[1]), eps);
        let crosses = self.history.iter().any(|path| path.windows(2).any(hits))
            || self.stroke.windows(2).take(older).any(hits);

        crosses && !self.coverage.has_nearby_uncovered_path(drawn)
    }

    /// Paint `from -> to`, with dots at each sub-step of a long move. A crossing found
    /// at a sub-step drops the paint for this move.
    fn paint_move(&mut self, from: Point, to: Point) {
        let distance = from.distance(to);
        let step = (distance / SUBSTEP_DIVISOR).clamp(SUBSTEP_MIN, SUBSTEP_MAX);
        let steps = ((distance / step).ceil() as usize).max(1);

        if steps > 1 {
            let mut prev = from;
            for i in 1..=steps {
                let current = from.lerp(to, i as f64 / steps as f64);
                if self.crosses_stroke(&Segment::new(prev, current)) {
                    debug!(step = i, "sub-step intersects; move left unpainted");
                    return;
                }
                if i < steps && distance > DOT_MIN_DISTANCE {
                    self.paint_dot_at(current);
                }
                prev = current;
            }
        }

        let diameter = self.transform.local_brush_diameter(&self.config);
        let (a, b) = (self.transform.invert(from), self.transform.invert(to));
        if let Some(surface) = self.surface.as_mut() {
            paint_stroke(surface, a, b, diameter, DRAWING_GREEN);
        }
    }

    fn paint_dot_at(&mut self, world: Point) {
        let diameter = self.transform.local_brush_diameter(&self.config);
        let local = self.transform.invert(world);
        if let Some(surface) = self.surface.as_mut() {
            paint_dot(surface, local, diameter, DRAWING_GREEN);
        }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == DrawState::Drawing
    }

    pub fn is_drawing_disabled(&self) -> bool {
        self.drawing_disabled
    }

    pub fn last_failure(&self) -> Option<FailureReason> {
        self.last_failure
    }

    pub fn stroke(&self) -> &[Point] {
        &self.stroke
    }

    pub fn history(&self) -> &[Vec<Point>] {
        &self.history
    }

    pub fn transform(&self) -> WorldTransform {
        self.transform
    }

    pub fn coverage(&self) -> &CoverageTracker {
        &self.coverage
    }

    pub fn surface(&self) -> Option<&PaintSurface> {
        self.surface.as_ref()
    }

    pub fn silhouette(&self) -> Option<&Silhouette> {
        self.silhouette.as_ref()
    }
}
