// Shape tracing core: skeleton extraction from a silhouette, snapping and the
// stroke state machine that enforces one continuous, non-crossing trace, plus
// painted-area progress.

pub mod config;
pub mod coverage;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod paint;
pub mod progress;
pub mod session;
pub mod silhouette;
pub mod simplify;
pub mod skeleton;
pub mod spatial;
pub mod thinning;
pub mod trace;
pub mod transform;
pub mod types;

pub use config::TraceConfig;
pub use error::{Error, Result};
pub use paint::{PaintSurface, RasterSurface, Rgba};
pub use progress::{compute_progress, ProgressThrottle};
pub use session::{DrawSession, DrawState, FailureReason};
pub use skeleton::{build_skeleton, build_skeleton_report, SkeletonReport};
pub use spatial::{SkeletonSegment, Snap, SpatialIndex};
pub use transform::WorldTransform;
pub use types::{PixelPoint, Point, Polyline, Silhouette};
