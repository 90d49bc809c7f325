// Every tuned constant of the tracing core, passed explicitly to whoever needs it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Thresholds and distances for skeleton extraction, snapping, drawing and progress.
///
/// World-space distances (snap, coverage, near-path, movement) are in drawing-surface
/// units; skeleton tolerances are in silhouette pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    // -- Skeleton extraction --
    /// Alpha strictly above this marks a foreground pixel.
    pub alpha_threshold: u8,
    /// A background pixel with at least this many foreground neighbors is filled.
    pub small_hole_threshold: u8,
    /// Number of spur-tip removal passes after thinning.
    pub spur_prune_passes: usize,
    /// Traced polylines with total length at or below this are dropped.
    pub min_polyline_length: f64,
    /// Douglas-Peucker tolerance in pixels.
    pub skeleton_tolerance: f64,
    /// Merge pass drops points closer than this to the last kept point.
    pub min_segment_length: f64,

    // -- Spatial index / snapping --
    pub grid_size: f64,
    pub snap_distance: f64,

    // -- Drawing --
    pub coverage_radius: f64,
    pub near_drawable_distance: f64,
    pub intersection_epsilon: f64,
    pub skip_recent_segments: usize,
    pub min_movement_distance: f64,
    pub brush_size_base: f64,
    pub min_brush_size: f64,
    /// When false, lifting the pointer commits the stroke to history instead of ending the attempt.
    pub lift_ends_attempt: bool,

    // -- Progress --
    pub progress_refresh_ms: u64,
    pub completion_threshold: f64,
    pub green_pixel_threshold: u8,
    pub non_green_threshold: u8,

    // -- Viewport fitting --
    pub image_scale_factor: f64,
    pub screen_margin: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 128,
            small_hole_threshold: 6,
            spur_prune_passes: 2,
            min_polyline_length: 5.0,
            skeleton_tolerance: 2.5,
            min_segment_length: 5.0,

            grid_size: 50.0,
            snap_distance: 30.0,

            coverage_radius: 8.0,
            near_drawable_distance: 32.0,
            intersection_epsilon: 1e-9,
            skip_recent_segments: 3,
            min_movement_distance: 1.5,
            brush_size_base: 42.0,
            min_brush_size: 8.0,
            lift_ends_attempt: true,

            progress_refresh_ms: 16,
            completion_threshold: 99.0,
            green_pixel_threshold: 200,
            non_green_threshold: 100,

            image_scale_factor: 0.8,
            screen_margin: 10.0,
        }
    }
}

impl TraceConfig {
    /// Parse JSON overrides; fields that are left out keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    /// Reject values that would make the grid, snapping or simplification meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("grid_size", self.grid_size),
            ("snap_distance", self.snap_distance),
            ("coverage_radius", self.coverage_radius),
            ("near_drawable_distance", self.near_drawable_distance),
            ("skeleton_tolerance", self.skeleton_tolerance),
            ("brush_size_base", self.brush_size_base),
            ("image_scale_factor", self.image_scale_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.small_hole_threshold > 8 {
            return Err(Error::InvalidConfig(format!(
                "small_hole_threshold is a neighbor count (0..=8), got {}",
                self.small_hole_threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.completion_threshold) {
            return Err(Error::InvalidConfig(format!(
                "completion_threshold must be a percentage, got {}",
                self.completion_threshold
            )));
        }
        Ok(())
    }

    pub fn progress_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.progress_refresh_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TraceConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_grid() {
        let config = TraceConfig { grid_size: 0.0, ..TraceConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_fills_the_rest_from_defaults() {
        let config = TraceConfig::from_json(r#"{ "snap_distance": 45.0, "lift_ends_attempt": false }"#).unwrap();
        assert_eq!(config.snap_distance, 45.0);
        assert!(!config.lift_ends_attempt);
        assert_eq!(
            config,
            TraceConfig { snap_distance: 45.0, lift_ends_attempt: false, ..TraceConfig::default() }
        );
    }

    #[test]
    fn json_round_trip() {
        let config = TraceConfig { grid_size: 64.0, skip_recent_segments: 5, ..TraceConfig::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(TraceConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn json_overrides_are_validated() {
        assert!(matches!(TraceConfig::from_json(r#"{ "grid_size": 0.0 }"#), Err(Error::InvalidConfig(_))));
        assert!(matches!(TraceConfig::from_json("{ grid_size"), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(TraceConfig::load("/nonexistent/trace.json"), Err(Error::ConfigRead(_))));
    }

    #[test]
    fn rejects_hole_threshold_above_eight() {
        let config = TraceConfig { small_hole_threshold: 9, ..TraceConfig::default() };
        assert!(config.validate().is_err());
    }
}
