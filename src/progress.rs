// Completion progress: the share of the silhouette's valid pixels painted green.
// Recomputed from scratch on every call; callers throttle with ProgressThrottle.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::TraceConfig;
use crate::error::{Error, Result};
use crate::paint::{RasterSurface, DRAWING_GREEN, Rgba};
use crate::types::Silhouette;

#[inline]
fn is_painted(px: Rgba, config: &TraceConfig) -> bool {
    px.a > 0 && px.g > config.green_pixel_threshold && px.r < config.non_green_threshold && px.b < config.non_green_threshold
}

fn check_dimensions<S: RasterSurface + ?Sized>(surface: &S, silhouette: &Silhouette) -> Result<()> {
    if surface.width() != silhouette.width || surface.height() != silhouette.height {
        return Err(Error::DimensionMismatch {
            expected: (silhouette.width, silhouette.height),
            actual: (surface.width(), surface.height()),
        });
    }
    Ok(())
}

/// Percentage in [0,100]; zero when the silhouette has no valid pixels.
pub fn measure_progress<S: RasterSurface + ?Sized>(
    surface: &S,
    silhouette: &Silhouette,
    config: &TraceConfig,
) -> Result<f64> {
    check_dimensions(surface, silhouette)?;

    let mut valid = 0usize;
    let mut painted = 0usize;
    for y in 0..silhouette.height {
        for x in 0..silhouette.width {
            if silhouette.alpha(x, y) <= config.alpha_threshold {
                continue;
            }
            valid += 1;
            if is_painted(surface.get_pixel(x, y), config) {
                painted += 1;
            }
        }
    }

    if valid == 0 {
        return Ok(0.0);
    }
    let pct = (100.0 * painted as f64 / valid as f64).clamp(0.0, 100.0);
    debug!(valid, painted, pct, "progress computed");
    Ok(pct)
}

/// Like [`measure_progress`], but a mismatched surface is logged and reads as 0%.
pub fn compute_progress<S: RasterSurface + ?Sized>(surface: &S, silhouette: &Silhouette, config: &TraceConfig) -> f64 {
    measure_progress(surface, silhouette, config).unwrap_or_else(|e| {
        warn!(error = %e, "progress unavailable; reporting 0%");
        0.0
    })
}

/// Overwrite the surface so every valid silhouette pixel is opaque green and the rest
/// is transparent.
pub fn paint_everything_complete<S: RasterSurface + ?Sized>(surface: &mut S, silhouette: &Silhouette, config: &TraceConfig) {
    if let Err(e) = check_dimensions(surface, silhouette) {
        warn!(error = %e, "completion fill skipped");
        return;
    }
    for y in 0..silhouette.height {
        for x in 0..silhouette.width {
            let px = if silhouette.alpha(x, y) > config.alpha_threshold { DRAWING_GREEN } else { Rgba::TRANSPARENT };
            surface.put_pixel(x, y, px);
        }
    }
}

/// Delay accumulator: any number of `request`s between refreshes collapse into one.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    delay: Duration,
    accumulated: Duration,
    dirty: bool,
}

impl ProgressThrottle {
    pub fn new(delay: Duration) -> Self {
        Self { delay, accumulated: Duration::ZERO, dirty: false }
    }

    /// Mark progress as stale.
    pub fn request(&mut self) {
        self.dirty = true;
    }

    pub fn is_pending(&self) -> bool {
        self.dirty
    }

    /// Advance the clock by `elapsed`. True when a refresh is due now.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(elapsed);
        if !self.dirty || self.accumulated < self.delay {
            return false;
        }
        self.dirty = false;
        self.accumulated = Duration::ZERO;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintSurface;

    fn disc_silhouette(size: usize) -> Silhouette {
        let c = size as f64 / 2.0;
        let mut alpha = vec![0u8; size * size];
        for y in 0..size {
            for x in 0..size {
                let (dx, dy) = (x as f64 + 0.5 - c, y as f64 + 0.5 - c);
                if (dx * dx + dy * dy).sqrt() < c - 2.0 {
                    alpha[y * size + x] = 255;
                }
            }
        }
        Silhouette::new(size, size, alpha).unwrap()
    }

    #[test]
    fn unpainted_is_zero_and_full_green_is_hundred() {
        let config = TraceConfig::default();
        let sil = disc_silhouette(40);
        let mut surface = PaintSurface::new(40, 40).unwrap();
        assert_eq!(compute_progress(&surface, &sil, &config), 0.0);

        paint_everything_complete(&mut surface, &sil, &config);
        assert!((compute_progress(&surface, &sil, &config) - 100.0).abs() < 1e-9);
        // outside the shape stays transparent
        assert_eq!(surface.get_pixel(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn non_green_paint_does_not_count() {
        let config = TraceConfig::default();
        let sil = Silhouette::new(2, 1, vec![255, 255]).unwrap();
        let mut surface = PaintSurface::new(2, 1).unwrap();
        surface.put_pixel(0, 0, Rgba::rgb(0, 255, 0));
        surface.put_pixel(1, 0, Rgba::rgb(150, 255, 0));
        assert!((compute_progress(&surface, &sil, &config) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_silhouette_and_mismatch_report_zero() {
        let config = TraceConfig::default();
        let blank = Silhouette::new(4, 4, vec![0; 16]).unwrap();
        let mut surface = PaintSurface::new(4, 4).unwrap();
        paint_everything_complete(&mut surface, &Silhouette::new(4, 4, vec![255; 16]).unwrap(), &config);
        assert_eq!(compute_progress(&surface, &blank, &config), 0.0);

        let other = PaintSurface::new(5, 4).unwrap();
        let full = Silhouette::new(4, 4, vec![255; 16]).unwrap();
        assert!(matches!(measure_progress(&other, &full, &config), Err(Error::DimensionMismatch { .. })));
        assert_eq!(compute_progress(&other, &Silhouette::new(4, 4, vec![255; 16]).unwrap(), &config), 0.0);
    }

    #[test]
    fn throttle_collapses_requests() {
        let mut t = ProgressThrottle::new(Duration::from_millis(16));
        assert!(!t.tick(Duration::from_millis(30)));
        t.request();
        t.request();
        assert!(t.tick(Duration::from_millis(1)));
        assert!(!t.is_pending());
        t.request();
        assert!(!t.tick(Duration::from_millis(10)));
        assert!(t.tick(Duration::from_millis(6)));
        assert!(!t.tick(Duration::from_millis(100)));
    }
}
