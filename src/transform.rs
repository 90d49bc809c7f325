// Shape-local (silhouette pixel) <-> world (drawing surface) mapping.
// Uniform scale plus offset; recomputed by the host whenever the viewport resizes.

use crate::config::TraceConfig;
use crate::types::{PixelPoint, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub scale: f64,
    /// World position of silhouette pixel (0,0).
    pub offset: Point,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl WorldTransform {
    pub const fn new(scale: f64, offset: Point) -> Self {
        Self { scale, offset }
    }

    pub const fn identity() -> Self {
        Self { scale: 1.0, offset: Point::new(0.0, 0.0) }
    }

    /// Fit an image centred in the viewport, leaving `screen_margin` on each side and
    /// shrinking by `image_scale_factor`.
    pub fn fit(
        image_width: usize,
        image_height: usize,
        viewport_width: f64,
        viewport_height: f64,
        config: &TraceConfig,
    ) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self::identity();
        }
        let avail_w = (viewport_width - 2.0 * config.screen_margin).max(1.0);
        let avail_h = (viewport_height - 2.0 * config.screen_margin).max(1.0);
        let scale_x = avail_w * config.image_scale_factor / image_width as f64;
        let scale_y = avail_h * config.image_scale_factor / image_height as f64;
        let scale = scale_x.min(scale_y);

        let w = image_width as f64 * scale;
        let h = image_height as f64 * scale;
        let offset = Point::new(viewport_width / 2.0 - w / 2.0, viewport_height / 2.0 - h / 2.0);
        Self { scale, offset }
    }

    #[inline]
    pub fn apply(&self, p: PixelPoint) -> Point {
        self.apply_point(Point::new(p.x as f64, p.y as f64))
    }

    #[inline]
    pub fn apply_point(&self, local: Point) -> Point {
        Point::new(self.offset.x + local.x * self.scale, self.offset.y + local.y * self.scale)
    }

    /// World -> shape-local (silhouette pixel space, fractional).
    #[inline]
    pub fn invert(&self, world: Point) -> Point {
        Point::new((world.x - self.offset.x) / self.scale, (world.y - self.offset.y) / self.scale)
    }

    /// Brush diameter in world units.
    pub fn brush_diameter(&self, config: &TraceConfig) -> f64 {
        (config.brush_size_base * self.scale).max(config.min_brush_size)
    }

    /// Brush diameter in silhouette pixels.
    pub fn local_brush_diameter(&self, config: &TraceConfig) -> f64 {
        self.brush_diameter(config) / self.scale
    }
}
