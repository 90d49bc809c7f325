// The painted raster: a per-shape RGBA surface the session stamps brush dots and
// strokes into, in silhouette pixel space.
// Visual: green paint appears wherever the user has traced; edges are 1px soft.

use crate::error::{Error, Result};
use crate::geometry::{point_segment_distance, Segment};
use crate::types::Point;

/// Straight (unpremultiplied) RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Pack as 0xAARRGGBB.
    #[inline]
    pub fn pack(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn unpack(v: u32) -> Self {
        Self {
            a: (v >> 24) as u8,
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// `self` drawn over `dst` with extra `coverage` in [0,1] (source-over).
    pub fn over(self, dst: Rgba, coverage: f32) -> Rgba {
        let sa = (self.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Paint colour for traced strokes.
pub const DRAWING_GREEN: Rgba = Rgba::rgb(0, 255, 0);

/// Pixel get/put access to a raster keyed to one shape.
pub trait RasterSurface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Out-of-range reads return transparent.
    fn get_pixel(&self, x: usize, y: usize) -> Rgba;
    /// Out-of-range writes are ignored.
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba);

    fn clear(&mut self) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.put_pixel(x, y, Rgba::TRANSPARENT);
            }
        }
    }
}

/// In-memory surface, one packed 0xAARRGGBB word per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintSurface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PaintSurface {
    /// A zero-sized surface cannot be created.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::SurfaceUnavailable { width, height });
        }
        Ok(Self { width, height, pixels: vec![0; width * height] })
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl RasterSurface for PaintSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn get_pixel(&self, x: usize, y: usize) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::TRANSPARENT;
        }
        Rgba::unpack(self.pixels[y * self.width + x])
    }

    #[inline]
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color.pack();
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

/// Fill a round-capped segment of `radius` (local pixels). A dot is a zero-length segment.
/// Pixel centres within `radius` are fully covered; coverage falls off over one pixel.
fn fill_capsule<S: RasterSurface + ?Sized>(surface: &mut S, seg: &Segment, radius: f64, color: Rgba) {
    if radius <= 0.0 {
        return;
    }
    let pad = radius + 1.0;
    let x0 = (seg.start.x.min(seg.end.x) - pad).floor().max(0.0) as usize;
    let y0 = (seg.start.y.min(seg.end.y) - pad).floor().max(0.0) as usize;
    let x1 = (seg.start.x.max(seg.end.x) + pad).ceil().min(surface.width() as f64 - 1.0);
    let y1 = (seg.start.y.max(seg.end.y) + pad).ceil().min(surface.height() as f64 - 1.0);
    if x1 < 0.0 || y1 < 0.0 {
        return;
    }
    let (x1, y1) = (x1 as usize, y1 as usize);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let d = point_segment_distance(centre, seg);
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0) as f32;
            if coverage <= 0.0 {
                continue;
            }
            let dst = surface.get_pixel(x, y);
            surface.put_pixel(x, y, color.over(dst, coverage));
        }
    }
}

/// Filled circle of `diameter` at `centre` (local pixels).
pub fn paint_dot<S: RasterSurface + ?Sized>(surface: &mut S, centre: Point, diameter: f64, color: Rgba) {
    fill_capsule(surface, &Segment::new(centre, centre), diameter / 2.0, color);
}

/// Line of width `diameter` with round caps from `from` to `to` (local pixels).
pub fn paint_stroke<S: RasterSurface + ?Sized>(
    surface: &mut S,
    from: Point,
    to: Point,
    diameter: f64,
    color: Rgba,
) {
    fill_capsule(surface, &Segment::new(from, to), diameter / 2.0, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_roundtrip_keeps_channels() {
        let c = Rgba { r: 1, g: 2, b: 3, a: 4 };
        assert_eq!(Rgba::unpack(c.pack()), c);
        assert_eq!(DRAWING_GREEN.pack(), 0xFF00_FF00);
    }

    #[test]
    fn zero_sized_surface_is_unavailable() {
        assert!(matches!(PaintSurface::new(0, 10), Err(Error::SurfaceUnavailable { .. })));
    }

    #[test]
    fn dot_covers_disc_and_nothing_far_away() {
        let mut s = PaintSurface::new(50, 50).unwrap();
        paint_dot(&mut s, Point::new(25.0, 25.0), 10.0, DRAWING_GREEN);
        assert_eq!(s.get_pixel(25, 25), DRAWING_GREEN);
        assert_eq!(s.get_pixel(21, 24), DRAWING_GREEN);
        assert_eq!(s.get_pixel(40, 40), Rgba::TRANSPARENT);
        assert_eq!(s.get_pixel(25, 33).a, 0);
    }

    #[test]
    fn stroke_paints_between_endpoints() {
        let mut s = PaintSurface::new(100, 40).unwrap();
        paint_stroke(&mut s, Point::new(10.0, 20.0), Point::new(90.0, 20.0), 6.0, DRAWING_GREEN);
        for x in 10..90 {
            assert_eq!(s.get_pixel(x, 20), DRAWING_GREEN, "gap at x={x}");
        }
        assert_eq!(s.get_pixel(50, 30).a, 0);
    }

    #[test]
    fn painting_off_the_edge_is_clipped() {
        let mut s = PaintSurface::new(10, 10).unwrap();
        paint_dot(&mut s, Point::new(-3.0, -3.0), 10.0, DRAWING_GREEN);
        paint_dot(&mut s, Point::new(30.0, 30.0), 10.0, DRAWING_GREEN);
        assert!(s.get_pixel(0, 0).a > 0);
        assert_eq!(s.get_pixel(0, 0).g, 255);
        assert_eq!(s.get_pixel(9, 9).a, 0);
    }

    #[test]
    fn clear_empties_surface() {
        let mut s = PaintSurface::new(8, 8).unwrap();
        paint_dot(&mut s, Point::new(4.0, 4.0), 6.0, DRAWING_GREEN);
        s.clear();
        assert!(s.pixels().iter().all(|&p| p == 0));
    }
}
