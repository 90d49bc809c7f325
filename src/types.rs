// Core types shared by the skeleton pipeline, the session and the demo host.

use crate::error::{Error, Result};

/// Screen buffer for the demo window.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// A point in world (drawing-surface) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Integer pixel coordinate inside a silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered chain of skeleton pixels.
pub type Polyline = Vec<PixelPoint>;

/// Cumulative Euclidean length of a polyline.
pub fn polyline_length(polyline: &[PixelPoint]) -> f64 {
    polyline.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// 8-neighbor offsets in clockwise order starting at north:
/// N, NE, E, SE, S, SW, W, NW.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Width x height grid of {0,1}. Used for the binary mask and the skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<u8>, // row-major, 0 or 1
}

impl BinaryGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![0; width * height] }
    }

    /// Build from rows of 0/1 values (rows must share a length).
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate().take(width) {
                grid.cells[y * width + x] = (v != 0) as u8;
            }
        }
        grid
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Value at (x,y); anything outside the grid reads as background.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.get(x, y) != 0
    }

    /// Writes outside the grid are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if self.in_bounds(x, y) {
            let idx = y as usize * self.width + x as usize;
            self.cells[idx] = value as u8;
        }
    }

    /// The 8 neighbors of (x,y), clockwise from north.
    pub fn neighbors(&self, x: i32, y: i32) -> [u8; 8] {
        let mut out = [0u8; 8];
        for (slot, (dx, dy)) in out.iter_mut().zip(NEIGHBOR_OFFSETS) {
            *slot = self.get(x + dx, y + dy);
        }
        out
    }

    pub fn neighbor_count(&self, x: i32, y: i32) -> usize {
        self.neighbors(x, y).iter().map(|&v| v as usize).sum()
    }

    pub fn count_foreground(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Foreground pixels in row-major order.
    pub fn foreground(&self) -> impl Iterator<Item = PixelPoint> + '_ {
        self.cells.iter().enumerate().filter(|(_, v)| **v != 0).map(move |(i, _)| {
            PixelPoint::new((i % self.width) as i32, (i / self.width) as i32)
        })
    }
}

/// Immutable alpha raster of one shape. Source of truth for skeletonization and progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Silhouette {
    pub width: usize,
    pub height: usize,
    alpha: Vec<u8>, // row-major, one byte per pixel
}

impl Silhouette {
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Result<Self> {
        if alpha.len() != width * height {
            return Err(Error::BufferLength { width, height, actual: alpha.len() });
        }
        Ok(Self { width, height, alpha })
    }

    #[inline]
    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.alpha[y * self.width + x]
    }

    pub fn alpha_values(&self) -> &[u8] {
        &self.alpha
    }

    /// Number of pixels whose alpha exceeds `threshold`.
    pub fn count_above(&self, threshold: u8) -> usize {
        self.alpha.iter().filter(|&&a| a > threshold).count()
    }
}
