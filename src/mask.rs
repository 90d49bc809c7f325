// Alpha threshold + morphological cleanup, run before thinning.
// Each pass reads one grid and writes a fresh one, so a scan never sees its own writes.

use crate::config::TraceConfig;
use crate::types::{BinaryGrid, Silhouette};

/// Foreground iff alpha > threshold.
pub fn build_mask(silhouette: &Silhouette, alpha_threshold: u8) -> BinaryGrid {
    let mut mask = BinaryGrid::new(silhouette.width, silhouette.height);
    for y in 0..silhouette.height {
        for x in 0..silhouette.width {
            if silhouette.alpha(x, y) > alpha_threshold {
                mask.set(x as i32, y as i32, true);
            }
        }
    }
    mask
}

#[inline]
fn is_border(grid: &BinaryGrid, x: i32, y: i32) -> bool {
    x == 0 || y == 0 || x == grid.width as i32 - 1 || y == grid.height as i32 - 1
}

/// 3x3 erosion. Border pixels always become background.
pub fn erode(grid: &BinaryGrid) -> BinaryGrid {
    let mut out = BinaryGrid::new(grid.width, grid.height);
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            if is_border(grid, x, y) {
                continue;
            }
            let all_set = (-1..=1).all(|dy| (-1..=1).all(|dx| grid.is_set(x + dx, y + dy)));
            out.set(x, y, all_set);
        }
    }
    out
}

/// 3x3 dilation. Border pixels are copied through unchanged.
pub fn dilate(grid: &BinaryGrid) -> BinaryGrid {
    let mut out = BinaryGrid::new(grid.width, grid.height);
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            let value = if is_border(grid, x, y) {
                grid.is_set(x, y)
            } else {
                (-1..=1).any(|dy| (-1..=1).any(|dx| grid.is_set(x + dx, y + dy)))
            };
            out.set(x, y, value);
        }
    }
    out
}

/// Promote interior background pixels with at least `threshold` foreground neighbors.
pub fn fill_small_holes(grid: &BinaryGrid, threshold: u8) -> BinaryGrid {
    let mut out = grid.clone();
    for y in 1..grid.height as i32 - 1 {
        for x in 1..grid.width as i32 - 1 {
            if !grid.is_set(x, y) && grid.neighbor_count(x, y) >= threshold as usize {
                out.set(x, y, true);
            }
        }
    }
    out
}

/// Erode, dilate, then close small holes.
pub fn preprocess(mask: &BinaryGrid, config: &TraceConfig) -> BinaryGrid {
    let opened = dilate(&erode(mask));
    fill_small_holes(&opened, config.small_hole_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rect(w: usize, h: usize, x0: i32, y0: i32, x1: i32, y1: i32) -> BinaryGrid {
        let mut g = BinaryGrid::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                g.set(x, y, true);
            }
        }
        g
    }

    #[test]
    fn threshold_is_strict() {
        let s = Silhouette::new(3, 1, vec![128, 129, 255]).unwrap();
        let m = build_mask(&s, 128);
        assert!(!m.is_set(0, 0));
        assert!(m.is_set(1, 0));
        assert!(m.is_set(2, 0));
    }

    #[test]
    fn opening_removes_single_pixel_noise() {
        let mut g = filled_rect(20, 20, 5, 5, 12, 12);
        g.set(16, 16, true);
        let out = dilate(&erode(&g));
        assert!(!out.is_set(16, 16));
        // the solid block survives without net shrinkage
        assert!(out.is_set(5, 5));
        assert!(out.is_set(12, 12));
        assert_eq!(out.count_foreground(), 64);
    }

    #[test]
    fn border_is_background_after_erosion() {
        let g = filled_rect(6, 6, 0, 0, 5, 5);
        let out = erode(&g);
        assert!(!out.is_set(0, 3));
        assert!(!out.is_set(5, 5));
        assert!(out.is_set(2, 2));
    }

    #[test]
    fn fills_pinhole() {
        let mut g = filled_rect(7, 7, 1, 1, 5, 5);
        g.set(3, 3, false);
        let out = fill_small_holes(&g, 6);
        assert!(out.is_set(3, 3));
    }

    #[test]
    fn leaves_open_notch() {
        // background pixel with only 5 foreground neighbors stays open
        let g = BinaryGrid::from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 1, 0, 1, 0],
            &[0, 1, 0, 1, 0],
            &[0, 1, 0, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let out = fill_small_holes(&g, 6);
        assert!(!out.is_set(2, 2));
    }
}
