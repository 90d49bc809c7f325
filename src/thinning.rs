// Zhang-Suen thinning and post-thinning cleanup.
// Visual: a filled blob collapses to a 1-pixel-wide centre line with the same
// number of pieces and holes; stray dots and short hairs are then removed.

use crate::types::BinaryGrid;

/// Number of 0 -> 1 transitions walking the neighbor ring once (N back to N).
#[inline]
fn transitions(n: &[u8; 8]) -> usize {
    (0..8).filter(|&i| n[i] == 0 && n[(i + 1) % 8] == 1).count()
}

// Neighbor indices in the clockwise ring.
const N: usize = 0;
const E: usize = 2;
const S: usize = 4;
const W: usize = 6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SubIteration {
    First,
    Second,
}

fn deletable(n: &[u8; 8], step: SubIteration) -> bool {
    let sum: usize = n.iter().map(|&v| v as usize).sum();
    if !(2..=6).contains(&sum) || transitions(n) != 1 {
        return false;
    }
    match step {
        SubIteration::First => n[N] * n[E] * n[S] == 0 && n[E] * n[S] * n[W] == 0,
        SubIteration::Second => n[N] * n[E] * n[W] == 0 && n[N] * n[S] * n[W] == 0,
    }
}

/// One sub-iteration as a pure function: every test reads `grid`, deletions land in the copy.
fn sub_iteration(grid: &BinaryGrid, step: SubIteration) -> (BinaryGrid, usize) {
    let mut out = grid.clone();
    let mut deleted = 0;
    for y in 1..grid.height as i32 - 1 {
        for x in 1..grid.width as i32 - 1 {
            if grid.is_set(x, y) && deletable(&grid.neighbors(x, y), step) {
                out.set(x, y, false);
                deleted += 1;
            }
        }
    }
    (out, deleted)
}

/// Thin until a full pass (both sub-iterations) deletes nothing.
/// Returns the skeleton and the number of passes that deleted something.
pub fn zhang_suen(mask: &BinaryGrid) -> (BinaryGrid, usize) {
    let mut grid = mask.clone();
    let mut passes = 0;
    loop {
        let (first, d1) = sub_iteration(&grid, SubIteration::First);
        let (second, d2) = sub_iteration(&first, SubIteration::Second);
        grid = second;
        if d1 + d2 == 0 {
            return (grid, passes);
        }
        passes += 1;
    }
}

/// Drop foreground pixels with no foreground neighbor.
pub fn remove_orphans(grid: &BinaryGrid) -> BinaryGrid {
    let mut out = grid.clone();
    for p in grid.foreground() {
        if grid.neighbor_count(p.x, p.y) == 0 {
            out.set(p.x, p.y, false);
        }
    }
    out
}

/// Remove spur tips (exactly one neighbor) `passes` times. All tips found in a
/// pass are removed together, so every open end shortens by one pixel per pass.
pub fn prune_spurs(grid: &BinaryGrid, passes: usize) -> BinaryGrid {
    let mut current = grid.clone();
    for _ in 0..passes {
        let tips: Vec<_> = current
            .foreground()
            .filter(|p| current.neighbor_count(p.x, p.y) == 1)
            .collect();
        if tips.is_empty() {
            break;
        }
        for p in tips {
            current.set(p.x, p.y, false);
        }
    }
    current
}

/// Orphans, then spurs, then any orphan the spur passes left behind.
pub fn clean(skeleton: &BinaryGrid, spur_passes: usize) -> BinaryGrid {
    let pruned = prune_spurs(&remove_orphans(skeleton), spur_passes);
    remove_orphans(&pruned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(w: usize, h: usize, x0: i32, y0: i32, x1: i32, y1: i32) -> BinaryGrid {
        let mut g = BinaryGrid::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                g.set(x, y, true);
            }
        }
        g
    }

    fn is_one_pixel_wide(g: &BinaryGrid) -> bool {
        // no 2x2 block of foreground survives thinning
        for y in 0..g.height as i32 - 1 {
            for x in 0..g.width as i32 - 1 {
                if g.is_set(x, y) && g.is_set(x + 1, y) && g.is_set(x, y + 1) && g.is_set(x + 1, y + 1) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn transitions_counts_ring_wraparound() {
        assert_eq!(transitions(&[1, 0, 0, 0, 0, 0, 0, 0]), 1);
        assert_eq!(transitions(&[1, 0, 1, 0, 0, 0, 0, 0]), 2);
        assert_eq!(transitions(&[0; 8]), 0);
    }

    #[test]
    fn thick_bar_thins_to_centre_row() {
        let g = bar(120, 20, 10, 10, 109, 12);
        let (skel, passes) = zhang_suen(&g);
        assert!(passes >= 1);
        assert!(is_one_pixel_wide(&skel));
        for p in skel.foreground() {
            assert_eq!(p.y, 11);
        }
        assert!(skel.count_foreground() > 90);
    }

    #[test]
    fn thinning_is_stable_on_a_skeleton() {
        let g = bar(40, 10, 5, 4, 30, 4);
        let (skel, passes) = zhang_suen(&g);
        assert_eq!(passes, 0);
        assert_eq!(skel, g);
    }

    /// 4-connected background flood fill from `start`; true if it reaches `target`.
    fn background_connected(g: &BinaryGrid, start: (i32, i32), target: (i32, i32)) -> bool {
        let mut seen = vec![false; g.width * g.height];
        let mut stack = vec![start];
        while let Some((x, y)) = stack.pop() {
            if !g.in_bounds(x, y) || g.is_set(x, y) {
                continue;
            }
            let idx = y as usize * g.width + x as usize;
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            if (x, y) == target {
                return true;
            }
            stack.extend([(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]);
        }
        false
    }

    #[test]
    fn ring_keeps_its_hole() {
        let mut g = bar(30, 30, 5, 5, 24, 24);
        for y in 10..=19 {
            for x in 10..=19 {
                g.set(x, y, false);
            }
        }
        let (skel, _) = zhang_suen(&g);
        assert!(is_one_pixel_wide(&skel));
        assert!(!skel.is_set(15, 15));
        // the loop still separates the hole from the outside
        assert!(!background_connected(&skel, (15, 15), (0, 0)));
    }

    #[test]
    fn clean_drops_orphans_and_fragments() {
        let mut g = bar(40, 20, 5, 10, 30, 10);
        g.set(35, 3, true); // orphan
        g.set(35, 15, true); // two-pixel fragment
        g.set(36, 15, true);
        let out = clean(&g, 2);
        assert!(!out.is_set(35, 3));
        assert!(!out.is_set(35, 15));
        assert!(!out.is_set(36, 15));
        // line ends shortened by two pixels each
        assert!(!out.is_set(6, 10));
        assert!(out.is_set(7, 10));
        assert!(out.is_set(28, 10));
        assert!(!out.is_set(29, 10));
    }

    #[test]
    fn clean_never_leaves_orphans() {
        let g = bar(10, 10, 2, 5, 4, 5); // three pixels: tips go, middle would be stranded
        let out = clean(&g, 1);
        for p in out.foreground() {
            assert!(out.neighbor_count(p.x, p.y) > 0);
        }
        assert_eq!(out.count_foreground(), 0);
    }
}
