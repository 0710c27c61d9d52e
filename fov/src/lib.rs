//! Digital field of view and line of sight.
//!
//! A cell is visible from the origin if some digital line, a line of grid
//! cells that approximates a continuous line, connects the two without
//! passing through an opaque cell. The target cell itself may be opaque, so
//! walls bordering an open area are seen.
//!
//! The field is computed octant by octant with a recursive shadow casting
//! scan that keeps track of the convex hulls of the walls seen so far.

use std::collections::TryReserveError;

mod field;
pub use field::{FieldOfView, Visibility};

mod los;
pub use los::line_of_sight;

mod rays;

/// Map interface the visibility algorithms need.
pub trait Opacity {
    /// Width and height of the map. Cells outside the map are treated as
    /// opaque and never reported visible.
    fn dimensions(&self) -> [i32; 2];

    /// Whether the cell blocks sight. Only called for cells inside the map.
    fn is_opaque(&self, p: [i32; 2]) -> bool;

    fn contains(&self, [x, y]: [i32; 2]) -> bool {
        let [w, h] = self.dimensions();
        x >= 0 && y >= 0 && x < w && y < h
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to allocate visibility buffer: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("visibility buffer for radius {0} is too large")]
    TooLarge(i32),
    #[error("field of view origin {0:?} is outside the map")]
    OriginOutOfBounds([i32; 2]),
    #[error("shadow ray collapsed to a vertical line")]
    DegenerateRay,
}

/// Transform octant-local coordinates into a map offset.
///
/// Bit 0 of `dir` swaps the axes, bit 1 rotates a quarter turn and bit 2
/// rotates a half turn, so values 0 to 7 cover all octants.
pub(crate) fn octant(dir: u8, u: i32, v: i32) -> [i32; 2] {
    let (mut x, mut y) = (u, v);
    if dir & 1 != 0 {
        (x, y) = (y, x);
    }
    if dir & 2 != 0 {
        (x, y) = (-y, x);
    }
    if dir & 4 != 0 {
        (x, y) = (-x, -y);
    }
    [x, y]
}

#[cfg(test)]
pub(crate) mod test_map {
    use super::Opacity;

    /// Map parsed from text, `#` is opaque.
    pub struct TextMap {
        pub w: i32,
        pub h: i32,
        cells: Vec<bool>,
    }

    impl TextMap {
        pub fn new(s: &str) -> Self {
            let lines: Vec<&str> = s
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            let h = lines.len() as i32;
            let w = lines[0].len() as i32;
            let cells = lines
                .iter()
                .flat_map(|l| l.chars().map(|c| c == '#'))
                .collect();
            TextMap { w, h, cells }
        }

        /// Pseudorandom map with roughly `density` percent of walls.
        pub fn noise(w: i32, h: i32, seed: u64, density: u64) -> Self {
            let mut x = seed | 1;
            let cells = (0..w * h)
                .map(|_| {
                    x ^= x << 13;
                    x ^= x >> 7;
                    x ^= x << 17;
                    x % 100 < density
                })
                .collect();
            TextMap { w, h, cells }
        }
    }

    impl Opacity for TextMap {
        fn dimensions(&self) -> [i32; 2] {
            [self.w, self.h]
        }

        fn is_opaque(&self, [x, y]: [i32; 2]) -> bool {
            self.cells[(y * self.w + x) as usize]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn octants_cover_directions() {
        let mut seen: Vec<[i32; 2]> = (0..8).map(|d| octant(d, 2, 1)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert_eq!(octant(0, 2, 1), [2, 1]);
        assert_eq!(octant(1, 2, 1), [1, 2]);
    }
}
