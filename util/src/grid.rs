use std::{
    collections::TryReserveError,
    ops::{Index, IndexMut},
};

use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Dimensions of a dense row-major 2D array of tiles.
///
/// All the index arithmetic for maps, goal-maps and visibility buffers goes
/// through here.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Default, Debug, Serialize, Deserialize,
)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width >= 0 && height >= 0,
            "Grid::new: negative dimensions {width}x{height}"
        );
        Grid { width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> IVec2 {
        ivec2(self.width, self.height)
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        let p = p.into();
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Flat index of a point, `None` if the point is outside the grid.
    pub fn get_index(&self, p: impl Into<IVec2>) -> Option<usize> {
        let p = p.into();
        self.contains(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    /// Flat index of a point.
    ///
    /// Panics if the point is out of bounds.
    pub fn index(&self, p: impl Into<IVec2>) -> usize {
        let p = p.into();
        self.get_index(p).unwrap_or_else(|| {
            panic!(
                "Grid::index: {p} out of bounds of {}x{} grid",
                self.width, self.height
            )
        })
    }

    /// Point corresponding to a flat index.
    pub fn coords(&self, i: usize) -> IVec2 {
        debug_assert!(i < self.len());
        let i = i as i32;
        ivec2(i % self.width, i / self.width)
    }

    /// Iterate all points of the grid in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| ivec2(x, y)))
    }
}

/// Dense 2D array of values.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Array2d<T> {
    grid: Grid,
    data: Vec<T>,
}

impl<T: Clone> Array2d<T> {
    pub fn new(grid: Grid, value: T) -> Self {
        Array2d {
            grid,
            data: vec![value; grid.len()],
        }
    }

    /// Construct an array, reporting an allocation failure instead of
    /// aborting the process.
    pub fn try_new(grid: Grid, value: T) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(grid.len())?;
        data.resize(grid.len(), value);
        Ok(Array2d { grid, data })
    }

    /// Set every cell to the same value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Array2d<T> {
    pub fn from_fn(grid: Grid, f: impl FnMut(IVec2) -> T) -> Self {
        Array2d {
            grid,
            data: grid.iter().map(f).collect(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn contains(&self, p: impl Into<IVec2>) -> bool {
        self.grid.contains(p)
    }

    pub fn get(&self, p: impl Into<IVec2>) -> Option<&T> {
        self.grid.get_index(p).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, p: impl Into<IVec2>) -> Option<&mut T> {
        self.grid.get_index(p).map(|i| &mut self.data[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        self.grid.iter().zip(self.data.iter())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<IVec2> for Array2d<T> {
    type Output = T;

    fn index(&self, p: IVec2) -> &Self::Output {
        &self.data[self.grid.index(p)]
    }
}

impl<T> IndexMut<IVec2> for Array2d<T> {
    fn index_mut(&mut self, p: IVec2) -> &mut Self::Output {
        let i = self.grid.index(p);
        &mut self.data[i]
    }
}
