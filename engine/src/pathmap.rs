use std::collections::VecDeque;

use util::{Array2d, Grid};

use crate::prelude::*;

/// Distance value for cells the fill never reached.
pub const UNREACHABLE: u8 = 255;

/// Greatest distance a reached cell can have, farther cells saturate here.
const MAX_DISTANCE: u8 = UNREACHABLE - 1;

/// Breadth-first distance field flowing towards a target cell.
///
/// Steps are 8-directional and every step costs one. The target cell has
/// distance zero even though it is usually occupied by whoever is being
/// pursued.
#[derive(Clone, Debug)]
pub struct Pathmap {
    distances: Array2d<u8>,
    target: IVec2,
    reaches_target: bool,
}

impl Pathmap {
    /// Allocate an empty map, reporting allocation failure.
    pub fn try_new(grid: Grid) -> Result<Self, crate::Error> {
        Ok(Pathmap {
            distances: Array2d::try_new(grid, UNREACHABLE)?,
            target: Default::default(),
            reaches_target: false,
        })
    }

    pub fn target(&self) -> IVec2 {
        self.target
    }

    /// Whether the fill got out of the target cell at all.
    pub fn reaches_target(&self) -> bool {
        self.reaches_target
    }

    /// Raw distance lookup, `UNREACHABLE` for unreached and out of bounds
    /// cells.
    pub fn distance_at(&self, p: IVec2) -> u8 {
        self.distances.get(p).copied().unwrap_or(UNREACHABLE)
    }

    /// Refill the map from a new target.
    pub fn update(
        &mut self,
        target: IVec2,
        mut travelable: impl FnMut(IVec2) -> bool,
    ) {
        self.target = target;
        self.reaches_target = false;
        self.distances.fill(UNREACHABLE);

        let Some(d) = self.distances.get_mut(target) else {
            return;
        };
        *d = 0;

        let mut edge = VecDeque::from([target]);
        while let Some(p) = edge.pop_front() {
            let dist = self.distances[p].saturating_add(1).min(MAX_DISTANCE);
            for dir in DIR_8 {
                let q = p + dir;
                if q == target {
                    self.reaches_target = true;
                    continue;
                }
                if self.distance_at(q) != UNREACHABLE
                    || !self.distances.contains(q)
                    || !travelable(q)
                {
                    continue;
                }
                self.distances[q] = dist;
                edge.push_back(q);
            }
        }
    }

    /// Direction of the best step from `from` towards the target.
    ///
    /// Stepping straight onto the target always wins. Otherwise the
    /// travelable neighbor with the smallest distance is picked, with
    /// diagonals tried before the cardinal directions so ties favor
    /// diagonal moves. Staying put is never suggested.
    pub fn next_direction(
        &self,
        from: IVec2,
        mut travelable: impl FnMut(IVec2) -> bool,
    ) -> Option<IVec2> {
        let mut best: Option<(u8, IVec2)> = None;
        for dir in DIAGONALS.into_iter().chain(DIR_4) {
            let q = from + dir;
            if q == self.target {
                return Some(dir);
            }
            let dist = self.distance_at(q);
            if dist == UNREACHABLE || !travelable(q) {
                continue;
            }
            if best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, dir));
            }
        }
        best.map(|(_, dir)| dir)
    }
}

#[cfg(test)]
mod test {
    use util::{dijkstra_map, AsciiMap};

    use super::*;

    fn open(map: &AsciiMap) -> impl Fn(IVec2) -> bool + '_ {
        |p| matches!(map.get(p), Some(c) if c != '#')
    }

    #[test]
    fn walks_towards_target() {
        let map = AsciiMap::from_fn(ivec2(10, 10), |_| '.');
        let mut pathmap = Pathmap::try_new(Grid::new(10, 10)).unwrap();
        pathmap.update(ivec2(5, 5), open(&map));
        assert!(pathmap.reaches_target());
        assert_eq!(pathmap.distance_at(ivec2(0, 0)), 5);
        assert_eq!(pathmap.distance_at(ivec2(5, 5)), 0);

        let mut pos = ivec2(0, 0);
        for _ in 0..4 {
            let dir = pathmap.next_direction(pos, open(&map)).unwrap();
            assert_eq!(dir, ivec2(1, 1));
            pos += dir;
        }
        assert_eq!(pos, ivec2(4, 4));
        assert_eq!(pathmap.next_direction(pos, open(&map)), Some(ivec2(1, 1)));
    }

    #[test]
    fn matches_breadth_first_distances() {
        let map = AsciiMap::new(
            "
            ##########
            #...#....#
            #.#.#.##.#
            #.#...#..#
            #.#####.##
            #........#
            ##########",
        );
        let target = ivec2(8, 1);
        let mut pathmap = Pathmap::try_new(Grid::new(10, 7)).unwrap();
        pathmap.update(target, open(&map));

        let reference: HashMap<IVec2, usize> = dijkstra_map(
            |&p| {
                DIR_8
                    .into_iter()
                    .map(move |d| p + d)
                    .filter(|&q| open(&map)(q))
                    .collect::<Vec<_>>()
            },
            [target],
        )
        .collect();

        for (p, c) in map.iter() {
            match reference.get(&p) {
                Some(&d) => assert_eq!(pathmap.distance_at(p) as usize, d),
                None => {
                    assert_eq!(c, '#');
                    assert_eq!(pathmap.distance_at(p), UNREACHABLE);
                }
            }
        }
    }

    #[test]
    fn unreachable_target() {
        let map = AsciiMap::new(
            "
            .....
            .###.
            .#.#.
            .###.
            .....",
        );
        let mut pathmap = Pathmap::try_new(Grid::new(5, 5)).unwrap();
        pathmap.update(ivec2(2, 2), open(&map));
        assert!(!pathmap.reaches_target());
        assert_eq!(pathmap.distance_at(ivec2(0, 0)), UNREACHABLE);
        assert_eq!(pathmap.next_direction(ivec2(0, 0), open(&map)), None);
    }

    #[test]
    fn target_in_a_corner() {
        let map = AsciiMap::from_fn(ivec2(4, 4), |_| '.');
        let mut pathmap = Pathmap::try_new(Grid::new(4, 4)).unwrap();
        pathmap.update(ivec2(0, 0), open(&map));
        assert!(pathmap.reaches_target());
        assert_eq!(pathmap.distance_at(ivec2(3, 3)), 3);
        assert_eq!(pathmap.distance_at(ivec2(-1, 0)), UNREACHABLE);
        // Adjacent to target, step right in.
        assert_eq!(
            pathmap.next_direction(ivec2(1, 0), open(&map)),
            Some(ivec2(-1, 0))
        );
    }

    #[test]
    fn ties_prefer_diagonals() {
        let map = AsciiMap::from_fn(ivec2(7, 3), |_| '.');
        let mut pathmap = Pathmap::try_new(Grid::new(7, 3)).unwrap();
        pathmap.update(ivec2(6, 1), open(&map));
        // East, northeast and southeast are all one step closer.
        assert_eq!(
            pathmap.next_direction(ivec2(2, 1), open(&map)),
            Some(ivec2(1, -1))
        );
    }
}
