use std::{collections::VecDeque, hash::Hash};

use glam::IVec2;
use pathfinding::prelude::astar;

use crate::{HashSet, VecExt, DIR_8};

/// Generate a shortest paths map on a grid according to a neighbors function.
pub fn dijkstra_map<'a, T, I>(
    mut neighbors: impl FnMut(&T) -> I + 'a,
    starts: impl IntoIterator<Item = T>,
) -> impl Iterator<Item = (T, usize)> + 'a
where
    T: Clone + Eq + Hash + 'a,
    I: IntoIterator<Item = T>,
{
    let mut edge: VecDeque<(T, usize)> =
        starts.into_iter().map(|s| (s, 0)).collect();
    let mut seen = HashSet::default();

    std::iter::from_fn(move || {
        // Candidates are in a queue and consumed first-in, first-out. This
        // should guarantee that the first time a node is popped from the queue
        // it shows the shortest path length from start to that node.

        while let Some((node, len)) = edge.pop_front() {
            if !seen.contains(&node) {
                seen.insert(node.clone());
                for n in neighbors(&node) {
                    edge.push_back((n, len + 1));
                }
                return Some((node, len));
            }
        }
        None
    })
}

/// Combinator for limiting flood fill to a given distance.
pub fn within_range<T>(n: usize) -> impl FnMut(&(T, usize)) -> bool {
    move |&(_, k)| k < n
}

/// Find a shortest 8-connected path between two points.
///
/// The returned path starts from the step after `start` and ends at `goal`.
/// Only points accepted by `passable` are stepped on, so the goal must be
/// passable for a path to exist. Returns `None` if the goal can't be
/// reached.
///
/// Uses the chessboard metric as the heuristic. It never overestimates the
/// remaining number of king's moves, so the first path found is a shortest
/// one.
pub fn astar_path(
    start: IVec2,
    goal: IVec2,
    mut passable: impl FnMut(IVec2) -> bool,
) -> Option<Vec<IVec2>> {
    let (mut path, _) = astar(
        &start,
        |&p| {
            DIR_8
                .iter()
                .map(move |&d| p + d)
                .filter(|&q| passable(q))
                .map(|q| (q, 1))
                .collect::<Vec<_>>()
        },
        |&p| (goal - p).chess_len(),
        |&p| p == goal,
    )?;
    // Drop the starting point.
    path.remove(0);
    Some(path)
}

#[cfg(test)]
mod test {
    use glam::ivec2;
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::{Grid, HashMap};

    /// Deterministic pseudorandom obstacle layout.
    fn obstacles(seed: u64, grid: Grid) -> HashSet<IVec2> {
        let mut x = seed | 1;
        grid.iter()
            .filter(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x % 10 < 3
            })
            .collect()
    }

    #[test]
    fn straight_and_diagonal() {
        let open = |p: IVec2| Grid::new(10, 10).contains(p);

        assert_eq!(astar_path(ivec2(2, 2), ivec2(2, 2), open), Some(vec![]));
        assert_eq!(
            astar_path(ivec2(0, 0), ivec2(3, 3), open),
            Some(vec![ivec2(1, 1), ivec2(2, 2), ivec2(3, 3)])
        );
        assert_eq!(astar_path(ivec2(0, 0), ivec2(9, 4), open).unwrap().len(), 9);
    }

    #[test]
    fn unreachable_goal() {
        // Wall across the whole map.
        let passable = |p: IVec2| Grid::new(10, 10).contains(p) && p.x != 5;
        assert_eq!(astar_path(ivec2(0, 0), ivec2(9, 9), passable), None);
    }

    #[test]
    fn bfs_distances() {
        let grid = Grid::new(5, 5);
        let map: HashMap<IVec2, usize> = dijkstra_map(
            move |&p: &IVec2| {
                DIR_8
                    .iter()
                    .map(move |&d| p + d)
                    .filter(move |&q| grid.contains(q))
            },
            [ivec2(0, 0)],
        )
        .collect();
        assert_eq!(map.len(), 25);
        assert_eq!(map[&ivec2(4, 4)], 4);
        assert_eq!(map[&ivec2(4, 1)], 4);

        let near: Vec<_> = dijkstra_map(
            move |&p: &IVec2| {
                DIR_8
                    .iter()
                    .map(move |&d| p + d)
                    .filter(move |&q| grid.contains(q))
            },
            [ivec2(2, 2)],
        )
        .take_while(within_range(2))
        .collect();
        assert_eq!(near.len(), 9);
    }

    #[quickcheck]
    fn astar_is_optimal(seed: u64, goal: (u8, u8)) -> bool {
        let grid = Grid::new(12, 12);
        let mut walls = obstacles(seed, grid);
        let start = ivec2(0, 0);
        let goal = ivec2(goal.0 as i32 % 12, goal.1 as i32 % 12);
        walls.remove(&start);

        let passable = |p: IVec2| grid.contains(p) && !walls.contains(&p);

        let oracle = pathfinding::prelude::bfs(
            &start,
            |&p| {
                DIR_8
                    .iter()
                    .map(move |&d| p + d)
                    .filter(|&q| passable(q))
                    .collect::<Vec<_>>()
            },
            |&p| p == goal,
        );

        match (astar_path(start, goal, passable), oracle) {
            (None, None) => true,
            (Some(path), Some(bfs)) => {
                // BFS path includes the start point.
                let steps_ok = path
                    .iter()
                    .zip(std::iter::once(&start).chain(path.iter()))
                    .all(|(a, b)| (*a - *b).is_adjacent() && passable(*a));
                steps_ok
                    && path.len() == bfs.len() - 1
                    && path.last() == Some(&goal)
            }
            _ => false,
        }
    }
}
