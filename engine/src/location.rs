//! Entity placement on dungeon levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ecs::*, prelude::*, Pathmap, Vision};

/// A tile on a specific level.
#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub struct Place {
    pub level: LevelId,
    pub pos: IVec2,
}

impl Place {
    pub fn new(level: LevelId, pos: IVec2) -> Self {
        Place { level, pos }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.level, self.pos.x, self.pos.y)
    }
}

/// Capability of being somewhere on a level.
///
/// Carries a cached pathmap that leads to this entity. The cache is marked
/// stale whenever anything changes on the level.
#[derive(Clone, Debug)]
pub struct Location {
    place: Place,
    pub(crate) pathmap: Option<Pathmap>,
    pub(crate) pathmap_is_fresh: bool,
}

impl Location {
    pub(crate) fn new(place: Place) -> Self {
        Location {
            place,
            pathmap: None,
            pathmap_is_fresh: false,
        }
    }

    pub fn place(&self) -> Place {
        self.place
    }

    pub fn level(&self) -> LevelId {
        self.place.level
    }

    pub fn pos(&self) -> IVec2 {
        self.place.pos
    }
}

/// Whether a tile can be stepped on, considering both terrain and the
/// bodies standing on it.
pub(crate) fn is_travelable(
    ecs: &Ecs,
    level: &DungeonLevel,
    p: IVec2,
) -> bool {
    level.within_bounds(p)
        && !level.terrain_at(p).blocks_movement()
        && !level.occupants(p).iter().any(|&e| {
            ecs.get::<Physical>(e).is_some_and(|b| b.blocks_movement)
        })
}

impl Runtime {
    pub fn travelable(&self, level: LevelId, p: IVec2) -> bool {
        is_travelable(&self.ecs, self.level(level), p)
    }

    /// Snapshot of the entities on a tile in arrival order.
    pub fn entities_at(&self, level: LevelId, p: IVec2) -> Vec<Entity> {
        self.level(level).entities_at(p)
    }

    /// Place an unplaced entity on a level.
    ///
    /// Does nothing and returns false if the entity already has a location.
    /// Panics if the position is outside the level.
    pub fn put_entity(
        &mut self,
        level: LevelId,
        e: Entity,
        pos: IVec2,
    ) -> bool {
        if !self.ecs.contains(e) || self.ecs.has::<Location>(e) {
            return false;
        }
        self.level_mut(level).insert(e, pos);
        self.ecs.add(e, Location::new(Place::new(level, pos)));
        self.invalidate_fov(e);
        self.invalidate_pathmaps(level);
        true
    }

    /// Take a placed entity off its level.
    ///
    /// Returns false if the entity had no location.
    pub fn remove_entity(&mut self, e: Entity) -> bool {
        let Some(loc) = self.ecs.remove::<Location>(e) else {
            return false;
        };
        let place = loc.place();
        let removed = self.level_mut(place.level).remove(e, place.pos);
        debug_assert!(removed, "remove_entity: {e} missing from index");
        self.invalidate_fov(e);
        self.invalidate_pathmaps(place.level);
        true
    }

    /// Move a placed entity to another tile on the same level.
    ///
    /// Does not check whether the destination is travelable. Returns false
    /// if the entity had no location.
    pub fn move_entity_within(&mut self, e: Entity, pos: IVec2) -> bool {
        let Some(place) = e.place(self) else {
            return false;
        };
        let level = self.level_mut(place.level);
        level.remove(e, place.pos);
        level.insert(e, pos);
        if let Some(mut loc) = self.ecs.get_mut::<Location>(e) {
            loc.place.pos = pos;
        }
        self.invalidate_fov(e);
        self.invalidate_pathmaps(place.level);
        true
    }

    /// Mark the pathmaps of everything on a level stale.
    pub(crate) fn invalidate_pathmaps(&self, level: LevelId) {
        for e in self.level(level).entities() {
            if let Some(mut loc) = self.ecs.get_mut::<Location>(e) {
                loc.pathmap_is_fresh = false;
            }
        }
    }

    pub(crate) fn invalidate_fov(&self, e: Entity) {
        if let Some(mut vision) = self.ecs.get_mut::<Vision>(e) {
            vision.invalidate();
        }
    }

    /// Run a query against the pathmap that leads to `target`.
    ///
    /// The pathmap is created or refilled first if the level has changed
    /// since it was last used. Returns `None` if the target isn't placed
    /// anywhere or there's no memory for the map.
    pub fn with_pathmap<U>(
        &self,
        target: Entity,
        f: impl FnOnce(&Pathmap) -> U,
    ) -> Option<U> {
        let mut guard = self.ecs.get_mut::<Location>(target)?;
        let loc = &mut *guard;
        let place = loc.place();
        let level = self.level(place.level);

        if loc.pathmap.is_none() {
            match Pathmap::try_new(level.grid()) {
                Ok(pathmap) => loc.pathmap = Some(pathmap),
                Err(e) => {
                    log::warn!("Runtime::with_pathmap: {target}: {e}");
                    return None;
                }
            }
            loc.pathmap_is_fresh = false;
        }

        let fresh = loc.pathmap_is_fresh;
        let pathmap = loc.pathmap.as_mut()?;
        if !fresh {
            pathmap.update(place.pos, |p| is_travelable(&self.ecs, level, p));
        }
        loc.pathmap_is_fresh = true;
        Some(f(pathmap))
    }

    /// Best step from `from` towards `target`, if there is a way there.
    pub fn direction_towards(
        &self,
        target: Entity,
        from: IVec2,
    ) -> Option<IVec2> {
        let level = self.level(target.place(self)?.level);
        self.with_pathmap(target, |pathmap| {
            pathmap.next_direction(from, |p| is_travelable(&self.ecs, level, p))
        })?
    }
}

#[cfg(test)]
mod test {
    use quickcheck_macros::quickcheck;
    use rand::{Rng, SeedableRng};
    use util::{dijkstra_map, Array2d, GameRng, Grid};

    use super::*;
    use crate::{mapgen::from_ascii, UNREACHABLE};

    fn runtime() -> (Runtime, LevelId) {
        let terrain = from_ascii(
            "
            ########
            #......#
            #.####.#
            #......#
            ########",
        )
        .unwrap();
        let r = Runtime::from_levels(vec![terrain]);
        (r, LevelId(0))
    }

    fn body(r: &mut Runtime, blocks_movement: bool) -> Entity {
        let e = r.ecs.spawn("thing");
        r.ecs.add(e, Physical { blocks_movement });
        e
    }

    #[test]
    fn placement() {
        let (mut r, l) = runtime();
        let a = body(&mut r, true);
        let item = body(&mut r, false);

        assert!(r.put_entity(l, a, ivec2(1, 1)));
        assert!(!r.put_entity(l, a, ivec2(2, 1)));
        assert_eq!(a.place(&r), Some(Place::new(l, ivec2(1, 1))));
        assert!(!r.travelable(l, ivec2(1, 1)));

        assert!(r.put_entity(l, item, ivec2(2, 1)));
        assert!(r.travelable(l, ivec2(2, 1)));

        assert!(r.move_entity_within(a, ivec2(2, 1)));
        assert_eq!(r.entities_at(l, ivec2(2, 1)), vec![item, a]);
        assert!(r.entities_at(l, ivec2(1, 1)).is_empty());
        assert!(r.travelable(l, ivec2(1, 1)));

        assert!(r.remove_entity(a));
        assert!(!r.remove_entity(a));
        assert!(!a.has::<Location>(&r));
        assert_eq!(r.entities_at(l, ivec2(2, 1)), vec![item]);
        assert!(!r.move_entity_within(a, ivec2(3, 1)));
    }

    #[test]
    fn terrain_blocks_travel() {
        let (r, l) = runtime();
        assert!(!r.travelable(l, ivec2(0, 0)));
        assert!(!r.travelable(l, ivec2(3, 2)));
        assert!(!r.travelable(l, ivec2(-1, 2)));
        assert!(r.travelable(l, ivec2(1, 2)));
    }

    #[test]
    fn pathmap_follows_changes() {
        let (mut r, l) = runtime();
        let target = body(&mut r, true);
        let blocker = body(&mut r, true);
        r.put_entity(l, target, ivec2(6, 3));

        // Around the ring, the short way goes along the bottom corridor.
        assert_eq!(
            r.with_pathmap(target, |m| m.distance_at(ivec2(1, 3))),
            Some(5)
        );
        assert_eq!(r.direction_towards(target, ivec2(1, 3)), Some(ivec2(1, 0)));

        // Blocking the corridor invalidates the map and forces the long way
        // around.
        r.put_entity(l, blocker, ivec2(3, 3));
        assert_eq!(
            r.with_pathmap(target, |m| m.distance_at(ivec2(1, 3))),
            Some(7)
        );
        assert_eq!(r.direction_towards(target, ivec2(1, 3)), Some(ivec2(0, -1)));

        r.remove_entity(blocker);
        assert_eq!(
            r.with_pathmap(target, |m| m.distance_at(ivec2(1, 3))),
            Some(5)
        );

        // Unplaced entities have no pathmaps.
        assert_eq!(r.with_pathmap(blocker, |m| m.target()), None);
    }

    #[quickcheck]
    fn pathmap_matches_breadth_first_search(
        seed: u64,
        blockers: Vec<(u8, u8)>,
    ) -> bool {
        const W: i32 = 12;
        const H: i32 = 9;
        let mut rng = GameRng::seed_from_u64(seed);
        let terrain = Array2d::from_fn(Grid::new(W, H), |p| {
            let edge = p.x == 0 || p.y == 0 || p.x == W - 1 || p.y == H - 1;
            if edge || rng.gen_bool(0.25) {
                Terrain::StoneWall
            } else {
                Terrain::StoneFloor
            }
        });
        let mut r = Runtime::from_levels(vec![terrain]);
        let l = LevelId(0);
        let grid = r.level(l).grid();

        let open: Vec<IVec2> =
            grid.iter().filter(|&p| r.travelable(l, p)).collect();
        if open.is_empty() {
            return true;
        }
        let goal = open[rng.gen_range(0..open.len())];
        let target = body(&mut r, true);
        r.put_entity(l, target, goal);

        // Creatures standing around block the way like walls do.
        for (x, y) in blockers.into_iter().take(12) {
            let p = ivec2(x as i32 % W, y as i32 % H);
            if r.travelable(l, p) {
                let e = body(&mut r, true);
                r.put_entity(l, e, p);
            }
        }

        let reference: HashMap<IVec2, usize> = dijkstra_map(
            |&p: &IVec2| {
                DIR_8
                    .into_iter()
                    .map(move |d| p + d)
                    .filter(|&q| r.travelable(l, q))
                    .collect::<Vec<_>>()
            },
            [goal],
        )
        .collect();

        for p in grid.iter() {
            let dist = r.with_pathmap(target, |m| m.distance_at(p)).unwrap();
            let expected = reference.get(&p).map_or(UNREACHABLE, |&d| d as u8);
            if dist != expected {
                return false;
            }

            if p == goal || !r.travelable(l, p) {
                continue;
            }
            match (r.direction_towards(target, p), reference.get(&p)) {
                (None, None) => {}
                (Some(dir), Some(&d)) => {
                    let q = p + dir;
                    if !dir.is_adjacent() {
                        return false;
                    }
                    // Every suggested step is a real move that gets closer.
                    let closer = reference.get(&q) == Some(&(d - 1));
                    if q != goal && !(r.travelable(l, q) && closer) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// Every placed entity is on exactly the tile its location says, and
    /// nothing else is indexed.
    fn index_is_consistent(r: &Runtime) -> bool {
        let mut indexed = 0;
        for level in &r.levels {
            for p in level.occupied_tiles() {
                for &e in level.occupants(p) {
                    indexed += 1;
                    if e.place(r) != Some(Place::new(level.id(), p)) {
                        return false;
                    }
                }
            }
        }
        let placed = r.ecs.with_all(Capabilities::LOCATION).count();
        indexed == placed
    }

    #[quickcheck]
    fn spatial_index_stays_consistent(ops: Vec<(u8, u8, u8)>) -> bool {
        let (mut r, l) = runtime();
        let things: Vec<Entity> =
            (0..4).map(|i| body(&mut r, i % 2 == 0)).collect();
        let size = r.level(l).grid().size();

        for (op, who, at) in ops {
            let e = things[who as usize % things.len()];
            let pos = ivec2(at as i32 % size.x, (at as i32 / size.x) % size.y);
            match op % 3 {
                0 => {
                    r.put_entity(l, e, pos);
                }
                1 => {
                    r.remove_entity(e);
                }
                _ => {
                    r.move_entity_within(e, pos);
                }
            }
            if !index_is_consistent(&r) {
                return false;
            }
        }
        true
    }
}
