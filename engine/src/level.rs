//! Dungeon levels and their per-tile entity index.

use std::fmt;

use serde::{Deserialize, Serialize};
use util::{Array2d, AsciiMap, Grid};

use crate::{prelude::*, Error};

/// Index of a level in the runtime's level arena, zero is the top level.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Default,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct LevelId(pub(crate) usize);

impl LevelId {
    pub fn depth(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {}", self.0 + 1)
    }
}

/// One floor of the dungeon.
///
/// Terrain and the links to the neighboring levels are fixed when the level
/// is created. Entities are indexed by tile, the per-tile lists keep arrival
/// order and are dropped when they become empty.
pub struct DungeonLevel {
    id: LevelId,
    terrain: Array2d<Terrain>,
    occupants: HashMap<IVec2, Vec<Entity>>,
    previous: Option<LevelId>,
    next: Option<LevelId>,
}

impl DungeonLevel {
    pub(crate) fn new(
        id: LevelId,
        terrain: Array2d<Terrain>,
        previous: Option<LevelId>,
        next: Option<LevelId>,
    ) -> Self {
        DungeonLevel {
            id,
            terrain,
            occupants: Default::default(),
            previous,
            next,
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    /// Level above this one.
    pub fn previous(&self) -> Option<LevelId> {
        self.previous
    }

    /// Level below this one.
    pub fn next(&self) -> Option<LevelId> {
        self.next
    }

    pub fn grid(&self) -> Grid {
        self.terrain.grid()
    }

    pub fn width(&self) -> i32 {
        self.grid().width()
    }

    pub fn height(&self) -> i32 {
        self.grid().height()
    }

    pub fn within_bounds(&self, p: IVec2) -> bool {
        self.terrain.contains(p)
    }

    /// Terrain at a position inside the level.
    ///
    /// Panics when `p` is out of bounds, use `try_terrain_at` for positions
    /// that haven't been checked.
    pub fn terrain_at(&self, p: IVec2) -> Terrain {
        match self.try_terrain_at(p) {
            Ok(t) => t,
            Err(e) => panic!("DungeonLevel::terrain_at: {e}"),
        }
    }

    pub fn try_terrain_at(&self, p: IVec2) -> Result<Terrain, Error> {
        self.terrain.get(p).copied().ok_or(Error::OutOfBounds(p))
    }

    /// Entities on a tile in arrival order.
    pub fn occupants(&self, p: IVec2) -> &[Entity] {
        self.occupants.get(&p).map_or(&[], |v| v.as_slice())
    }

    /// Snapshot of the entities on a tile, safe to hold while the level
    /// changes.
    pub fn entities_at(&self, p: IVec2) -> Vec<Entity> {
        self.occupants(p).to_vec()
    }

    /// Iterate all entities on the level in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.occupants.values().flatten().copied()
    }

    /// Iterate occupied tiles in no particular order.
    pub fn occupied_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.occupants.keys().copied()
    }

    /// Iterate positions of a terrain type in row-major order.
    pub fn find_terrain(
        &self,
        terrain: Terrain,
    ) -> impl Iterator<Item = IVec2> + '_ {
        self.terrain
            .iter()
            .filter(move |(_, &t)| t == terrain)
            .map(|(p, _)| p)
    }

    pub(crate) fn insert(&mut self, e: Entity, p: IVec2) {
        assert!(
            self.within_bounds(p),
            "DungeonLevel::insert: {}",
            Error::OutOfBounds(p)
        );
        self.occupants.entry(p).or_default().push(e);
    }

    pub(crate) fn remove(&mut self, e: Entity, p: IVec2) -> bool {
        let Some(list) = self.occupants.get_mut(&p) else {
            return false;
        };
        let Some(idx) = list.iter().position(|&a| a == e) else {
            return false;
        };
        list.remove(idx);
        if list.is_empty() {
            self.occupants.remove(&p);
        }
        true
    }

    /// Draw the bare terrain.
    pub fn terrain_map(&self) -> AsciiMap {
        AsciiMap::from_fn(self.grid().size(), |p| self.terrain[p].into())
    }
}

impl fov::Opacity for DungeonLevel {
    fn dimensions(&self) -> [i32; 2] {
        [self.width(), self.height()]
    }

    fn is_opaque(&self, [x, y]: [i32; 2]) -> bool {
        self.terrain[ivec2(x, y)].blocks_sight()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mapgen::from_ascii;

    fn level() -> DungeonLevel {
        let terrain = from_ascii(
            "
            #####
            #.<.#
            #####",
        )
        .unwrap();
        DungeonLevel::new(LevelId(0), terrain, None, Some(LevelId(1)))
    }

    #[test]
    fn tile_lists() {
        let mut level = level();
        let p = ivec2(1, 1);
        level.insert(Entity(3), p);
        level.insert(Entity(1), p);
        level.insert(Entity(2), p);
        assert_eq!(level.entities_at(p), vec![Entity(3), Entity(1), Entity(2)]);

        assert!(level.remove(Entity(1), p));
        assert!(!level.remove(Entity(1), p));
        assert_eq!(level.occupants(p), &[Entity(3), Entity(2)]);

        level.remove(Entity(3), p);
        level.remove(Entity(2), p);
        assert!(level.occupants.is_empty());
        assert_eq!(level.entities().count(), 0);
    }

    #[test]
    fn terrain_lookup() {
        let level = level();
        assert_eq!(level.terrain_at(ivec2(2, 1)), Terrain::Upstairs);
        assert!(matches!(
            level.try_terrain_at(ivec2(5, 1)),
            Err(Error::OutOfBounds(_))
        ));
        assert_eq!(level.find_terrain(Terrain::Upstairs).collect::<Vec<_>>(), vec![ivec2(2, 1)]);
        assert_eq!(level.next(), Some(LevelId(1)));
        assert_eq!(level.previous(), None);
        assert_eq!(level.terrain_map().to_string(), "#####\n#.<.#\n#####");
    }

    #[test]
    #[should_panic]
    fn terrain_out_of_bounds() {
        level().terrain_at(ivec2(-1, 0));
    }
}
