//! Dungeon level generation.

use anyhow::{bail, Context, Result};
use rand::prelude::*;
use util::{dijkstra_map, Array2d, AsciiMap, Grid, RngExt};

use crate::{ecs::*, prelude::*, prototypes, Config};

/// Read a terrain map from text, one character per tile.
pub fn from_ascii(map: &str) -> Result<Array2d<Terrain>> {
    let map = AsciiMap::new(map);
    let size = map.size();
    if size.x == 0 || size.y == 0 {
        bail!("Empty map");
    }

    let mut ret = Array2d::new(Grid::new(size.x, size.y), Terrain::default());
    for (p, c) in map.iter() {
        ret[p] = Terrain::try_from(c).with_context(|| format!("at {p}"))?;
    }
    Ok(ret)
}

/// Parameters for generating one level.
#[derive(Copy, Clone, Debug)]
pub struct Level {
    width: i32,
    height: i32,
    pillar_density: f32,
    /// Where the stairs from the level above arrive.
    upstairs: Option<IVec2>,
    /// True if map should include a downstairs exit.
    downstairs: bool,
}

/// A generated level map.
#[derive(Clone, Debug)]
pub struct Blueprint {
    pub terrain: Array2d<Terrain>,
    /// Tile every open tile of the map can be reached from.
    pub origin: IVec2,
    pub downstairs: Option<IVec2>,
}

impl Level {
    pub fn new(config: &Config) -> Self {
        Level {
            width: config.level_width,
            height: config.level_height,
            pillar_density: config.pillar_density,
            upstairs: None,
            downstairs: false,
        }
    }

    pub fn upstairs_at(mut self, pos: IVec2) -> Self {
        self.upstairs = Some(pos);
        self
    }

    pub fn with_downstairs(mut self) -> Self {
        self.downstairs = true;
        self
    }

    fn is_interior(&self, p: IVec2) -> bool {
        p.x > 0 && p.y > 0 && p.x < self.width - 1 && p.y < self.height - 1
    }

    /// Scatter a blob of soft ground around a point.
    fn patch(
        &self,
        terrain: &mut Array2d<Terrain>,
        rng: &mut (impl Rng + ?Sized),
    ) {
        let kind = if rng.gen_bool(0.5) {
            Terrain::Grass
        } else {
            Terrain::Dirt
        };
        let center =
            ivec2(rng.gen_range(1..self.width - 1), rng.gen_range(1..self.height - 1));
        let radius = rng.gen_range(1..=3);
        for y in -radius..=radius {
            for x in -radius..=radius {
                let p = center + ivec2(x, y);
                if x * x + y * y <= radius * radius
                    && self.is_interior(p)
                    && !rng.one_chance_in(4)
                {
                    terrain[p] = kind;
                }
            }
        }
    }

    pub fn generate(&self, rng: &mut (impl Rng + ?Sized)) -> Result<Blueprint> {
        if self.width < 4 || self.height < 4 {
            bail!("Level {}x{} is too small", self.width, self.height);
        }
        if let Some(p) = self.upstairs {
            if !self.is_interior(p) {
                bail!("Upstairs {p} is not inside the level");
            }
        }

        let grid = Grid::new(self.width, self.height);
        let mut terrain = Array2d::from_fn(grid, |p| {
            if self.is_interior(p) {
                Terrain::StoneFloor
            } else {
                Terrain::StoneWall
            }
        });

        for _ in 0..(grid.len() / 200).max(1) {
            self.patch(&mut terrain, rng);
        }

        for p in grid.iter() {
            if self.is_interior(p) && rng.gen::<f32>() < self.pillar_density {
                terrain[p] = Terrain::StoneWall;
            }
        }

        let origin = match self.upstairs {
            Some(p) => {
                terrain[p] = Terrain::Upstairs;
                p
            }
            None => {
                let open: Vec<IVec2> = grid
                    .iter()
                    .filter(|&p| !terrain[p].blocks_movement())
                    .collect();
                *open.choose(rng).context("Level has no floor")?
            }
        };

        // Wall off the pockets that can't be reached from the origin.
        let reachable: HashSet<IVec2> = dijkstra_map(
            |&p: &IVec2| {
                DIR_8
                    .iter()
                    .map(move |&d| p + d)
                    .filter(|&q| {
                        terrain.get(q).is_some_and(|t| !t.blocks_movement())
                    })
                    .collect::<Vec<_>>()
            },
            [origin],
        )
        .map(|(p, _)| p)
        .collect();
        for p in grid.iter() {
            if !reachable.contains(&p) {
                terrain[p] = Terrain::StoneWall;
            }
        }

        let downstairs = if self.downstairs {
            let mut spots: Vec<IVec2> =
                reachable.into_iter().filter(|&p| p != origin).collect();
            // Hash set order isn't stable, keep generation deterministic.
            spots.sort_by_key(|p| (p.y, p.x));
            let &p = spots.choose(rng).context("No room for downstairs")?;
            terrain[p] = Terrain::Downstairs;
            Some(p)
        } else {
            None
        };

        Ok(Blueprint {
            terrain,
            origin,
            downstairs,
        })
    }
}

/// Open tiles of a level that don't have stairs or anything on them.
fn free_spots(r: &Runtime, level: LevelId) -> Vec<IVec2> {
    let level = r.level(level);
    level
        .grid()
        .iter()
        .filter(|&p| {
            let t = level.terrain_at(p);
            !t.blocks_movement()
                && t.climb_direction().is_none()
                && level.occupants(p).is_empty()
        })
        .collect()
}

/// Put goblins and trinkets on a level.
pub fn populate(
    r: &mut Runtime,
    level: LevelId,
    config: &Config,
    rng: &mut (impl Rng + ?Sized),
) -> Result<()> {
    let mut spots = free_spots(r, level);
    spots.shuffle(rng);

    for _ in 0..config.goblins_per_level {
        let Some(pos) = spots.pop() else {
            log::warn!("populate: {level} is full, skipping goblins");
            break;
        };
        let goblin = prototypes::goblin(r, config.fov_radius)?;
        goblin.with_mut(r, |c: &mut Controlled| c.speed = config.goblin_speed);
        r.put_entity(level, goblin, pos);
    }

    for _ in 0..config.trinkets_per_level {
        let Some(pos) = spots.pop() else {
            log::warn!("populate: {level} is full, skipping trinkets");
            break;
        };
        let trinket = prototypes::trinket(r);
        r.put_entity(level, trinket, pos);
    }

    Ok(())
}
