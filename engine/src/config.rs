use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_SPEED, FOV_RADIUS};

/// Dungeon generation and creature parameters.
///
/// Loaded from an IDM file, omitted fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub level_width: i32,
    pub level_height: i32,
    pub num_levels: usize,
    pub goblins_per_level: usize,
    pub trinkets_per_level: usize,
    pub fov_radius: i32,
    /// Chance of a floor tile becoming a stone pillar.
    pub pillar_density: f32,
    pub player_speed: i32,
    pub goblin_speed: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level_width: 40,
            level_height: 25,
            num_levels: 3,
            goblins_per_level: 4,
            trinkets_per_level: 2,
            fov_radius: FOV_RADIUS,
            pillar_density: 0.05,
            player_speed: DEFAULT_SPEED,
            goblin_speed: DEFAULT_SPEED,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        let ret: Config =
            idm::from_str(text).map_err(|e| anyhow::anyhow!("{e}"))?;
        ret.check()?;
        Ok(ret)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn check(&self) -> Result<()> {
        // Room for the border walls and some floor.
        if self.level_width < 4 || self.level_height < 4 {
            anyhow::bail!(
                "level size {}x{} is too small",
                self.level_width,
                self.level_height
            );
        }
        if self.num_levels == 0 {
            anyhow::bail!("dungeon needs at least one level");
        }
        if self.fov_radius < 0 {
            anyhow::bail!("negative vision radius {}", self.fov_radius);
        }
        if !(0.0..1.0).contains(&self.pillar_density) {
            anyhow::bail!("pillar density {} not in [0, 1)", self.pillar_density);
        }
        if self.player_speed <= 0 || self.goblin_speed <= 0 {
            anyhow::bail!("speeds must be positive");
        }
        Ok(())
    }
}
