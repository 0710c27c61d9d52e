use anyhow::bail;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::ClimbDirection;

/// Kinds of dungeon floor tiles.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Default,
    Debug,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Terrain {
    StoneWall,
    WoodWall,
    Palisade,
    #[default]
    StoneFloor,
    WoodFloor,
    Grass,
    Dirt,
    Upstairs,
    Downstairs,
}

use Terrain::*;

impl TryFrom<char> for Terrain {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Ok(match value {
            '#' => StoneWall,
            '=' => WoodWall,
            '|' => Palisade,
            '.' => StoneFloor,
            '_' => WoodFloor,
            '"' => Grass,
            ',' => Dirt,
            '<' => Upstairs,
            '>' => Downstairs,
            _ => bail!("Invalid terrain {value:?}"),
        })
    }
}

impl From<Terrain> for char {
    fn from(value: Terrain) -> Self {
        match value {
            StoneWall => '#',
            WoodWall => '=',
            Palisade => '|',
            StoneFloor => '.',
            WoodFloor => '_',
            Grass => '"',
            Dirt => ',',
            Upstairs => '<',
            Downstairs => '>',
        }
    }
}

impl Terrain {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, StoneWall | WoodWall | Palisade)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, StoneWall | WoodWall | Palisade)
    }

    pub fn is_wall(self) -> bool {
        self.blocks_movement()
    }

    /// Which way a staircase on this tile leads.
    pub fn climb_direction(self) -> Option<ClimbDirection> {
        match self {
            Upstairs => Some(ClimbDirection::Up),
            Downstairs => Some(ClimbDirection::Down),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn glyphs() {
        for t in Terrain::iter() {
            assert_eq!(Terrain::try_from(char::from(t)).unwrap(), t);
        }
        assert!(Terrain::try_from('x').is_err());
    }

    #[test]
    fn properties() {
        assert!(StoneWall.blocks_sight());
        assert!(Palisade.blocks_movement());
        assert!(!Grass.blocks_movement());
        assert_eq!(Downstairs.climb_direction(), Some(ClimbDirection::Down));
        assert_eq!(Dirt.climb_direction(), None);
        assert_eq!(WoodFloor.name(), "wood-floor");
    }
}
