pub use crate::{
    msg, Action, ClimbDirection, DungeonLevel, Entity, LevelId, Location,
    Msg, Place, Rejection, Runtime, Terrain,
};
pub use glam::{ivec2, IVec2};
pub use util::{
    HashMap, HashSet, IndexMap, IndexSet, Odds, VecExt, DIAGONALS, DIR_4,
    DIR_8,
};
