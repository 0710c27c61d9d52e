//! Game logic layer machinery.

/// How far can creatures see by default.
pub const FOV_RADIUS: i32 = 10;

/// Energy an actor must accumulate before it can take an action.
pub const ENERGY_THRESHOLD: i32 = 100;

/// Energy gained per dispatch by an actor of ordinary speed.
pub const DEFAULT_SPEED: i32 = 100;

/// How far wandering creatures plan their strolls.
pub const WANDER_RANGE: usize = 8;

mod action;
pub use action::{Action, ClimbDirection, Rejection};

mod ai;
pub use ai::{AiState, Autoplay};

mod config;
pub use config::Config;

pub mod ecs;

mod entity;
pub use entity::Entity;

mod item;
pub use item::{EquipableStats, EquipmentSlot};

mod level;
pub use level::{DungeonLevel, LevelId};

mod location;
pub use location::{Location, Place};

pub mod mapgen;

mod mob;
pub use mob::{CombatStats, Controller, Faction};

mod msg;
pub use msg::Msg;

mod pathing;
pub use pathing::BlindPath;

mod pathmap;
pub use pathmap::{Pathmap, UNREACHABLE};

pub mod prelude;

pub mod prototypes;

mod runtime;
pub use runtime::{InputSource, Runtime, StepOutcome};

mod scheduler;
pub use scheduler::ActorDispenser;

mod terrain;
pub use terrain::Terrain;

mod vision;
pub use vision::Vision;

/// Failures of engine operations that callers are expected to handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position {0} is outside the level")]
    OutOfBounds(glam::IVec2),
    #[error("failed to allocate map buffer: {0}")]
    Allocation(#[from] std::collections::TryReserveError),
    #[error(transparent)]
    Fov(#[from] fov::Error),
}
