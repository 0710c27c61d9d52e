use std::collections::VecDeque;

use anyhow::{Context, Result};
use rand::prelude::*;
use util::{Array2d, AsciiMap, GameRng, Logos};

use crate::{
    ecs::*, mapgen, prelude::*, prototypes, ActorDispenser, Config,
    Controller,
};

/// Source of actions for input-controlled actors.
pub trait InputSource {
    /// Produce the next action for `actor`.
    ///
    /// Returning `None` means there's no input yet. The actor then stays
    /// pending and is asked again on the next step.
    fn next_action(&mut self, r: &mut Runtime, actor: Entity)
        -> Option<Action>;
}

impl<F> InputSource for F
where
    F: FnMut(&mut Runtime, Entity) -> Option<Action>,
{
    fn next_action(
        &mut self,
        r: &mut Runtime,
        actor: Entity,
    ) -> Option<Action> {
        self(r, actor)
    }
}

/// What happened during a single scheduler dispatch.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StepOutcome {
    /// There's no one around to act.
    Idle,
    Acted(Entity, Action),
    /// The actor tried something that didn't work, nothing happened.
    Rejected(Entity, Rejection),
    /// The actor didn't have enough energy to act yet.
    Recovering(Entity),
    /// The input source had nothing for the actor.
    AwaitingInput(Entity),
}

/// Main data container for game engine runtime.
pub struct Runtime {
    pub(crate) ecs: Ecs,
    pub(crate) levels: Vec<DungeonLevel>,
    dispenser: ActorDispenser,
    /// Actor that has its energy but is still waiting for input.
    pending: Option<Entity>,
    /// Entity whose point of view messages are told from.
    tracked: Option<Entity>,
    /// Level the scheduler is centered on.
    current: Option<LevelId>,
    pub(crate) rng: GameRng,
    pub(crate) msgs: VecDeque<Msg>,
    /// Entities that died during the current step.
    pub(crate) deaths: Vec<Entity>,
    needs_resync: bool,
    turn: u64,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime {
            ecs: Default::default(),
            levels: Default::default(),
            dispenser: Default::default(),
            pending: None,
            tracked: None,
            current: None,
            rng: GameRng::seed_from_u64(0xdeadbeef),
            msgs: Default::default(),
            deaths: Default::default(),
            needs_resync: false,
            turn: 0,
        }
    }
}

impl AsRef<Runtime> for Runtime {
    fn as_ref(&self) -> &Runtime {
        self
    }
}

impl AsMut<Runtime> for Runtime {
    fn as_mut(&mut self) -> &mut Runtime {
        self
    }
}

impl Runtime {
    /// Build an empty dungeon from terrain maps, topmost level first.
    pub fn from_levels(maps: Vec<Array2d<Terrain>>) -> Self {
        let n = maps.len();
        let levels = maps
            .into_iter()
            .enumerate()
            .map(|(i, terrain)| {
                DungeonLevel::new(
                    LevelId(i),
                    terrain,
                    i.checked_sub(1).map(LevelId),
                    (i + 1 < n).then_some(LevelId(i + 1)),
                )
            })
            .collect::<Vec<_>>();

        Runtime {
            current: (!levels.is_empty()).then_some(LevelId(0)),
            levels,
            ..Default::default()
        }
    }

    /// Generate and populate a new dungeon.
    pub fn new(config: &Config, seed: &Logos) -> Result<Self> {
        let mut rng = seed.rng();

        let mut maps = Vec::new();
        let mut upstairs = None;
        for depth in 0..config.num_levels {
            let mut level = mapgen::Level::new(config);
            if let Some(p) = upstairs {
                level = level.upstairs_at(p);
            }
            if depth + 1 < config.num_levels {
                level = level.with_downstairs();
            }
            let map = level
                .generate(&mut rng)
                .with_context(|| format!("generating level {}", depth + 1))?;
            upstairs = map.downstairs;
            maps.push(map);
        }
        let start = maps.first().context("Dungeon has no levels")?.origin;

        let mut ret =
            Runtime::from_levels(maps.into_iter().map(|m| m.terrain).collect());
        ret.rng = GameRng::seed_from_u64(rng.gen());

        let player =
            prototypes::human(&mut ret, Controller::Input, config.fov_radius)?;
        player
            .with_mut(&mut ret, |c: &mut Controlled| c.speed = config.player_speed);
        ret.put_entity(LevelId(0), player, start);
        ret.set_tracked(Some(player));

        for i in 0..ret.levels.len() {
            mapgen::populate(&mut ret, LevelId(i), config, &mut rng)?;
        }
        ret.sync_actors();

        log::info!(
            "Generated {} levels from seed {seed}, {} entities",
            ret.levels.len(),
            ret.ecs.len()
        );
        Ok(ret)
    }

    /// Access a level.
    ///
    /// Panics on ids that don't belong to this runtime.
    pub fn level(&self, id: LevelId) -> &DungeonLevel {
        &self.levels[id.0]
    }

    pub(crate) fn level_mut(&mut self, id: LevelId) -> &mut DungeonLevel {
        &mut self.levels[id.0]
    }

    pub fn levels(&self) -> impl Iterator<Item = &DungeonLevel> + '_ {
        self.levels.iter()
    }

    pub fn current_level(&self) -> Option<LevelId> {
        self.current
    }

    pub fn tracked(&self) -> Option<Entity> {
        self.tracked
    }

    /// Set the entity the game is followed from. The scheduler centers on
    /// its level.
    pub fn set_tracked(&mut self, e: Option<Entity>) {
        self.tracked = e;
        self.follow_tracked();
    }

    /// Number of dispatches that led to an action being tried.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn actors(&self) -> &[Entity] {
        self.dispenser.actors()
    }

    pub(crate) fn request_resync(&mut self) {
        self.needs_resync = true;
    }

    fn follow_tracked(&mut self) {
        if let Some(level) = self.tracked.and_then(|e| e.place(self)).map(|p| p.level)
        {
            if self.current != Some(level) {
                log::debug!("Scheduler moves to {level}");
                self.current = Some(level);
                self.needs_resync = true;
            }
        }
    }

    /// Rebuild the scheduler's actor set from the current level and the
    /// levels right above and below it.
    pub fn sync_actors(&mut self) {
        self.needs_resync = false;
        let Some(current) = self.current else {
            self.dispenser.sync(Vec::new());
            return;
        };
        let level = self.level(current);
        let actors: Vec<Entity> = [level.previous(), Some(current), level.next()]
            .into_iter()
            .flatten()
            .flat_map(|l| self.level(l).entities())
            .filter(|&e| self.ecs.has::<Controlled>(e))
            .collect();
        self.dispenser.sync(actors);
    }

    /// Run one scheduler dispatch.
    pub fn step(&mut self, input: &mut impl InputSource) -> StepOutcome {
        if self.needs_resync {
            self.sync_actors();
        }

        let actor = match self.pending.take() {
            // Already got its energy, still needs to act.
            Some(actor) => actor,
            None => {
                let Some(actor) = self.dispenser.next() else {
                    return StepOutcome::Idle;
                };
                if !actor.gain_energy(self) {
                    return StepOutcome::Recovering(actor);
                }
                actor
            }
        };

        let ai = actor.with_mut(self, |c: &mut Controlled| {
            match &mut c.controller {
                Controller::Ai(state) => Some(std::mem::take(state)),
                Controller::Input => None,
            }
        });

        let action = match ai {
            None => {
                log::warn!("Runtime::step: dispatched {actor} can't act");
                self.request_resync();
                return StepOutcome::Idle;
            }
            Some(Some(mut state)) => {
                let action = actor.decide(self, &mut state);
                actor.with_mut(self, |c: &mut Controlled| {
                    c.controller = Controller::Ai(state)
                });
                action
            }
            Some(None) => {
                self.send_msg(Msg::Redraw);
                let Some(action) = input.next_action(self, actor) else {
                    self.pending = Some(actor);
                    return StepOutcome::AwaitingInput(actor);
                };
                action
            }
        };

        self.turn += 1;
        let outcome = match actor.validate(self, action) {
            Ok(action) => {
                actor.spend_energy(self, action.cost());
                actor.execute(self, action);
                StepOutcome::Acted(actor, action)
            }
            Err(rejection) => {
                log::debug!("{actor} can't do {action:?}: {rejection}");
                if actor.is_tracked(self) {
                    msg!(self, "{}", rejection);
                }
                StepOutcome::Rejected(actor, rejection)
            }
        };

        self.finish_turn();
        outcome
    }

    fn finish_turn(&mut self) {
        let deaths = std::mem::take(&mut self.deaths);
        if !deaths.is_empty() {
            for c in self.ecs.iter_mut::<Controlled>() {
                if let Controller::Ai(state) = &mut c.controller {
                    for &e in &deaths {
                        state.forget(e);
                    }
                }
            }
            self.needs_resync = true;
        }

        self.follow_tracked();
        if self.needs_resync {
            self.sync_actors();
        }
    }

    /// Run up to `steps` dispatches, stopping early when the game is over
    /// or the input source runs dry. Returns the number of dispatches run.
    pub fn run(&mut self, steps: usize, input: &mut impl InputSource) -> usize {
        for i in 0..steps {
            if self.is_over() {
                return i;
            }
            match self.step(input) {
                StepOutcome::Idle | StepOutcome::AwaitingInput(_) => {
                    return i + 1
                }
                _ => {}
            }
        }
        steps
    }

    /// The tracked entity has died.
    pub fn is_over(&self) -> bool {
        self.tracked.is_some_and(|e| !e.is_alive(self))
    }

    /// Draw a level as text, creatures are shown over items.
    pub fn render_level(&self, id: LevelId) -> AsciiMap {
        let level = self.level(id);
        AsciiMap::from_fn(level.grid().size(), |p| {
            let occupants = level.occupants(p);
            let shown = occupants
                .iter()
                .find(|&&e| {
                    self.ecs.get::<Physical>(e).is_some_and(|b| b.blocks_movement)
                })
                .or_else(|| occupants.last());
            match shown {
                Some(&e) => self.ecs.icon(e),
                None => level.terrain_at(p).into(),
            }
        })
    }
}
