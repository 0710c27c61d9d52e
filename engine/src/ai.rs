//! Mobs figuring out what to do on their own.
use rand::seq::SliceRandom;
use util::{dijkstra_map, srng, within_range};

use crate::{prelude::*, BlindPath, InputSource, Vision, WANDER_RANGE};

/// Memory of an AI-controlled creature between turns.
#[derive(Clone, Default, Debug)]
pub struct AiState {
    /// Hostile creature being chased.
    target: Option<Entity>,
    /// Aimless stroll in progress when there's nobody to chase.
    wander: Option<BlindPath>,
}

impl AiState {
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Drop a chase target that is no longer around.
    pub fn forget(&mut self, e: Entity) {
        if self.target == Some(e) {
            self.target = None;
        }
    }
}

impl Entity {
    /// Decide on the next action for an AI-controlled creature.
    ///
    /// Visible hostiles are chased using their pathmaps and attacked when
    /// adjacent. With no one to chase, the creature wanders to random
    /// nearby spots, and rests if it can't go anywhere.
    pub fn decide(&self, r: &impl AsRef<Runtime>, state: &mut AiState) -> Action {
        let r = r.as_ref();

        let Some(place) = self.place(r) else {
            log::warn!("Entity::decide: {self} is not on any level");
            return Action::Rest;
        };

        if let Some(target) = state.target {
            let lost = !target.is_alive(r)
                || target.place(r).map(|p| p.level) != Some(place.level);
            if lost {
                state.target = None;
            }
        }

        if self.has::<Vision>(r) {
            // Visible entities come nearest first.
            if let Some(foe) = r
                .visible_entities(*self)
                .into_iter()
                .find(|&e| self.is_hostile_to(r, e))
            {
                if state.target != Some(foe) {
                    log::debug!("{self} spots {foe}");
                }
                state.target = Some(foe);
                state.wander = None;
            }
        }

        if let Some(target) = state.target {
            if let Some(dir) = r.direction_towards(target, place.pos) {
                if target.pos(r) == Some(place.pos + dir) {
                    return Action::Attack(dir);
                }
                return Action::Move(dir);
            }
        }

        self.wander(r, place, state).unwrap_or(Action::Rest)
    }

    fn wander(
        &self,
        r: &Runtime,
        place: Place,
        state: &mut AiState,
    ) -> Option<Action> {
        // The previous stroll is stale if it ended or the creature got
        // pushed off it.
        if state
            .wander
            .as_ref()
            .is_some_and(|w| w.is_done() || w.pos() != place.pos)
        {
            state.wander = None;
        }

        let travelable = |p| r.travelable(place.level, p);
        if let Some(next) =
            state.wander.as_mut().and_then(|w| w.next_step(travelable))
        {
            return Some(Action::Move(next - place.pos));
        }

        // Nothing in progress or the stroll just ran out, head somewhere new.
        let mut path = BlindPath::new(place.pos, wander_destination(r, place)?);
        let next = path.next_step(travelable);
        state.wander = Some(path);
        Some(Action::Move(next? - place.pos))
    }
}

/// Pick a reachable spot a short walk away from `place`.
fn wander_destination(r: &Runtime, place: Place) -> Option<IVec2> {
    let spots: Vec<IVec2> = dijkstra_map(
        |&p: &IVec2| {
            DIR_8
                .iter()
                .map(move |&d| p + d)
                .filter(|&q| r.travelable(place.level, q))
                .collect::<Vec<_>>()
        },
        [place.pos],
    )
    .take_while(within_range(WANDER_RANGE))
    .filter(|&(_, dist)| dist > 0)
    .map(|(p, _)| p)
    .collect();

    // Vary the pick by turn so creatures don't pace between two spots.
    let mut rng = srng(&(place.level, place.pos, r.turn()));
    spots.choose(&mut rng).copied()
}

/// Input source that runs input-controlled actors with the creature AI.
#[derive(Clone, Default, Debug)]
pub struct Autoplay {
    states: HashMap<Entity, AiState>,
}

impl InputSource for Autoplay {
    fn next_action(&mut self, r: &mut Runtime, actor: Entity) -> Option<Action> {
        let state = self.states.entry(actor).or_default();
        Some(actor.decide(&*r, state))
    }
}
