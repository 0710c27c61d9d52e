//! Entity logic for active creatures.
use rand::Rng;
use serde::{Deserialize, Serialize};
use util::RngExt;

use crate::{ecs::*, prelude::*, AiState, EquipmentSlot};

/// What makes the decisions for an actor.
#[derive(Clone, Debug)]
pub enum Controller {
    /// Decisions come from the runtime's input source.
    Input,
    Ai(AiState),
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum Faction {
    Player,
    Monster,
}

/// Derived fighting numbers of a creature and its gear.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct CombatStats {
    /// Debican odds bonus for landing a hit.
    pub accuracy: i32,
    pub dice_num: i32,
    pub dice_size: i32,
    /// Damage soaked from every hit.
    pub defense: i32,
    /// Debican odds penalty for attackers.
    pub evasion: i32,
}

/// Base odds of hitting an opponent of equal accuracy and evasion.
const BASE_HIT_ODDS: Odds = Odds(4);

impl Entity {
    pub fn is_alive(&self, r: &impl AsRef<Runtime>) -> bool {
        self.with(r, |d: &Damageable| d.is_alive()).unwrap_or(false)
    }

    pub fn faction(&self, r: &impl AsRef<Runtime>) -> Option<Faction> {
        self.with(r, |c: &Controlled| c.faction)
    }

    /// Whether `other` is something this entity should fight.
    pub fn is_hostile_to(
        &self,
        r: &impl AsRef<Runtime>,
        other: Entity,
    ) -> bool {
        if other == *self || !other.is_alive(r) {
            return false;
        }
        match (self.faction(r), other.faction(r)) {
            (Some(a), Some(b)) => a != b,
            // Inert damageable things are fair game.
            _ => true,
        }
    }

    /// First living hostile thing on a tile.
    pub fn hostile_at(
        &self,
        r: &impl AsRef<Runtime>,
        place: Place,
    ) -> Option<Entity> {
        let r = r.as_ref();
        r.level(place.level)
            .occupants(place.pos)
            .iter()
            .copied()
            .find(|&e| self.is_hostile_to(r, e))
    }

    pub fn combat_stats(&self, r: &impl AsRef<Runtime>) -> CombatStats {
        let r = r.as_ref();
        let attrs = self.get::<Attributes>(r).unwrap_or_default();

        let mut armor = 0;
        let mut encumbrance = 0;
        let mut weapon = None;
        if let Some(equipment) = self.get::<Equipment>(r) {
            for (slot, item) in equipment.iter() {
                let Some(eq) = item.get::<Equipable>(r) else {
                    continue;
                };
                armor += eq.stats.armor;
                encumbrance += eq.stats.encumbrance;
                if slot == EquipmentSlot::MainHand {
                    weapon = Some(eq.stats);
                }
            }
        }
        let weapon = weapon.unwrap_or_default();

        CombatStats {
            accuracy: attrs.dexterity + weapon.accuracy,
            dice_num: weapon.dice_num.max(1),
            dice_size: attrs.strength + weapon.dice_size,
            defense: armor * attrs.endurance / 5,
            evasion: attrs.dexterity / encumbrance.max(1),
        }
    }

    /// Swing at a target, rolling to hit and for damage.
    pub(crate) fn attack(&self, r: &mut impl AsMut<Runtime>, target: Entity) {
        let r = r.as_mut();
        let Some(place) = target.place(r) else { return };

        let attacker = self.combat_stats(r);
        let defender = target.combat_stats(r);
        let odds =
            BASE_HIT_ODDS + Odds(attacker.accuracy) - Odds(defender.evasion);

        if !r.rng.sample(odds) {
            let text = format!(
                "The {} misses the {}.",
                self.name(r),
                target.name(r)
            );
            r.log_local(*self, place, text);
            return;
        }

        let roll = r.rng.roll_dice(attacker.dice_num, attacker.dice_size);
        let damage = (roll - defender.defense).max(1);
        let text = format!(
            "The {} hits the {} for {} damage.",
            self.name(r),
            target.name(r),
            damage
        );
        r.log_local(*self, place, text);
        target.take_damage(r, damage);
    }

    /// Lose health, dying when it runs out.
    ///
    /// Returns the amount of health lost.
    pub fn take_damage(&self, r: &mut impl AsMut<Runtime>, amount: i32) -> i32 {
        let r = r.as_mut();
        let Some((lost, dead)) = self.with_mut(r, |d: &mut Damageable| {
            if !d.is_alive() {
                return (0, false);
            }
            let lost = amount.clamp(0, d.health);
            d.health -= lost;
            (lost, !d.is_alive())
        }) else {
            return 0;
        };

        if dead {
            self.die(r);
        }
        lost
    }

    /// Remove a creature that ran out of health from the world.
    ///
    /// The body stays in the registry so references to it remain valid,
    /// but it is taken off its level and stops acting.
    fn die(&self, r: &mut Runtime) {
        if let Some(place) = self.place(r) {
            let text = format!("The {} dies.", self.name(r));
            r.log_local(*self, place, text);
        }
        log::info!("{} {self} died", self.name(r));
        r.remove_entity(*self);
        r.send_msg(Msg::Death(*self));
        r.deaths.push(*self);
    }

    /// Gain energy for one dispatch, returns whether the actor can act.
    ///
    /// Energy doesn't pile up past what one dispatch would give, so turns
    /// spent idle can't be saved for a burst of actions later.
    pub(crate) fn gain_energy(&self, r: &mut impl AsMut<Runtime>) -> bool {
        self.with_mut(r, |c: &mut Controlled| {
            let cap = c.speed.max(crate::ENERGY_THRESHOLD);
            c.energy = (c.energy + c.speed).min(cap);
            c.energy >= crate::ENERGY_THRESHOLD
        })
        .unwrap_or(false)
    }

    pub(crate) fn spend_energy(&self, r: &mut impl AsMut<Runtime>, cost: i32) {
        self.with_mut(r, |c: &mut Controlled| c.energy -= cost);
    }
}
