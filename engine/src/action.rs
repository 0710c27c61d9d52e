//! Entities doing things

use serde::{Deserialize, Serialize};

use crate::{ecs::*, prelude::*};

/// Things an actor can try to do on its turn.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Action {
    /// Step to an adjacent tile. Bumping into a foe attacks it.
    Move(IVec2),
    /// Attack whatever hostile is on an adjacent tile.
    Attack(IVec2),
    /// Use the stairs underfoot. Controllers leave the direction empty,
    /// validation fills it in from the terrain.
    ClimbStairs(Option<ClimbDirection>),
    Rest,
    /// Pick up an item underfoot, the first portable one if unspecified.
    Pickup(Option<Entity>),
    Drop(Entity),
    Equip(Entity),
    Unequip(Entity),
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
pub enum ClimbDirection {
    Up,
    Down,
}

/// Reasons why an action can't be done right now.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum Rejection {
    #[error("That's not a direction you can go.")]
    NotADirection,
    #[error("Something is in the way.")]
    Blocked,
    #[error("There's nothing there to attack.")]
    NoTarget,
    #[error("There are no stairs here.")]
    NoStairs,
    #[error("The stairs lead nowhere.")]
    DeadEndStairs,
    #[error("The other end of the stairs is blocked.")]
    StairsBlocked,
    #[error("There's nothing here to pick up.")]
    NothingToPickUp,
    #[error("You can't carry any more.")]
    StorageFull,
    #[error("You aren't carrying that.")]
    NotCarried,
    #[error("That can't be equipped.")]
    NotEquipable,
    #[error("That isn't equipped.")]
    NotEquipped,
    #[error("There's no room to put that away.")]
    NoRoom,
    #[error("You can't do that.")]
    Incapable,
}

impl Action {
    /// Energy spent by doing the action.
    pub fn cost(&self) -> i32 {
        use Action::*;
        match self {
            Attack(_) | Move(_) | Rest | Pickup(_) | Drop(_) => 100,
            ClimbStairs(_) | Equip(_) | Unequip(_) => 150,
        }
    }
}

fn unit_step(dir: IVec2) -> Result<IVec2, Rejection> {
    if dir.is_adjacent() {
        Ok(dir)
    } else {
        Err(Rejection::NotADirection)
    }
}

impl Entity {
    /// Check an action against the current state of the world.
    ///
    /// The returned action is the one that should be executed. It can
    /// differ from the requested one, moving into a foe becomes an attack
    /// and climbing learns which way the stairs go.
    pub fn validate(
        &self,
        r: &impl AsRef<Runtime>,
        action: Action,
    ) -> Result<Action, Rejection> {
        use Action::*;
        use Rejection::*;
        let r = r.as_ref();

        if action == Rest {
            return Ok(Rest);
        }

        let Some(place) = self.place(r) else {
            return Err(Incapable);
        };

        match action {
            Rest => Ok(Rest),
            Move(dir) => {
                let dir = unit_step(dir)?;
                let dest = Place::new(place.level, place.pos + dir);
                if self.hostile_at(r, dest).is_some() {
                    Ok(Attack(dir))
                } else if r.travelable(dest.level, dest.pos) {
                    Ok(Move(dir))
                } else {
                    Err(Blocked)
                }
            }
            Attack(dir) => {
                let dir = unit_step(dir)?;
                let dest = Place::new(place.level, place.pos + dir);
                self.hostile_at(r, dest).ok_or(NoTarget)?;
                Ok(Attack(dir))
            }
            ClimbStairs(_) => {
                let level = r.level(place.level);
                let dir =
                    level.terrain_at(place.pos).climb_direction().ok_or(NoStairs)?;
                let other = match dir {
                    ClimbDirection::Up => level.previous(),
                    ClimbDirection::Down => level.next(),
                }
                .ok_or(DeadEndStairs)?;
                if !r.travelable(other, place.pos) {
                    return Err(StairsBlocked);
                }
                Ok(ClimbStairs(Some(dir)))
            }
            Pickup(item) => {
                let full = self
                    .with(r, |s: &Storage| s.is_full())
                    .ok_or(Incapable)?;
                let is_candidate = |e: &Entity| *e != *self && e.is_portable(r);
                let occupants = r.level(place.level).occupants(place.pos);
                let item = match item {
                    Some(item) => occupants
                        .iter()
                        .copied()
                        .find(|e| *e == item && is_candidate(e)),
                    None => occupants.iter().copied().find(is_candidate),
                }
                .ok_or(NothingToPickUp)?;
                if full {
                    return Err(StorageFull);
                }
                Ok(Pickup(Some(item)))
            }
            Drop(item) => {
                if !self.is_carrying(r, item) {
                    return Err(NotCarried);
                }
                Ok(Drop(item))
            }
            Equip(item) => {
                if !self.is_carrying(r, item) {
                    return Err(NotCarried);
                }
                if !item.has::<Equipable>(r) {
                    return Err(NotEquipable);
                }
                if !self.has::<Equipment>(r) {
                    return Err(Incapable);
                }
                Ok(Equip(item))
            }
            Unequip(item) => {
                self.with(r, |e: &Equipment| e.slot_of(item))
                    .flatten()
                    .ok_or(NotEquipped)?;
                let full = self
                    .with(r, |s: &Storage| s.is_full())
                    .ok_or(Incapable)?;
                if full {
                    return Err(NoRoom);
                }
                Ok(Unequip(item))
            }
        }
    }

    /// Carry out a validated action.
    pub fn execute(&self, r: &mut impl AsMut<Runtime>, action: Action) {
        use Action::*;
        let r = r.as_mut();

        match action {
            Move(dir) => {
                if let Some(pos) = self.pos(r) {
                    r.move_entity_within(*self, pos + dir);
                }
            }
            Attack(dir) => {
                let Some(place) = self.place(r) else { return };
                let dest = Place::new(place.level, place.pos + dir);
                if let Some(foe) = self.hostile_at(r, dest) {
                    self.attack(r, foe);
                }
            }
            ClimbStairs(Some(dir)) => self.climb(r, dir),
            ClimbStairs(None) | Pickup(None) | Rest => {}
            Pickup(Some(item)) => self.pick_up(r, item),
            Drop(item) => self.drop_item(r, item),
            Equip(item) => self.equip(r, item),
            Unequip(item) => self.unequip(r, item),
        }
    }

    fn climb(&self, r: &mut Runtime, dir: ClimbDirection) {
        let Some(place) = self.place(r) else { return };
        let level = r.level(place.level);
        let terrain = level.terrain_at(place.pos);
        let (other, word) = match dir {
            ClimbDirection::Up => (level.previous(), "up"),
            ClimbDirection::Down => (level.next(), "down"),
        };
        let Some(other) = other else { return };

        let text = format!(
            "The {} goes {word} the {}.",
            self.name(r),
            terrain.name()
        );
        r.log_local(*self, place, text);

        r.remove_entity(*self);
        r.put_entity(other, *self, place.pos);
        log::debug!("{self} moved to {other}");
        r.request_resync();
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{mapgen::from_ascii, prototypes, Controller, EquipmentSlot};

    fn runtime() -> Runtime {
        Runtime::from_levels(vec![
            from_ascii(
                "
                ######
                #<..>#
                ######",
            )
            .unwrap(),
            from_ascii(
                "
                ######
                #...<#
                ######",
            )
            .unwrap(),
        ])
    }

    fn human_at(r: &mut Runtime, level: usize, x: i32) -> Entity {
        let e = prototypes::human(r, Controller::Input, 5).unwrap();
        r.put_entity(LevelId(level), e, ivec2(x, 1));
        e
    }

    fn goblin_at(r: &mut Runtime, level: usize, x: i32) -> Entity {
        let e = prototypes::goblin(r, 5).unwrap();
        r.put_entity(LevelId(level), e, ivec2(x, 1));
        e
    }

    #[test]
    fn costs() {
        assert_eq!(Action::Move(ivec2(1, 0)).cost(), 100);
        assert_eq!(Action::Rest.cost(), 100);
        assert_eq!(Action::ClimbStairs(None).cost(), 150);
        assert_eq!(Action::Equip(Entity(1)).cost(), 150);
    }

    #[test]
    fn bumping() {
        let mut r = runtime();
        let human = human_at(&mut r, 0, 2);
        let goblin = goblin_at(&mut r, 0, 3);
        let other = goblin_at(&mut r, 0, 4);

        let east = ivec2(1, 0);
        assert_eq!(human.validate(&r, Action::Move(east)), Ok(Action::Attack(east)));
        assert_eq!(
            human.validate(&r, Action::Move(-east)),
            Ok(Action::Move(-east))
        );
        assert_eq!(
            human.validate(&r, Action::Move(ivec2(0, 1))),
            Err(Rejection::Blocked)
        );
        assert_eq!(
            human.validate(&r, Action::Move(ivec2(2, 0))),
            Err(Rejection::NotADirection)
        );
        assert_eq!(
            human.validate(&r, Action::Attack(-east)),
            Err(Rejection::NoTarget)
        );

        // No fighting among friends.
        assert_eq!(goblin.validate(&r, Action::Move(east)), Err(Rejection::Blocked));
        assert_eq!(other.validate(&r, Action::Attack(-east)), Err(Rejection::NoTarget));
    }

    #[test]
    fn stairs() {
        let mut r = runtime();
        let human = human_at(&mut r, 0, 4);
        let climb = Action::ClimbStairs(None);

        let down = human.validate(&r, climb).unwrap();
        assert_eq!(down, Action::ClimbStairs(Some(ClimbDirection::Down)));
        human.execute(&mut r, down);
        assert_eq!(human.place(&r), Some(Place::new(LevelId(1), ivec2(4, 1))));
        assert!(r.level(LevelId(0)).entities_at(ivec2(4, 1)).is_empty());

        let up = human.validate(&r, climb).unwrap();
        assert_eq!(up, Action::ClimbStairs(Some(ClimbDirection::Up)));

        // Someone waits at the top.
        let goblin = goblin_at(&mut r, 0, 4);
        assert_eq!(human.validate(&r, climb), Err(Rejection::StairsBlocked));
        r.remove_entity(goblin);

        human.execute(&mut r, up);
        r.move_entity_within(human, ivec2(1, 1));
        assert_eq!(human.validate(&r, climb), Err(Rejection::DeadEndStairs));
        r.move_entity_within(human, ivec2(2, 1));
        assert_eq!(human.validate(&r, climb), Err(Rejection::NoStairs));
    }

    #[test]
    fn items() {
        let mut r = runtime();
        let human = human_at(&mut r, 0, 2);
        let trinket = prototypes::trinket(&mut r);

        assert_eq!(
            human.validate(&r, Action::Pickup(None)),
            Err(Rejection::NothingToPickUp)
        );
        r.put_entity(LevelId(0), trinket, ivec2(2, 1));
        let pickup = human.validate(&r, Action::Pickup(None)).unwrap();
        assert_eq!(pickup, Action::Pickup(Some(trinket)));
        human.execute(&mut r, pickup);
        assert_eq!(human.inventory(&r), vec![trinket]);
        assert!(trinket.place(&r).is_none());

        let equip = human.validate(&r, Action::Equip(trinket)).unwrap();
        human.execute(&mut r, equip);
        assert_eq!(human.equipped(&r, EquipmentSlot::Amulet), Some(trinket));
        assert!(human.inventory(&r).is_empty());
        assert_eq!(
            human.validate(&r, Action::Drop(trinket)),
            Err(Rejection::NotCarried)
        );

        let unequip = human.validate(&r, Action::Unequip(trinket)).unwrap();
        human.execute(&mut r, unequip);
        assert_eq!(human.equipped(&r, EquipmentSlot::Amulet), None);
        assert_eq!(
            human.validate(&r, Action::Unequip(trinket)),
            Err(Rejection::NotEquipped)
        );

        r.move_entity_within(human, ivec2(3, 1));
        let drop = human.validate(&r, Action::Drop(trinket)).unwrap();
        human.execute(&mut r, drop);
        assert!(human.inventory(&r).is_empty());
        assert_eq!(trinket.place(&r), Some(Place::new(LevelId(0), ivec2(3, 1))));

        // Creatures can't be picked up.
        let goblin = goblin_at(&mut r, 0, 2);
        assert!(!goblin.is_portable(&r));
        assert_eq!(
            human.validate(&r, Action::Pickup(Some(goblin))),
            Err(Rejection::NothingToPickUp)
        );
    }

    #[test]
    fn full_storage() {
        let mut r = runtime();
        let human = human_at(&mut r, 0, 2);
        human.detach::<Storage>(&mut r);
        assert!(human.attach(&mut r, Storage::new(0)));
        let trinket = prototypes::trinket(&mut r);
        r.put_entity(LevelId(0), trinket, ivec2(2, 1));
        assert_eq!(
            human.validate(&r, Action::Pickup(Some(trinket))),
            Err(Rejection::StorageFull)
        );

        let goblin = goblin_at(&mut r, 0, 3);
        assert_eq!(
            goblin.validate(&r, Action::Pickup(None)),
            Err(Rejection::Incapable)
        );
    }
}
