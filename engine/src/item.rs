//! Entity logic for carried and worn items.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{ecs::*, prelude::*};

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum EquipmentSlot {
    Head,
    Back,
    Torso,
    Hands,
    Legs,
    Feet,
    MainHand,
    OffHand,
    Ring1,
    Ring2,
    Amulet,
}

/// Bonuses an item gives when equipped.
#[derive(
    Copy, Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize,
)]
pub struct EquipableStats {
    pub dice_num: i32,
    pub dice_size: i32,
    pub accuracy: i32,
    pub armor: i32,
    pub encumbrance: i32,
}

impl Entity {
    /// Can be picked up and carried around.
    pub fn is_portable(&self, r: &impl AsRef<Runtime>) -> bool {
        !self.has::<Controlled>(r)
            && self
                .with(r, |p: &Physical| !p.blocks_movement)
                .unwrap_or(false)
    }

    /// Carried items in pickup order.
    pub fn inventory(&self, r: &impl AsRef<Runtime>) -> Vec<Entity> {
        self.with(r, |s: &Storage| s.iter().collect())
            .unwrap_or_default()
    }

    pub fn is_carrying(&self, r: &impl AsRef<Runtime>, item: Entity) -> bool {
        self.with(r, |s: &Storage| s.contains(item))
            .unwrap_or(false)
    }

    pub fn equipped(
        &self,
        r: &impl AsRef<Runtime>,
        slot: EquipmentSlot,
    ) -> Option<Entity> {
        self.with(r, |e: &Equipment| e.get(slot)).flatten()
    }

    /// Tell about something the entity did where it is standing.
    fn log_deed(&self, r: &mut Runtime, text: String) {
        if let Some(place) = self.place(r) {
            r.log_local(*self, place, text);
        } else {
            log::debug!("{text}");
        }
    }

    pub(crate) fn pick_up(&self, r: &mut impl AsMut<Runtime>, item: Entity) {
        let r = r.as_mut();
        r.remove_entity(item);
        let stored = self.with_mut(r, |s: &mut Storage| s.insert(item));
        debug_assert_eq!(stored, Some(true), "pick_up: unvalidated pickup");
        let text =
            format!("The {} picks up the {}.", self.name(r), item.name(r));
        self.log_deed(r, text);
    }

    pub(crate) fn drop_item(&self, r: &mut impl AsMut<Runtime>, item: Entity) {
        let r = r.as_mut();
        let Some(place) = self.place(r) else { return };
        if self.with_mut(r, |s: &mut Storage| s.remove(item)) != Some(true) {
            return;
        }
        r.put_entity(place.level, item, place.pos);
        let text = format!("The {} drops the {}.", self.name(r), item.name(r));
        self.log_deed(r, text);
    }

    pub(crate) fn equip(&self, r: &mut impl AsMut<Runtime>, item: Entity) {
        let r = r.as_mut();
        let Some(slot) = item.with(r, |e: &Equipable| e.slot) else {
            return;
        };
        if self.with_mut(r, |s: &mut Storage| s.remove(item)) != Some(true) {
            return;
        }
        let previous = self
            .with_mut(r, |e: &mut Equipment| e.insert(slot, item))
            .flatten();
        if let Some(previous) = previous {
            // Room was made by taking out the new item.
            self.with_mut(r, |s: &mut Storage| s.insert(previous));
        }
        let text = format!("The {} equips a {}.", self.name(r), item.name(r));
        self.log_deed(r, text);
    }

    pub(crate) fn unequip(&self, r: &mut impl AsMut<Runtime>, item: Entity) {
        let r = r.as_mut();
        let Some(slot) = self.with(r, |e: &Equipment| e.slot_of(item)).flatten()
        else {
            return;
        };
        self.with_mut(r, |e: &mut Equipment| e.remove(slot));
        self.with_mut(r, |s: &mut Storage| s.insert(item));
        let text =
            format!("The {} takes off its {}.", self.name(r), item.name(r));
        self.log_deed(r, text);
    }
}
