//! Capability registry on top of the component store.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use util::IndexSet;

use crate::{
    prelude::*, Controller, EquipableStats, EquipmentSlot, Faction, Vision,
    DEFAULT_SPEED,
};

bitflags! {
    /// Set of capability kinds attached to an entity.
    #[derive(
        Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize,
    )]
    pub struct Capabilities: u16 {
        const LOCATION = 1 << 0;
        const VISION = 1 << 1;
        const PHYSICAL = 1 << 2;
        const DAMAGEABLE = 1 << 3;
        const CONTROLLED = 1 << 4;
        const ATTRIBUTES = 1 << 5;
        const STORAGE = 1 << 6;
        const EQUIPMENT = 1 << 7;
        const EQUIPABLE = 1 << 8;
    }
}

/// Component type whose presence is tracked in the entity's capability
/// mask.
pub trait Capability: hecs::Component {
    const KIND: Capabilities;
}

macro_rules! capabilities {
    {
        $($ty:ty: $kind:ident,)+
    } => {
        $(
            impl Capability for $ty {
                const KIND: Capabilities = Capabilities::$kind;
            }
        )+
    }
}

capabilities! {
    Location: LOCATION,
    Vision: VISION,
    Physical: PHYSICAL,
    Damageable: DAMAGEABLE,
    Controlled: CONTROLLED,
    Attributes: ATTRIBUTES,
    Storage: STORAGE,
    Equipment: EQUIPMENT,
    Equipable: EQUIPABLE,
}

#[derive(Copy, Clone, Debug)]
struct Row {
    handle: hecs::Entity,
    caps: Capabilities,
}

/// Entity registry.
///
/// Entity ids are handed out in increasing order and never reused. Every
/// live entity has a name and a capability mask that mirrors exactly which
/// capability components it holds.
pub struct Ecs {
    world: hecs::World,
    rows: BTreeMap<Entity, Row>,
    next_id: u64,
}

impl Default for Ecs {
    fn default() -> Self {
        Ecs {
            world: Default::default(),
            rows: Default::default(),
            next_id: 1,
        }
    }
}

impl Ecs {
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let e = Entity(self.next_id);
        self.next_id += 1;
        let handle = self.world.spawn((Name(name.into()),));
        self.rows.insert(
            e,
            Row {
                handle,
                caps: Capabilities::empty(),
            },
        );
        e
    }

    /// Destroy an entity and everything attached to it.
    pub fn despawn(&mut self, e: Entity) -> bool {
        let Some(row) = self.rows.remove(&e) else {
            return false;
        };
        self.world
            .despawn(row.handle)
            .expect("Ecs::despawn: registry out of sync");
        true
    }

    pub fn contains(&self, e: Entity) -> bool {
        self.rows.contains_key(&e)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.rows.keys().copied()
    }

    pub fn capabilities(&self, e: Entity) -> Capabilities {
        self.rows.get(&e).map_or(Capabilities::empty(), |row| row.caps)
    }

    pub fn has<C: Capability>(&self, e: Entity) -> bool {
        self.capabilities(e).contains(C::KIND)
    }

    pub fn has_all(&self, e: Entity, caps: Capabilities) -> bool {
        self.contains(e) && self.capabilities(e).contains(caps)
    }

    /// Iterate entities that have all the given capabilities in id order.
    pub fn with_all(
        &self,
        caps: Capabilities,
    ) -> impl Iterator<Item = Entity> + '_ {
        self.rows
            .iter()
            .filter(move |(_, row)| row.caps.contains(caps))
            .map(|(&e, _)| e)
    }

    /// Attach a capability.
    ///
    /// An entity holds at most one capability of each kind. Returns false
    /// and leaves the entity unchanged if it does not exist or already has
    /// the capability.
    pub fn add<C: Capability>(&mut self, e: Entity, c: C) -> bool {
        let Some(row) = self.rows.get_mut(&e) else {
            return false;
        };
        if row.caps.contains(C::KIND) {
            return false;
        }
        self.world
            .insert_one(row.handle, c)
            .expect("Ecs::add: registry out of sync");
        row.caps |= C::KIND;
        true
    }

    /// Detach a capability and return it.
    pub fn remove<C: Capability>(&mut self, e: Entity) -> Option<C> {
        let row = self.rows.get_mut(&e)?;
        if !row.caps.contains(C::KIND) {
            return None;
        }
        row.caps.remove(C::KIND);
        self.world.remove_one::<C>(row.handle).ok()
    }

    pub fn get<C: Capability>(&self, e: Entity) -> Option<hecs::Ref<'_, C>> {
        let row = self.rows.get(&e)?;
        self.world.get::<&C>(row.handle).ok()
    }

    /// Mutable access through a runtime-checked borrow.
    ///
    /// Borrows are tracked per component type, so two capabilities of
    /// different kinds can be held at once.
    pub fn get_mut<C: Capability>(
        &self,
        e: Entity,
    ) -> Option<hecs::RefMut<'_, C>> {
        let row = self.rows.get(&e)?;
        self.world.get::<&mut C>(row.handle).ok()
    }

    /// Iterate every instance of a capability for bulk updates.
    pub fn iter_mut<C: Capability>(&mut self) -> impl Iterator<Item = &mut C> {
        self.world.query_mut::<&mut C>().into_iter().map(|(_, c)| c)
    }

    pub fn name(&self, e: Entity) -> String {
        self.rows
            .get(&e)
            .and_then(|row| self.world.get::<&Name>(row.handle).ok())
            .map_or_else(|| format!("unknown {e}"), |n| n.0.clone())
    }

    pub fn icon(&self, e: Entity) -> char {
        self.rows
            .get(&e)
            .and_then(|row| self.world.get::<&Icon>(row.handle).ok())
            .map_or('?', |i| i.0)
    }

    pub fn set_icon(&mut self, e: Entity, icon: char) {
        if let Some(row) = self.rows.get(&e) {
            self.world
                .insert_one(row.handle, Icon(icon))
                .expect("Ecs::set_icon: registry out of sync");
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Name(pub String);

/// Map display character.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize,
)]
pub struct Icon(pub char);

#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize,
)]
pub struct Physical {
    /// Whether other bodies are kept out of the tile this one occupies.
    pub blocks_movement: bool,
}

#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize,
)]
pub struct Damageable {
    pub health: i32,
    pub max_health: i32,
}

impl Damageable {
    pub fn new(max_health: i32) -> Self {
        Damageable {
            health: max_health,
            max_health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize,
)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub endurance: i32,
}

/// Something that takes turns.
#[derive(Clone, Debug)]
pub struct Controlled {
    pub controller: Controller,
    pub faction: Faction,
    /// Energy gained every time the actor is dispatched.
    pub speed: i32,
    pub energy: i32,
}

impl Controlled {
    pub fn new(controller: Controller, faction: Faction) -> Self {
        Controlled {
            controller,
            faction,
            speed: DEFAULT_SPEED,
            energy: 0,
        }
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }
}

/// Inventory of carried items in pickup order.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    capacity: usize,
    contents: IndexSet<Entity>,
}

impl Storage {
    pub fn new(capacity: usize) -> Self {
        Storage {
            capacity,
            contents: Default::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.contents.len() >= self.capacity
    }

    pub fn contains(&self, item: Entity) -> bool {
        self.contents.contains(&item)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.contents.iter().copied()
    }

    pub(crate) fn insert(&mut self, item: Entity) -> bool {
        !self.is_full() && self.contents.insert(item)
    }

    pub(crate) fn remove(&mut self, item: Entity) -> bool {
        self.contents.shift_remove(&item)
    }
}

/// Items currently worn or wielded.
#[derive(Clone, Debug, Default)]
pub struct Equipment {
    slots: BTreeMap<EquipmentSlot, Entity>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<Entity> {
        self.slots.get(&slot).copied()
    }

    pub fn slot_of(&self, item: Entity) -> Option<EquipmentSlot> {
        self.slots
            .iter()
            .find_map(|(&slot, &e)| (e == item).then_some(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, Entity)> + '_ {
        self.slots.iter().map(|(&s, &e)| (s, e))
    }

    /// Put an item in a slot, returning what was there before.
    pub(crate) fn insert(
        &mut self,
        slot: EquipmentSlot,
        item: Entity,
    ) -> Option<Entity> {
        self.slots.insert(slot, item)
    }

    pub(crate) fn remove(&mut self, slot: EquipmentSlot) -> Option<Entity> {
        self.slots.remove(&slot)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Equipable {
    pub slot: EquipmentSlot,
    pub stats: EquipableStats,
}
