//! Constructors for the things that populate the dungeon.
//!
//! The returned entities are not placed on any level yet.

use anyhow::Result;

use crate::{
    ecs::*, prelude::*, AiState, Controller, EquipableStats, EquipmentSlot,
    Faction, Vision,
};

/// How many items a human can carry.
const HUMAN_STORAGE: usize = 30;

/// Bare hands as an equipable weapon.
pub fn fist(r: &mut impl AsMut<Runtime>, accuracy: i32) -> Entity {
    let r = r.as_mut();
    let e = r.ecs.spawn("fist");
    r.ecs.add(
        e,
        Equipable {
            slot: EquipmentSlot::MainHand,
            stats: EquipableStats {
                dice_num: 1,
                dice_size: 1,
                accuracy,
                ..Default::default()
            },
        },
    );
    e
}

fn creature(
    r: &mut Runtime,
    name: &str,
    icon: char,
    attributes: Attributes,
    max_health: i32,
    controlled: Controlled,
    fov_radius: i32,
) -> Result<Entity> {
    // Allocate the sight buffer first so a failure leaves nothing behind.
    let vision = Vision::new(fov_radius)?;

    let e = r.ecs.spawn(name);
    r.ecs.set_icon(e, icon);
    r.ecs.add(e, vision);
    r.ecs.add(
        e,
        Physical {
            blocks_movement: true,
        },
    );
    r.ecs.add(e, Damageable::new(max_health));
    r.ecs.add(e, attributes);
    r.ecs.add(e, controlled);
    r.ecs.add(e, Equipment::default());
    Ok(e)
}

fn arm(r: &mut Runtime, e: Entity, weapon: Entity) {
    e.with_mut(r, |eq: &mut Equipment| {
        eq.insert(EquipmentSlot::MainHand, weapon)
    });
}

/// A human adventurer, the player character in a normal game.
pub fn human(
    r: &mut impl AsMut<Runtime>,
    controller: Controller,
    fov_radius: i32,
) -> Result<Entity> {
    let r = r.as_mut();
    let e = creature(
        r,
        "human",
        '@',
        Attributes {
            strength: 8,
            dexterity: 8,
            endurance: 8,
        },
        100,
        Controlled::new(controller, Faction::Player),
        fov_radius,
    )?;
    r.ecs.add(e, Storage::new(HUMAN_STORAGE));
    let weapon = fist(r, -3);
    arm(r, e, weapon);
    Ok(e)
}

pub fn goblin(r: &mut impl AsMut<Runtime>, fov_radius: i32) -> Result<Entity> {
    let r = r.as_mut();
    let e = creature(
        r,
        "goblin",
        'g',
        Attributes {
            strength: 3,
            dexterity: 8,
            endurance: 5,
        },
        10,
        Controlled::new(Controller::Ai(AiState::default()), Faction::Monster),
        fov_radius,
    )?;
    let weapon = fist(r, 1);
    arm(r, e, weapon);
    Ok(e)
}

/// A worthless amulet to pick up and wear.
pub fn trinket(r: &mut impl AsMut<Runtime>) -> Entity {
    let r = r.as_mut();
    let e = r.ecs.spawn("trinket");
    r.ecs.set_icon(e, '"');
    r.ecs.add(
        e,
        Physical {
            blocks_movement: false,
        },
    );
    r.ecs.add(
        e,
        Equipable {
            slot: EquipmentSlot::Amulet,
            stats: Default::default(),
        },
    );
    e
}
