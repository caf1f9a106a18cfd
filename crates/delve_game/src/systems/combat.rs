//! Resolves attacks.

use anyhow::Result;
use delve_world::{CommandRecord, RemoveEntity, System, World};
use tracing::debug;

use super::{describe, equipment};
use crate::commands::{Attack, DropItem};
use crate::components::{Combat, Equippable, Health, Inventory};
use crate::events::{CombatDamage, CombatDeath};

/// Damage dealt by one hit: attack plus weapon bonus, minus defense plus
/// armour bonus, never less than one.
#[must_use]
pub fn damage(
    attacker: Combat,
    attacker_gear: Equippable,
    defender: Combat,
    defender_gear: Equippable,
) -> i32 {
    let attack = attacker.attack + attacker_gear.attack_bonus;
    let defense = defender.defense + defender_gear.defense_bonus;
    (attack - defense).max(1)
}

/// Handler for [`Attack`].
///
/// Applies damage and publishes [`CombatDamage`]. When the defender's
/// health reaches zero it queues a [`DropItem`] for everything the defender
/// carried, then [`RemoveEntity`], and publishes [`CombatDeath`]. Dead
/// attackers do not swing and dead defenders are not hit again.
#[derive(Debug, Default)]
pub struct CombatSystem;

impl System for CombatSystem {
    fn name(&self) -> &str {
        "combat"
    }

    fn on_command(&mut self, world: &mut World, command: &CommandRecord) -> Result<()> {
        let Some(&Attack { attacker, defender }) = command.downcast::<Attack>() else {
            return Ok(());
        };

        let attacker_alive = world
            .get_component::<Health>(attacker)
            .map_or(world.contains_entity(attacker), |health| !health.is_dead());
        if !attacker_alive {
            debug!(%attacker, %defender, "attacker is gone or dead; attack dropped");
            return Ok(());
        }
        if world
            .get_component::<Health>(defender)
            .is_none_or(Health::is_dead)
        {
            debug!(%attacker, %defender, "defender has no health left; attack dropped");
            return Ok(());
        }

        let amount = damage(
            world.get_component::<Combat>(attacker).copied().unwrap_or_default(),
            equipment(world, attacker),
            world.get_component::<Combat>(defender).copied().unwrap_or_default(),
            equipment(world, defender),
        );
        let Some(health) = world.get_component_mut::<Health>(defender) else {
            return Ok(());
        };
        let remaining = health.damage(amount);

        debug!(%attacker, %defender, amount, remaining, "hit");
        world.publish(CombatDamage {
            attacker,
            defender,
            amount,
            remaining,
        });

        if remaining <= 0 {
            let carried = world
                .get_component::<Inventory>(defender)
                .map(|inventory| inventory.items.clone())
                .unwrap_or_default();
            for item in carried {
                world.queue_command(DropItem {
                    actor: defender,
                    item,
                });
            }
            world.queue_command(RemoveEntity { id: defender });
            world.publish(CombatDeath {
                entity: defender,
                killer: attacker,
                name: describe(world, defender),
            });
        }
        Ok(())
    }
}
