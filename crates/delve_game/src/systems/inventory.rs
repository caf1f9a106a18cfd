//! Picking up, dropping, equipping and using items.

use anyhow::Result;
use delve_component::EntityId;
use delve_world::{CommandRecord, RemoveEntity, System, World};
use tracing::debug;

use super::describe;
use crate::commands::{DropItem, Equip, PickUp, UseItem};
use crate::components::{Consumable, Equippable, Health, Inventory, Item, Position};
use crate::events::{InventoryFull, ItemConsumed, ItemDropped, ItemEquipped, ItemPickedUp};

/// Handler for [`PickUp`], [`DropItem`], [`Equip`] and [`UseItem`].
#[derive(Debug, Default)]
pub struct InventorySystem;

impl System for InventorySystem {
    fn name(&self) -> &str {
        "inventory"
    }

    fn on_command(&mut self, world: &mut World, command: &CommandRecord) -> Result<()> {
        if let Some(&PickUp { actor, item }) = command.downcast::<PickUp>() {
            pick_up(world, actor, item);
        } else if let Some(&DropItem { actor, item }) = command.downcast::<DropItem>() {
            drop_item(world, actor, item);
        } else if let Some(&Equip { actor, item }) = command.downcast::<Equip>() {
            equip(world, actor, item);
        } else if let Some(&UseItem { actor, item }) = command.downcast::<UseItem>() {
            use_item(world, actor, item);
        }
        Ok(())
    }
}

fn carries(world: &World, actor: EntityId, item: EntityId) -> bool {
    world
        .get_component::<Inventory>(actor)
        .is_some_and(|inventory| inventory.contains(item))
}

fn pick_up(world: &mut World, actor: EntityId, item: EntityId) {
    if !world.has_component::<Item>(item) || !world.has_component::<Position>(item) {
        debug!(%actor, %item, "nothing to pick up");
        return;
    }
    let Some(inventory) = world.get_component_mut::<Inventory>(actor) else {
        debug!(%actor, %item, "actor cannot carry items");
        return;
    };
    if inventory.is_full() {
        world.publish(InventoryFull { actor, item });
        return;
    }
    inventory.add(item);
    world.remove_component::<Position>(item);
    world.publish(ItemPickedUp { actor, item });
}

fn drop_item(world: &mut World, actor: EntityId, item: EntityId) {
    let Some(&at) = world.get_component::<Position>(actor) else {
        debug!(%actor, %item, "actor has no position to drop at");
        return;
    };
    let taken = world
        .get_component_mut::<Inventory>(actor)
        .is_some_and(|inventory| inventory.take(item));
    if !taken || !world.contains_entity(item) {
        debug!(%actor, %item, "item not carried");
        return;
    }
    world.add_component(item, at);
    world.publish(ItemDropped { actor, item, at });
}

fn equip(world: &mut World, actor: EntityId, item: EntityId) {
    if !carries(world, actor, item) || !world.has_component::<Equippable>(item) {
        debug!(%actor, %item, "cannot equip");
        return;
    }
    if let Some(inventory) = world.get_component_mut::<Inventory>(actor) {
        inventory.equipped = Some(item);
    }
    world.publish(ItemEquipped { actor, item });
}

fn use_item(world: &mut World, actor: EntityId, item: EntityId) {
    let Some(&Consumable { heal }) = world.get_component::<Consumable>(item) else {
        debug!(%actor, %item, "item is not consumable");
        return;
    };
    if !carries(world, actor, item) {
        debug!(%actor, %item, "item not carried");
        return;
    }

    let healed = world
        .get_component_mut::<Health>(actor)
        .map_or(0, |health| health.heal(heal));
    if let Some(inventory) = world.get_component_mut::<Inventory>(actor) {
        inventory.take(item);
    }
    let name = describe(world, item);
    world.queue_command(RemoveEntity { id: item });
    world.publish(ItemConsumed {
        actor,
        item,
        name,
        healed,
    });
}

#[cfg(test)]
mod tests {
    use delve_world::Command;

    use super::*;
    use crate::testing::{Seen, SeenLog, record_events};

    fn setup() -> (World, SeenLog, EntityId) {
        let mut world = World::new();
        let inventory = world.add_system(InventorySystem, 0);
        for kind in [PickUp::KIND, DropItem::KIND, Equip::KIND, UseItem::KIND] {
            world.handle_command(kind, inventory);
        }
        let log = record_events(&mut world);
        let actor = world
            .create_entity()
            .with(Position::new(1, 1))
            .with(Health { current: 3, max: 10 })
            .with(Inventory::with_capacity(1));
        let actor = world.add_entity(actor);
        (world, log, actor)
    }

    fn item_at(world: &mut World, name: &str, at: Position) -> EntityId {
        let entity = world.create_entity().with(Item::new(name)).with(at);
        world.add_entity(entity)
    }

    #[test]
    fn test_pick_up_and_drop() {
        let (mut world, log, actor) = setup();
        let sword = item_at(&mut world, "sword", Position::new(1, 1));

        world.queue_command(PickUp { actor, item: sword });
        world.update(1.0).unwrap();
        assert!(carries(&world, actor, sword));
        assert!(!world.has_component::<Position>(sword));

        world.add_component(actor, Position::new(4, 2));
        world.queue_command(DropItem { actor, item: sword });
        world.update(1.0).unwrap();
        assert!(!carries(&world, actor, sword));
        assert_eq!(world.get_component::<Position>(sword), Some(&Position::new(4, 2)));

        assert_eq!(
            *log.borrow(),
            vec![
                Seen::PickedUp(ItemPickedUp { actor, item: sword }),
                Seen::Dropped(ItemDropped {
                    actor,
                    item: sword,
                    at: Position::new(4, 2),
                }),
            ]
        );
    }

    #[test]
    fn test_full_inventory() {
        let (mut world, log, actor) = setup();
        let first = item_at(&mut world, "first", Position::new(1, 1));
        let second = item_at(&mut world, "second", Position::new(1, 1));

        world.queue_command(PickUp { actor, item: first });
        world.queue_command(PickUp { actor, item: second });
        world.update(1.0).unwrap();

        assert!(world.has_component::<Position>(second));
        assert_eq!(
            log.borrow().last(),
            Some(&Seen::Full(InventoryFull { actor, item: second }))
        );
    }

    #[test]
    fn test_equip_requires_carried_equippable() {
        let (mut world, log, actor) = setup();
        let blade = item_at(&mut world, "blade", Position::new(1, 1));
        world.add_component(blade, Equippable {
            attack_bonus: 2,
            defense_bonus: 0,
        });

        world.queue_command(Equip { actor, item: blade });
        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Inventory>(actor).unwrap().equipped, None);

        world.queue_command(PickUp { actor, item: blade });
        world.queue_command(Equip { actor, item: blade });
        world.update(1.0).unwrap();
        assert_eq!(
            world.get_component::<Inventory>(actor).unwrap().equipped,
            Some(blade)
        );
        assert!(log.borrow().contains(&Seen::Equipped(ItemEquipped { actor, item: blade })));
    }

    #[test]
    fn test_use_potion_heals_and_removes_it() {
        let (mut world, log, actor) = setup();
        let potion = item_at(&mut world, "potion", Position::new(1, 1));
        world.add_component(potion, Consumable { heal: 20 });

        world.queue_command(PickUp { actor, item: potion });
        world.queue_command(UseItem { actor, item: potion });
        world.update(1.0).unwrap();

        assert!(!world.contains_entity(potion));
        assert_eq!(world.get_component::<Health>(actor).map(|h| h.current), Some(10));
        assert!(!carries(&world, actor, potion));
        assert!(log.borrow().contains(&Seen::Consumed(ItemConsumed {
            actor,
            item: potion,
            name: "potion".to_string(),
            healed: 7,
        })));
    }
}
