//! Gameplay systems and their wiring.
//!
//! | System      | Priority | Hooks                                   |
//! |-------------|----------|-----------------------------------------|
//! | MonsterAi   | 10       | `update`                                |
//! | Movement    | 20       | `update`                                |
//! | Collision   | 30       | `on_event(EntityMoved)`                 |
//! | Encounter   | 40       | `on_event(EntitiesCollided)`            |
//! | Combat      | 50       | `on_command(Attack)`                    |
//! | Inventory   | 60       | `on_command(PickUp/DropItem/Equip/UseItem)` |

mod collision;
mod combat;
mod encounter;
mod inventory;
mod monster_ai;
mod movement;

pub use collision::CollisionSystem;
pub use combat::{CombatSystem, damage};
pub use encounter::{Encounter, EncounterResolver, EncounterSystem, StandardEncounters};
pub use inventory::InventorySystem;
pub use monster_ai::MonsterAiSystem;
pub use movement::MovementSystem;

use delve_component::EntityId;
use delve_world::{Command, Event, SystemId, World};

use crate::commands::{Attack, DropItem, Equip, PickUp, UseItem};
use crate::components::{Equippable, Inventory, Item, Name};
use crate::events::{EntitiesCollided, EntityMoved};

/// Scheduler priorities of the game systems.
pub mod priority {
    pub const MONSTER_AI: i32 = 10;
    pub const MOVEMENT: i32 = 20;
    pub const COLLISION: i32 = 30;
    pub const ENCOUNTER: i32 = 40;
    pub const COMBAT: i32 = 50;
    pub const INVENTORY: i32 = 60;
}

/// Ids of the installed game systems.
#[derive(Debug, Clone, Copy)]
pub struct GameSystems {
    pub monster_ai: SystemId,
    pub movement: SystemId,
    pub collision: SystemId,
    pub encounter: SystemId,
    pub combat: SystemId,
    pub inventory: SystemId,
}

/// Register every game system, its subscriptions and its command handlers.
pub fn install(world: &mut World, resolver: impl EncounterResolver + 'static) -> GameSystems {
    let monster_ai = world.add_system(MonsterAiSystem::new(), priority::MONSTER_AI);
    let movement = world.add_system(MovementSystem::new(), priority::MOVEMENT);

    let collision = world.add_system(CollisionSystem, priority::COLLISION);
    world.subscribe(EntityMoved::KIND, collision);

    let encounter = world.add_system(EncounterSystem::new(resolver), priority::ENCOUNTER);
    world.subscribe(EntitiesCollided::KIND, encounter);

    let combat = world.add_system(CombatSystem, priority::COMBAT);
    world.handle_command(Attack::KIND, combat);

    let inventory = world.add_system(InventorySystem, priority::INVENTORY);
    for kind in [PickUp::KIND, DropItem::KIND, Equip::KIND, UseItem::KIND] {
        world.handle_command(kind, inventory);
    }

    GameSystems {
        monster_ai,
        movement,
        collision,
        encounter,
        combat,
        inventory,
    }
}

/// A display name for an entity: its [`Name`], its [`Item`] name, or a
/// placeholder.
#[must_use]
pub fn describe(world: &World, id: EntityId) -> String {
    if let Some(name) = world.get_component::<Name>(id) {
        return name.0.clone();
    }
    if let Some(item) = world.get_component::<Item>(id) {
        return item.name.clone();
    }
    "something".to_string()
}

/// Bonuses from the item an entity has equipped, if any.
#[must_use]
pub fn equipment(world: &World, id: EntityId) -> Equippable {
    world
        .get_component::<Inventory>(id)
        .and_then(|inventory| inventory.equipped)
        .and_then(|item| world.get_component::<Equippable>(item))
        .copied()
        .unwrap_or_default()
}
