//! Turns collisions into actions.
//!
//! What a collision *means* (fight, pick up, descend, nothing) is decided by
//! an [`EncounterResolver`] handed to the system at construction, so tests
//! and alternative rule sets can swap it without touching the system.

use anyhow::Result;
use delve_component::EntityId;
use delve_world::{EventRecord, System, World};
use tracing::debug;

use crate::commands::{Attack, PickUp};
use crate::components::{Health, Inventory, Item, Stairs, tags};
use crate::events::{EntitiesCollided, StairsReached};

/// The outcome of a collision between a mover and an occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// The mover attacks the occupant.
    Attack,
    /// The mover picks the occupant up.
    PickUp,
    /// The mover takes the occupant's stairs.
    Descend,
    Ignore,
}

/// Decides what a collision means.
pub trait EncounterResolver {
    fn resolve(&mut self, world: &World, mover: EntityId, occupant: EntityId) -> Encounter;
}

impl<F> EncounterResolver for F
where
    F: FnMut(&World, EntityId, EntityId) -> Encounter,
{
    fn resolve(&mut self, world: &World, mover: EntityId, occupant: EntityId) -> Encounter {
        self(world, mover, occupant)
    }
}

/// The default rules: the player and monsters fight each other, the player
/// picks up items it walks over and descends stairs it steps on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEncounters;

impl EncounterResolver for StandardEncounters {
    fn resolve(&mut self, world: &World, mover: EntityId, occupant: EntityId) -> Encounter {
        let mover_is_player = world.has_tag(mover, &tags::PLAYER);
        let hostile = (mover_is_player && world.has_tag(occupant, &tags::MONSTER))
            || (world.has_tag(mover, &tags::MONSTER) && world.has_tag(occupant, &tags::PLAYER));

        if hostile && world.has_component::<Health>(occupant) {
            Encounter::Attack
        } else if mover_is_player
            && world.has_component::<Item>(occupant)
            && world.has_component::<Inventory>(mover)
        {
            Encounter::PickUp
        } else if mover_is_player && world.has_component::<Stairs>(occupant) {
            Encounter::Descend
        } else {
            Encounter::Ignore
        }
    }
}

/// Subscribed to [`EntitiesCollided`].
pub struct EncounterSystem<R> {
    resolver: R,
}

impl<R: EncounterResolver> EncounterSystem<R> {
    #[must_use]
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

impl<R: EncounterResolver> System for EncounterSystem<R> {
    fn name(&self) -> &str {
        "encounter"
    }

    fn on_event(&mut self, world: &mut World, event: &EventRecord) -> Result<()> {
        let Some(&EntitiesCollided { mover, occupant, .. }) = event.downcast::<EntitiesCollided>()
        else {
            return Ok(());
        };
        if !world.contains_entity(mover) || !world.contains_entity(occupant) {
            return Ok(());
        }

        let encounter = self.resolver.resolve(world, mover, occupant);
        debug!(%mover, %occupant, ?encounter, "encounter resolved");
        match encounter {
            Encounter::Attack => world.queue_command(Attack {
                attacker: mover,
                defender: occupant,
            }),
            Encounter::PickUp => world.queue_command(PickUp {
                actor: mover,
                item: occupant,
            }),
            Encounter::Descend => {
                let depth = world
                    .get_component::<Stairs>(occupant)
                    .map_or(0, |stairs| stairs.depth);
                world.publish(StairsReached {
                    entity: mover,
                    depth,
                });
            }
            Encounter::Ignore => {}
        }
        Ok(())
    }
}
