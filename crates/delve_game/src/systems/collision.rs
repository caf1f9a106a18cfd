//! Detects entities sharing a cell after a move.

use anyhow::Result;
use delve_world::{Component, EventRecord, System, World};
use tracing::trace;

use crate::components::Position;
use crate::events::{EntitiesCollided, EntityMoved};

/// Subscribed to [`EntityMoved`]. Publishes one [`EntitiesCollided`] per
/// other entity found in the destination cell, in insertion order.
#[derive(Debug, Default)]
pub struct CollisionSystem;

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn on_event(&mut self, world: &mut World, event: &EventRecord) -> Result<()> {
        let Some(&EntityMoved { entity: mover, to, .. }) = event.downcast::<EntityMoved>() else {
            return Ok(());
        };
        if !world.contains_entity(mover) {
            return Ok(());
        }

        let kinds = [Position::component_type_id()];
        let occupants: Vec<_> = world
            .query_iter(&kinds)
            .filter(|entity| entity.id() != mover && entity.get::<Position>() == Some(&to))
            .map(|entity| entity.id())
            .collect();

        for occupant in occupants {
            trace!(%mover, %occupant, at = %to, "collision");
            world.publish(EntitiesCollided {
                mover,
                occupant,
                at: to,
            });
        }
        Ok(())
    }
}
