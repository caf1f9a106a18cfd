//! # delve_world
//!
//! The runtime core of the delve engine. A [`World`] owns:
//!
//! - an [`EntityTable`] of live entities, in insertion order;
//! - a [`Scheduler`] running [`System`]s in ascending priority;
//! - an [`EventBus`] of deferred, broadcast notifications;
//! - a [`CommandQueue`] of deferred, FIFO side-effect requests;
//! - an opaque current-level slot and a quit flag.
//!
//! Nothing a system publishes or queues is observed by another system until
//! the scheduler pass ends. See [`World::update`] for the step lifecycle.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
mod payload;
pub mod quit;
pub mod scheduler;
pub mod system;
pub mod table;
pub mod world;

pub use command::{Command, CommandKind, CommandQueue, CommandRecord, RemoveEntity, SpawnEntity};
pub use config::WorldConfig;
pub use error::{Phase, WorldError};
pub use event::{Event, EventBus, EventKind, EventRecord};
pub use quit::QuitHandle;
pub use scheduler::Scheduler;
pub use system::{FnSystem, System, SystemId};
pub use table::EntityTable;
pub use world::{StepReport, World};

pub use delve_component::{
    Component, ComponentTypeId, Entity, EntityId, QueryDescriptor, QueryFilter, Tag,
};
