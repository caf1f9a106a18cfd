//! # delve_component
//!
//! The "E" and "C" of the delve runtime: entity identity, type-keyed
//! component storage and the filters systems use to select entities.
//!
//! This crate provides:
//!
//! - [`Component`] trait: the contract all entity data must satisfy.
//! - [`EntityId`]: lightweight `u64` identifiers, never reused.
//! - [`EntityAllocator`]: monotonically increasing ID allocator.
//! - [`Entity`]: an identifier plus its owned [`ComponentStore`] and [`TagSet`].
//! - [`QueryDescriptor`]: declarative entity filters for systems and queries.

pub mod component;
pub mod entity;
pub mod query;
pub mod store;
pub mod tag;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator, EntityId};
pub use query::{QueryDescriptor, QueryFilter};
pub use store::ComponentStore;
pub use tag::{Tag, TagSet};
