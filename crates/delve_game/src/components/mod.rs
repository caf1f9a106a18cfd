//! Game components and tags.

mod actor;
mod item;
mod spatial;

pub use actor::{Combat, Health, Name, Render, Visibility};
pub use item::{Consumable, Equippable, Inventory, Item, Stairs};
pub use spatial::{Direction, Input, Movement, Position};

/// Entity classification tags.
pub mod tags {
    use delve_component::Tag;

    pub const PLAYER: Tag = Tag::from_static("player");
    pub const MONSTER: Tag = Tag::from_static("monster");
    pub const ITEM: Tag = Tag::from_static("item");
    pub const STAIRS: Tag = Tag::from_static("stairs");
}
