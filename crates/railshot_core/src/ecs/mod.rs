//! Entity Component System core types.
//!
//! A sparse-set store: every component type owns one packed array plus a
//! sparse index keyed by entity slot. Entities carry no type of their own;
//! adding or removing a component never moves any other component's data,
//! which keeps activate/deactivate of pooled entities allocation-free.

mod component;
mod entity;
mod macros;
mod query;
mod storage;
mod world;

pub use component::{Component, ComponentId};
pub use entity::Entity;
pub use query::{ComponentSet, QueryIter};
pub use storage::SparseSet;
pub use world::{World, WorldError};
