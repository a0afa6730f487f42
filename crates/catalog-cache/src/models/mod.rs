//! Data models for the catalog cache.
//!
//! Entities are plain owned values. The cache never hands out references to
//! its own copies; every read returns a fresh clone.

mod entity;
mod identifier;
mod layout;
mod stats;

pub use entity::*;
pub use identifier::*;
pub use layout::*;
pub use stats::*;
