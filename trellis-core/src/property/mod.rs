//! Typed, linkable component properties.

mod cell;
mod group;
mod schema;
mod value;

pub use group::PropertyGroup;
pub(crate) use cell::Owner;
pub use cell::{Direction, LinkInfo, Property};
pub use schema::PropertySchema;
pub use value::{Value, ValueType, Vector};
