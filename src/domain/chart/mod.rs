//! Chart aggregate: theme, surface options and layout math.

pub mod layout;
pub mod value_objects;

pub use layout::*;
pub use value_objects::*;
