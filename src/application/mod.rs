pub mod binding;
pub mod feed;
pub mod surface;

pub use binding::*;
pub use feed::*;
pub use surface::*;
