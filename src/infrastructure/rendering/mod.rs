pub mod canvas_renderer;

pub use canvas_renderer::{CanvasSurface, CanvasSurfaceFactory};
