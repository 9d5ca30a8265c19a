pub mod common;
pub mod native;
pub mod shared;

pub use common::{max_texture_dimension, projection_matrix, GlobalUniform, ObjectUniform};
pub use native::Renderer;
