//! A skybox, a car circling the origin and a spinning reference cube,
//! viewed through a free-fly or orbit camera.
//!
//! Camera math, the car's transform hierarchy and the per-frame draw list
//! live in plain modules so they can be driven without a window; only
//! [`render`] touches the GPU.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod input;
pub mod mesh;
pub mod render;
pub mod scene;

pub use app::Simulation;
pub use assets::{AssetError, TextureImage, TextureSet};
pub use camera::{Camera, CameraControls, CameraMode};
pub use config::Settings;
pub use input::{InputState, KeyCode, NamedKey};
pub use mesh::{CubeFace, Vertex, CUBE_VERTICES};
pub use render::{max_texture_dimension, projection_matrix, Renderer};
pub use scene::{DrawCommand, Pipeline, Scene, TextureSlot};
