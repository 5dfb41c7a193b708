//! Isometric tile-level viewer.
//!
//! Levels are grids of floor heights with optional walls and sprite markers.
//! The crate turns them into triangle meshes and draws them with a fixed
//! isometric camera, either on the GPU through wgpu or on the CPU with the
//! software rasterizer, which runs the same shading stages in Rust.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod level;
pub mod mesh;
pub mod raster;
pub mod render;
pub mod shading;
pub mod texture;
pub mod wall;

pub use camera::Camera;
pub use config::RenderConfig;
pub use error::LevelError;
pub use input::{InputState, KeyCode};
pub use level::{Level, Marker};
pub use mesh::{LitVertex, Vertex};
pub use render::{Renderer, SceneGeometry, SoftwareRenderer};
pub use shading::{CameraUniforms, ShadingUniforms};
pub use texture::TextureImage;
pub use wall::Wall;
