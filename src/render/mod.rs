mod common;
pub mod native;
pub mod shaders;
pub mod software;

pub use common::{DrawUniforms, SceneGeometry};
pub use native::Renderer;
pub use software::SoftwareRenderer;
