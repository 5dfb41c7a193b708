use std::f32::consts::FRAC_1_SQRT_2;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;

use crate::camera::Camera;
use crate::config::{CameraConfig, RenderConfig};
use crate::input::InputState;
use crate::level::Level;
use crate::render::{SceneGeometry, SoftwareRenderer};

/// Screen-right and screen-up expressed as floor directions.
const SCREEN_RIGHT: Vec2 = Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2);
const SCREEN_UP: Vec2 = Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);

/// One-line description printed after a level loads.
pub fn level_summary(level: &Level) -> String {
    format!(
        "Loaded level {}x{} ({} wall segments, {} markers)",
        level.width(),
        level.depth(),
        level.wall_count(),
        level.markers().len()
    )
}

/// Camera centred over the middle of `level`.
pub fn camera_for_level(level: &Level, aspect_ratio: f32, config: &RenderConfig) -> Camera {
    let mut camera = Camera::new(aspect_ratio);
    camera
        .set_pos(level.width() as f32 / 2.0, level.depth() as f32 / 2.0, 0.0)
        .set_ratio(config.camera.ratio);
    camera
}

/// Applies held keys to the camera for a frame lasting `dt` seconds.
/// Returns whether the camera moved.
pub fn advance_camera(
    camera: &mut Camera,
    input: &InputState,
    dt: f32,
    config: &CameraConfig,
) -> bool {
    let pan = input.pan_direction();
    let zoom = input.zoom_delta();
    if pan == Vec2::ZERO && zoom == 0.0 {
        return false;
    }

    // pan speed is in tiles per second at the default zoom
    let speed = config.pan_speed * dt * camera.ratio() / 5.0;
    let step = (SCREEN_RIGHT * pan.x + SCREEN_UP * pan.y) * speed;
    camera.pan(step.x, step.y);
    if zoom != 0.0 {
        let factor = config.zoom_speed.max(1.0).powf(zoom * dt);
        let ratio = camera.ratio() * factor;
        camera.set_ratio(ratio);
    }
    true
}

/// Renders `level` with the software renderer and writes a PNG to `path`.
pub fn render_headless(
    level: &Level,
    config: &RenderConfig,
    (width, height): (u32, u32),
    path: &Path,
) -> Result<()> {
    let (floor, wall) = config.load_textures()?;
    let renderer = SoftwareRenderer::new(width, height, config);
    let camera = camera_for_level(level, renderer.aspect_ratio(), config);
    let geometry = SceneGeometry::build(level, &camera);
    let frame = renderer.render(&geometry, &camera, &floor, &wall);

    info!("writing {width}x{height} render to {}", path.display());
    frame
        .to_image()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
