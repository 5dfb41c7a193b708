use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use serde::Deserialize;

use crate::shading::ShadingUniforms;
use crate::texture::TextureImage;

/// Render settings, read from TOML. Every key is optional.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub window: WindowConfig,
    pub light: LightConfig,
    pub camera: CameraConfig,
    pub textures: TextureConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            clear_color: [0.0, 0.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub direction: [f32; 3],
    pub light_color: [f32; 3],
    pub dark_color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [1.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0],
            dark_color: [0.75, 0.75, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Approximate number of visible tiles.
    pub ratio: f32,
    /// Tiles per second.
    pub pan_speed: f32,
    /// Zoom factor per second.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ratio: 5.0,
            pan_speed: 4.0,
            zoom_speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub floor: Option<PathBuf>,
    pub wall: Option<PathBuf>,
}

impl RenderConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid render configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn clear_color(&self) -> Vec4 {
        Vec4::from(self.window.clear_color)
    }

    pub fn shading(&self) -> ShadingUniforms {
        ShadingUniforms {
            v_light: Vec3::from(self.light.direction),
            light_color: Vec3::from(self.light.light_color),
            dark_color: Vec3::from(self.light.dark_color),
        }
    }

    /// Floor and wall textures; procedural ones stand in for unset paths.
    pub fn load_textures(&self) -> Result<(TextureImage, TextureImage)> {
        let floor = match &self.textures.floor {
            Some(path) => TextureImage::load(path)?,
            None => TextureImage::default_floor(),
        };
        let wall = match &self.textures.wall {
            Some(path) => TextureImage::load(path)?,
            None => TextureImage::default_wall(),
        };
        Ok((floor, wall))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = RenderConfig::from_toml("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.shading(), ShadingUniforms::default());
        assert_eq!(config.clear_color(), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RenderConfig::from_toml(
            r#"
            [window]
            width = 320

            [light]
            direction = [0.0, 0.0, 1.0]

            [textures]
            floor = "assets/floor.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 320);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.light.direction, [0.0, 0.0, 1.0]);
        assert_eq!(config.light.dark_color, [0.75, 0.75, 1.0]);
        assert_eq!(config.camera.ratio, 5.0);
        assert_eq!(config.textures.floor, Some(PathBuf::from("assets/floor.png")));
        assert_eq!(config.textures.wall, None);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(RenderConfig::from_toml("[window]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nratio = 8.0").unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.ratio, 8.0);
        assert!(RenderConfig::load("/missing/config.toml").is_err());
    }

    #[test]
    fn default_textures_without_paths() {
        let (floor, wall) = RenderConfig::default().load_textures().unwrap();
        assert_eq!(floor.width(), 64);
        assert_eq!(wall.height(), 64);
    }
}
