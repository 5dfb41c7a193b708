use glam::Vec4;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::raster::Framebuffer;
use crate::render::SceneGeometry;
use crate::shading::{self, CameraUniforms, Sampler, ShadingUniforms};
use crate::texture::TextureImage;

/// Headless renderer running the shading stages on the CPU.
///
/// Draws the same geometry in the same order as the GPU renderer: floor and
/// walls through the plain vertex stage, markers through the lit one.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    clear_color: Vec4,
    shading: ShadingUniforms,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32, config: &RenderConfig) -> Self {
        Self {
            width,
            height,
            clear_color: config.clear_color(),
            shading: config.shading(),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn render(
        &self,
        geometry: &SceneGeometry,
        camera: &Camera,
        floor: &TextureImage,
        wall: &TextureImage,
    ) -> Framebuffer {
        let uniforms = CameraUniforms::from_camera(camera);
        let mut target = Framebuffer::new(self.width, self.height, self.clear_color);

        let floor_fragments = self.draw_plain(&mut target, &geometry.floor, &uniforms, floor);
        let wall_fragments = self.draw_plain(&mut target, &geometry.walls, &uniforms, wall);
        let marker_fragments = self.draw_lit(&mut target, &geometry.markers, &uniforms, wall);
        log::debug!(
            "software frame: {floor_fragments} floor, {wall_fragments} wall, {marker_fragments} marker fragments"
        );
        target
    }

    fn draw_plain(
        &self,
        target: &mut Framebuffer,
        vertices: &[crate::mesh::Vertex],
        uniforms: &CameraUniforms,
        tex: &impl Sampler,
    ) -> usize {
        vertices
            .chunks_exact(3)
            .map(|triangle| {
                let [a, b, c] = [0, 1, 2].map(|i| shading::plain_vertex(&triangle[i], uniforms));
                target.draw_triangle(
                    [a.clip_position, b.clip_position, c.clip_position],
                    [&a.interpolants, &b.interpolants, &c.interpolants],
                    |input| shading::shade(input, &self.shading, tex),
                )
            })
            .sum()
    }

    fn draw_lit(
        &self,
        target: &mut Framebuffer,
        vertices: &[crate::mesh::LitVertex],
        uniforms: &CameraUniforms,
        tex: &impl Sampler,
    ) -> usize {
        vertices
            .chunks_exact(3)
            .map(|triangle| {
                let [a, b, c] = [0, 1, 2].map(|i| shading::lit_vertex(&triangle[i], uniforms));
                target.draw_triangle(
                    [a.clip_position, b.clip_position, c.clip_position],
                    [&a.interpolants, &b.interpolants, &c.interpolants],
                    |input| shading::shade(input, &self.shading, tex),
                )
            })
            .sum()
    }
}
