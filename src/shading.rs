//! The shading pipeline as plain functions.
//!
//! These mirror the WGSL entry points in [`crate::render::shaders`] one to
//! one: `plain_vertex` is `vs_plain`, `lit_vertex` is `vs_lit` and `shade`
//! is `fs_main`. The software renderer runs them directly.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::mesh::{LitVertex, Vertex};
use crate::raster::{barycentric, Varying};

/// Divisor turning a `final_z` attribute into normalized device depth.
pub const FINAL_Z_SCALE: f32 = 1000.0;

/// Per-draw camera matrices, composed as `perspective * view * position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniforms {
    pub perspective: Mat4,
    pub view: Mat4,
}

impl CameraUniforms {
    pub fn from_camera(camera: &crate::Camera) -> Self {
        Self {
            perspective: camera.perspective(),
            view: camera.view(),
        }
    }

    fn project(&self, position: [f32; 3]) -> Vec4 {
        self.perspective * self.view * Vec3::from(position).extend(1.0)
    }
}

/// Per-draw lighting parameters of the shading stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingUniforms {
    /// Light direction; need not be normalized.
    pub v_light: Vec3,
    pub light_color: Vec3,
    pub dark_color: Vec3,
}

impl Default for ShadingUniforms {
    fn default() -> Self {
        Self {
            v_light: Vec3::X,
            light_color: Vec3::ONE,
            dark_color: Vec3::new(0.75, 0.75, 1.0),
        }
    }
}

/// Values handed from a vertex stage to the shading stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolants {
    pub tex_coords: Vec2,
    pub normal: Vec3,
}

impl Varying for Interpolants {
    fn blend(values: [&Self; 3], weights: Vec3) -> Self {
        Self {
            tex_coords: barycentric(values.map(|v| v.tex_coords), weights),
            normal: barycentric(values.map(|v| v.normal), weights),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub interpolants: Interpolants,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitVertexOutput {
    pub clip_position: Vec4,
    pub interpolants: Interpolants,
    /// Forwarded untouched; the shading stage does not read it.
    pub lighted: f32,
}

/// Source of texture colour for the shading stage.
pub trait Sampler {
    fn sample(&self, tex_coords: Vec2) -> Vec4;
}

impl Sampler for Vec4 {
    fn sample(&self, _tex_coords: Vec2) -> Vec4 {
        *self
    }
}

/// Plain vertex stage.
pub fn plain_vertex(vertex: &Vertex, uniforms: &CameraUniforms) -> VertexOutput {
    VertexOutput {
        clip_position: uniforms.project(vertex.position),
        interpolants: Interpolants {
            tex_coords: Vec2::from(vertex.tex_coords),
            normal: Vec3::from(vertex.normal),
        },
    }
}

/// Lit vertex stage.
///
/// Same transform as [`plain_vertex`], then clip depth is replaced with
/// `final_z / 1000`. The replacement happens after the full transform.
pub fn lit_vertex(vertex: &LitVertex, uniforms: &CameraUniforms) -> LitVertexOutput {
    let mut clip_position = uniforms.project(vertex.position);
    clip_position.z = vertex.final_z / FINAL_Z_SCALE;
    LitVertexOutput {
        clip_position,
        interpolants: Interpolants {
            tex_coords: Vec2::from(vertex.tex_coords),
            normal: Vec3::from(vertex.normal),
        },
        lighted: vertex.lighted,
    }
}

/// Cosine between the surface normal and the light direction, unclamped.
pub fn brightness(normal: Vec3, v_light: Vec3) -> f32 {
    normal.normalize().dot(v_light.normalize())
}

/// `mix(dark, light, t)`. Extrapolates when `t` is outside `0..=1`.
pub fn ramp(dark_color: Vec3, light_color: Vec3, t: f32) -> Vec3 {
    dark_color + (light_color - dark_color) * t
}

/// Shading stage: two-tone ramp by brightness, modulated by the texture.
pub fn shade(input: &Interpolants, uniforms: &ShadingUniforms, tex: &impl Sampler) -> Vec4 {
    let brightness = brightness(input.normal, uniforms.v_light);
    let ratio = ramp(uniforms.dark_color, uniforms.light_color, brightness).extend(1.0);
    ratio * tex.sample(input.tex_coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniforms() -> CameraUniforms {
        CameraUniforms {
            perspective: Mat4::perspective_rh(0.9, 1.5, 0.1, 50.0),
            view: Mat4::look_at_rh(Vec3::new(3.0, -4.0, 5.0), Vec3::ZERO, Vec3::Z),
        }
    }

    fn lit(position: [f32; 3], final_z: f32) -> LitVertex {
        LitVertex {
            position,
            tex_coords: [0.25, 0.75],
            normal: [0.0, 2.0, 0.0],
            lighted: 1.0,
            final_z,
        }
    }

    #[test]
    fn plain_stage_is_perspective_times_view() {
        let u = uniforms();
        let vertex = Vertex {
            position: [1.0, 2.0, -0.5],
            tex_coords: [0.1, 0.2],
            normal: [0.0, 0.0, 3.0],
        };
        let out = plain_vertex(&vertex, &u);
        let expected = u.perspective * u.view * Vec4::new(1.0, 2.0, -0.5, 1.0);
        assert_eq!(out.clip_position, expected);
        assert_eq!(out.interpolants.tex_coords, Vec2::new(0.1, 0.2));
        // normals are forwarded unnormalized
        assert_eq!(out.interpolants.normal, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn lit_stage_replaces_only_depth() {
        let u = uniforms();
        let vertex = lit([1.0, 2.0, -0.5], 250.0);
        let out = lit_vertex(&vertex, &u);
        let expected = u.perspective * u.view * Vec4::new(1.0, 2.0, -0.5, 1.0);
        assert_eq!(out.clip_position.x, expected.x);
        assert_eq!(out.clip_position.y, expected.y);
        assert_eq!(out.clip_position.w, expected.w);
        assert_eq!(out.clip_position.z, 0.25);
        assert_eq!(out.lighted, 1.0);
        assert_eq!(out.interpolants.normal, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn final_z_500_is_half_depth_for_any_transform() {
        let cameras = [
            uniforms(),
            CameraUniforms {
                perspective: Mat4::IDENTITY,
                view: Mat4::IDENTITY,
            },
            CameraUniforms::from_camera(&crate::Camera::new(2.0)),
        ];
        for u in cameras {
            for position in [[0.0, 0.0, 0.0], [10.0, -3.0, 7.0], [-1.0, 5.0, 2.0]] {
                let out = lit_vertex(&lit(position, 500.0), &u);
                assert_eq!(out.clip_position.z, 0.5);
            }
        }
    }

    #[test]
    fn vertex_stages_are_deterministic() {
        let u = uniforms();
        let vertex = lit([0.3, -2.0, 1.7], 812.5);
        assert_eq!(lit_vertex(&vertex, &u), lit_vertex(&vertex, &u));
        let plain = Vertex {
            position: vertex.position,
            tex_coords: vertex.tex_coords,
            normal: vertex.normal,
        };
        let a = plain_vertex(&plain, &u);
        let b = plain_vertex(&plain, &u);
        assert_eq!(
            a.clip_position.to_array().map(f32::to_bits),
            b.clip_position.to_array().map(f32::to_bits)
        );
    }

    fn shading(v_light: Vec3) -> ShadingUniforms {
        ShadingUniforms {
            v_light,
            light_color: Vec3::new(0.9, 0.8, 0.7),
            dark_color: Vec3::new(0.2, 0.3, 0.6),
        }
    }

    #[test]
    fn facing_light_gives_light_colour() {
        let input = Interpolants {
            tex_coords: Vec2::ZERO,
            normal: Vec3::Z,
        };
        let texel = Vec4::new(0.5, 1.0, 0.25, 1.0);
        let color = shade(&input, &shading(Vec3::new(0.0, 0.0, 1.0)), &texel);
        assert_relative_eq!(color.x, 0.9 * 0.5);
        assert_relative_eq!(color.y, 0.8);
        assert_relative_eq!(color.z, 0.7 * 0.25);
        assert_relative_eq!(color.w, 1.0);
    }

    #[test]
    fn facing_away_extrapolates_past_dark_colour() {
        let input = Interpolants {
            tex_coords: Vec2::ZERO,
            normal: Vec3::new(0.0, 0.0, 4.0),
        };
        let texel = Vec4::ONE;
        let color = shade(&input, &shading(Vec3::new(0.0, 0.0, -2.0)), &texel);
        // 2 * dark - light, not clamped
        assert_relative_eq!(color.x, -0.5, epsilon = 1e-6);
        assert_relative_eq!(color.y, -0.2, epsilon = 1e-6);
        assert_relative_eq!(color.z, 0.5, epsilon = 1e-6);
        assert_relative_eq!(color.w, 1.0);
    }

    #[test]
    fn texture_alpha_passes_through() {
        let input = Interpolants {
            tex_coords: Vec2::new(0.5, 0.5),
            normal: Vec3::Y,
        };
        let texel = Vec4::new(1.0, 1.0, 1.0, 0.3);
        let color = shade(&input, &ShadingUniforms::default(), &texel);
        assert_relative_eq!(color.w, 0.3);
    }

    #[test]
    fn perpendicular_light_gives_dark_colour() {
        let input = Interpolants {
            tex_coords: Vec2::ZERO,
            normal: Vec3::Z,
        };
        let uniforms = ShadingUniforms::default();
        let color = shade(&input, &uniforms, &Vec4::ONE);
        assert_relative_eq!(color.truncate(), uniforms.dark_color);
    }

    #[test]
    fn interpolants_blend_by_weight() {
        let a = Interpolants {
            tex_coords: Vec2::new(0.0, 0.0),
            normal: Vec3::X,
        };
        let b = Interpolants {
            tex_coords: Vec2::new(1.0, 0.0),
            normal: Vec3::Y,
        };
        let c = Interpolants {
            tex_coords: Vec2::new(0.0, 1.0),
            normal: Vec3::Z,
        };
        let mid = Interpolants::blend([&a, &b, &c], Vec3::new(0.5, 0.25, 0.25));
        assert_relative_eq!(mid.tex_coords, Vec2::new(0.25, 0.25));
        assert_relative_eq!(mid.normal, Vec3::new(0.5, 0.25, 0.25));
    }
}
