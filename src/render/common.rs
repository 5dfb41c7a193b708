use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::level::Level;
use crate::mesh::{self, LitVertex, Vertex};
use crate::shading::{CameraUniforms, ShadingUniforms};

/// Uniform block shared by every draw, laid out for WGSL (vec3s padded).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub perspective: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub v_light: [f32; 4],
    pub light_color: [f32; 4],
    pub dark_color: [f32; 4],
}

impl DrawUniforms {
    pub fn new(camera: &CameraUniforms, shading: &ShadingUniforms) -> Self {
        Self {
            perspective: camera.perspective.to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
            v_light: shading.v_light.extend(0.0).into(),
            light_color: shading.light_color.extend(1.0).into(),
            dark_color: shading.dark_color.extend(1.0).into(),
        }
    }
}

/// Triangle lists for one frame, in draw order.
#[derive(Debug, Clone, Default)]
pub struct SceneGeometry {
    pub floor: Vec<Vertex>,
    pub walls: Vec<Vertex>,
    pub markers: Vec<LitVertex>,
}

impl SceneGeometry {
    pub fn build(level: &Level, camera: &Camera) -> Self {
        Self {
            floor: mesh::floor_vertices(level),
            walls: mesh::wall_vertices(level),
            markers: mesh::marker_vertices(level, camera),
        }
    }

    pub fn triangle_count(&self) -> usize {
        (self.floor.len() + self.walls.len() + self.markers.len()) / 3
    }
}
