//! Triangle lists for the floor, walls and markers of a level.
//!
//! Every builder returns a flat triangle list (three vertices per triangle,
//! no index buffer) ready to be uploaded as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::Camera;
use crate::level::Level;

/// Vertex consumed by the plain vertex stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

/// Vertex consumed by the lit vertex stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub lighted: f32,
    pub final_z: f32,
}

const FLOOR_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const HORIZONTAL_WALL_NORMAL: [f32; 3] = [0.0, -1.0, 0.0];
const VERTICAL_WALL_NORMAL: [f32; 3] = [-1.0, 0.0, 0.0];
const MARKER_NORMAL: [f32; 3] = [-1.0, -1.0, 0.0];

/// Emits the quad `a b c d` as the triangles `a b c` and `b d c`.
fn push_quad<V: Copy>(vertices: &mut Vec<V>, [a, b, c, d]: [V; 4]) {
    vertices.extend_from_slice(&[a, b, c, b, d, c]);
}

fn step(coord: usize, delta: isize, len: usize) -> Option<usize> {
    coord.checked_add_signed(delta).filter(|c| *c < len)
}

/// Height of the corner of tile `(x, y)` in direction `(dx, dy)`.
///
/// Averages the tile with every tile sharing the corner that can be reached
/// without crossing a wall. Diagonal tiles count when reachable through
/// either orthogonal neighbour.
fn corner_height(level: &Level, x: usize, y: usize, dx: isize, dy: isize) -> f32 {
    let mut sum = level.z(x, y);
    let mut count = 1.0;
    let nx = step(x, dx, level.width());
    let ny = step(y, dy, level.depth());

    let side = nx.filter(|nx| level.is_move_possible((x, y), (*nx, y)));
    let front = ny.filter(|ny| level.is_move_possible((x, y), (x, *ny)));
    if let Some(nx) = side {
        sum += level.z(nx, y);
        count += 1.0;
    }
    if let Some(ny) = front {
        sum += level.z(x, ny);
        count += 1.0;
    }
    if let (Some(nx), Some(ny)) = (nx, ny) {
        let via_side = side.is_some() && level.is_move_possible((nx, y), (nx, ny));
        let via_front = front.is_some() && level.is_move_possible((x, ny), (nx, ny));
        if via_side || via_front {
            sum += level.z(nx, ny);
            count += 1.0;
        }
    }
    sum / count
}

/// Floor tiles with heights smoothed across connected neighbours.
pub fn floor_vertices(level: &Level) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(level.width() * level.depth() * 6);
    let u_scale = level.width() as f32 + 1.0;
    let v_scale = level.depth() as f32 + 1.0;
    let vertex = |px: usize, py: usize, z: f32| {
        let (px, py) = (px as f32, py as f32);
        Vertex {
            position: [px, py, z],
            tex_coords: [px / u_scale, py / v_scale],
            normal: FLOOR_NORMAL,
        }
    };

    for x in 0..level.width() {
        for y in 0..level.depth() {
            let a = vertex(x, y, corner_height(level, x, y, -1, -1));
            let b = vertex(x + 1, y, corner_height(level, x, y, 1, -1));
            let c = vertex(x, y + 1, corner_height(level, x, y, -1, 1));
            let d = vertex(x + 1, y + 1, corner_height(level, x, y, 1, 1));
            push_quad(&mut vertices, [a, b, c, d]);
        }
    }
    vertices
}

fn horizontal_wall(vertices: &mut Vec<Vertex>, x: usize, y: usize, z: f32, other_z: f32) {
    let (x, y) = (x as f32, y as f32);
    let corner = |position: [f32; 3], tex_coords: [f32; 2]| Vertex {
        position,
        tex_coords,
        normal: HORIZONTAL_WALL_NORMAL,
    };
    push_quad(
        vertices,
        [
            corner([x, y, z], [0.0, 0.0]),
            corner([x + 1.0, y, z], [1.0, 0.0]),
            corner([x, y, other_z], [0.0, 1.0]),
            corner([x + 1.0, y, other_z], [1.0, 1.0]),
        ],
    );
}

fn vertical_wall(vertices: &mut Vec<Vertex>, x: usize, y: usize, z: f32, other_z: f32) {
    let (x, y) = (x as f32, y as f32);
    let corner = |position: [f32; 3], tex_coords: [f32; 2]| Vertex {
        position,
        tex_coords,
        normal: VERTICAL_WALL_NORMAL,
    };
    push_quad(
        vertices,
        [
            corner([x, y, z], [0.0, 0.0]),
            corner([x, y + 1.0, z], [1.0, 0.0]),
            corner([x, y, other_z], [0.0, 1.0]),
            corner([x, y + 1.0, other_z], [1.0, 1.0]),
        ],
    );
}

/// One upright quad per wall side.
///
/// A wall spans from the tile's height to its neighbour's. Walls on the
/// level border rise one unit above the tile.
pub fn wall_vertices(level: &Level) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(level.wall_count() * 6);
    let (width, depth) = (level.width(), level.depth());
    for x in 0..width {
        for y in 0..depth {
            let wall = *level.wall(x, y);
            let z = level.z(x, y);
            if wall.bottom {
                let other = if y == 0 { z + 1.0 } else { level.z(x, y - 1) };
                horizontal_wall(&mut vertices, x, y, z, other);
            }
            if wall.left {
                let other = if x == 0 { z + 1.0 } else { level.z(x - 1, y) };
                vertical_wall(&mut vertices, x, y, z, other);
            }
            if wall.top {
                let other = if y == depth - 1 { z + 1.0 } else { level.z(x, y + 1) };
                horizontal_wall(&mut vertices, x, y + 1, z, other);
            }
            if wall.right {
                let other = if x == width - 1 { z + 1.0 } else { level.z(x + 1, y) };
                vertical_wall(&mut vertices, x + 1, y, z, other);
            }
        }
    }
    vertices
}

/// One upright quad per marker, facing the camera diagonal.
///
/// Every vertex of a marker carries the depth of the marker's anchor (the
/// centre of its tile), so the whole quad sorts as a single sprite.
pub fn marker_vertices(level: &Level, camera: &Camera) -> Vec<LitVertex> {
    let mut vertices = Vec::with_capacity(level.markers().len() * 6);
    for marker in level.markers() {
        let cx = marker.x as f32 + 0.5;
        let cy = marker.y as f32 + 0.5;
        let z = level.z(marker.x, marker.y);
        let final_z = camera.final_z(Vec3::new(cx, cy, z));
        let lighted = if marker.lighted { 1.0 } else { 0.0 };
        let corner = |position: [f32; 3], tex_coords: [f32; 2]| LitVertex {
            position,
            tex_coords,
            normal: MARKER_NORMAL,
            lighted,
            final_z,
        };
        push_quad(
            &mut vertices,
            [
                corner([cx - 0.5, cy + 0.5, z], [0.0, 0.0]),
                corner([cx + 0.5, cy - 0.5, z], [1.0, 0.0]),
                corner([cx - 0.5, cy + 0.5, z + 1.0], [0.0, 1.0]),
                corner([cx + 0.5, cy - 0.5, z + 1.0], [1.0, 1.0]),
            ],
        );
    }
    vertices
}
