//! Minimal triangle rasterizer used by the headless renderer.
//!
//! Clip-space triangles are divided by w, mapped to the viewport (y down)
//! and scanned over their bounding box with edge functions. Varyings are
//! interpolated perspective-correctly, depth linearly in screen space.

use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

/// Values interpolated across a triangle.
pub trait Varying: Sized {
    /// Weighted sum of the three corner values. Weights add up to 1;
    /// [`barycentric`] does the arithmetic for vector fields.
    fn blend(values: [&Self; 3], weights: Vec3) -> Self;
}

/// `a + (b - a) * w.y + (c - a) * w.z`.
///
/// Equal corners come back bit-exact, whatever rounding the weights carry.
pub fn barycentric<T>([a, b, c]: [T; 3], weights: Vec3) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    a + (b - a) * weights.y + (c - a) * weights.z
}

/// Colour and depth targets.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Creates a framebuffer cleared to `clear` with depth 1.0.
    pub fn new(width: u32, height: u32, clear: Vec4) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![clear; len],
            depth: vec![1.0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_at(&self, x: u32, y: u32) -> Vec4 {
        self.color[self.index(x, y)]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn to_screen(&self, clip: Vec4) -> Vec3 {
        let ndc = clip.truncate() / clip.w;
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z,
        )
    }

    /// Rasterizes one triangle.
    ///
    /// The triangle is dropped if any corner lies behind the eye (w <= 0)
    /// or if it covers no area. Fragments with depth outside `0..=1` are
    /// clipped; the rest pass a `Less` depth test and overwrite the colour.
    /// Returns the number of fragments written.
    pub fn draw_triangle<V, F>(&mut self, clip: [Vec4; 3], varyings: [&V; 3], shade: F) -> usize
    where
        V: Varying,
        F: Fn(&V) -> Vec4,
    {
        if self.width == 0 || self.height == 0 || clip.iter().any(|c| c.w <= 0.0) {
            return 0;
        }
        let screen = clip.map(|c| self.to_screen(c));
        let [p0, p1, p2] = screen.map(|s| Vec2::new(s.x, s.y));
        let area = edge(p0, p1, p2);
        if area == 0.0 || !area.is_finite() {
            return 0;
        }

        let min = p0.min(p1).min(p2).floor().max(Vec2::ZERO);
        let max = p0
            .max(p1)
            .max(p2)
            .ceil()
            .min(Vec2::new(self.width as f32, self.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return 0;
        }
        let inv_w = Vec3::new(1.0 / clip[0].w, 1.0 / clip[1].w, 1.0 / clip[2].w);

        let mut written = 0;
        for py in min.y as u32..max.y as u32 {
            for px in min.x as u32..max.x as u32 {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let bary = Vec3::new(edge(p1, p2, p), edge(p2, p0, p), edge(p0, p1, p)) / area;
                if bary.min_element() < 0.0 {
                    continue;
                }
                let depth = barycentric([screen[0].z, screen[1].z, screen[2].z], bary);
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let index = self.index(px, py);
                if depth >= self.depth[index] {
                    continue;
                }
                let corrected = bary * inv_w;
                let sum = corrected.element_sum();
                let (wy, wz) = (corrected.y / sum, corrected.z / sum);
                let weights = Vec3::new(1.0 - wy - wz, wy, wz);
                let value = V::blend(varyings, weights);
                self.depth[index] = depth;
                self.color[index] = shade(&value);
                written += 1;
            }
        }
        written
    }

    /// Quantizes the colour target to RGBA8, clamping every channel.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color_at(x, y).clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            Rgba([
                c.x.round() as u8,
                c.y.round() as u8,
                c.z.round() as u8,
                c.w.round() as u8,
            ])
        })
    }
}

/// Twice the signed area of the triangle `a b c`.
fn edge(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy)]
    struct Shade(f32);

    impl Varying for Shade {
        fn blend(values: [&Self; 3], weights: Vec3) -> Self {
            Shade(barycentric(values.map(|v| v.0), weights))
        }
    }

    const FULL_SCREEN: [Vec4; 3] = [
        Vec4::new(-1.0, -1.0, 0.5, 1.0),
        Vec4::new(3.0, -1.0, 0.5, 1.0),
        Vec4::new(-1.0, 3.0, 0.5, 1.0),
    ];

    #[test]
    fn covers_the_viewport() {
        let mut fb = Framebuffer::new(4, 3, Vec4::ZERO);
        let v = Shade(1.0);
        let written = fb.draw_triangle(FULL_SCREEN, [&v, &v, &v], |s| Vec4::splat(s.0));
        assert_eq!(written, 12);
        assert_relative_eq!(fb.color_at(3, 2), Vec4::ONE);
        assert_relative_eq!(fb.depth_at(0, 0), 0.5);
    }

    #[test]
    fn winding_does_not_matter() {
        let mut fb = Framebuffer::new(4, 4, Vec4::ZERO);
        let v = Shade(1.0);
        let [a, b, c] = FULL_SCREEN;
        assert_eq!(fb.draw_triangle([a, c, b], [&v, &v, &v], |_| Vec4::ONE), 16);
    }

    #[test]
    fn nearer_fragments_win() {
        let mut fb = Framebuffer::new(2, 2, Vec4::ZERO);
        let v = Shade(0.0);
        let far = FULL_SCREEN.map(|c| Vec4::new(c.x, c.y, 0.8, 1.0));
        fb.draw_triangle(FULL_SCREEN, [&v, &v, &v], |_| Vec4::X);
        assert_eq!(fb.draw_triangle(far, [&v, &v, &v], |_| Vec4::Y), 0);
        assert_eq!(fb.color_at(1, 1), Vec4::X);
    }

    #[test]
    fn out_of_range_depth_is_clipped() {
        let mut fb = Framebuffer::new(2, 2, Vec4::ZERO);
        let v = Shade(0.0);
        let behind = FULL_SCREEN.map(|c| Vec4::new(c.x, c.y, -0.2, 1.0));
        assert_eq!(fb.draw_triangle(behind, [&v, &v, &v], |_| Vec4::ONE), 0);
        let degenerate = [FULL_SCREEN[0], FULL_SCREEN[0], FULL_SCREEN[1]];
        assert_eq!(fb.draw_triangle(degenerate, [&v, &v, &v], |_| Vec4::ONE), 0);
    }

    #[test]
    fn varyings_interpolate_across_the_triangle() {
        let mut fb = Framebuffer::new(8, 1, Vec4::ZERO);
        let left = Shade(0.0);
        let right = Shade(1.0);
        let clip = [
            Vec4::new(-1.0, -3.0, 0.5, 1.0),
            Vec4::new(3.0, 1.0, 0.5, 1.0),
            Vec4::new(-1.0, 5.0, 0.5, 1.0),
        ];
        fb.draw_triangle(clip, [&left, &right, &left], |s| Vec4::splat(s.0));
        let first = fb.color_at(0, 0).x;
        let last = fb.color_at(7, 0).x;
        assert!(first < last);
        assert_relative_eq!(first, 1.0 / 32.0, epsilon = 1e-5);
        assert_relative_eq!(last, 15.0 / 32.0, epsilon = 1e-5);
    }

    #[test]
    fn constant_varyings_interpolate_exactly() {
        let mut fb = Framebuffer::new(7, 5, Vec4::ZERO);
        let clip = [
            Vec4::new(-0.9, -0.8, 0.2, 1.3),
            Vec4::new(2.1, -0.7, 0.6, 0.7),
            Vec4::new(-0.6, 1.9, 0.4, 1.9),
        ];
        let v = Shade(1.0);
        let written = fb.draw_triangle(clip, [&v, &v, &v], |s| Vec4::splat(s.0));
        assert!(written > 0);
        for y in 0..5 {
            for x in 0..7 {
                let c = fb.color_at(x, y);
                assert!(c == Vec4::ZERO || c == Vec4::ONE, "({x}, {y}) = {c}");
            }
        }
    }

    #[test]
    fn barycentric_keeps_equal_corners() {
        let n = Vec3::new(0.1, 0.2, 0.7);
        assert_eq!(barycentric([n, n, n], Vec3::new(0.3, 0.3, 0.4)), n);
        assert_relative_eq!(
            barycentric([0.0_f32, 1.0, 2.0], Vec3::new(0.5, 0.25, 0.25)),
            0.75
        );
    }

    #[test]
    fn image_is_clamped() {
        let fb = Framebuffer::new(1, 1, Vec4::new(-0.5, 0.5, 2.0, 1.0));
        let image = fb.to_image();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 128, 255, 255]));
    }
}
