//! Software Renderer
//!
//! CPU implementation of the render backend. The vertex stage displaces the
//! sphere and projects it; triangles are filled with perspective-correct
//! barycentrics and every visible fragment goes through the shade program.
//! Particles are drawn as depth-tested wireframe octahedra.

use crate::display::PixelBuffer;
use crate::displacement::displace_mesh;
use crate::math3d::{Camera, Mesh, Vec3};
use crate::particles::InstanceTransform;
use crate::scene::{RenderBackend, SphereState, Uniforms};

/// Circumradius of the particle glyph
pub const GLYPH_RADIUS: f32 = 0.2;

/// Wireframe color of the particle glyph (#444444)
pub const GLYPH_COLOR: (u8, u8, u8) = (0x44, 0x44, 0x44);

/// Screen-space vertex: pixel position plus view depth
type ScreenVertex = (f32, f32, f32);

pub struct SoftwareRenderer {
    buffer: PixelBuffer,
    camera: Camera,
    glyph: Mesh,
    glyph_edges: Vec<(usize, usize)>,
    instances: Vec<InstanceTransform>,
    // Per-vertex scratch, reused across frames
    displaced: Vec<Vec3>,
    view_positions: Vec<Vec3>,
    view_normals: Vec<Vec3>,
    screen: Vec<Option<ScreenVertex>>,
    frames_drawn: u64,
    instance_uploads: u64,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32, camera: Camera) -> Self {
        let glyph = Mesh::octahedron(GLYPH_RADIUS);
        let glyph_edges = glyph.edges();
        Self {
            buffer: PixelBuffer::with_depth(width, height),
            camera,
            glyph,
            glyph_edges,
            instances: Vec::new(),
            displaced: Vec::new(),
            view_positions: Vec::new(),
            view_normals: Vec::new(),
            screen: Vec::new(),
            frames_drawn: 0,
            instance_uploads: 0,
        }
    }

    /// The most recently drawn frame
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    #[inline]
    pub fn instance_uploads(&self) -> u64 {
        self.instance_uploads
    }

    #[inline]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Vertex stage: displace, apply the model transform and project
    fn transform_sphere(&mut self, sphere: &SphereState, uniforms: &Uniforms) {
        displace_mesh(&sphere.base, uniforms.time, &mut self.displaced);

        let (w, h) = (self.buffer.width(), self.buffer.height());
        let camera = self.camera;
        let (yaw, roll) = (sphere.yaw, sphere.roll);

        self.view_positions.clear();
        self.view_normals.clear();
        self.screen.clear();
        for (p, n) in self.displaced.iter().zip(&sphere.base.normals) {
            let world = (*p * sphere.scale).rotate_xyz(0.0, yaw, roll);
            let view = camera.to_view(world);
            // Shading uses the base normal; the camera does not rotate
            self.view_normals.push(n.rotate_xyz(0.0, yaw, roll));
            self.view_positions.push(view);
            self.screen.push(camera.project(view, w, h));
        }
    }

    /// Fill one triangle of the sphere
    fn fill_face(&mut self, face: [usize; 3], sphere: &SphereState) {
        let (Some(s0), Some(s1), Some(s2)) = (
            self.screen[face[0]],
            self.screen[face[1]],
            self.screen[face[2]],
        ) else {
            return;
        };

        let area = edge(s0, s1, s2);
        if area.abs() < 1e-6 {
            return;
        }
        let inv_area = 1.0 / area;

        let (w, h) = (self.buffer.width() as i32, self.buffer.height() as i32);
        let min_x = s0.0.min(s1.0).min(s2.0).floor().max(0.0) as i32;
        let max_x = (s0.0.max(s1.0).max(s2.0).ceil() as i32).min(w - 1);
        let min_y = s0.1.min(s1.1).min(s2.1).floor().max(0.0) as i32;
        let max_y = (s0.1.max(s1.1).max(s2.1).ceil() as i32).min(h - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let inv_z = [1.0 / s0.2, 1.0 / s1.2, 1.0 / s2.2];
        let pos = face.map(|i| self.view_positions[i]);
        let nrm = face.map(|i| self.view_normals[i]);

        for y in min_y..=max_y {
            // Fragment coordinates count rows from the bottom
            let frag_y = h - 1 - y;
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let b0 = edge(s1, s2, p) * inv_area;
                let b1 = edge(s2, s0, p) * inv_area;
                let b2 = edge(s0, s1, p) * inv_area;
                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }

                let pw = [b0 * inv_z[0], b1 * inv_z[1], b2 * inv_z[2]];
                let depth = 1.0 / (pw[0] + pw[1] + pw[2]);
                if !self.buffer.depth_passes(x, y, depth) {
                    continue;
                }
                let k = [pw[0] * depth, pw[1] * depth, pw[2] * depth];

                let view_pos = pos[0] * k[0] + pos[1] * k[1] + pos[2] * k[2];
                let normal = (nrm[0] * k[0] + nrm[1] * k[1] + nrm[2] * k[2]).normalize();

                let (r, g, b) = sphere.program.shade(normal, view_pos, x, frag_y).to_rgb8();
                self.buffer.set_pixel_z(x, y, depth, r, g, b);
            }
        }
    }

    /// Wireframe glyph for every uploaded instance
    fn draw_particles(&mut self) {
        let (w, h) = (self.buffer.width(), self.buffer.height());
        let (r, g, b) = GLYPH_COLOR;
        for instance in &self.instances {
            for &(a, c) in &self.glyph_edges {
                let pa = self.camera.to_view(instance.apply(self.glyph.vertices[a]));
                let pc = self.camera.to_view(instance.apply(self.glyph.vertices[c]));
                if let (Some(sa), Some(sc)) =
                    (self.camera.project(pa, w, h), self.camera.project(pc, w, h))
                {
                    self.buffer.line_z(sa, sc, r, g, b);
                }
            }
        }
    }
}

impl RenderBackend for SoftwareRenderer {
    fn upload_instances(&mut self, transforms: &[InstanceTransform]) {
        self.instances.clear();
        self.instances.extend_from_slice(transforms);
        self.instance_uploads += 1;
    }

    fn draw_frame(&mut self, sphere: &SphereState, uniforms: &Uniforms) {
        let (r, g, b) = sphere.program.background().to_rgb8();
        self.buffer.clear_all(r, g, b);

        self.transform_sphere(sphere, uniforms);
        for &face in &sphere.base.faces {
            self.fill_face(face, sphere);
        }
        self.draw_particles();

        self.frames_drawn += 1;
    }

    fn release(&mut self) {
        self.instances = Vec::new();
        self.displaced = Vec::new();
        self.view_positions = Vec::new();
        self.view_normals = Vec::new();
        self.screen = Vec::new();
        log::debug!("Renderer: released after {} frames", self.frames_drawn);
    }
}

/// Signed doubled area of (a, b, p); the sign gives the side of `ab` that `p` is on
#[inline]
fn edge(a: ScreenVertex, b: ScreenVertex, p: ScreenVertex) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dither::DitherLevel;
    use crate::math3d::Vec2;
    use crate::scene::SceneDriver;

    const W: u32 = 160;
    const H: u32 = 120;

    fn driver() -> SceneDriver {
        let mut config = Config::default();
        config.sphere.subdivisions = 2;
        let mut driver = SceneDriver::new(&config);
        driver.init().unwrap();
        driver
    }

    fn palette_rgb(driver: &SceneDriver) -> Vec<(u8, u8, u8)> {
        let palette = driver.sphere().unwrap().program.palette();
        [DitherLevel::Dark, DitherLevel::Mid, DitherLevel::Bright]
            .iter()
            .map(|&level| palette.color(level).to_rgb8())
            .collect()
    }

    #[test]
    fn test_sphere_covers_center() {
        let mut driver = driver();
        let mut renderer = SoftwareRenderer::new(W, H, Camera::default());
        driver.update(0.5, Vec2::default(), &mut renderer);

        let center = renderer.buffer().get_pixel(W as i32 / 2, H as i32 / 2).unwrap();
        assert!(palette_rgb(&driver).contains(&center));
        let depth = renderer.buffer().depth_at(W as i32 / 2, H as i32 / 2).unwrap();
        // Front surface sits about 1.8 units toward the camera from the origin
        assert!(depth > 2.0 && depth < 4.5);
    }

    #[test]
    fn test_corner_shows_background() {
        let mut driver = driver();
        let mut renderer = SoftwareRenderer::new(W, H, Camera::default());
        driver.update(0.5, Vec2::default(), &mut renderer);

        let corner = renderer.buffer().get_pixel(0, 0).unwrap();
        let bg = driver.sphere().unwrap().program.background().to_rgb8();
        let glyph = GLYPH_COLOR;
        assert!(corner == bg || corner == glyph);
    }

    #[test]
    fn test_sphere_pixels_use_palette_only() {
        let mut driver = driver();
        let mut renderer = SoftwareRenderer::new(W, H, Camera::default());
        driver.update(1.0, Vec2::new(0.5, 0.0), &mut renderer);

        let allowed = palette_rgb(&driver);
        let bg = driver.sphere().unwrap().program.background().to_rgb8();
        let buffer = renderer.buffer();
        let mut sphere_pixels = 0;
        for y in 0..H as i32 {
            for x in 0..W as i32 {
                let px = buffer.get_pixel(x, y).unwrap();
                if px == bg || px == GLYPH_COLOR {
                    continue;
                }
                assert!(allowed.contains(&px), "unexpected color {:?}", px);
                sphere_pixels += 1;
            }
        }
        assert!(sphere_pixels > 0);
    }

    #[test]
    fn test_one_upload_per_frame_reaches_renderer() {
        let mut driver = driver();
        let mut renderer = SoftwareRenderer::new(W, H, Camera::default());
        for i in 1..=3 {
            driver.update(i as f32 * 0.016, Vec2::default(), &mut renderer);
        }
        assert_eq!(renderer.instance_uploads(), 3);
        assert_eq!(renderer.frames_drawn(), 3);
        assert_eq!(renderer.instance_count(), 100);
    }

    #[test]
    fn test_release_drops_instances() {
        let mut driver = driver();
        let mut renderer = SoftwareRenderer::new(W, H, Camera::default());
        driver.update(0.1, Vec2::default(), &mut renderer);
        driver.teardown(&mut renderer);
        assert_eq!(renderer.instance_count(), 0);
    }

    #[test]
    fn test_edge_sign() {
        let a = (0.0, 0.0, 1.0);
        let b = (4.0, 0.0, 1.0);
        assert!(edge(a, b, (1.0, 1.0, 0.0)) > 0.0);
        assert!(edge(a, b, (1.0, -1.0, 0.0)) < 0.0);
    }
}
