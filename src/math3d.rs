//! 3D Math Utilities
//!
//! Vectors, the base meshes (icosphere and octahedron glyph), and the
//! perspective camera used by the software pipeline.
//!
//! View space follows the GL convention: camera at the origin looking down
//! -Z, +Y up. Screen space has its origin at the top-left with +Y down.

use std::collections::HashMap;
use std::ops::{Add, Mul, Neg, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Same value on every component
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Reflect an incident direction about a unit normal: `i - 2 dot(n, i) n`
    #[inline]
    pub fn reflect(&self, normal: &Self) -> Self {
        *self - *normal * (2.0 * normal.dot(self))
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }

    /// Rotate around X axis
    #[inline]
    pub fn rotate_x(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x,
            y: self.y * cos - self.z * sin,
            z: self.y * sin + self.z * cos,
        }
    }

    /// Rotate around Y axis
    #[inline]
    pub fn rotate_y(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos + self.z * sin,
            y: self.y,
            z: -self.x * sin + self.z * cos,
        }
    }

    /// Rotate around Z axis
    #[inline]
    pub fn rotate_z(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
            z: self.z,
        }
    }

    /// Euler rotation in XYZ order (Z applied first, as an XYZ rotation matrix does)
    #[inline]
    pub fn rotate_xyz(&self, rx: f32, ry: f32, rz: f32) -> Self {
        self.rotate_z(rz).rotate_y(ry).rotate_x(rx)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// 2D Vector (pointer coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Scalar linear interpolation. `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ============================================================================
// Mesh
// ============================================================================

/// Indexed triangle mesh with per-vertex normals
#[derive(Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Icosahedron with recursive midpoint subdivision.
    ///
    /// Edge midpoints are shared between neighbouring faces, so the surface
    /// has no seams and each vertex normal is its outward radial direction.
    pub fn icosphere(radius: f32, subdivisions: u32) -> Self {
        fn midpoint(
            dirs: &mut Vec<Vec3>,
            cache: &mut HashMap<(usize, usize), usize>,
            i0: usize,
            i1: usize,
        ) -> usize {
            let key = if i0 < i1 { (i0, i1) } else { (i1, i0) };
            if let Some(&idx) = cache.get(&key) {
                return idx;
            }
            let mid = ((dirs[i0] + dirs[i1]) * 0.5).normalize();
            let idx = dirs.len();
            dirs.push(mid);
            cache.insert(key, idx);
            idx
        }

        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let mut dirs: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();

        let mut faces = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut next = Vec::with_capacity(faces.len() * 4);
            let mut cache: HashMap<(usize, usize), usize> = HashMap::new();

            for &[v0, v1, v2] in &faces {
                let a = midpoint(&mut dirs, &mut cache, v0, v1);
                let b = midpoint(&mut dirs, &mut cache, v1, v2);
                let c = midpoint(&mut dirs, &mut cache, v2, v0);

                next.push([v0, a, c]);
                next.push([v1, b, a]);
                next.push([v2, c, b]);
                next.push([a, b, c]);
            }

            faces = next;
        }

        Self {
            vertices: dirs.iter().map(|&d| d * radius).collect(),
            normals: dirs,
            faces,
        }
    }

    /// Regular octahedron with vertices on the axes
    pub fn octahedron(radius: f32) -> Self {
        let dirs = vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        Self {
            vertices: dirs.iter().map(|&d| d * radius).collect(),
            normals: dirs,
            faces,
        }
    }

    /// Unique undirected edges, ordered by first appearance
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut seen = std::collections::HashSet::new();
        let mut edges = Vec::new();
        for face in &self.faces {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    /// Get face normal from the winding order
    pub fn face_normal(&self, face_idx: usize) -> Vec3 {
        let face = &self.faces[face_idx];
        let v0 = self.vertices[face[0]];
        let v1 = self.vertices[face[1]];
        let v2 = self.vertices[face[2]];
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }
}

// ============================================================================
// Camera
// ============================================================================

/// Perspective camera on the +Z axis looking at the origin
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub distance: f32,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
}

impl Camera {
    pub fn new(distance: f32, fov_degrees: f32) -> Self {
        Self {
            distance,
            fov_y: fov_degrees.to_radians(),
            near: 0.1,
        }
    }

    /// World to view space
    #[inline]
    pub fn to_view(&self, world: Vec3) -> Vec3 {
        Vec3::new(world.x, world.y, world.z - self.distance)
    }

    /// Project a view-space point to screen coordinates.
    ///
    /// Returns (screen_x, screen_y, depth) where depth is the positive
    /// distance along the view axis, or None in front of the near plane.
    #[inline]
    pub fn project(&self, view: Vec3, width: u32, height: u32) -> Option<(f32, f32, f32)> {
        let depth = -view.z;
        if depth <= self.near {
            return None;
        }
        let focal = (height as f32 * 0.5) / (self.fov_y * 0.5).tan();
        let scale = focal / depth;
        Some((
            width as f32 * 0.5 + view.x * scale,
            height as f32 * 0.5 - view.y * scale,
            depth,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(5.0, 45.0)
    }
}
