//! Displacement Stage
//!
//! Pushes each base vertex along its normal by two layers of noise: a slow,
//! large "breathing" swell and a faster, smaller ripple.

use crate::math3d::{Mesh, Vec3};
use crate::noise::noise;

pub const COARSE_FREQ: f32 = 0.8;
pub const COARSE_RATE: f32 = 0.2;
pub const COARSE_AMPLITUDE: f32 = 0.3;

pub const FINE_FREQ: f32 = 4.0;
pub const FINE_RATE: f32 = 0.5;
pub const FINE_AMPLITUDE: f32 = 0.05;

/// Upper bound on |displacement| given the noise stays within [-1, 1]
pub const MAX_DISPLACEMENT: f32 = COARSE_AMPLITUDE + FINE_AMPLITUDE;

/// Signed offset along the normal for base position `p` at time `t`
#[inline]
pub fn displacement(p: Vec3, t: f32) -> f32 {
    let coarse = noise(p, COARSE_FREQ, t * COARSE_RATE);
    let fine = noise(p, FINE_FREQ, t * FINE_RATE) * FINE_AMPLITUDE;
    coarse * COARSE_AMPLITUDE + fine
}

/// Displaced position: `p + n * displacement(p, t)`
#[inline]
pub fn displace(p: Vec3, n: Vec3, t: f32) -> Vec3 {
    p + n * displacement(p, t)
}

/// Evaluate the stage for every vertex of `mesh` into `out`.
/// `out` is reused across frames; the base mesh is never modified.
pub fn displace_mesh(mesh: &Mesh, t: f32, out: &mut Vec<Vec3>) {
    out.clear();
    out.extend(
        mesh.vertices
            .iter()
            .zip(&mesh.normals)
            .map(|(&p, &n)| displace(p, n, t)),
    );
}
