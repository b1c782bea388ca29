//! Noise Field
//!
//! 3D simplex gradient noise for the sphere displacement. The lattice hash is
//! the mod-289 permutation polynomial and gradients are picked from a 7x7 ring
//! on an octahedron, which is the formulation GPU shaders use, so the field
//! needs no permutation table and no seed.

use crate::math3d::Vec3;

/// Skew factor into simplex lattice space (1/3 for three dimensions)
const SKEW: f32 = 1.0 / 3.0;
/// Unskew factor back to Cartesian space (1/6 for three dimensions)
const UNSKEW: f32 = 1.0 / 6.0;
/// Output scale that maps the kernel sum to roughly [-1, 1]
const OUTPUT_SCALE: f32 = 42.0;

#[inline]
fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

/// Permutation polynomial: (34x² + x) mod 289
#[inline]
fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

/// First-order Taylor approximation of 1/sqrt(r) around r = 0.7
#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_914_001_59 - 0.853_734_720_953_14 * r
}

/// Pseudo-random unit gradient for a hashed lattice corner
fn gradient(hash: f32) -> Vec3 {
    const N: f32 = 1.0 / 7.0;
    // ns = (2/7, 0.5/7 - 1, 1/7)
    let ns_x = 2.0 * N;
    let ns_y = 0.5 * N - 1.0;

    // j = hash mod 49, split into a 7x7 grid
    let j = hash - 49.0 * (hash * N * N).floor();
    let gx_cell = (j * N).floor();
    let gy_cell = (j - 7.0 * gx_cell).floor();

    let mut gx = gx_cell * ns_x + ns_y;
    let mut gy = gy_cell * ns_x + ns_y;
    let gz = 1.0 - gx.abs() - gy.abs();

    // Fold the lower half of the octahedron back up
    if gz <= 0.0 {
        gx -= gx.floor() * 2.0 + 1.0;
        gy -= gy.floor() * 2.0 + 1.0;
    }

    let g = Vec3::new(gx, gy, gz);
    g * taylor_inv_sqrt(g.dot(&g))
}

/// 3D simplex noise.
///
/// Deterministic and C¹-continuous. Output is approximately in [-1, 1]; the
/// kernel sum is not strictly bounded but stays within that range in practice.
pub fn simplex3(v: Vec3) -> f32 {
    // Skew to find the containing simplex cell
    let s = (v.x + v.y + v.z) * SKEW;
    let i = Vec3::new((v.x + s).floor(), (v.y + s).floor(), (v.z + s).floor());
    let t = (i.x + i.y + i.z) * UNSKEW;
    let x0 = v - i + Vec3::splat(t);

    // Rank the components to pick the simplex traversal order
    let gx = if x0.x >= x0.y { 1.0 } else { 0.0 };
    let gy = if x0.y >= x0.z { 1.0 } else { 0.0 };
    let gz = if x0.z >= x0.x { 1.0 } else { 0.0 };
    let (lx, ly, lz) = (1.0 - gx, 1.0 - gy, 1.0 - gz);
    let i1 = Vec3::new(f32::min(gx, lz), f32::min(gy, lx), f32::min(gz, ly));
    let i2 = Vec3::new(f32::max(gx, lz), f32::max(gy, lx), f32::max(gz, ly));

    let corners = [
        (Vec3::zero(), x0),
        (i1, x0 - i1 + Vec3::splat(UNSKEW)),
        (i2, x0 - i2 + Vec3::splat(2.0 * UNSKEW)),
        (Vec3::splat(1.0), x0 - Vec3::splat(0.5)),
    ];

    let cell = Vec3::new(mod289(i.x), mod289(i.y), mod289(i.z));

    let mut sum = 0.0;
    for (offset, d) in corners {
        let falloff = (0.6 - d.dot(&d)).max(0.0);
        if falloff == 0.0 {
            continue;
        }
        let hash = permute(
            permute(permute(cell.z + offset.z) + cell.y + offset.y) + cell.x + offset.x,
        );
        let m2 = falloff * falloff;
        sum += m2 * m2 * gradient(hash).dot(&d);
    }

    OUTPUT_SCALE * sum
}

/// Noise field sampled at `position * freq_scale`, advected by `time` along
/// the (1, 1, 1) diagonal.
#[inline]
pub fn noise(position: Vec3, freq_scale: f32, time: f32) -> f32 {
    simplex3(position * freq_scale + Vec3::splat(time))
}
