//! Drifting Particles
//!
//! A fixed set of particles that loop forever around their spawn offsets.
//! Each frame the phases advance and every particle writes one instance
//! transform into a shared buffer, which the backend consumes in one upload.

use crate::math3d::Vec3;
use crate::util::Rng;

/// Number of particle instances in the scene
pub const PARTICLE_COUNT: usize = 100;

/// Smallest scale an instance may take
pub const MIN_SCALE: f32 = 0.01;

/// Per-instance animation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftParticle {
    /// Animation phase
    pub t: f32,
    /// Amplitude factor (carried with the particle, not used by the drift path)
    pub factor: f32,
    pub speed: f32,
    pub offset: Vec3,
}

impl DriftParticle {
    /// Spawn with randomized phase, speed and offset
    pub fn random(rng: &mut Rng) -> Self {
        let t = rng.next_f32() * 100.0;
        let factor = 20.0 + rng.next_f32() * 100.0;
        let speed = 0.01 + rng.next_f32() / 200.0;
        let x = (rng.next_f32() - 0.5) * 10.0;
        let y = (rng.next_f32() - 0.5) * 10.0;
        // Pushed back a bit behind the sphere
        let z = (rng.next_f32() - 0.5) * 10.0 - 2.0;
        Self {
            t,
            factor,
            speed,
            offset: Vec3::new(x, y, z),
        }
    }

    /// Advance the phase by one frame
    #[inline]
    pub fn advance(&mut self) {
        self.t += self.speed / 2.0;
    }

    /// Instance transform for the current phase
    pub fn transform(&self) -> InstanceTransform {
        let t = self.t;
        let s = t.cos();

        let position = Vec3::new(
            self.offset.x + (t / 10.0).cos() + t.sin() / 10.0,
            self.offset.y + (t / 10.0).sin() + (t * 2.0).cos() / 10.0,
            self.offset.z + (t / 10.0).cos(),
        );

        InstanceTransform {
            position,
            rotation: Vec3::splat(s * 5.0),
            scale: instance_scale(t),
        }
    }
}

/// Pulsing scale, floored so an instance never collapses or inverts
#[inline]
pub fn instance_scale(t: f32) -> f32 {
    (0.03 * t.cos() + 0.01).max(MIN_SCALE)
}

// ============================================================================
// Instance transforms
// ============================================================================

/// Translation, Euler rotation (XYZ) and uniform scale of one instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl InstanceTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::zero(),
        rotation: Vec3::zero(),
        scale: 1.0,
    };

    /// Transform a local-space point: scale, rotate, then translate
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        (v * self.scale).rotate_xyz(self.rotation.x, self.rotation.y, self.rotation.z)
            + self.position
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Fixed-capacity array of instance transforms submitted as one batch
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    transforms: Vec<InstanceTransform>,
    needs_update: bool,
}

impl InstanceBuffer {
    pub fn new(count: usize) -> Self {
        Self {
            transforms: vec![InstanceTransform::IDENTITY; count],
            needs_update: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Write one slot. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, transform: InstanceTransform) {
        if let Some(slot) = self.transforms.get_mut(index) {
            *slot = transform;
        }
    }

    #[inline]
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Flag the buffer as changed since the last upload
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    #[inline]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Called by the backend once the batch has been consumed
    #[inline]
    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }
}

// ============================================================================
// Particle field
// ============================================================================

/// All drifting particles of the scene
#[derive(Debug, Clone)]
pub struct DriftField {
    particles: Vec<DriftParticle>,
}

impl DriftField {
    /// Reproducible field: the same seed always yields the same particles
    pub fn seeded(count: usize, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let particles = (0..count).map(|_| DriftParticle::random(&mut rng)).collect();
        Self { particles }
    }

    #[inline]
    pub fn particles(&self) -> &[DriftParticle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance every phase one frame and write all transforms into `buffer`.
    /// The buffer is marked dirty once, after every slot is written.
    pub fn advance(&mut self, buffer: &mut InstanceBuffer) {
        for (i, particle) in self.particles.iter_mut().enumerate() {
            particle.advance();
            buffer.set(i, particle.transform());
        }
        buffer.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_field_reproducible() {
        let a = DriftField::seeded(PARTICLE_COUNT, 1234);
        let b = DriftField::seeded(PARTICLE_COUNT, 1234);
        assert_eq!(a.len(), PARTICLE_COUNT);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = DriftField::seeded(10, 1);
        let b = DriftField::seeded(10, 2);
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn test_spawn_ranges() {
        let field = DriftField::seeded(PARTICLE_COUNT, 77);
        for p in field.particles() {
            assert!((0.0..100.0).contains(&p.t));
            assert!((20.0..120.0).contains(&p.factor));
            assert!((0.01..0.015).contains(&p.speed));
            assert!((-5.0..5.0).contains(&p.offset.x));
            assert!((-5.0..5.0).contains(&p.offset.y));
            assert!((-7.0..3.0).contains(&p.offset.z));
        }
    }

    #[test]
    fn test_scale_never_below_floor() {
        let mut t = -50.0;
        while t < 50.0 {
            assert!(instance_scale(t) >= MIN_SCALE);
            t += 0.01;
        }
        // cos(t) = -1 would give -0.02 without the floor
        assert_eq!(instance_scale(std::f32::consts::PI), MIN_SCALE);
        assert!((instance_scale(0.0) - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_advance_steps_half_speed() {
        let mut p = DriftParticle {
            t: 1.0,
            factor: 50.0,
            speed: 0.012,
            offset: Vec3::zero(),
        };
        p.advance();
        assert!((p.t - 1.006).abs() < 1e-6);
    }

    #[test]
    fn test_transform_orbits_offset() {
        let p = DriftParticle {
            t: 0.0,
            factor: 20.0,
            speed: 0.01,
            offset: Vec3::new(1.0, 2.0, -3.0),
        };
        let xf = p.transform();
        // t = 0: (x + 1, y + 0.1, z + 1)
        assert!(xf.position.approx_eq(&Vec3::new(2.0, 2.1, -2.0), 1e-6));
        assert!(xf.rotation.approx_eq(&Vec3::splat(5.0), 1e-6));
    }

    #[test]
    fn test_field_fills_whole_buffer() {
        let mut field = DriftField::seeded(PARTICLE_COUNT, 9);
        let mut buffer = InstanceBuffer::new(PARTICLE_COUNT);
        assert!(!buffer.needs_update());
        field.advance(&mut buffer);
        assert!(buffer.needs_update());
        for (p, xf) in field.particles().iter().zip(buffer.transforms()) {
            assert_eq!(p.transform(), *xf);
        }
    }

    #[test]
    fn test_instance_apply_scales_then_translates() {
        let xf = InstanceTransform {
            position: Vec3::new(0.0, 0.0, -2.0),
            rotation: Vec3::zero(),
            scale: 0.5,
        };
        assert!(xf
            .apply(Vec3::new(0.2, 0.0, 0.0))
            .approx_eq(&Vec3::new(0.1, 0.0, -2.0), 1e-6));
    }
}
