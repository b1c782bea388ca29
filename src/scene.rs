//! Scene Driver
//!
//! Owns the displaced sphere and the particle instances, advances the shared
//! time uniform once per frame and hands the results to a render backend.

use crate::config::{Config, ParticleConfig, SphereConfig};
use crate::dither::{ShadeConfig, ShadeProgram};
use crate::math3d::{lerp, Mesh, Vec2};
use crate::particles::{DriftField, InstanceBuffer, InstanceTransform};

/// Frame rate the per-frame motion constants were tuned at
pub const REFERENCE_FPS: f32 = 60.0;

/// Deepest icosphere subdivision accepted at init (20 * 4^7 faces)
pub const MAX_SUBDIVISIONS: u32 = 7;

// ============================================================================
// Uniforms
// ============================================================================

/// Session time in seconds. Only the scene driver can move it, and only forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeUniform {
    seconds: f32,
}

impl TimeUniform {
    #[inline]
    pub fn get(&self) -> f32 {
        self.seconds
    }

    /// Move to `elapsed`; earlier values are ignored. Returns the delta applied.
    pub(crate) fn advance_to(&mut self, elapsed: f32) -> f32 {
        if elapsed > self.seconds {
            let delta = elapsed - self.seconds;
            self.seconds = elapsed;
            delta
        } else {
            0.0
        }
    }
}

/// Read-only inputs shared by the vertex and fragment stages for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub time: f32,
}

// ============================================================================
// Render backend seam
// ============================================================================

/// Sphere state handed to the backend each frame
pub struct SphereState {
    /// Undisplaced base geometry, never mutated after init
    pub base: Mesh,
    pub program: ShadeProgram,
    pub scale: f32,
    /// Continuous rotation about Y
    pub yaw: f32,
    /// Pointer-driven tilt about Z
    pub roll: f32,
}

/// What the scene needs from whatever draws it
pub trait RenderBackend {
    /// Receive every particle transform for this frame in one call
    fn upload_instances(&mut self, transforms: &[InstanceTransform]);

    /// Draw the sphere and the most recently uploaded instances
    fn draw_frame(&mut self, sphere: &SphereState, uniforms: &Uniforms);

    /// Drop geometry and instance storage
    fn release(&mut self);
}

// ============================================================================
// Driver
// ============================================================================

pub struct SceneDriver {
    sphere_config: SphereConfig,
    particle_config: ParticleConfig,
    shade_config: ShadeConfig,
    time: TimeUniform,
    sphere: Option<SphereState>,
    particles: Option<DriftField>,
    instances: Option<InstanceBuffer>,
    frames: u64,
}

impl SceneDriver {
    /// Create an uninitialized driver; call [`SceneDriver::init`] before the first frame
    pub fn new(config: &Config) -> Self {
        Self {
            sphere_config: config.sphere,
            particle_config: config.particles,
            shade_config: config.shade,
            time: TimeUniform::default(),
            sphere: None,
            particles: None,
            instances: None,
            frames: 0,
        }
    }

    /// Allocate base geometry, the shade program and the instance buffer.
    /// Fails if the sphere or shade settings are unusable.
    pub fn init(&mut self) -> Result<(), String> {
        let sphere = &self.sphere_config;
        if sphere.subdivisions > MAX_SUBDIVISIONS {
            return Err(format!(
                "sphere subdivisions {} exceeds the maximum of {}",
                sphere.subdivisions, MAX_SUBDIVISIONS
            ));
        }
        if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
            return Err(format!("sphere radius {} must be positive", sphere.radius));
        }
        if !(sphere.scale.is_finite() && sphere.scale > 0.0) {
            return Err(format!("sphere scale {} must be positive", sphere.scale));
        }
        if !(sphere.tilt_lerp.is_finite() && (0.0..=1.0).contains(&sphere.tilt_lerp)) {
            return Err(format!(
                "sphere tilt_lerp {} must be within [0, 1]",
                sphere.tilt_lerp
            ));
        }
        if !sphere.tilt_factor.is_finite() || !sphere.yaw_per_frame.is_finite() {
            return Err(format!(
                "sphere tilt_factor {} and yaw_per_frame {} must be finite",
                sphere.tilt_factor, sphere.yaw_per_frame
            ));
        }

        let program = ShadeProgram::compile(&self.shade_config)?;
        let base = Mesh::icosphere(sphere.radius, sphere.subdivisions);
        log::info!(
            "Scene: sphere r={} with {} vertices / {} faces",
            sphere.radius,
            base.vertices.len(),
            base.faces.len()
        );

        let count = self.particle_config.count;
        self.particles = Some(DriftField::seeded(count, self.particle_config.seed));
        self.instances = Some(InstanceBuffer::new(count));
        log::info!(
            "Scene: {} particles (seed {})",
            count,
            self.particle_config.seed
        );

        self.sphere = Some(SphereState {
            base,
            program,
            scale: sphere.scale,
            yaw: 0.0,
            roll: 0.0,
        });
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.sphere.is_some() && self.instances.is_some()
    }

    /// Advance one frame.
    ///
    /// `elapsed` is wall-clock session time in seconds and `pointer` the
    /// normalized pointer position in [-1, 1]. Does nothing until
    /// [`SceneDriver::init`] has run.
    pub fn update(&mut self, elapsed: f32, pointer: Vec2, backend: &mut dyn RenderBackend) {
        let (Some(sphere), Some(particles), Some(instances)) = (
            self.sphere.as_mut(),
            self.particles.as_mut(),
            self.instances.as_mut(),
        ) else {
            return;
        };

        let dt = self.time.advance_to(elapsed);
        let uniforms = Uniforms {
            time: self.time.get(),
        };

        // Per-frame constants scaled to the real frame length
        let frames = dt * REFERENCE_FPS;
        let cfg = &self.sphere_config;
        sphere.yaw += cfg.yaw_per_frame * frames;
        let target_roll = pointer.x * cfg.tilt_factor;
        let blend = 1.0 - (1.0 - cfg.tilt_lerp).powf(frames);
        sphere.roll = lerp(sphere.roll, target_roll, blend);

        particles.advance(instances);
        if instances.needs_update() {
            backend.upload_instances(instances.transforms());
            instances.mark_uploaded();
        }

        backend.draw_frame(sphere, &uniforms);
        self.frames += 1;
    }

    /// Release everything allocated by init. The driver can be initialized again.
    pub fn teardown(&mut self, backend: &mut dyn RenderBackend) {
        if self.sphere.take().is_some() {
            log::info!("Scene: teardown after {} frames", self.frames);
        }
        self.particles = None;
        self.instances = None;
        backend.release();
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time.get()
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn sphere(&self) -> Option<&SphereState> {
        self.sphere.as_ref()
    }

    #[inline]
    pub fn particles(&self) -> Option<&DriftField> {
        self.particles.as_ref()
    }

    #[inline]
    pub fn instances(&self) -> Option<&InstanceBuffer> {
        self.instances.as_ref()
    }
}
