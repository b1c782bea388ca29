//! Dither Shade Stage
//!
//! Per-pixel lighting (diffuse + specular + rim) quantized against a 4x4
//! Bayer matrix into three palette tiers. The matrix is indexed by screen
//! position, so the pattern stays locked to the viewport while the sphere
//! moves underneath it.

use serde::{Deserialize, Serialize};

use crate::math3d::Vec3;

/// 4x4 Bayer threshold matrix (normalized to 0-1), row-major
pub const DITHER_TABLE: [[f32; 4]; 4] = [
    [0.0 / 16.0, 8.0 / 16.0, 2.0 / 16.0, 10.0 / 16.0],
    [12.0 / 16.0, 4.0 / 16.0, 14.0 / 16.0, 6.0 / 16.0],
    [3.0 / 16.0, 11.0 / 16.0, 1.0 / 16.0, 9.0 / 16.0],
    [15.0 / 16.0, 7.0 / 16.0, 13.0 / 16.0, 5.0 / 16.0],
];

/// Unnormalized light direction; see [`Lighting::default`]
pub const LIGHT_DIR: Vec3 = Vec3::new(1.0, 1.0, 2.0);

const SPECULAR_POWER: i32 = 32;
const DIFFUSE_WEIGHT: f32 = 0.5;
const SPECULAR_WEIGHT: f32 = 0.8;
const RIM_WEIGHT: f32 = 0.6;

/// Threshold for a screen pixel. Period 4 on both axes, negative coordinates included.
#[inline]
pub fn threshold(sx: i32, sy: i32) -> f32 {
    DITHER_TABLE[sx.rem_euclid(4) as usize][sy.rem_euclid(4) as usize]
}

// ============================================================================
// Lighting
// ============================================================================

/// Fixed directional light in view space
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    light_dir: Vec3,
}

impl Lighting {
    /// `dir` must be finite and non-zero; it is normalized here
    pub fn new(dir: Vec3) -> Self {
        Self {
            light_dir: dir.normalize(),
        }
    }

    #[inline]
    pub fn light_dir(&self) -> Vec3 {
        self.light_dir
    }

    /// Lighting intensity for a view-space normal and position.
    ///
    /// Not clamped: strong specular highlights exceed 1.0 and so beat every
    /// dither threshold.
    pub fn intensity(&self, normal: Vec3, view_pos: Vec3) -> f32 {
        let view_dir = (-view_pos).normalize();

        let diffuse = normal.dot(&self.light_dir).max(0.0);

        let reflected = (-self.light_dir).reflect(&normal);
        let specular = view_dir.dot(&reflected).max(0.0).powi(SPECULAR_POWER);

        let rim = (1.0 - view_dir.dot(&normal).max(0.0)).powi(3);

        diffuse * DIFFUSE_WEIGHT + specular * SPECULAR_WEIGHT + rim * RIM_WEIGHT
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::new(LIGHT_DIR)
    }
}

// ============================================================================
// Quantization
// ============================================================================

/// Output tier of the three-level ordered dither
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DitherLevel {
    Dark,
    Mid,
    Bright,
}

/// Compare intensity against a threshold: above it is bright, above half
/// of it is the soft mid tier, otherwise dark.
#[inline]
pub fn quantize(intensity: f32, threshold: f32) -> DitherLevel {
    if intensity > threshold {
        DitherLevel::Bright
    } else if intensity > threshold * 0.5 {
        DitherLevel::Mid
    } else {
        DitherLevel::Dark
    }
}

// ============================================================================
// Palette
// ============================================================================

/// Linear RGB color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    #[inline]
    pub fn mix(self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    #[inline]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

/// Three-tone palette: void black, cold silver and a grey accent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub dark: Color,
    pub accent: Color,
    pub bright: Color,
}

impl Palette {
    /// Color written for a dither tier. The mid tier is a 50/50 blend of dark and accent.
    #[inline]
    pub fn color(&self, level: DitherLevel) -> Color {
        match level {
            DitherLevel::Dark => self.dark,
            DitherLevel::Mid => self.dark.mix(self.accent, 0.5),
            DitherLevel::Bright => self.bright,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dark: Color::new(0.01, 0.01, 0.02),
            accent: Color::new(0.4, 0.4, 0.5),
            bright: Color::new(0.9, 0.95, 1.0),
        }
    }
}

// ============================================================================
// Shade Program
// ============================================================================

/// Inputs the shade program is built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeConfig {
    pub light_dir: [f32; 3],
    pub palette: Palette,
    pub background: Color,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        Self {
            light_dir: [LIGHT_DIR.x, LIGHT_DIR.y, LIGHT_DIR.z],
            palette: Palette::default(),
            // #030303
            background: Color::from_rgb8(3, 3, 3),
        }
    }
}

/// Validated lighting + palette, evaluated once per covered pixel
#[derive(Debug, Clone)]
pub struct ShadeProgram {
    lighting: Lighting,
    palette: Palette,
    background: Color,
}

impl ShadeProgram {
    /// Build the program. Invalid input is a setup defect and is reported
    /// here rather than surfacing mid-frame.
    pub fn compile(config: &ShadeConfig) -> Result<Self, String> {
        let [x, y, z] = config.light_dir;
        let dir = Vec3::new(x, y, z);
        if !dir.is_finite() || dir.length() <= f32::EPSILON {
            return Err(format!(
                "shade program: light direction {:?} must be finite and non-zero",
                config.light_dir
            ));
        }

        let colors = [
            ("palette.dark", config.palette.dark),
            ("palette.accent", config.palette.accent),
            ("palette.bright", config.palette.bright),
            ("background", config.background),
        ];
        for (name, color) in colors {
            if !color.is_valid() {
                return Err(format!(
                    "shade program: {} {:?} has channels outside [0, 1]",
                    name, color
                ));
            }
        }

        Ok(Self {
            lighting: Lighting::new(dir),
            palette: config.palette,
            background: config.background,
        })
    }

    #[inline]
    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Dither tier for one fragment. `(sx, sy)` is the fragment coordinate.
    #[inline]
    pub fn level(&self, normal: Vec3, view_pos: Vec3, sx: i32, sy: i32) -> DitherLevel {
        let intensity = self.lighting.intensity(normal, view_pos);
        quantize(intensity, threshold(sx, sy))
    }

    /// Final fragment color
    #[inline]
    pub fn shade(&self, normal: Vec3, view_pos: Vec3, sx: i32, sy: i32) -> Color {
        self.palette.color(self.level(normal, view_pos, sx, sy))
    }
}

impl Default for ShadeProgram {
    fn default() -> Self {
        Self {
            lighting: Lighting::default(),
            palette: Palette::default(),
            background: ShadeConfig::default().background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_permutation_of_sixteenths() {
        let mut seen: Vec<u32> = DITHER_TABLE
            .iter()
            .flatten()
            .map(|v| (v * 16.0) as u32)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_table_layout() {
        let flat: Vec<f32> = DITHER_TABLE.iter().flatten().map(|v| v * 16.0).collect();
        let expected = [
            0.0, 8.0, 2.0, 10.0, 12.0, 4.0, 14.0, 6.0, 3.0, 11.0, 1.0, 9.0, 15.0, 7.0, 13.0, 5.0,
        ];
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_threshold_periodic_and_idempotent() {
        for sx in -8..8 {
            for sy in -8..8 {
                let t = threshold(sx, sy);
                assert_eq!(t, threshold(sx, sy));
                assert_eq!(t, threshold(sx + 4, sy));
                assert_eq!(t, threshold(sx, sy + 4));
                assert_eq!(t, threshold(sx - 12, sy + 400));
            }
        }
        assert_eq!(threshold(1, 0), 12.0 / 16.0);
        assert_eq!(threshold(0, 1), 8.0 / 16.0);
        assert_eq!(threshold(-1, -1), 5.0 / 16.0);
    }

    #[test]
    fn test_quantize_covers_three_tiers() {
        assert_eq!(quantize(0.5, 0.25), DitherLevel::Bright);
        assert_eq!(quantize(0.2, 0.25), DitherLevel::Mid);
        assert_eq!(quantize(0.1, 0.25), DitherLevel::Dark);
        // Zero threshold: anything positive is bright, zero stays dark
        assert_eq!(quantize(0.0, 0.0), DitherLevel::Dark);
    }

    #[test]
    fn test_quantize_monotonic() {
        for row in DITHER_TABLE {
            for t in row {
                let mut prev = DitherLevel::Dark;
                for step in 0..200 {
                    let level = quantize(step as f32 * 0.01, t);
                    assert!(level >= prev, "tier dropped at t={} i={}", t, step);
                    prev = level;
                }
            }
        }
    }

    #[test]
    fn test_pixel_origin_half_intensity_is_bright() {
        assert_eq!(DITHER_TABLE[0][0], 0.0);
        assert_eq!(quantize(0.5, threshold(0, 0)), DitherLevel::Bright);
    }

    #[test]
    fn test_intensity_unclamped_at_highlight() {
        let lighting = Lighting::default();
        // Normal halfway between light and view: specular peaks
        let view_pos = Vec3::new(0.0, 0.0, -5.0);
        let view_dir = (-view_pos).normalize();
        let normal = (lighting.light_dir() + view_dir).normalize();
        let i = lighting.intensity(normal, view_pos);
        assert!(i > 1.0, "highlight intensity {}", i);
        assert_eq!(quantize(i, 15.0 / 16.0), DitherLevel::Bright);
    }

    #[test]
    fn test_rim_brightens_silhouette() {
        let lighting = Lighting::new(Vec3::new(0.0, -1.0, 0.0));
        let view_pos = Vec3::new(0.0, 0.0, -5.0);
        let facing = lighting.intensity(Vec3::new(0.0, 0.0, 1.0), view_pos);
        let grazing = lighting.intensity(Vec3::new(1.0, 0.0, 0.0), view_pos);
        assert!(facing.abs() < 1e-6);
        assert!((grazing - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_mid_tier_is_half_blend() {
        let palette = Palette::default();
        let mid = palette.color(DitherLevel::Mid);
        assert!((mid.r - 0.205).abs() < 1e-6);
        assert!((mid.b - 0.26).abs() < 1e-6);
    }

    #[test]
    fn test_shade_returns_palette_color() {
        let program = ShadeProgram::default();
        let palette = program.palette();
        let choices = [
            palette.color(DitherLevel::Dark),
            palette.color(DitherLevel::Mid),
            palette.color(DitherLevel::Bright),
        ];
        for sx in 0..4 {
            for sy in 0..4 {
                for k in 0..8 {
                    let a = k as f32 * 0.8;
                    let n = Vec3::new(a.cos(), a.sin(), 0.3).normalize();
                    let c = program.shade(n, Vec3::new(0.1, 0.2, -4.0), sx, sy);
                    assert!(choices.contains(&c));
                }
            }
        }
    }

    #[test]
    fn test_compile_rejects_zero_light() {
        let config = ShadeConfig {
            light_dir: [0.0, 0.0, 0.0],
            ..ShadeConfig::default()
        };
        assert!(ShadeProgram::compile(&config).is_err());
    }

    #[test]
    fn test_compile_rejects_out_of_range_palette() {
        let mut config = ShadeConfig::default();
        config.palette.bright = Color::new(1.5, 0.0, 0.0);
        let err = ShadeProgram::compile(&config).unwrap_err();
        assert!(err.contains("palette.bright"));
    }

    #[test]
    fn test_compile_normalizes_light() {
        let program = ShadeProgram::compile(&ShadeConfig::default()).unwrap();
        let dir = program.lighting().light_dir();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.approx_eq(&Vec3::new(1.0, 1.0, 2.0).normalize(), 1e-6));
    }

    #[test]
    fn test_background_default_is_near_black() {
        assert_eq!(ShadeConfig::default().background.to_rgb8(), (3, 3, 3));
    }
}
