//! Voidsphere: a noise-displaced, ordered-dither shaded sphere drifting in a
//! field of wireframe particles, rendered entirely on the CPU.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod displacement;
pub mod display;
pub mod dither;
pub mod math3d;
pub mod noise;
pub mod particles;
pub mod raster;
pub mod scene;
pub mod util;
