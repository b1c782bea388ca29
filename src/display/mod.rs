mod pixel_buffer;
#[cfg(feature = "sdl")]
mod window;

pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "sdl")]
pub use window::{Display, InputEvent, RenderTarget};

use crate::math3d::Vec2;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Map a window pixel position to [-1, 1] on both axes, +y up.
/// Positions outside the window extrapolate past the range.
pub fn normalize_pointer(x: i32, y: i32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(
        (x as f32 / w) * 2.0 - 1.0,
        -((y as f32 / h) * 2.0 - 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pointer_corners() {
        let center = normalize_pointer(320, 240, 640, 480);
        assert_eq!((center.x, center.y), (0.0, 0.0));

        let top_left = normalize_pointer(0, 0, 640, 480);
        assert_eq!((top_left.x, top_left.y), (-1.0, 1.0));

        let bottom_right = normalize_pointer(640, 480, 640, 480);
        assert_eq!((bottom_right.x, bottom_right.y), (1.0, -1.0));
    }

    #[test]
    fn test_normalize_pointer_zero_size() {
        let p = normalize_pointer(0, 0, 0, 0);
        assert!(p.x.is_finite() && p.y.is_finite());
    }
}
