// ============================================================================
// Utility Functions
// ============================================================================

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering, with a depth plane.
/// Depth is view distance: smaller is closer.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    depth: Vec<f32>,
}

impl PixelBuffer {
    /// Create a pixel buffer with its depth plane initialized to infinity
    pub fn with_depth(width: u32, height: u32) -> Self {
        let pixel_count = (width * height) as usize;
        Self {
            pixels: vec![0; pixel_count * 4],
            width,
            height,
            depth: vec![f32::INFINITY; pixel_count],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel(chunk, r, g, b);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    // ========================================================================
    // Depth Buffer
    // ========================================================================

    /// Reset depth buffer to infinity
    pub fn clear_depth(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    /// Clear color (A=255) and depth in one call
    pub fn clear_all(&mut self, r: u8, g: u8, b: u8) {
        self.clear(r, g, b);
        self.clear_depth();
    }

    /// Read depth value at (x, y). Returns None if out of bounds.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.depth[(y as u32 * self.width + x as u32) as usize])
    }

    /// Would a fragment at depth `z` be visible? Lets callers skip shading
    /// hidden fragments.
    #[inline]
    pub fn depth_passes(&self, x: i32, y: i32, z: f32) -> bool {
        self.depth_at(x, y).is_some_and(|d| z < d)
    }

    /// Depth-tested pixel write: writes only if z < current depth, then updates depth.
    #[inline]
    pub fn set_pixel_z(&mut self, x: i32, y: i32, z: f32, r: u8, g: u8, b: u8) {
        if !self.in_bounds(x, y) {
            return;
        }
        let pi = (y as u32 * self.width + x as u32) as usize;
        if z >= self.depth[pi] {
            return;
        }
        self.depth[pi] = z;
        let idx = pi * 4;
        write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
    }

    /// Depth-tested line with depth interpolated between the endpoints.
    ///
    /// Steps once per pixel along the major axis; every step goes through
    /// `set_pixel_z`, so off-screen segments are clipped per pixel.
    pub fn line_z(
        &mut self,
        (x0, y0, z0): (f32, f32, f32),
        (x1, y1, z1): (f32, f32, f32),
        r: u8,
        g: u8,
        b: u8,
    ) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        // Segments far larger than the screen are degenerate projections
        let limit = (self.width + self.height) as f32 * 4.0;
        if steps > limit {
            return;
        }
        let n = steps as i32;
        if n == 0 {
            self.set_pixel_z(x0.floor() as i32, y0.floor() as i32, z0, r, g, b);
            return;
        }
        let inv = 1.0 / steps;
        for i in 0..=n {
            let t = i as f32 * inv;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            let z = z0 + (z1 - z0) * t;
            self.set_pixel_z(x.floor() as i32, y.floor() as i32, z, r, g, b);
        }
    }

    /// Get raw pixel data for SDL texture update
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_read_back() {
        let mut buffer = PixelBuffer::with_depth(4, 4);
        buffer.clear(3, 3, 3);
        assert_eq!(buffer.get_pixel(2, 2), Some((3, 3, 3)));
        assert_eq!(buffer.get_pixel(4, 0), None);
        assert_eq!(&buffer.as_bytes()[..4], &[255, 3, 3, 3]);
    }

    #[test]
    fn test_byte_order_is_abgr() {
        let mut buffer = PixelBuffer::with_depth(1, 1);
        buffer.set_pixel_z(0, 0, 1.0, 10, 20, 30);
        assert_eq!(buffer.as_bytes(), &[255, 30, 20, 10]);
    }

    #[test]
    fn test_depth_rejects_farther_fragment() {
        let mut buffer = PixelBuffer::with_depth(2, 2);
        buffer.set_pixel_z(0, 0, 2.0, 255, 0, 0);
        buffer.set_pixel_z(0, 0, 3.0, 0, 255, 0);
        assert_eq!(buffer.get_pixel(0, 0), Some((255, 0, 0)));
        assert!(!buffer.depth_passes(0, 0, 2.0));
        assert!(buffer.depth_passes(0, 0, 1.0));
        buffer.set_pixel_z(0, 0, 1.0, 0, 0, 255);
        assert_eq!(buffer.get_pixel(0, 0), Some((0, 0, 255)));
        assert_eq!(buffer.depth_at(0, 0), Some(1.0));
    }

    #[test]
    fn test_clear_all_resets_depth() {
        let mut buffer = PixelBuffer::with_depth(2, 2);
        buffer.set_pixel_z(1, 1, 0.5, 1, 1, 1);
        buffer.clear_all(0, 0, 0);
        assert_eq!(buffer.depth_at(1, 1), Some(f32::INFINITY));
    }

    #[test]
    fn test_line_z_covers_endpoints() {
        let mut buffer = PixelBuffer::with_depth(8, 8);
        buffer.line_z((1.5, 1.5, 1.0), (6.5, 3.5, 1.0), 68, 68, 68);
        assert_eq!(buffer.get_pixel(1, 1), Some((68, 68, 68)));
        assert_eq!(buffer.get_pixel(6, 3), Some((68, 68, 68)));
    }

    #[test]
    fn test_line_z_clips_offscreen() {
        let mut buffer = PixelBuffer::with_depth(4, 4);
        buffer.line_z((-10.0, 1.0, 1.0), (10.0, 1.0, 1.0), 9, 9, 9);
        for x in 0..4 {
            assert_eq!(buffer.get_pixel(x, 1), Some((9, 9, 9)));
        }
    }
}
