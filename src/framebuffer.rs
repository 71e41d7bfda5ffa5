use crate::error::{Error, Result};

/// 0RGB pixel surface, row-major. Always holds exactly `width * height`
/// pixels with both dimensions non-zero; the fields stay private so that
/// cannot be broken after construction.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ZeroSurface { width, height });
        }
        Ok(Self {
            pixels: vec![0; width * height],
            width,
            height,
        })
    }

    /// Wrap an existing pixel vector, checking it matches the dimensions.
    pub fn from_pixels(pixels: Vec<u32>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ZeroSurface { width, height });
        }
        if pixels.len() != width * height {
            return Err(Error::SurfaceMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable view of the pixels. A slice, so the length stays fixed.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// One full row, `None` past the bottom edge.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        Some(&mut self.pixels[start..start + self.width])
    }

    #[inline]
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Alpha-blend `color` over the pixel at (x, y). Out-of-bounds writes are dropped.
    #[inline]
    pub fn blend(&mut self, x: usize, y: usize, color: u32, alpha: f32) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.pixels[idx] = mix(self.pixels[idx], color, alpha);
        }
    }

    /// Fill rows `y0..y1` of column `x` with one colour.
    pub fn vline(&mut self, x: usize, y0: usize, y1: usize, color: u32) {
        if x >= self.width {
            return;
        }
        let y1 = y1.min(self.height);
        let mut idx = y0 * self.width + x;
        for _ in y0..y1 {
            self.pixels[idx] = color;
            idx += self.width;
        }
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory, alpha left at 0
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[inline]
pub fn unpack_rgb(c: u32) -> (u8, u8, u8) {
    (((c >> 16) & 0xFF) as u8, ((c >> 8) & 0xFF) as u8, (c & 0xFF) as u8)
}

/// Linear mix of `a` towards `b` by `t` in [0, 1].
#[inline]
pub fn mix(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let (ar, ag, ab) = unpack_rgb(a);
    let (br, bg, bb) = unpack_rgb(b);
    let ch = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    pack_rgb(ch(ar, br), ch(ag, bg), ch(ab, bb))
}

/// Composite black at `opacity` over `c`.
#[inline]
pub fn darken(c: u32, opacity: f32) -> u32 {
    mix(c, 0, opacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert_eq!(
            FrameBuffer::new(0, 10).unwrap_err(),
            Error::ZeroSurface {
                width: 0,
                height: 10
            }
        );
    }

    #[test]
    fn from_pixels_checks_length() {
        let err = FrameBuffer::from_pixels(vec![0; 5], 2, 2).unwrap_err();
        assert_eq!(
            err,
            Error::SurfaceMismatch {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn pixel_views_keep_surface_length() {
        let mut fb = FrameBuffer::new(3, 2).unwrap();
        fb.pixels_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(fb.pixels().len(), fb.width() * fb.height());
        assert_eq!(fb.row_mut(1).map(|r| r.to_vec()), Some(vec![4, 5, 6]));
        assert!(fb.row_mut(2).is_none());
        assert_eq!(fb.get(2, 0), Some(3));
    }

    #[test]
    fn darken_extremes() {
        let c = pack_rgb(200, 100, 50);
        assert_eq!(darken(c, 0.0), c);
        assert_eq!(darken(c, 1.0), 0);
        assert_eq!(darken(c, 0.5), pack_rgb(100, 50, 25));
    }

    #[test]
    fn vline_clips_to_height() {
        let mut fb = FrameBuffer::new(3, 4).unwrap();
        fb.vline(1, 2, 100, 7);
        assert_eq!(fb.get(1, 1), Some(0));
        assert_eq!(fb.get(1, 2), Some(7));
        assert_eq!(fb.get(1, 3), Some(7));
        assert_eq!(fb.get(0, 3), Some(0));
    }
}
