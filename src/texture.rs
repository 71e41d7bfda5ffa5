//! Wall texture atlas: one horizontal strip cut into equal-width slices,
//! slice `i` textures wall type `i + 1`.

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct TextureAtlas {
    pixels: Vec<u32>, // 0RGB, row-major
    width: usize,
    height: usize,
    slice_width: usize,
}

impl TextureAtlas {
    pub fn new(pixels: Vec<u32>, width: usize, height: usize, slice_width: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidAtlas(format!(
                "atlas must be non-empty, got {width}x{height}"
            )));
        }
        if slice_width == 0 || width % slice_width != 0 {
            return Err(Error::InvalidAtlas(format!(
                "atlas width {width} is not a multiple of slice width {slice_width}"
            )));
        }
        if pixels.len() != width * height {
            return Err(Error::InvalidAtlas(format!(
                "{width}x{height} atlas needs {} pixels, got {}",
                width * height,
                pixels.len()
            )));
        }
        tracing::debug!(width, height, slice_width, "texture atlas ready");
        Ok(Self {
            pixels,
            width,
            height,
            slice_width,
        })
    }

    /// Build `slices` slices of `slice_width` x `height`, colouring each
    /// pixel with `f(slice, u, v)` where `u`/`v` are pixel coordinates
    /// inside the slice.
    pub fn from_fn(
        slices: usize,
        slice_width: usize,
        height: usize,
        f: impl Fn(usize, usize, usize) -> u32,
    ) -> Result<Self> {
        let width = slices * slice_width;
        let mut pixels = vec![0; width * height];
        for v in 0..height {
            for x in 0..width {
                pixels[v * width + x] = f(x / slice_width.max(1), x % slice_width.max(1), v);
            }
        }
        Self::new(pixels, width, height, slice_width)
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
    pub fn slice_width(&self) -> usize {
        self.slice_width
    }

    #[inline]
    pub fn slice_count(&self) -> usize {
        self.width / self.slice_width
    }

    /// Absolute atlas column for a face sample in [0, 1) on slice `index`.
    /// `None` when the atlas has no such slice.
    pub fn sample_column(&self, sample: f32, index: usize) -> Option<usize> {
        if index >= self.slice_count() {
            return None;
        }
        let offset = (sample * self.slice_width as f32).floor();
        let offset = if offset.is_finite() {
            (offset.max(0.0) as usize).min(self.slice_width - 1)
        } else {
            0
        };
        Some(index * self.slice_width + offset)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y.min(self.height - 1) * self.width + x.min(self.width - 1)]
    }
}
