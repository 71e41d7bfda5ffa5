//! Presentation stretch from the fixed-height internal frame to the window.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use grid_raycaster::FrameBuffer;

/// For one axis: the two source samples feeding each destination pixel and
/// the 8.8 fixed-point weight of the second.
#[derive(Clone, Debug, Default)]
struct AxisTaps {
    near: Vec<usize>,
    far: Vec<usize>,
    weight: Vec<u32>,
}

impl AxisTaps {
    fn build(dst: usize, src: usize) -> Self {
        let ratio = src as f32 / dst.max(1) as f32;
        let last = src.saturating_sub(1);
        let mut taps = Self {
            near: Vec::with_capacity(dst),
            far: Vec::with_capacity(dst),
            weight: Vec::with_capacity(dst),
        };
        for i in 0..dst {
            let f = i as f32 * ratio;
            let lo = (f.floor() as usize).min(last);
            taps.near.push(lo);
            taps.far.push((lo + 1).min(last));
            taps.weight.push(((f - lo as f32) * 256.0).round() as u32);
        }
        taps
    }
}

/// Precomputed bilinear mapping from a window-sized target to a source frame.
#[derive(Clone, Debug, Default)]
pub struct Stretch {
    dst_w: usize,
    src_w: usize,
    cols: AxisTaps,
    rows: AxisTaps,
}

impl Stretch {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        Self {
            dst_w,
            src_w,
            cols: AxisTaps::build(dst_w, src_w),
            rows: AxisTaps::build(dst_h, src_h),
        }
    }

    pub fn dst_size(&self) -> (usize, usize) {
        (self.dst_w, self.rows.near.len())
    }

    /// Stretch `src` into `dst`. Rows are filled in parallel. `dst` must hold
    /// the destination size this stretch was built for and `src` must match
    /// its source width; anything else is left untouched.
    pub fn blit(&self, dst: &mut [u32], src: &FrameBuffer) {
        let (dw, dh) = self.dst_size();
        if dw == 0 || dst.len() != dw * dh || src.width() != self.src_w {
            return;
        }
        let sw = src.width();
        let px = src.pixels();

        dst.par_chunks_mut(dw).enumerate().for_each(|(y, out)| {
            let row0 = self.rows.near[y] * sw;
            let row1 = self.rows.far[y] * sw;
            let wy = self.rows.weight[y];

            for (x, o) in out.iter_mut().enumerate() {
                let (x0, x1, wx) = (self.cols.near[x], self.cols.far[x], self.cols.weight[x]);
                let top = lerp_rgb(px[row0 + x0], px[row0 + x1], wx);
                let bottom = lerp_rgb(px[row1 + x0], px[row1 + x1], wx);
                *o = lerp_rgb(top, bottom, wy);
            }
        });
    }
}

#[inline]
fn lerp_rgb(a: u32, b: u32, w256: u32) -> u32 {
    let inv = 256 - w256;
    // R and B share one multiply (00RR00BB), G gets its own
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}
