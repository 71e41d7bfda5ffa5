use crate::camera::{Camera, CameraUpdate};
use crate::caster::{cast, column_angle, perpendicular_distance};
use crate::config::RendererConfig;
use crate::error::Result;
use crate::framebuffer::{FrameBuffer, darken, mix};
use crate::minimap::{MinimapRect, render_minimap};
use crate::texture::TextureAtlas;
use crate::world::GridMap;

// Floor for the corrected distance when deriving column height.
const MIN_DEPTH: f32 = 1e-4;

/// Per-frame column counts from the wall pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub textured: usize,
    pub fallback: usize,
    pub skipped: usize,
}

/// Column projector. Holds the camera and configuration between frames and
/// owns the depth buffer written by each wall pass.
pub struct Renderer {
    config: RendererConfig,
    camera: Camera,
    depth_buffer: Vec<Option<f32>>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Result<Self> {
        config.validate()?;
        let camera = Camera {
            fov: config.fov,
            ..Camera::default()
        };
        tracing::debug!(
            fov = config.fov,
            draw_distance = config.draw_distance,
            fog_distance = config.fog_distance,
            "renderer created"
        );
        Ok(Self {
            config,
            camera,
            depth_buffer: Vec::new(),
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RendererConfig) -> Result<()> {
        config.validate()?;
        self.camera.fov = config.fov;
        tracing::debug!(?config, "renderer config changed");
        self.config = config;
        Ok(())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Apply a partial camera update. Only `Some` fields change.
    pub fn set_camera(&mut self, update: CameraUpdate) -> Result<()> {
        self.camera.apply(update)?;
        self.config.fov = self.camera.fov;
        Ok(())
    }

    /// Corrected distance per column from the last wall pass; `None` where
    /// the ray hit nothing.
    pub fn depth_buffer(&self) -> &[Option<f32>] {
        &self.depth_buffer
    }

    /// Ceiling fades to black at the horizon, floor fades in from black.
    pub fn render_background(&self, fb: &mut FrameBuffer) {
        let height = fb.height();
        let mid = height / 2;

        for y in 0..mid {
            let color = mix(self.config.ceiling_color, 0, y as f32 / mid as f32);
            if let Some(row) = fb.row_mut(y) {
                row.fill(color);
            }
        }
        let lower = (height - mid).max(1) as f32;
        for y in mid..height {
            let color = mix(0, self.config.floor_color, (y - mid + 1) as f32 / lower);
            if let Some(row) = fb.row_mut(y) {
                row.fill(color);
            }
        }
    }

    /// Cast one ray per column and draw textured, shaded wall strips. Columns
    /// whose ray escapes the grid are left untouched.
    pub fn render_map(
        &mut self,
        fb: &mut FrameBuffer,
        map: &GridMap,
        atlas: &TextureAtlas,
    ) -> FrameStats {
        let (width, height) = (fb.width(), fb.height());
        self.depth_buffer.clear();
        self.depth_buffer.resize(width, None);

        let half_h = height as f32 * 0.5;
        let mut stats = FrameStats::default();

        for column in 0..width {
            let ray_angle = column_angle(&self.camera, column, width);
            let Some(hit) = cast(map, &self.camera, ray_angle) else {
                stats.skipped += 1;
                continue;
            };

            let depth = perpendicular_distance(&self.camera, ray_angle, hit.distance);
            self.depth_buffer[column] = Some(depth);

            let render_height = height as f32 * map.tile_size() / depth.max(MIN_DEPTH);
            let top = half_h - render_height * 0.5;
            let y0 = top.max(0.0).floor() as usize;
            let y1 = ((top + render_height).ceil().max(0.0) as usize).min(height);
            if y0 >= y1 {
                continue;
            }

            // Orientation shading and fog apply to every strip, fallback included.
            let shade = combine_overlays(
                self.config.shading.opacity(hit.orientation),
                self.config.fog_opacity(depth),
            );
            let index = hit.wall_type as usize - 1;
            let Some(src_x) = atlas.sample_column(hit.sample, index) else {
                fb.vline(column, y0, y1, darken(self.config.fallback_color, shade));
                stats.fallback += 1;
                continue;
            };

            let tex_h = atlas.height();
            let pixels = fb.pixels_mut();
            let mut idx = y0 * width + column;
            for y in y0..y1 {
                let v = (y as f32 + 0.5 - top) / render_height;
                let src_y = ((v * tex_h as f32) as usize).min(tex_h - 1);
                pixels[idx] = darken(atlas.pixel(src_x, src_y), shade);
                idx += width;
            }
            stats.textured += 1;
        }

        stats
    }

    /// Background, walls, then the minimap in the top-left corner.
    pub fn render_frame(
        &mut self,
        fb: &mut FrameBuffer,
        map: &GridMap,
        atlas: &TextureAtlas,
    ) -> Result<FrameStats> {
        self.render_background(fb);
        let stats = self.render_map(fb, map, atlas);

        let size = self.config.minimap_size.min(fb.width()).min(fb.height());
        if size > 0 {
            let rect = MinimapRect {
                x: 0,
                y: 0,
                width: size,
                height: size,
            };
            render_minimap(fb, map, &self.camera, rect)?;
        }

        tracing::trace!(
            textured = stats.textured,
            fallback = stats.fallback,
            skipped = stats.skipped,
            "frame rendered"
        );
        Ok(stats)
    }
}

/// Opacity of two black overlays stacked on each other.
#[inline]
pub fn combine_overlays(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a.clamp(0.0, 1.0)) * (1.0 - b.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::framebuffer::pack_rgb;
    use crate::world::EMPTY;

    const WHITE: u32 = 0x00FF_FFFF;

    fn white_atlas(slices: usize) -> TextureAtlas {
        TextureAtlas::from_fn(slices, 8, 8, |_, _, _| WHITE).unwrap()
    }

    fn renderer_at(x: f32, y: f32, angle: f32) -> Renderer {
        let mut r = Renderer::new(RendererConfig::default()).unwrap();
        r.set_camera(CameraUpdate::pose(x, y, angle)).unwrap();
        r
    }

    #[test]
    fn overlays_stack() {
        assert_eq!(combine_overlays(0.0, 0.0), 0.0);
        assert_eq!(combine_overlays(1.0, 0.3), 1.0);
        assert!((combine_overlays(0.5, 0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn set_camera_keeps_config_fov_in_sync() {
        let mut r = Renderer::new(RendererConfig::default()).unwrap();
        r.set_camera(CameraUpdate {
            fov: Some(1.2),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.config().fov, 1.2);
        assert_eq!(r.camera().fov, 1.2);
    }

    #[test]
    fn close_wall_fills_column_and_shades_by_orientation() {
        let map = GridMap::bordered(3, 3, 64.0, 1, EMPTY).unwrap();
        let mut fb = FrameBuffer::new(8, 32).unwrap();

        // Looking east: east/west face, no darkening by default.
        let mut r = renderer_at(96.0, 96.0, 0.0);
        r.render_map(&mut fb, &map, &white_atlas(1));
        assert_eq!(fb.get(4, 16), Some(WHITE));

        // Looking north: north/south face, darkened by 0.25.
        let mut r = renderer_at(96.0, 96.0, std::f32::consts::FRAC_PI_2);
        r.render_map(&mut fb, &map, &white_atlas(1));
        assert_eq!(fb.get(4, 16), Some(darken(WHITE, 0.25)));
    }

    #[test]
    fn unknown_wall_type_draws_fallback() {
        let map = GridMap::bordered(3, 3, 64.0, 5, EMPTY).unwrap();
        let mut fb = FrameBuffer::new(4, 16).unwrap();
        let mut r = renderer_at(96.0, 96.0, 0.0);
        let stats = r.render_map(&mut fb, &map, &white_atlas(2));
        assert_eq!(stats.fallback, 4);
        assert_eq!(fb.get(1, 8), Some(pack_rgb(255, 0, 255)));
        assert!(r.depth_buffer().iter().all(|d| d.is_some()));
    }

    #[test]
    fn far_wall_fades_to_black() {
        let config = RendererConfig {
            fog_distance: 10.0,
            draw_distance: 20.0,
            ..Default::default()
        };
        let mut r = Renderer::new(config).unwrap();
        r.set_camera(CameraUpdate::pose(96.0, 96.0, 0.0)).unwrap();
        let map = GridMap::bordered(3, 3, 64.0, 1, EMPTY).unwrap();
        let mut fb = FrameBuffer::new(4, 16).unwrap();
        fb.clear(WHITE);
        r.render_map(&mut fb, &map, &white_atlas(1));
        assert_eq!(fb.get(2, 8), Some(0));
    }

    #[test]
    fn background_is_dark_at_horizon() {
        let r = Renderer::new(RendererConfig::default()).unwrap();
        let mut fb = FrameBuffer::new(2, 10).unwrap();
        r.render_background(&mut fb);
        assert_eq!(fb.get(0, 0), Some(r.config().ceiling_color));
        assert_eq!(fb.get(0, 9), Some(r.config().floor_color));
        let (cr, cg, cb) = crate::framebuffer::unpack_rgb(fb.get(1, 4).unwrap_or(0));
        let (tr, tg, tb) = crate::framebuffer::unpack_rgb(r.config().ceiling_color);
        assert!(cr < tr && cg < tg && cb < tb);
    }

    #[test]
    fn fogged_fallback_fades_to_black() {
        let config = RendererConfig {
            fog_distance: 10.0,
            draw_distance: 20.0,
            ..Default::default()
        };
        let mut r = Renderer::new(config).unwrap();
        r.set_camera(CameraUpdate::pose(96.0, 96.0, 0.0)).unwrap();
        let map = GridMap::bordered(3, 3, 64.0, 9, EMPTY).unwrap();
        let mut fb = FrameBuffer::new(4, 16).unwrap();
        fb.clear(WHITE);

        let stats = r.render_map(&mut fb, &map, &white_atlas(1));
        assert_eq!(stats.fallback, 4);
        assert!((r.depth_buffer()[2].unwrap() - 32.0).abs() < 1e-3);
        assert_eq!(fb.get(2, 8), Some(0));
    }

    #[test]
    fn north_south_fallback_is_darkened() {
        let map = GridMap::bordered(3, 3, 64.0, 9, EMPTY).unwrap();
        let mut fb = FrameBuffer::new(8, 32).unwrap();
        let mut r = renderer_at(96.0, 96.0, std::f32::consts::FRAC_PI_2);
        r.render_map(&mut fb, &map, &white_atlas(1));
        let fallback = r.config().fallback_color;
        assert_eq!(fb.get(4, 16), Some(darken(fallback, 0.25)));
        assert_ne!(fb.get(4, 16), Some(fallback));
    }

    #[test]
    fn truncated_pixels_never_reach_the_renderer() {
        // A surface can only be built with a matching pixel count, so every
        // surface the renderer sees is consistent.
        assert!(matches!(
            FrameBuffer::from_pixels(vec![0; 10], 4, 16),
            Err(Error::SurfaceMismatch {
                expected: 64,
                actual: 10
            })
        ));

        let mut r = Renderer::new(RendererConfig::default()).unwrap();
        let map = GridMap::bordered(3, 3, 64.0, 1, EMPTY).unwrap();
        for (w, h) in [(1, 1), (1, 7), (7, 1), (4, 16)] {
            let mut fb = FrameBuffer::from_pixels(vec![0; w * h], w, h).unwrap();
            let stats = r.render_frame(&mut fb, &map, &white_atlas(1)).unwrap();
            assert_eq!(stats.textured + stats.fallback + stats.skipped, w);
            assert_eq!(fb.pixels().len(), w * h);
        }
    }
}
