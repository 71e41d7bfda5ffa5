//! Renderer configuration.
use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::framebuffer::pack_rgb;
use crate::world::Orientation;

/// Black overlay opacity applied to each wall orientation, independent of distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationShading {
    pub north_south: f32,
    pub east_west: f32,
}

impl OrientationShading {
    #[inline]
    pub fn opacity(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::NorthSouth => self.north_south,
            Orientation::EastWest => self.east_west,
        }
    }
}

impl Default for OrientationShading {
    fn default() -> Self {
        Self {
            north_south: 0.25,
            east_west: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Corrected distance at which walls are fully fogged.
    pub draw_distance: f32,
    /// Corrected distance at which fog starts.
    pub fog_distance: f32,
    /// Horizontal field of view in radians, handed to the camera.
    pub fov: f32,
    pub shading: OrientationShading,
    pub ceiling_color: u32,
    pub floor_color: u32,
    /// Flat fill for columns whose wall type has no atlas slice.
    pub fallback_color: u32,
    /// Side of the minimap square in the top-left corner; 0 disables it.
    pub minimap_size: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            draw_distance: 3200.0,
            fog_distance: 2400.0,
            fov: std::f32::consts::PI / 3.0,
            shading: OrientationShading::default(),
            ceiling_color: pack_rgb(70, 70, 110),
            floor_color: pack_rgb(60, 50, 40),
            fallback_color: pack_rgb(255, 0, 255),
            minimap_size: 250,
        }
    }
}

impl RendererConfig {
    /// Defaults overridden from environment variables.
    ///
    /// Environment variables:
    /// - `RAYCAST_DRAW_DISTANCE` - full-fog distance in world units (default: 3200)
    /// - `RAYCAST_FOG_DISTANCE` - fog start distance in world units (default: 2400)
    /// - `RAYCAST_FOV_DEGREES` - horizontal field of view (default: 60)
    /// - `RAYCAST_NS_SHADE` - north/south face darkening, 0..1 (default: 0.25)
    /// - `RAYCAST_EW_SHADE` - east/west face darkening, 0..1 (default: 0)
    /// - `RAYCAST_MINIMAP_SIZE` - minimap side in pixels, 0 disables (default: 250)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RendererConfig::from_env`], reading raw values through `get`.
    /// Malformed values are logged and leave the default in place.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| get(key).map(|raw| (key.to_owned(), raw));

        if let Some(d) = read("RAYCAST_DRAW_DISTANCE").and_then(parse_override::<f32>) {
            config.draw_distance = d;
        }
        if let Some(d) = read("RAYCAST_FOG_DISTANCE").and_then(parse_override::<f32>) {
            config.fog_distance = d;
        }
        if let Some(deg) = read("RAYCAST_FOV_DEGREES").and_then(parse_override::<f32>) {
            config.fov = deg.to_radians();
        }
        if let Some(a) = read("RAYCAST_NS_SHADE").and_then(parse_override::<f32>) {
            config.shading.north_south = a;
        }
        if let Some(a) = read("RAYCAST_EW_SHADE").and_then(parse_override::<f32>) {
            config.shading.east_west = a;
        }
        if let Some(px) = read("RAYCAST_MINIMAP_SIZE").and_then(parse_override::<usize>) {
            config.minimap_size = px;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        for (name, d) in [
            ("draw_distance", self.draw_distance),
            ("fog_distance", self.fog_distance),
        ] {
            if !(d.is_finite() && d >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {d}"
                )));
            }
        }
        for (name, a) in [
            ("north_south shading", self.shading.north_south),
            ("east_west shading", self.shading.east_west),
        ] {
            if !(0.0..=1.0).contains(&a) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {a}"
                )));
            }
        }
        if !(self.fov.is_finite() && self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(Error::InvalidConfig(format!(
                "field of view must be in (0, pi) radians, got {}",
                self.fov
            )));
        }
        Ok(())
    }

    /// Opacity of the black fog overlay at a corrected distance: 0 up to
    /// `fog_distance`, linear to 1 at `draw_distance`, 1 beyond.
    pub fn fog_opacity(&self, distance: f32) -> f32 {
        if !(distance > self.fog_distance) {
            return 0.0;
        }
        let span = self.draw_distance - self.fog_distance;
        if span <= 0.0 {
            return 1.0;
        }
        ((distance - self.fog_distance) / span).clamp(0.0, 1.0)
    }
}

/// Parse one `(key, raw value)` override, logging at `warn` and returning
/// `None` when the value does not parse.
pub fn parse_override<T: FromStr>((key, raw): (String, String)) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "ignoring malformed environment override");
            None
        }
    }
}
