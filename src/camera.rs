use std::f32::consts::PI;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: [f32; 2], // (x, y) position in world units
    pub angle: f32,    // radians, counter-clockwise on the map, 0 looks along +X
    pub fov: f32,      // horizontal field of view, radians
}

/// Partial camera update; `None` fields keep their previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraUpdate {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub angle: Option<f32>,
    pub fov: Option<f32>,
}

impl CameraUpdate {
    pub fn pose(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            angle: Some(angle),
            fov: None,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: [0.0, 0.0],
            angle: 0.0,
            fov: PI / 3.0,
        }
    }
}

impl Camera {
    pub fn new(x: f32, y: f32, angle: f32, fov: f32) -> Result<Self> {
        check_fov(fov)?;
        Ok(Self {
            pos: [x, y],
            angle,
            fov,
        })
    }

    pub fn apply(&mut self, update: CameraUpdate) -> Result<()> {
        if let Some(fov) = update.fov {
            check_fov(fov)?;
            self.fov = fov;
        }
        if let Some(x) = update.x {
            self.pos[0] = x;
        }
        if let Some(y) = update.y {
            self.pos[1] = y;
        }
        if let Some(angle) = update.angle {
            self.angle = angle;
        }
        Ok(())
    }

    /// Unit direction of a ray at `angle`. Grid rows grow downwards, so the
    /// y component is negated.
    #[inline]
    pub fn direction(angle: f32) -> [f32; 2] {
        [angle.cos(), -angle.sin()]
    }

    #[inline]
    pub fn forward(&self) -> [f32; 2] {
        Self::direction(self.angle)
    }

    /// Keep the heading in [-pi, pi] to avoid float drift.
    pub fn wrap_angle(&mut self) {
        if self.angle > PI {
            self.angle -= 2.0 * PI;
        }
        if self.angle < -PI {
            self.angle += 2.0 * PI;
        }
    }
}

fn check_fov(fov: f32) -> Result<()> {
    if fov.is_finite() && fov > 0.0 && fov < PI {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "field of view must be in (0, pi) radians, got {fov}"
        )))
    }
}
