//! Overhead view of the grid with the camera's view wedge.

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::framebuffer::{FrameBuffer, pack_rgb};
use crate::world::{EMPTY, GridMap, WallType};

const FLOOR_COLOR: u32 = 0x0018_1818;
const WEDGE_RADIUS: f32 = 10.0;
const WEDGE_ALPHA: f32 = 0.365;

/// Screen rectangle the minimap is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimapRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Stable colour per wall type.
pub fn wall_color(wall: WallType) -> u32 {
    let k = wall as u32;
    let r = ((k * 97) % 200 + 40) as u8;
    let g = ((k * 57) % 200 + 40) as u8;
    let b = ((k * 31) % 200 + 40) as u8;
    pack_rgb(r, g, b)
}

/// Draw the grid into `rect`, shrinking its longer side to keep the grid's
/// aspect ratio, then outline the camera's field of view.
pub fn render_minimap(
    fb: &mut FrameBuffer,
    map: &GridMap,
    camera: &Camera,
    rect: MinimapRect,
) -> Result<()> {
    if rect.width == 0 || rect.height == 0 {
        return Err(Error::MissingMinimapDimensions);
    }

    let aspect = map.width() as f32 / map.height() as f32;
    let mut w = rect.width as f32;
    let mut h = rect.height as f32;
    if aspect < 1.0 {
        w *= aspect;
    }
    if aspect > 1.0 {
        h /= aspect;
    }
    let (w, h) = ((w.round() as usize).max(1), (h.round() as usize).max(1));

    for py in 0..h {
        let cy = py * map.height() / h;
        for px in 0..w {
            let cx = px * map.width() / w;
            let color = match map.tile_at(cx as isize, cy as isize) {
                Some(EMPTY) | None => FLOOR_COLOR,
                Some(wall) => wall_color(wall),
            };
            fb.set(rect.x + px, rect.y + py, color);
        }
    }

    let mx = rect.x as f32 + camera.pos[0] / map.world_width() * w as f32;
    let my = rect.y as f32 + camera.pos[1] / map.world_height() * h as f32;
    let green = pack_rgb(0, 255, 0);
    for (x, y) in wedge_outline(mx, my, camera.angle, camera.fov) {
        fb.blend(x, y, green, WEDGE_ALPHA);
    }
    Ok(())
}

/// Pixels of the view wedge outline: both edges plus the arc, each pixel once.
fn wedge_outline(mx: f32, my: f32, angle: f32, fov: f32) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    let mut push = |x: f32, y: f32| {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let p = (x as usize, y as usize);
        if !out.contains(&p) {
            out.push(p);
        }
    };

    let left = angle + fov * 0.5;
    let right = angle - fov * 0.5;
    let steps = WEDGE_RADIUS.ceil() as usize * 2;
    for edge in [left, right] {
        let [dx, dy] = Camera::direction(edge);
        for i in 0..=steps {
            let r = WEDGE_RADIUS * i as f32 / steps as f32;
            push(mx + dx * r, my + dy * r);
        }
    }
    let arc_steps = ((fov * WEDGE_RADIUS).ceil() as usize * 2).max(2);
    for i in 0..=arc_steps {
        let a = left - fov * i as f32 / arc_steps as f32;
        let [dx, dy] = Camera::direction(a);
        push(mx + dx * WEDGE_RADIUS, my + dy * WEDGE_RADIUS);
    }
    out
}
