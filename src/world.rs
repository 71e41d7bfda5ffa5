//! Tile grid and the grid-stepping ray query.
//!
//! World coordinates are in world units; cell `(cx, cy)` covers
//! `[cx * tile_size, (cx + 1) * tile_size)` on X and the same on Y, with
//! rows growing downwards. A wall type of `0` is empty floor.

use crate::camera::Camera;
use crate::error::{Error, Result};

pub type WallType = u16;

pub const EMPTY: WallType = 0;

/// Which kind of grid line the ray crossed to enter the hit cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Crossed a horizontal grid line; the face looks north or south.
    NorthSouth,
    /// Crossed a vertical grid line; the face looks east or west.
    EastWest,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Euclidean distance from the ray origin to the intersection, world units.
    pub distance: f32,
    pub orientation: Orientation,
    pub wall_type: WallType,
    /// Fractional position along the hit face, in [0, 1).
    pub sample: f32,
    pub cell: (usize, usize),
}

#[derive(Clone, Debug)]
pub struct GridMap {
    width: usize,
    height: usize,
    tile_size: f32,
    tiles: Vec<WallType>, // row-major
}

impl GridMap {
    pub fn new(width: usize, height: usize, tile_size: f32, tiles: Vec<WallType>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGrid(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        if tiles.len() != width * height {
            return Err(Error::InvalidGrid(format!(
                "{width}x{height} grid needs {} tiles, got {}",
                width * height,
                tiles.len()
            )));
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(Error::InvalidTileSize(tile_size));
        }
        tracing::debug!(width, height, tile_size, "grid map created");
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
        })
    }

    /// Build from rows of wall types. All rows must share one length.
    pub fn from_rows<R: AsRef<[WallType]>>(rows: &[R], tile_size: f32) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * height);
        for (j, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::InvalidGrid(format!(
                    "row {j} has {} tiles, expected {width}",
                    row.len()
                )));
            }
            tiles.extend_from_slice(row);
        }
        Self::new(width, height, tile_size, tiles)
    }

    /// A `width` x `height` grid filled with `fill`, ringed by `border`.
    pub fn bordered(
        width: usize,
        height: usize,
        tile_size: f32,
        border: WallType,
        fill: WallType,
    ) -> Result<Self> {
        let mut tiles = vec![fill; width * height];
        for j in 0..height {
            for i in 0..width {
                if i == 0 || j == 0 || i + 1 == width || j + 1 == height {
                    tiles[j * width + i] = border;
                }
            }
        }
        Self::new(width, height, tile_size, tiles)
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
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    #[inline]
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    #[inline]
    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    /// Wall type of a cell, `None` when out of bounds.
    #[inline]
    pub fn tile_at(&self, cx: isize, cy: isize) -> Option<WallType> {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return None;
        }
        Some(self.tiles[cy as usize * self.width + cx as usize])
    }

    pub fn set_tile(&mut self, cx: usize, cy: usize, wall: WallType) {
        if cx < self.width && cy < self.height {
            self.tiles[cy * self.width + cx] = wall;
        }
    }

    /// True if the world point lies in an empty cell. Outside the grid is solid.
    pub fn is_passable(&self, x: f32, y: f32) -> bool {
        let cx = (x / self.tile_size).floor() as isize;
        let cy = (y / self.tile_size).floor() as isize;
        self.tile_at(cx, cy) == Some(EMPTY)
    }

    /// Step a ray from `(origin_x, origin_y)` at `angle` through the grid and
    /// return the first non-empty cell it enters. `None` when the origin is
    /// outside the grid or the ray leaves the grid without a hit.
    ///
    /// The origin cell itself is never tested.
    pub fn cast_ray(&self, origin_x: f32, origin_y: f32, angle: f32) -> Option<RayHit> {
        // Work in tile space so each cell is 1x1.
        let px = origin_x / self.tile_size;
        let py = origin_y / self.tile_size;
        if !(px >= 0.0 && py >= 0.0 && px < self.width as f32 && py < self.height as f32) {
            return None;
        }

        let [dx, dy] = Camera::direction(angle);
        let mut cx = px.floor() as isize;
        let mut cy = py.floor() as isize;
        let (step_x, mut side_x, delta_x) = axis_walk(px, dx);
        let (step_y, mut side_y, delta_y) = axis_walk(py, dy);

        loop {
            let (t, orientation) = if side_x < side_y {
                let t = side_x;
                side_x += delta_x;
                cx += step_x;
                (t, Orientation::EastWest)
            } else {
                let t = side_y;
                side_y += delta_y;
                cy += step_y;
                (t, Orientation::NorthSouth)
            };
            if !t.is_finite() {
                return None;
            }

            let wall_type = self.tile_at(cx, cy)?;
            if wall_type == EMPTY {
                continue;
            }

            // Position along the crossed grid line, measured in world axes so
            // that neighbouring cells share one continuous coordinate.
            let along = match orientation {
                Orientation::EastWest => py + t * dy,
                Orientation::NorthSouth => px + t * dx,
            };
            return Some(RayHit {
                distance: t * self.tile_size,
                orientation,
                wall_type,
                sample: fract01(along),
                cell: (cx as usize, cy as usize),
            });
        }
    }
}

/// Step direction, distance to the first grid line, and distance between
/// grid lines along one axis. A zero component never reaches a line.
#[inline]
fn axis_walk(p: f32, d: f32) -> (isize, f32, f32) {
    if d > 0.0 {
        (1, (p.floor() + 1.0 - p) / d, 1.0 / d)
    } else if d < 0.0 {
        (-1, (p - p.floor()) / -d, -1.0 / d)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}

#[inline]
fn fract01(v: f32) -> f32 {
    let f = v - v.floor();
    // v just below an integer can round up to exactly 1.0
    if f >= 1.0 { 0.0 } else { f }
}
