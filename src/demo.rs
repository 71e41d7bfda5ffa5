//! Built-in level and procedural wall textures for the host binary.

use grid_raycaster::world::EMPTY;
use grid_raycaster::{GridMap, Result, TextureAtlas, pack_rgb};

pub const TILE: f32 = 64.0;
const TEX: usize = 64;

const LAYOUT: [&str; 16] = [
    "2222222222222222",
    "2..............2",
    "2..11....33....2",
    "2..11....33....2",
    "2..............2",
    "2......4.......2",
    "2.....444......2",
    "2......4.....1.2",
    "2............1.2",
    "2..3.........1.2",
    "2..3...........2",
    "2..3....22222..2",
    "2..............2",
    "2.1.1.1........2",
    "2..............2",
    "2222222222222222",
];

/// The demo level. Digits are wall types, `.` is floor.
pub fn level() -> Result<GridMap> {
    let rows: Vec<Vec<u16>> = LAYOUT
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| c.to_digit(10).map(|d| d as u16).unwrap_or(EMPTY))
                .collect()
        })
        .collect();
    GridMap::from_rows(&rows, TILE)
}

/// Spawn point in world units: the middle of cell (1, 1), facing east.
pub fn spawn() -> (f32, f32, f32) {
    (1.5 * TILE, 1.5 * TILE, 0.0)
}

/// Four slices: brick, stone checker, wood planks, metal panel.
pub fn atlas() -> Result<TextureAtlas> {
    TextureAtlas::from_fn(4, TEX, TEX, |slice, u, v| match slice {
        0 => brick(u, v),
        1 => checker(u, v),
        2 => planks(u, v),
        _ => panel(u, v),
    })
}

fn brick(u: usize, v: usize) -> u32 {
    let row = v / 16;
    let shift = if row % 2 == 0 { 0 } else { 16 };
    if v % 16 == 0 || (u + shift) % 32 == 0 {
        pack_rgb(170, 170, 160)
    } else {
        let n = ((u * 7 + v * 13) % 23) as u8;
        pack_rgb(150 + n, 60 + n / 2, 45)
    }
}

fn checker(u: usize, v: usize) -> u32 {
    if (u / 16 + v / 16) % 2 == 0 {
        pack_rgb(120, 120, 128)
    } else {
        pack_rgb(90, 90, 98)
    }
}

fn planks(u: usize, v: usize) -> u32 {
    if u % 16 == 0 {
        pack_rgb(60, 35, 15)
    } else {
        let grain = ((v * 3 + (u / 16) * 11) % 17) as u8;
        pack_rgb(130 + grain, 85 + grain / 2, 40)
    }
}

fn panel(u: usize, v: usize) -> u32 {
    let edge = u < 2 || v < 2 || u >= TEX - 2 || v >= TEX - 2;
    let rivet = (u == 6 || u == TEX - 7) && (v == 6 || v == TEX - 7);
    if edge || rivet {
        pack_rgb(40, 50, 60)
    } else {
        pack_rgb(80, 100, 120)
    }
}
