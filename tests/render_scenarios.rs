//! Whole-frame scenarios through the public API.

use grid_raycaster::caster::{cast, column_angle, perpendicular_distance};
use grid_raycaster::world::EMPTY;
use grid_raycaster::{
    CameraUpdate, FrameBuffer, GridMap, Orientation, Renderer, RendererConfig, TextureAtlas,
    pack_rgb,
};

const CLEAR: u32 = 0x0012_3456;

fn assert_close(a: f32, b: f32, tol: f32) {
    assert!((a - b).abs() <= tol, "{a} vs {b} (tol {tol})");
}

fn atlas(slices: usize) -> TextureAtlas {
    TextureAtlas::from_fn(slices, 16, 16, |s, u, v| pack_rgb(40 * s as u8 + 40, u as u8 * 8, v as u8 * 8))
        .unwrap()
}

fn renderer(x: f32, y: f32, angle: f32, fov: f32) -> Renderer {
    let config = RendererConfig {
        fov,
        minimap_size: 0,
        ..Default::default()
    };
    let mut r = Renderer::new(config).unwrap();
    r.set_camera(CameraUpdate::pose(x, y, angle)).unwrap();
    r
}

/// 10x10 grid of 64-unit tiles with a wall-type-2 perimeter.
fn perimeter_room() -> GridMap {
    GridMap::bordered(10, 10, 64.0, 2, EMPTY).unwrap()
}

#[test]
fn four_columns_from_room_center() {
    let map = perimeter_room();
    let mut r = renderer(320.0, 320.0, 0.0, 60f32.to_radians());
    let mut fb = FrameBuffer::new(4, 32).unwrap();
    fb.clear(CLEAR);

    let hits: Vec<_> = (0..4)
        .map(|c| {
            let angle = column_angle(r.camera(), c, 4);
            cast(&map, r.camera(), angle).expect("every column hits the perimeter")
        })
        .collect();
    assert!(hits.iter().all(|h| h.wall_type == 2));
    assert!(hits.iter().all(|h| h.orientation == Orientation::EastWest));

    // Columns 1 and 3 sit 15 degrees either side of the center column.
    assert_close(hits[1].distance, hits[3].distance, 1e-2);
    assert_close(hits[2].distance, 256.0, 1e-3);

    let stats = r.render_map(&mut fb, &map, &atlas(2));
    assert_eq!(stats.textured, 4);
    assert_eq!(stats.skipped, 0);

    let depth = r.depth_buffer();
    assert_eq!(depth.len(), 4);
    for d in depth {
        let d = d.expect("depth written");
        assert!(d.is_finite() && d > 0.0);
        // Flat wall facing the camera: every corrected distance is the same.
        assert_close(d, 256.0, 1e-2);
    }
}

#[test]
fn center_column_depth_equals_raw_distance() {
    let map = perimeter_room();
    let r = renderer(300.0, 270.0, 0.37, 1.0);
    let angle = r.camera().angle;
    let hit = cast(&map, r.camera(), angle).unwrap();
    assert_eq!(perpendicular_distance(r.camera(), angle, hit.distance), hit.distance);
}

#[test]
fn open_grid_leaves_frame_and_depth_untouched() {
    let map = GridMap::new(10, 10, 64.0, vec![EMPTY; 100]).unwrap();
    let mut r = renderer(320.0, 320.0, 0.0, 60f32.to_radians());
    let mut fb = FrameBuffer::new(4, 16).unwrap();
    fb.clear(CLEAR);

    let stats = r.render_map(&mut fb, &map, &atlas(2));
    assert_eq!(stats.skipped, 4);
    assert!(fb.pixels().iter().all(|&p| p == CLEAR));
    assert!(r.depth_buffer().iter().all(Option::is_none));
}

#[test]
fn rays_escaping_an_open_side_are_skipped() {
    // Perimeter with the east column removed.
    let mut map = perimeter_room();
    for row in 0..10 {
        map.set_tile(9, row, EMPTY);
    }
    let mut r = renderer(320.0, 320.0, 45f32.to_radians(), 60f32.to_radians());
    let mut fb = FrameBuffer::new(4, 16).unwrap();
    fb.clear(CLEAR);
    r.render_map(&mut fb, &map, &atlas(2));

    // Column 0 looks at 75 degrees: north wall.
    assert!(r.depth_buffer()[0].is_some());
    assert_ne!(fb.get(0, 8), Some(CLEAR));
    // Column 3 looks at 30 degrees: out through the open east side.
    assert!(r.depth_buffer()[3].is_none());
    for y in 0..16 {
        assert_eq!(fb.get(3, y), Some(CLEAR));
    }
}

#[test]
fn missing_texture_falls_back_without_failing_frame() {
    let map = GridMap::bordered(6, 6, 64.0, 7, EMPTY).unwrap();
    let mut r = Renderer::new(RendererConfig::default()).unwrap();
    r.set_camera(CameraUpdate::pose(192.0, 192.0, 0.0)).unwrap();
    let mut fb = FrameBuffer::new(32, 24).unwrap();

    let stats = r.render_frame(&mut fb, &map, &atlas(3)).unwrap();
    assert_eq!(stats.fallback, 32);
    assert_eq!(stats.textured, 0);
    // Minimap covers the top-left 24x24, so check a column right of it.
    assert_eq!(fb.get(28, 12), Some(r.config().fallback_color));
}

#[test]
fn partial_camera_update_keeps_other_fields() {
    let mut r = renderer(100.0, 200.0, 1.0, 1.0);
    r.set_camera(CameraUpdate {
        angle: Some(2.0),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(r.camera().pos, [100.0, 200.0]);
    assert_eq!(r.camera().angle, 2.0);
    assert_eq!(r.camera().fov, 1.0);
}

#[test]
fn nearer_walls_project_taller() {
    let map = perimeter_room();
    let atlas = atlas(2);
    let mut near = FrameBuffer::new(1, 200).unwrap();
    let mut far = FrameBuffer::new(1, 200).unwrap();
    near.clear(CLEAR);
    far.clear(CLEAR);

    renderer(500.0, 320.0, 0.0, 1.0).render_map(&mut near, &map, &atlas);
    renderer(100.0, 320.0, 0.0, 1.0).render_map(&mut far, &map, &atlas);

    let covered = |fb: &FrameBuffer| fb.pixels().iter().filter(|&&p| p != CLEAR).count();
    assert!(covered(&near) > covered(&far));
}
