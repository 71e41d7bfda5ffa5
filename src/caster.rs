use crate::camera::Camera;
use crate::world::{GridMap, RayHit};

/// Angle of the ray for screen column `column` out of `columns`. Column 0
/// looks along `angle + fov / 2` and each column turns right by `fov / columns`.
#[inline]
pub fn column_angle(camera: &Camera, column: usize, columns: usize) -> f32 {
    let start = camera.angle + camera.fov * 0.5;
    let step = camera.fov / columns as f32;
    start - step * column as f32
}

/// Cast from the camera position at an absolute world angle.
#[inline]
pub fn cast(map: &GridMap, camera: &Camera, ray_angle: f32) -> Option<RayHit> {
    map.cast_ray(camera.pos[0], camera.pos[1], ray_angle)
}

/// Flatten a radial distance onto the view axis.
#[inline]
pub fn perpendicular_distance(camera: &Camera, ray_angle: f32, distance: f32) -> f32 {
    distance * (camera.angle - ray_angle).cos()
}
