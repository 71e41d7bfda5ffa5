//! Grid raycasting engine: one ray per screen column through a tile map,
//! projected into textured, shaded wall strips plus an overhead minimap.

pub mod camera;
pub mod caster;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod minimap;
pub mod renderer;
pub mod texture;
pub mod world;

pub use camera::{Camera, CameraUpdate};
pub use config::{OrientationShading, RendererConfig};
pub use error::{Error, Result};
pub use framebuffer::{FrameBuffer, pack_rgb};
pub use renderer::{FrameStats, Renderer};
pub use texture::TextureAtlas;
pub use world::{GridMap, Orientation, RayHit, WallType};
