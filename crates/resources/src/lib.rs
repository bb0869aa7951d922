//! Resource layer of the engine: logical paths resolved against mount points, texture
//! values (owned, shared, borrowed or vector) and a cache that loads each texture and
//! font once and releases textures nobody holds anymore.

mod backend;
mod config;
mod engine;
mod error;
mod font;
mod fs;
mod math;
mod path;
mod resources;
mod sprite;
pub mod strings;
mod texture;

#[cfg(test)]
mod testing;

pub use backend::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use font::*;
pub use fs::*;
pub use math::*;
pub use path::*;
pub use resources::*;
pub use sprite::*;
pub use texture::*;
