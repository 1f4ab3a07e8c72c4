//! Still-image pipeline for small frame buffers.
//!
//! JPEG and raw files become [`Image`]s, images are placed in a [`Scene`]
//! and composited onto a surface, text is drawn with bitmap or
//! anti-aliased glyph [`Font`]s. A JSON scene description can be rendered
//! with [`canvas::draw_elements`].

pub mod buffer;
pub mod canvas;
pub mod config;
pub mod error;
pub mod font;
pub mod pixel;
pub mod raw;
pub mod scene;
pub mod text;
pub mod utils;

pub use buffer::Image;
pub use canvas::Region;
pub use error::GfxError;
pub use font::Font;
pub use pixel::{PixelFormat, Rgba};
pub use scene::{ObjectRef, Scene, SceneObject};
