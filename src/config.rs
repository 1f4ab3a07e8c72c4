use std::num::NonZero;

use anyhow::Result;
use log::debug;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Deserializer};

use crate::buffer;
use crate::canvas::Region;
use crate::pixel::{PixelFormat, Rgba};

#[derive(Clone, Debug)]
pub struct CSSColor(csscolorparser::Color);

impl CSSColor {
    pub fn rgba(&self) -> [u8; 4] {
        self.0.to_rgba8()
    }

    /// Native color value in `format`
    pub fn pack(&self, format: PixelFormat) -> u32 {
        format.pack(Rgba::from(self.rgba()))
    }
}

impl<'de> Deserialize<'de> for CSSColor {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        csscolorparser::parse(&s)
            .map(CSSColor)
            .map_err(|err| serde::de::Error::custom(format_args!("invalid css color: {err:?}")))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurfaceConfig {
    pub width: NonZero<u16>,
    pub height: NonZero<u16>,
    pub pixel_format: PixelFormat,
    pub background: CSSColor,
}

impl SurfaceConfig {
    /// Allocate the surface filled with the background color
    pub fn create_surface(&self) -> buffer::Image {
        let color = self.background.pack(self.pixel_format);
        buffer::Image::new(self.width.get(), self.height.get(), self.pixel_format, color)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SceneConfig {
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Element {
    Rectangle(Rectangle),
    Line(Line),
    Image(Image),
    Text(Text),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rectangle {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub color: CSSColor,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Line {
    pub start: (i32, i32),
    pub end: (i32, i32),
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    pub color: CSSColor,
}

fn default_stroke_width() -> u32 {
    1
}

/// Image drawn from the caller's image map (`key`) or inline (`base64`)
#[derive(Clone, Debug, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub x: u16,
    #[serde(default)]
    pub y: u16,
    pub key: Option<NonEmptyString>,
    pub base64: Option<String>,
    /// Overrides the whole-image region at (x, y)
    pub region: Option<Region>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum TextLayout {
    /// Break lines between characters
    Chars,
    /// Break lines between words
    #[default]
    Words,
    /// Centered on the surface, `x` is ignored
    Centered,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub x: u16,
    #[serde(default)]
    pub y: u16,
    pub text: String,
    pub color: CSSColor,
    #[serde(default)]
    pub layout: TextLayout,
    /// 0 = limited by the surface width only
    #[serde(default)]
    pub max_width: u16,
}

pub fn parse_scene_config(data: Vec<u8>) -> Result<SceneConfig> {
    let data_str = String::from_utf8(data)?;
    let config = serde_json::from_str::<SceneConfig>(&data_str)?;
    debug!(
        "scene config: {}x{} {:?}, {} elements",
        config.surface.width,
        config.surface.height,
        config.surface.pixel_format,
        config.elements.len()
    );
    Ok(config)
}

pub fn parse_elements(data: Vec<u8>) -> Result<Vec<Element>> {
    let data_str = String::from_utf8(data)?;
    let elements = serde_json::from_str::<Vec<Element>>(&data_str)?;
    Ok(elements)
}
