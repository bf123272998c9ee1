//! Software rasterizer behind the default [`MapEngine`](crate::MapEngine)
//! render and encode services.
//!
//! It draws the map background and each visible layer's extent as a shaded
//! box. That is enough to preview the effect of size, extent, color and
//! status edits without a real cartographic backend.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::engine::RenderedImage;
use crate::error::{EngineError, EngineResult};
use crate::map::MapObj;
use crate::types::{Color, LayerStatus, Rect};

/// Grows `extent` so that it has the aspect ratio of a `width` x `height`
/// image, keeping it centred.
pub fn adjust_extent(extent: &mut Rect, width: u32, height: u32) {
    if width == 0 || height == 0 || !extent.is_valid() {
        return;
    }
    let cellsize = (extent.width() / f64::from(width)).max(extent.height() / f64::from(height));
    let ox = ((f64::from(width) * cellsize - extent.width()) / 2.0).max(0.0);
    let oy = ((f64::from(height) * cellsize - extent.height()) / 2.0).max(0.0);
    extent.minx -= ox;
    extent.maxx += ox;
    extent.miny -= oy;
    extent.maxy += oy;
}

fn blend(dst: &mut [u8], src: Color, opacity: i32) {
    let a = (f64::from(src.alpha) / 255.0) * (f64::from(opacity.clamp(0, 100)) / 100.0);
    for (d, s) in dst.iter_mut().zip([src.red, src.green, src.blue]) {
        *d = (f64::from(*d) * (1.0 - a) + f64::from(s) * a).round() as u8;
    }
    dst[3] = 0xff;
}

/// Draws `map` into a new image. See [`MapEngine::render`](crate::MapEngine::render).
pub fn draw_map(map: &mut MapObj, use_query_size: bool) -> EngineResult<RenderedImage> {
    let (w, h) = if use_query_size {
        (map.querymap.width, map.querymap.height)
    } else {
        (map.width, map.height)
    };
    let (Ok(width), Ok(height)) = (u32::try_from(w), u32::try_from(h)) else {
        return Err(EngineError::NoImage(format!("invalid image size {w}x{h}")));
    };
    if width == 0 || height == 0 {
        return Err(EngineError::NoImage(format!("invalid image size {w}x{h}")));
    }
    if map.maxsize > 0 && (w > map.maxsize || h > map.maxsize) {
        return Err(EngineError::NoImage(format!(
            "image size {w}x{h} exceeds maxsize {}",
            map.maxsize
        )));
    }
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| EngineError::NoImage(format!("image size {w}x{h} is too large")))?;
    if !map.extent.is_valid() {
        return Err(EngineError::NoImage("map extent is not set".into()));
    }

    adjust_extent(&mut map.extent, width, height);
    let extent = map.extent;

    let background = if map.imagecolor == Color::UNSET {
        Color::rgb(0xff, 0xff, 0xff)
    } else {
        map.imagecolor
    };
    let mut pixels = Vec::with_capacity(len);
    for _ in 0..len / 4 {
        pixels.extend_from_slice(&[background.red, background.green, background.blue, 0xff]);
    }

    let to_px = |x: f64, y: f64| -> (f64, f64) {
        (
            (x - extent.minx) / extent.width() * f64::from(width),
            (extent.maxy - y) / extent.height() * f64::from(height),
        )
    };

    for &index in map.layer_order() {
        let Some(layer) = map.layer(index) else {
            continue;
        };
        if layer.status == LayerStatus::Off || !layer.extent.is_valid() {
            continue;
        }
        let (x0, y0) = to_px(layer.extent.minx, layer.extent.maxy);
        let (x1, y1) = to_px(layer.extent.maxx, layer.extent.miny);
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(width)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(height)) as u32;
        let shade = 0x40 + ((index * 0x29) % 0x80) as u8;
        let fill = Color::rgb(shade, shade, shade);
        for py in clamp_y(y0)..clamp_y(y1) {
            for px in clamp_x(x0)..clamp_x(x1) {
                let offset = (py as usize * width as usize + px as usize) * 4;
                blend(&mut pixels[offset..offset + 4], fill, layer.opacity);
            }
        }
    }

    log::debug!("drew map \"{}\" at {width}x{height}", map.name);
    Ok(RenderedImage {
        width,
        height,
        pixels,
    })
}

/// Encodes `image`. Only PNG is supported.
pub fn encode(image: &RenderedImage, format: &str) -> EngineResult<Vec<u8>> {
    let format_lower = format.to_ascii_lowercase();
    if !matches!(format_lower.as_str(), "png" | "image/png" | "agg/png" | "png24") {
        return Err(EngineError::UnsupportedFormat(format.to_owned()));
    }
    let buffer = RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
        .ok_or_else(|| EngineError::Encode("pixel buffer does not match image size".into()))?;
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawable_map() -> MapObj {
        let mut map = MapObj::new();
        map.width = 40;
        map.height = 20;
        map.extent = Rect::new(0.0, 0.0, 100.0, 100.0);
        map
    }

    #[test]
    fn adjust_extent_matches_image_aspect() {
        let mut extent = Rect::new(0.0, 0.0, 100.0, 100.0);
        adjust_extent(&mut extent, 200, 100);
        assert_eq!(extent, Rect::new(-50.0, 0.0, 150.0, 100.0));
    }

    #[test]
    fn draw_uses_query_size_when_asked() {
        let mut map = drawable_map();
        map.querymap.width = 8;
        map.querymap.height = 8;
        let image = draw_map(&mut map, true).unwrap();
        assert_eq!((image.width, image.height), (8, 8));
        assert_eq!(image.pixels.len(), 8 * 8 * 4);
    }

    #[test]
    fn draw_mutates_extent() {
        let mut map = drawable_map();
        draw_map(&mut map, false).unwrap();
        assert_ne!(map.extent, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn draw_fails_without_size_or_extent() {
        let mut map = MapObj::new();
        assert!(matches!(draw_map(&mut map, false), Err(EngineError::NoImage(_))));
        map.width = 10;
        map.height = 10;
        assert!(matches!(draw_map(&mut map, false), Err(EngineError::NoImage(_))));
    }

    #[test]
    fn draw_refuses_sizes_over_maxsize() {
        let mut map = drawable_map();
        map.maxsize = 64;
        map.width = 65;
        assert!(matches!(draw_map(&mut map, false), Err(EngineError::NoImage(_))));

        map.querymap.width = i32::MAX;
        map.querymap.height = i32::MAX;
        assert!(matches!(draw_map(&mut map, true), Err(EngineError::NoImage(_))));
        assert_eq!(map.extent, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn background_uses_image_color() {
        let mut map = drawable_map();
        map.imagecolor = Color::rgb(10, 20, 30);
        let image = draw_map(&mut map, false).unwrap();
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 0xff]);
    }

    #[test]
    fn encode_png_signature() {
        let mut map = drawable_map();
        let image = draw_map(&mut map, false).unwrap();
        let bytes = encode(&image, "png").unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert!(matches!(
            encode(&image, "image/svg+xml"),
            Err(EngineError::UnsupportedFormat(_))
        ));
    }
}
