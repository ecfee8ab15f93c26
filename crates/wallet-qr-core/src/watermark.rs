//! Водяной знак
//!
//! Полупрозрачный текст, повторяющийся вдоль горизонтальной развёртки
//! через средину холста, смешивается с изображением через альфа-канал.

use image::imageops;
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};

use crate::fonts::FontHandle;

pub const WATERMARK_FONT_SIZE: u32 = 20;
/// Шаг между копиями текста
pub const WATERMARK_STEP: usize = 150;
/// Непрозрачность одной копии
pub const WATERMARK_ALPHA: u8 = 30;
const WATERMARK_GRAY: u8 = 200;

/// Накладывает водяной знак. Пустой текст оставляет изображение без изменений.
pub fn apply_watermark(img: RgbImage, text: &str, font: &FontHandle) -> RgbImage {
    if text.is_empty() {
        return img;
    }

    let (width, height) = img.dimensions();
    let overlay = watermark_layer(width, height, text, font);

    let mut base = DynamicImage::ImageRgb8(img).to_rgba8();
    imageops::overlay(&mut base, &overlay, 0, 0);
    DynamicImage::ImageRgba8(base).to_rgb8()
}

/// Прозрачный слой размером с холст с копиями текста
pub fn watermark_layer(width: u32, height: u32, text: &str, font: &FontHandle) -> RgbaImage {
    let mut layer = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    let y = (height / 2) as i32;
    let start = -(height as i32);
    let end = width as i32 + height as i32;

    for x in (start..end).step_by(WATERMARK_STEP) {
        font.rasterize(text, x, y, |px, py, coverage| {
            if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                return;
            }
            let alpha = (f32::from(WATERMARK_ALPHA) * coverage.clamp(0.0, 1.0)).round() as u8;
            let pixel = layer.get_pixel_mut(px as u32, py as u32);
            if alpha > pixel.0[3] {
                *pixel = Rgba([WATERMARK_GRAY, WATERMARK_GRAY, WATERMARK_GRAY, alpha]);
            }
        });
    }

    layer
}
