//! Наложение логотипа
//!
//! Логотип вписывается в круглую маску: непрозрачный внутренний круг и
//! полупрозрачное кольцо-тень по краю. Всё за пределами маски остаётся
//! нетронутым, данные под логотипом восстанавливаются коррекцией ошибок.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_ellipse_mut;

use crate::error::AssetError;

/// Прозрачность кольца-тени
pub const SHADOW_ALPHA: u8 = 100;
/// Поле маски вокруг логотипа (суммарно по обеим сторонам)
pub const MASK_MARGIN: u32 = 4;

/// Накладывает логотип из файла по центру QR-изображения.
///
/// При ошибке изображение не меняется, ошибка возвращается как предупреждение.
pub fn overlay_logo(qr: &mut RgbImage, path: &Path, logo_size: u32) -> Result<(), AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }

    let logo = image::open(path)
        .map_err(|e| AssetError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .to_rgba8();

    composite_logo(qr, &logo, logo_size);
    Ok(())
}

/// Наложение уже загруженного логотипа
pub fn composite_logo(qr: &mut RgbImage, logo: &RgbaImage, logo_size: u32) {
    if logo_size == 0 {
        return;
    }

    let logo = imageops::resize(logo, logo_size, logo_size, FilterType::Lanczos3);
    let mask = circular_mask(logo_size);
    let mask_size = mask.width();

    // Холст маски: тёмный под тенью, белый диск под логотипом
    let mut composite = RgbaImage::from_pixel(mask_size, mask_size, Rgba([0, 0, 0, 0]));
    let (center, inner_radius, _) = mask_geometry(logo_size);
    draw_filled_ellipse_mut(
        &mut composite,
        (center, center),
        inner_radius,
        inner_radius,
        Rgba([255, 255, 255, 255]),
    );
    let offset = i64::from((mask_size - logo_size) / 2);
    imageops::overlay(&mut composite, &logo, offset, offset);

    let pos = (i64::from(qr.width()) - i64::from(mask_size)).div_euclid(2);
    paste_with_mask(qr, &composite, &mask, pos, pos);
}

/// (центр, радиус внутреннего круга, радиус кольца-тени)
fn mask_geometry(logo_size: u32) -> (i32, i32, i32) {
    let mask_size = (logo_size + MASK_MARGIN) as i32;
    let center = mask_size / 2;
    let outer = (mask_size - 1) / 2;
    let inner = ((logo_size as i32 - 1) / 2).max(0);
    (center, inner, outer)
}

/// Маска диаметром `logo_size + 4`: 255 внутри логотипа, 100 в кольце, 0 снаружи
pub fn circular_mask(logo_size: u32) -> GrayImage {
    let mask_size = logo_size + MASK_MARGIN;
    let (center, inner, outer) = mask_geometry(logo_size);

    let mut mask = GrayImage::new(mask_size, mask_size);
    draw_filled_ellipse_mut(&mut mask, (center, center), outer, outer, Luma([SHADOW_ALPHA]));
    draw_filled_ellipse_mut(&mut mask, (center, center), inner, inner, Luma([255]));
    mask
}

fn paste_with_mask(dst: &mut RgbImage, src: &RgbaImage, mask: &GrayImage, x0: i64, y0: i64) {
    for (mx, my, m) in mask.enumerate_pixels() {
        let alpha = u32::from(m.0[0]);
        if alpha == 0 {
            continue;
        }
        let tx = x0 + i64::from(mx);
        let ty = y0 + i64::from(my);
        if tx < 0 || ty < 0 || tx >= i64::from(dst.width()) || ty >= i64::from(dst.height()) {
            continue;
        }

        let s = src.get_pixel(mx, my).0;
        let d = dst.get_pixel(tx as u32, ty as u32).0;
        let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * (255 - alpha) + 127) / 255) as u8;
        dst.put_pixel(tx as u32, ty as u32, Rgb([mix(s[0], d[0]), mix(s[1], d[1]), mix(s[2], d[2])]));
    }
}
