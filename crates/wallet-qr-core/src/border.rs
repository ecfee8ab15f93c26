//! Рельефная рамка вокруг QR-блока
//!
//! Верх и левый край светлее базового цвета, низ и правый темнее.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Отступ рамки наружу от области модулей
pub const BEVEL_OFFSET: i32 = 15;
/// Сдвиг каналов для светлого/тёмного тона
pub const BEVEL_DELTA: i16 = 40;
const LINE_WIDTH: u32 = 2;

/// Светлый и тёмный тона рамки
pub fn bevel_colors(base: Rgb<u8>) -> (Rgb<u8>, Rgb<u8>) {
    let shift = |delta: i16| {
        let mut out = base;
        for c in &mut out.0 {
            *c = (i16::from(*c) + delta).clamp(0, 255) as u8;
        }
        out
    };
    (shift(BEVEL_DELTA), shift(-BEVEL_DELTA))
}

/// Рамка вокруг QR-блока `(x, y, side)` с тихой зоной `quiet_zone` пикселей
pub fn draw_emboss(canvas: &mut RgbImage, qr_rect: (u32, u32, u32), quiet_zone: u32, base: Rgb<u8>) {
    let (light, dark) = bevel_colors(base);
    let (qx, qy, side) = (qr_rect.0 as i32, qr_rect.1 as i32, qr_rect.2 as i32);
    let inset = quiet_zone as i32 - BEVEL_OFFSET;

    let x0 = qx + inset;
    let y0 = qy + inset;
    let x1 = qx + side - inset;
    let y1 = qy + side - inset;
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let w = (x1 - x0 + 1) as u32;
    let h = (y1 - y0 + 1) as u32;

    // Light top/left
    draw_filled_rect_mut(canvas, Rect::at(x0, y0).of_size(w, LINE_WIDTH), light);
    draw_filled_rect_mut(canvas, Rect::at(x0, y0).of_size(LINE_WIDTH, h), light);

    // Dark bottom/right
    let edge = LINE_WIDTH as i32 - 1;
    draw_filled_rect_mut(canvas, Rect::at(x0, y1 - edge).of_size(w, LINE_WIDTH), dark);
    draw_filled_rect_mut(canvas, Rect::at(x1 - edge, y0).of_size(LINE_WIDTH, h), dark);
}
