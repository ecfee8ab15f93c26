//! Текстовые элементы: заголовок, подзаголовок и подпись с адресом

use image::{Rgb, RgbImage};

use crate::error::ConfigError;
use crate::fonts::{FontCache, FontHandle};
use crate::layout::Layout;
use crate::style::StyleConfig;

pub const TITLE_FONT_SIZE: u32 = 28;
pub const SUBTITLE_FONT_SIZE: u32 = 16;
pub const LABEL_FONT_SIZE: u32 = 16;
pub const ADDRESS_FONT_SIZE: u32 = 14;
pub const FULL_ADDRESS_FONT_SIZE: u32 = 10;

pub const ADDRESS_LABEL: &str = "Wallet Address:";

const SUBTITLE_COLOR: Rgb<u8> = Rgb([0x7F, 0x8C, 0x8D]);
const LABEL_COLOR: Rgb<u8> = Rgb([0x2C, 0x3E, 0x50]);
const FULL_ADDRESS_COLOR: Rgb<u8> = Rgb([0x7F, 0x8C, 0x8D]);

/// Адрес длиннее этого значения сокращается
const SHORTEN_ABOVE: usize = 30;
const SHORT_PART: usize = 15;
/// Ширина строки полного адреса в символах
pub const WRAP_WIDTH: usize = 50;

const DISPLAY_ADDRESS_OFFSET: i32 = 25;
const FULL_ADDRESS_OFFSET: i32 = 30;
const FULL_ADDRESS_LINE_HEIGHT: i32 = 15;

/// Короткая форма адреса: `first15...last15`
pub fn display_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= SHORTEN_ABOVE {
        return address.to_string();
    }
    let head: String = chars[..SHORT_PART].iter().collect();
    let tail: String = chars[chars.len() - SHORT_PART..].iter().collect();
    format!("{head}...{tail}")
}

/// Полный адрес, разбитый на строки по `width` символов
pub fn wrap_address(address: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = address.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Текст поверх RGB-холста с учётом покрытия глифа
pub fn draw_text(canvas: &mut RgbImage, font: &FontHandle, x: i32, y: i32, color: Rgb<u8>, text: &str) {
    let (width, height) = canvas.dimensions();
    font.rasterize(text, x, y, |px, py, coverage| {
        if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height || coverage <= 0.0 {
            return;
        }
        let pixel = canvas.get_pixel_mut(px as u32, py as u32);
        let a = coverage.min(1.0);
        for (dst, src) in pixel.0.iter_mut().zip(color.0) {
            *dst = (f32::from(src) * a + f32::from(*dst) * (1.0 - a)).round() as u8;
        }
    });
}

/// Текст с обводкой толщиной `stroke_width`
pub fn draw_text_stroked(
    canvas: &mut RgbImage,
    font: &FontHandle,
    x: i32,
    y: i32,
    color: Rgb<u8>,
    stroke: Rgb<u8>,
    stroke_width: i32,
    text: &str,
) {
    for dy in -stroke_width..=stroke_width {
        for dx in -stroke_width..=stroke_width {
            if dx != 0 || dy != 0 {
                draw_text(canvas, font, x + dx, y + dy, stroke, text);
            }
        }
    }
    draw_text(canvas, font, x, y, color, text);
}

/// X для центрирования строки по ширине холста
fn centered_x(canvas_width: u32, text_width: u32) -> i32 {
    (canvas_width as i32 - text_width as i32).div_euclid(2)
}

/// Рендерер текстовых элементов
pub struct TextOverlay<'a> {
    fonts: &'a FontCache,
}

impl<'a> TextOverlay<'a> {
    pub fn new(fonts: &'a FontCache) -> Self {
        Self { fonts }
    }

    /// Заголовок, подзаголовок и подпись с адресом согласно конфигурации
    pub fn draw(
        &self,
        canvas: &mut RgbImage,
        layout: &Layout,
        config: &StyleConfig,
        address: &str,
    ) -> Result<(), ConfigError> {
        let fill = config.fill_rgb()?;
        let back = config.back_rgb()?;

        if config.has_title() {
            let font = self.fonts.resolve(TITLE_FONT_SIZE, true, false);
            let x = centered_x(layout.width, font.text_width(&config.title));
            let y = layout.title_position.1 as i32;
            draw_text_stroked(canvas, &font, x, y, fill, back, 1, &config.title);
        }

        if config.has_subtitle() {
            let font = self.fonts.resolve(SUBTITLE_FONT_SIZE, false, true);
            let x = centered_x(layout.width, font.text_width(&config.subtitle));
            let y = layout.subtitle_position.1 as i32;
            draw_text(canvas, &font, x, y, SUBTITLE_COLOR, &config.subtitle);
        }

        if config.show_address {
            self.draw_address(canvas, layout, fill, address);
        }

        Ok(())
    }

    fn draw_address(&self, canvas: &mut RgbImage, layout: &Layout, fill: Rgb<u8>, address: &str) {
        let (x, label_y) = (layout.address_position.0 as i32, layout.address_position.1 as i32);

        let label_font = self.fonts.resolve(LABEL_FONT_SIZE, true, false);
        draw_text(canvas, &label_font, x, label_y, LABEL_COLOR, ADDRESS_LABEL);

        let address_y = label_y + DISPLAY_ADDRESS_OFFSET;
        let address_font = self.fonts.resolve(ADDRESS_FONT_SIZE, false, false);
        draw_text(canvas, &address_font, layout.padding as i32, address_y, fill, &display_address(address));

        let small_font = self.fonts.resolve(FULL_ADDRESS_FONT_SIZE, false, false);
        let full_y = address_y + FULL_ADDRESS_OFFSET;
        for (i, line) in wrap_address(address, WRAP_WIDTH).iter().enumerate() {
            let y = full_y + i as i32 * FULL_ADDRESS_LINE_HEIGHT;
            draw_text(canvas, &small_font, layout.padding as i32, y, FULL_ADDRESS_COLOR, line);
        }
    }
}
