//! Раскладка холста
//!
//! Чистая функция от размера QR-блока и конфигурации стиля: одинаковые
//! входы всегда дают одинаковую геометрию.

use serde::{Deserialize, Serialize};

use crate::style::StyleConfig;

/// Отступ со всех сторон
pub const PADDING: u32 = 40;
/// Место под заголовок
pub const TITLE_SPACE: u32 = 60;
/// Место под подзаголовок
pub const SUBTITLE_SPACE: u32 = 30;
/// Место под подпись с адресом
pub const ADDRESS_SPACE: u32 = 80;
/// Место под водяной знак
pub const WATERMARK_SPACE: u32 = 30;

const TITLE_Y: u32 = 30;
const SUBTITLE_GAP: u32 = 40;
const NO_TITLE_OFFSET: u32 = 20;
const ADDRESS_GAP: u32 = 20;

/// Геометрия холста и позиции элементов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// Дополнительная высота под текстовые элементы
    pub extra_height: u32,
    pub qr_position: (u32, u32),
    pub qr_size: u32,
    pub title_position: (u32, u32),
    pub subtitle_position: (u32, u32),
    pub address_position: (u32, u32),
    /// Учётная позиция логотипа (правый верхний угол)
    pub logo_position: (u32, u32),
    /// Якорь водяного знака (правый нижний угол)
    pub watermark_position: (u32, u32),
}

impl Layout {
    /// Раскладка для квадратного QR-блока стороной `qr_size` пикселей
    pub fn compute(qr_size: u32, config: &StyleConfig) -> Self {
        let padding = PADDING;
        let extra_height = extra_height(config);

        let width = qr_size + padding * 2;
        let height = qr_size + padding * 2 + extra_height;

        let qr_x = padding;
        let qr_y = padding + if config.has_title() { TITLE_SPACE } else { NO_TITLE_OFFSET };

        Self {
            width,
            height,
            padding,
            extra_height,
            qr_position: (qr_x, qr_y),
            qr_size,
            title_position: (padding, TITLE_Y),
            subtitle_position: (padding, TITLE_Y + SUBTITLE_GAP),
            address_position: (padding, qr_y + qr_size + ADDRESS_GAP),
            logo_position: (width.saturating_sub(padding + 50), 30),
            watermark_position: (width.saturating_sub(padding + 100), height.saturating_sub(30)),
        }
    }

    /// Прямоугольник QR-блока: (x, y, сторона)
    pub fn qr_rect(&self) -> (u32, u32, u32) {
        (self.qr_position.0, self.qr_position.1, self.qr_size)
    }
}

/// Сумма условных надбавок по высоте
pub fn extra_height(config: &StyleConfig) -> u32 {
    let mut extra = 0;
    if config.has_title() {
        extra += TITLE_SPACE;
    }
    if config.has_subtitle() {
        extra += SUBTITLE_SPACE;
    }
    if config.show_address {
        extra += ADDRESS_SPACE;
    }
    if config.has_watermark() {
        extra += WATERMARK_SPACE;
    }
    extra
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> StyleConfig {
        StyleConfig {
            title: String::new(),
            subtitle: String::new(),
            watermark: String::new(),
            show_address: false,
            ..StyleConfig::default()
        }
    }

    #[test]
    fn test_no_text_elements() {
        let layout = Layout::compute(444, &bare());
        assert_eq!(layout.width, 444 + 80);
        assert_eq!(layout.height, 444 + 2 * PADDING);
        assert_eq!(layout.extra_height, 0);
        assert_eq!(layout.qr_position, (40, 60));
    }

    #[test]
    fn test_each_element_adds_its_space() {
        let qr = 300;
        let base = qr + 2 * PADDING;

        let title = StyleConfig { title: "T".into(), ..bare() };
        assert_eq!(Layout::compute(qr, &title).height, base + 60);

        let subtitle = StyleConfig { subtitle: "S".into(), ..bare() };
        assert_eq!(Layout::compute(qr, &subtitle).height, base + 30);

        let address = StyleConfig { show_address: true, ..bare() };
        assert_eq!(Layout::compute(qr, &address).height, base + 80);

        let watermark = StyleConfig { watermark: "W".into(), ..bare() };
        assert_eq!(Layout::compute(qr, &watermark).height, base + 30);

        let all = StyleConfig {
            title: "T".into(),
            subtitle: "S".into(),
            show_address: true,
            watermark: "W".into(),
            ..bare()
        };
        assert_eq!(Layout::compute(qr, &all).height, base + 200);
    }

    #[test]
    fn test_positions() {
        let config = StyleConfig { title: "TITLE".into(), show_address: true, ..bare() };
        let layout = Layout::compute(348, &config);

        assert_eq!(layout.qr_position, (40, 100));
        assert_eq!(layout.title_position.1, 30);
        assert_eq!(layout.subtitle_position.1, 70);
        assert_eq!(layout.address_position, (40, 100 + 348 + 20));
        assert_eq!(layout.logo_position, (layout.width - 90, 30));
        assert_eq!(layout.watermark_position, (layout.width - 140, layout.height - 30));
        assert_eq!(layout.qr_rect(), (40, 100, 348));
    }

    #[test]
    fn test_pure_function() {
        let config = StyleConfig::default();
        assert_eq!(Layout::compute(500, &config), Layout::compute(500, &config));
    }
}
