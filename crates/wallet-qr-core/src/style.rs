//! Модуль стилей
//!
//! Конфигурация оформления QR-кода: цвета, пресеты, палитры градиента,
//! режим отрисовки модулей и фон холста.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::modules::{ModuleRenderer, MAX_IMAGE_SIDE, MIN_MATRIX_SIZE};

/// Уровень коррекции ошибок
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCorrection {
    L, // ~7%
    M, // ~15%
    Q, // ~25%
    H, // ~30%
}

impl FromStr for ErrorCorrection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            _ => Err(ConfigError::InvalidErrorCorrection(s.to_string())),
        }
    }
}

/// Именованная палитра градиента (3 цвета, используются циклически)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GradientPalette {
    Sunset,
    Ocean,
    Forest,
    Royal,
    Fire,
}

impl GradientPalette {
    pub const ALL: [GradientPalette; 5] = [
        GradientPalette::Sunset,
        GradientPalette::Ocean,
        GradientPalette::Forest,
        GradientPalette::Royal,
        GradientPalette::Fire,
    ];

    /// Цвета палитры в порядке обхода
    pub fn colors(self) -> [Rgb<u8>; 3] {
        match self {
            Self::Sunset => [Rgb([255, 107, 107]), Rgb([255, 167, 38]), Rgb([255, 193, 7])],
            Self::Ocean => [Rgb([41, 128, 185]), Rgb([52, 152, 219]), Rgb([93, 173, 226])],
            Self::Forest => [Rgb([39, 174, 96]), Rgb([46, 204, 113]), Rgb([88, 214, 141])],
            Self::Royal => [Rgb([142, 68, 173]), Rgb([155, 89, 182]), Rgb([165, 105, 189])],
            Self::Fire => [Rgb([231, 76, 60]), Rgb([235, 152, 78]), Rgb([241, 196, 15])],
        }
    }

    /// Цвет модуля (row, col): диагональные полосы
    pub fn color_at(self, row: usize, col: usize) -> Rgb<u8> {
        let colors = self.colors();
        colors[(row + col) % colors.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sunset => "sunset",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Royal => "royal",
            Self::Fire => "fire",
        }
    }
}

impl FromStr for GradientPalette {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPalette(s.to_string()))
    }
}

/// Режим отрисовки модулей
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Два цвета: `fill_color` на `back_color`
    #[default]
    Solid,
    /// Каждый тёмный модуль окрашивается цветом палитры по `(row + col) mod 3`
    Gradient(GradientPalette),
}

impl RenderMode {
    /// Перевод устаревшей карты расширений стиля (`gradient`, `gradient_name`)
    /// в явный режим. Неизвестные ключи считаются ошибкой конфигурации.
    pub fn from_extensions(extensions: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut gradient = false;
        let mut palette = GradientPalette::Sunset;

        for (key, value) in extensions {
            match key.as_str() {
                "gradient" => {
                    gradient = match value.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" | "on" => true,
                        "false" | "0" | "no" | "off" => false,
                        _ => return Err(ConfigError::UnknownExtension(format!("{key}={value}"))),
                    };
                }
                "gradient_name" => palette = value.parse()?,
                _ => return Err(ConfigError::UnknownExtension(key.clone())),
            }
        }

        Ok(if gradient { Self::Gradient(palette) } else { Self::Solid })
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::Gradient(_))
    }
}

/// Вариант фона холста
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    Solid,
    Gradient,
    /// Недетерминированная текстура, в пресетах не используется
    Noise,
}

/// Конфигурация оформления
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    /// Имя стиля, попадает в результат генерации
    pub name: String,
    /// Минимальная версия QR (1-40), энкодер растёт при нехватке ёмкости
    pub version: u8,
    pub error_correction: ErrorCorrection,
    /// Размер модуля в пикселях
    pub box_size: u32,
    /// Тихая зона в модулях
    pub border: u32,
    pub fill_color: String,
    pub back_color: String,
    pub title: String,
    pub subtitle: String,
    pub watermark: String,
    pub show_address: bool,
    /// Рельефная рамка вокруг QR
    pub show_border: bool,
    pub add_logo: bool,
    pub logo_path: Option<PathBuf>,
    pub logo_size: u32,
    pub render_mode: RenderMode,
    pub background: BackgroundStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            name: "standard".to_string(),
            version: 5,
            error_correction: ErrorCorrection::H,
            box_size: 12,
            border: 4,
            fill_color: "#2E86C1".to_string(),
            back_color: "white".to_string(),
            title: "CRYPTO WALLET".to_string(),
            subtitle: String::new(),
            watermark: String::new(),
            show_address: true,
            show_border: true,
            add_logo: false,
            logo_path: None,
            logo_size: 80,
            render_mode: RenderMode::Solid,
            background: BackgroundStyle::Solid,
        }
    }
}

impl StyleConfig {
    /// Конфигурация из пресета
    pub fn from_preset(preset: StylePreset) -> Self {
        preset.config()
    }

    /// Конфигурация из имени пресета (без учёта регистра)
    pub fn from_preset_name(name: &str) -> Result<Self, ConfigError> {
        Ok(name.parse::<StylePreset>()?.config())
    }

    /// Применить цветовую схему (цвет модулей и фона)
    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.fill_color = scheme.fill().to_string();
        self.back_color = scheme.background().to_string();
        self
    }

    /// Проверка инвариантов до начала генерации
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.box_size == 0 {
            return Err(ConfigError::InvalidBoxSize);
        }
        // Даже матрица версии 1 должна поместиться в допустимый размер
        ModuleRenderer::new(self.box_size, self.border).side_for(MIN_MATRIX_SIZE)?;
        if self.add_logo && self.logo_path.is_some() && (self.logo_size == 0 || self.logo_size > MAX_IMAGE_SIDE) {
            return Err(ConfigError::InvalidLogoSize);
        }
        self.fill_rgb()?;
        self.back_rgb()?;
        if self.show_border {
            self.border_rgb()?;
        }
        Ok(())
    }

    pub fn fill_rgb(&self) -> Result<Rgb<u8>, ConfigError> {
        parse_color("fill_color", &self.fill_color)
    }

    pub fn back_rgb(&self) -> Result<Rgb<u8>, ConfigError> {
        parse_color("back_color", &self.back_color)
    }

    /// Базовый цвет рельефной рамки: только `#RRGGBB`
    pub fn border_rgb(&self) -> Result<Rgb<u8>, ConfigError> {
        parse_hex6(&self.fill_color).ok_or_else(|| ConfigError::BorderColorNotHex(self.fill_color.clone()))
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    pub fn has_subtitle(&self) -> bool {
        !self.subtitle.is_empty()
    }

    pub fn has_watermark(&self) -> bool {
        !self.watermark.is_empty()
    }
}

/// Цвет в форме `#RRGGBB`
pub fn parse_hex6(value: &str) -> Option<Rgb<u8>> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Цвет: `#RRGGBB`, `#RGB` или одно из базовых имён
pub fn parse_color(field: &'static str, value: &str) -> Result<Rgb<u8>, ConfigError> {
    let invalid = || ConfigError::InvalidColor { field, value: value.to_string() };
    let trimmed = value.trim();

    if let Some(rgb) = parse_hex6(trimmed) {
        return Ok(rgb);
    }

    if let Some(short) = trimmed.strip_prefix('#') {
        if short.len() == 3 && short.chars().all(|c| c.is_ascii_hexdigit()) {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(short.chars()) {
                let nibble = c.to_digit(16).ok_or_else(invalid)? as u8;
                *slot = nibble * 17;
            }
            return Ok(Rgb(out));
        }
        return Err(invalid());
    }

    let named = match trimmed.to_ascii_lowercase().as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "navy" => [0, 0, 128],
        "gold" => [255, 215, 0],
        "silver" => [192, 192, 192],
        _ => return Err(invalid()),
    };
    Ok(Rgb(named))
}

/// Цветовые схемы
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColorScheme {
    Blue,
    Green,
    Red,
    Purple,
    Dark,
    Gradient,
    Gold,
    Silver,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 8] = [
        ColorScheme::Blue,
        ColorScheme::Green,
        ColorScheme::Red,
        ColorScheme::Purple,
        ColorScheme::Dark,
        ColorScheme::Gradient,
        ColorScheme::Gold,
        ColorScheme::Silver,
    ];

    /// (fill, background, text, description)
    fn palette(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::Blue => ("#2E86C1", "#F8F9F9", "#2C3E50", "Professional blue theme"),
            Self::Green => ("#27AE60", "#F8F9F9", "#145A32", "Fresh green theme"),
            Self::Red => ("#E74C3C", "#FDF2F0", "#922B21", "Vibrant red theme"),
            Self::Purple => ("#8E44AD", "#F9F0FF", "#4A235A", "Royal purple theme"),
            Self::Dark => ("#27AE60", "#1C2833", "#BDC3C7", "Dark mode theme"),
            Self::Gradient => ("#FF6B6B", "#F8F9F9", "#2C3E50", "Gradient color theme"),
            Self::Gold => ("#F39C12", "#FEF9E7", "#7D6608", "Premium gold theme"),
            Self::Silver => ("#7F8C8D", "#F8F9F9", "#2C3E50", "Elegant silver theme"),
        }
    }

    pub fn fill(self) -> &'static str {
        self.palette().0
    }

    pub fn background(self) -> &'static str {
        self.palette().1
    }

    pub fn text_color(self) -> &'static str {
        self.palette().2
    }

    pub fn description(self) -> &'static str {
        self.palette().3
    }
}

/// Закрытый набор пресетов
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Professional,
    Minimalist,
    Dark,
    Gradient,
    Business,
    Premium,
}

impl StylePreset {
    pub const ALL: [StylePreset; 6] = [
        StylePreset::Professional,
        StylePreset::Minimalist,
        StylePreset::Dark,
        StylePreset::Gradient,
        StylePreset::Business,
        StylePreset::Premium,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Professional => "professional",
            Self::Minimalist => "minimalist",
            Self::Dark => "dark",
            Self::Gradient => "gradient",
            Self::Business => "business",
            Self::Premium => "premium",
        }
    }

    pub fn config(self) -> StyleConfig {
        let base = StyleConfig {
            name: self.name().to_string(),
            ..StyleConfig::default()
        };

        match self {
            Self::Professional => StyleConfig {
                title: "CRYPTO WALLET ADDRESS".into(),
                subtitle: "Secure Digital Asset Storage".into(),
                add_logo: true,
                logo_size: 100,
                ..base
            },
            Self::Minimalist => StyleConfig {
                version: 4,
                error_correction: ErrorCorrection::Q,
                box_size: 15,
                border: 3,
                fill_color: "black".into(),
                title: String::new(),
                show_address: false,
                show_border: false,
                ..base
            },
            Self::Dark => StyleConfig {
                box_size: 10,
                fill_color: "#27AE60".into(),
                back_color: "#1C2833".into(),
                subtitle: "Scan to Transfer".into(),
                ..base
            },
            Self::Gradient => StyleConfig {
                version: 4,
                border: 3,
                fill_color: "#FF6B6B".into(),
                title: "WALLET ADDRESS".into(),
                subtitle: "Digital Currency".into(),
                render_mode: RenderMode::Gradient(GradientPalette::Sunset),
                background: BackgroundStyle::Gradient,
                ..base
            },
            Self::Business => StyleConfig {
                version: 6,
                box_size: 10,
                fill_color: "#2C3E50".into(),
                title: "BUSINESS WALLET".into(),
                subtitle: "Official Corporate Address".into(),
                add_logo: true,
                logo_size: 120,
                ..base
            },
            Self::Premium => StyleConfig {
                version: 7,
                box_size: 14,
                border: 6,
                fill_color: "#F39C12".into(),
                back_color: "#FEF9E7".into(),
                title: "PREMIUM WALLET".into(),
                subtitle: "Gold Standard Security".into(),
                add_logo: true,
                logo_size: 150,
                watermark: "VERIFIED".into(),
                ..base
            },
        }
    }
}

impl FromStr for StylePreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Реестр именованных стилей (в памяти)
#[derive(Debug, Clone)]
pub struct StyleManager {
    styles: BTreeMap<String, StyleConfig>,
}

impl Default for StyleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleManager {
    /// Реестр со всеми встроенными пресетами
    pub fn new() -> Self {
        let styles = StylePreset::ALL
            .into_iter()
            .map(|p| (p.name().to_string(), p.config()))
            .collect();
        Self { styles }
    }

    pub fn get_style(&self, name: &str) -> Option<&StyleConfig> {
        self.styles.get(&name.to_ascii_lowercase())
    }

    pub fn add_style(&mut self, name: &str, config: StyleConfig) {
        self.styles.insert(name.to_ascii_lowercase(), config);
    }

    pub fn list_styles(&self) -> Vec<&str> {
        self.styles.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StyleConfig::default();
        assert_eq!(config.version, 5);
        assert_eq!(config.error_correction, ErrorCorrection::H);
        assert_eq!(config.box_size, 12);
        assert_eq!(config.border, 4);
        assert_eq!(config.fill_color, "#2E86C1");
        assert_eq!(config.back_color, "white");
        assert_eq!(config.title, "CRYPTO WALLET");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        for preset in StylePreset::ALL {
            let config = StyleConfig::from_preset(preset);
            assert_eq!(config.name, preset.name());
            assert!(config.validate().is_ok(), "{} must validate", preset.name());
        }

        let minimalist = StyleConfig::from_preset_name("Minimalist").unwrap();
        assert!(!minimalist.show_address);
        assert_eq!(minimalist.fill_color, "black");

        let dark = StyleConfig::from_preset(StylePreset::Dark);
        assert_eq!(dark.back_color, "#1C2833");

        let gradient = StyleConfig::from_preset(StylePreset::Gradient);
        assert_eq!(gradient.render_mode, RenderMode::Gradient(GradientPalette::Sunset));

        assert!(matches!(
            StyleConfig::from_preset_name("neon"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_palette_cycle() {
        let palette = GradientPalette::Ocean;
        let colors = palette.colors();
        assert_eq!(palette.color_at(0, 0), colors[0]);
        assert_eq!(palette.color_at(1, 0), colors[1]);
        assert_eq!(palette.color_at(2, 2), colors[1]);
        assert_eq!(palette.color_at(5, 7), colors[0]);
        assert_eq!("FIRE".parse::<GradientPalette>().unwrap(), GradientPalette::Fire);
        assert!("rainbow".parse::<GradientPalette>().is_err());
    }

    #[test]
    fn test_render_mode_from_extensions() {
        let mut ext = BTreeMap::new();
        assert_eq!(RenderMode::from_extensions(&ext).unwrap(), RenderMode::Solid);

        ext.insert("gradient".to_string(), "true".to_string());
        assert_eq!(
            RenderMode::from_extensions(&ext).unwrap(),
            RenderMode::Gradient(GradientPalette::Sunset)
        );

        ext.insert("gradient_name".to_string(), "royal".to_string());
        assert_eq!(
            RenderMode::from_extensions(&ext).unwrap(),
            RenderMode::Gradient(GradientPalette::Royal)
        );

        ext.insert("sparkles".to_string(), "true".to_string());
        assert!(matches!(
            RenderMode::from_extensions(&ext),
            Err(ConfigError::UnknownExtension(_))
        ));
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_color("fill_color", "#2E86C1").unwrap(), Rgb([0x2E, 0x86, 0xC1]));
        assert_eq!(parse_color("fill_color", "#fff").unwrap(), Rgb([255, 255, 255]));
        assert_eq!(parse_color("fill_color", "Black").unwrap(), Rgb([0, 0, 0]));
        assert!(parse_color("fill_color", "#12345").is_err());
        assert!(parse_color("fill_color", "chartreuse-ish").is_err());
        assert_eq!(parse_hex6("black"), None);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let config = StyleConfig { box_size: 0, ..StyleConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBoxSize)));

        let config = StyleConfig {
            fill_color: "black".into(),
            show_border: true,
            ..StyleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BorderColorNotHex(_))));

        let config = StyleConfig {
            fill_color: "black".into(),
            show_border: false,
            ..StyleConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_config() {
        let config = StyleConfig { box_size: 100_000_000, ..StyleConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::CanvasTooLarge(_))));

        let config = StyleConfig { border: u32::MAX, ..StyleConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::CanvasTooLarge(_))));

        let config = StyleConfig {
            add_logo: true,
            logo_path: Some(PathBuf::from("logo.png")),
            logo_size: u32::MAX,
            ..StyleConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogoSize)));
    }

    #[test]
    fn test_error_correction_parsing() {
        assert_eq!("h".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::H);
        assert_eq!(" Q ".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Q);
        match "X".parse::<ErrorCorrection>() {
            Err(ConfigError::InvalidErrorCorrection(level)) => assert_eq!(level, "X"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_color_schemes() {
        for scheme in ColorScheme::ALL {
            assert!(scheme.fill().starts_with('#'));
            assert!(parse_color("back_color", scheme.background()).is_ok());
            assert!(!scheme.description().is_empty());
        }
        let config = StyleConfig::default().with_color_scheme(ColorScheme::Gold);
        assert_eq!(config.fill_color, "#F39C12");
        assert_eq!(config.back_color, "#FEF9E7");
    }

    #[test]
    fn test_style_manager() {
        let mut manager = StyleManager::new();
        assert_eq!(manager.list_styles().len(), 6);
        assert!(manager.get_style("PROFESSIONAL").is_some());

        let custom = StyleConfig { title: "CUSTOM WALLET".into(), ..StyleConfig::default() };
        manager.add_style("Custom", custom);
        assert!(manager.list_styles().contains(&"custom"));
        assert_eq!(manager.get_style("custom").unwrap().title, "CUSTOM WALLET");
    }
}
