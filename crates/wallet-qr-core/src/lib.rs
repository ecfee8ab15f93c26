//! Wallet QR Core - Модуль компоновки QR-кодов для адресов кошельков
//!
//! Библиотека превращает адрес и конфигурацию стиля в готовое изображение:
//! - Построение матрицы модулей с автоподбором версии
//! - Отрисовка модулей сплошным цветом или градиентной палитрой
//! - Логотип в круглой маске с тенью
//! - Фон (сплошной, градиентный, шумовой), рельефная рамка
//! - Заголовок, подзаголовок, подпись с адресом, водяной знак
//! - Пакетная генерация с изоляцией ошибок

pub mod background;
pub mod border;
pub mod encoder;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod logo;
pub mod modules;
pub mod output;
pub mod style;
pub mod text;
pub mod watermark;

pub use encoder::ModuleMatrix;
pub use error::{AssetError, ConfigError, EncodingError, GenerationError};
pub use fonts::{FontCache, FontHandle};
pub use layout::Layout;
pub use output::OutputFormat;
pub use style::{
    BackgroundStyle, ColorScheme, ErrorCorrection, GradientPalette, RenderMode, StyleConfig, StyleManager,
    StylePreset,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use modules::{ModuleFill, ModuleRenderer};
use text::TextOverlay;

/// Нефатальные проблемы, возникшие при генерации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// Логотип пропущен
    Logo(AssetError),
}

/// Результат успешной генерации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Путь к итоговому файлу
    pub filepath: PathBuf,
    /// Размер файла в байтах
    pub size_bytes: u64,
    /// (ширина, высота) в пикселях
    pub dimensions: (u32, u32),
    /// Закодированный адрес
    pub address: String,
    /// Имя применённого стиля
    pub style: String,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationResult {
    /// Размер файла в читаемом виде
    pub fn size_formatted(&self) -> String {
        format_file_size(self.size_bytes)
    }

    /// Был ли пропущен логотип
    pub fn has_asset_warning(&self) -> bool {
        self.warnings.iter().any(|w| matches!(w, GenerationWarning::Logo(_)))
    }
}

/// `1536` -> `"1.5 KB"`
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

/// Готовое изображение в памяти
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub image: RgbImage,
    pub layout: Layout,
    pub matrix: ModuleMatrix,
    pub warnings: Vec<GenerationWarning>,
}

/// Одна задача пакетной генерации
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub address: String,
    pub output_path: PathBuf,
    /// Собственный стиль задачи вместо стиля генератора
    pub style: Option<StyleConfig>,
}

impl BatchJob {
    pub fn new(address: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            address: address.into(),
            output_path: output_path.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = Some(style);
        self
    }
}

/// Задачи для списка адресов: `qr_{index:03}_{style}.png` в `output_dir`
pub fn batch_jobs<S: AsRef<str>>(addresses: &[S], output_dir: &Path, style: &str) -> Vec<BatchJob> {
    let safe_style: String = style
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            BatchJob::new(
                address.as_ref(),
                output_dir.join(format!("qr_{:03}_{}.png", i + 1, safe_style)),
            )
        })
        .collect()
}

/// Главный генератор: конвейер компоновки
#[derive(Debug, Clone)]
pub struct WalletQrGenerator {
    config: StyleConfig,
    fonts: Arc<FontCache>,
    quality: u8,
}

impl Default for WalletQrGenerator {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl WalletQrGenerator {
    /// Генератор с системными шрифтами
    pub fn new(config: StyleConfig) -> Self {
        Self::with_font_cache(config, Arc::new(FontCache::new()))
    }

    /// Генератор с общим кэшем шрифтов
    pub fn with_font_cache(config: StyleConfig, fonts: Arc<FontCache>) -> Self {
        Self {
            config,
            fonts,
            quality: output::DEFAULT_QUALITY,
        }
    }

    /// Качество для форматов с потерями (1-100)
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn font_cache(&self) -> &Arc<FontCache> {
        &self.fonts
    }

    /// Полная компоновка в памяти, без записи на диск
    pub fn render(&self, address: &str) -> Result<RenderedImage, GenerationError> {
        self.render_with(&self.config, address)
    }

    fn render_with(&self, config: &StyleConfig, address: &str) -> Result<RenderedImage, GenerationError> {
        config.validate()?;

        let preview: String = address.chars().take(30).collect();
        log::info!("Generating QR code for: {}...", preview);
        let mut warnings = Vec::new();

        // 1. Матрица модулей
        let matrix = encoder::encode(address, config.version, config.error_correction)?;
        log::debug!("Encoded {}x{} modules", matrix.size(), matrix.size());

        // 2. Модули
        let back = config.back_rgb()?;
        let fill = match config.render_mode {
            RenderMode::Solid => ModuleFill::Solid(config.fill_rgb()?),
            RenderMode::Gradient(palette) => ModuleFill::Gradient(palette),
        };
        let mut qr = ModuleRenderer::new(config.box_size, config.border).render(&matrix, fill, back)?;

        // 3. Логотип
        if config.add_logo {
            if let Some(path) = &config.logo_path {
                if let Err(e) = logo::overlay_logo(&mut qr, path, config.logo_size) {
                    log::warn!("Skipping logo: {}", e);
                    warnings.push(GenerationWarning::Logo(e));
                }
            }
        }

        // 4. Раскладка
        let layout = Layout::compute(qr.width(), config);
        log::debug!("Canvas {}x{}, QR at {:?}", layout.width, layout.height, layout.qr_position);

        // 5. Фон
        let mut canvas = background::render_background(layout.width, layout.height, config.background, &config.back_color);

        // 6. QR-блок
        let (qx, qy) = layout.qr_position;
        imageops::replace(&mut canvas, &qr, i64::from(qx), i64::from(qy));

        // 7. Рамка
        if config.show_border {
            let quiet_zone = config.border * config.box_size;
            border::draw_emboss(&mut canvas, layout.qr_rect(), quiet_zone, config.border_rgb()?);
        }

        // 8. Текст
        TextOverlay::new(&self.fonts).draw(&mut canvas, &layout, config, address)?;

        // 9. Водяной знак
        if config.has_watermark() {
            let font = self.fonts.resolve(watermark::WATERMARK_FONT_SIZE, false, true);
            canvas = watermark::apply_watermark(canvas, &config.watermark, &font);
        }

        Ok(RenderedImage {
            image: canvas,
            layout,
            matrix,
            warnings,
        })
    }

    /// Генерация и запись файла. Файл появляется только после полной компоновки.
    pub fn generate(&self, address: &str, output_path: &Path) -> Result<GenerationResult, GenerationError> {
        self.generate_with(&self.config, address, output_path)
    }

    fn generate_with(
        &self,
        config: &StyleConfig,
        address: &str,
        output_path: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let rendered = self.render_with(config, address)?;

        let format = OutputFormat::from_path(output_path, self.quality);
        let bytes = output::encode_image(&rendered.image, format)?;
        output::write_output(output_path, &bytes)?;

        log::info!(
            "Saved {} ({})",
            output_path.display(),
            format_file_size(bytes.len() as u64)
        );

        Ok(GenerationResult {
            filepath: output_path.to_path_buf(),
            size_bytes: bytes.len() as u64,
            dimensions: rendered.image.dimensions(),
            address: address.to_string(),
            style: config.name.clone(),
            warnings: rendered.warnings,
        })
    }

    /// Пакетная генерация. Ошибка одной задачи не прерывает остальные;
    /// результаты возвращаются в порядке задач. Кэш шрифтов общий для всех.
    pub fn generate_batch(&self, jobs: &[BatchJob]) -> Vec<Result<GenerationResult, GenerationError>> {
        log::info!("Starting batch of {} QR codes", jobs.len());

        let results: Vec<_> = jobs
            .par_iter()
            .enumerate()
            .map(|(i, job)| {
                let config = job.style.as_ref().unwrap_or(&self.config);
                let result = self.generate_with(config, &job.address, &job.output_path);
                if let Err(e) = &result {
                    log::warn!("Error generating QR for address {}: {}", i + 1, e);
                }
                result
            })
            .collect();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        log::info!("Batch complete: {}/{} generated", ok, jobs.len());
        results
    }
}
