//! Кодирование и запись результата
//!
//! Изображение целиком кодируется в память, пишется во временный файл
//! рядом с целевым и атомарно переименовывается. Читатель видит либо
//! прежний файл, либо готовый новый.

use std::io::Write;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageResult, RgbImage};
use tempfile::NamedTempFile;

use crate::error::GenerationError;

pub const DEFAULT_QUALITY: u8 = 95;

/// Формат выходного файла
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Без потерь (по умолчанию)
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Формат по расширению файла; всё, кроме `.jpg`/`.jpeg`, пишется как PNG
    pub fn from_path(path: &Path, quality: u8) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Self::Jpeg {
                quality: quality.clamp(1, 100),
            },
            _ => Self::Png,
        }
    }
}

/// Кодирование в байты выбранного формата
pub fn encode_image(img: &RgbImage, format: OutputFormat) -> ImageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let (width, height) = img.dimensions();

    match format {
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
            encoder.write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Jpeg { quality } => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            encoder.write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)?;
        }
    }

    Ok(buf)
}

/// Запись готовых байтов по итоговому пути.
/// При ошибке временный файл удаляется, существующий файл не трогается.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), GenerationError> {
    let io_error = |source: std::io::Error| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(bytes).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.png"), 95), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("qr.JPG"), 80), OutputFormat::Jpeg { quality: 80 });
        assert_eq!(OutputFormat::from_path(Path::new("qr.jpeg"), 0), OutputFormat::Jpeg { quality: 1 });
        assert_eq!(OutputFormat::from_path(Path::new("qr"), 95), OutputFormat::Png);
    }

    #[test]
    fn test_png_is_lossless() {
        let img = RgbImage::from_fn(16, 9, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 99]));
        let bytes = encode_image(&img, OutputFormat::Png).unwrap();
        assert_eq!(&bytes[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_jpeg_header() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let bytes = encode_image(&img, OutputFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_write_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("qr.png");
        let err = write_output(&path, b"data").unwrap_err();
        assert!(matches!(err, GenerationError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        std::fs::write(&path, b"old contents").unwrap();

        write_output(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");

        // Временных файлов не остаётся
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
