//! Ошибки генерации
//!
//! Каждая стадия конвейера имеет собственный тип ошибки; наружу вызывающий
//! код видит только [`GenerationError`], который хранит исходную причину.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::ErrorCorrection;

/// Ошибки построения матрицы модулей
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Nothing to encode: input is empty")]
    EmptyData,

    #[error("Invalid QR version {0} (expected 1-40)")]
    InvalidVersion(u8),

    #[error("Data of {len} bytes does not fit any QR version at error correction {ec:?}")]
    DataTooLong { len: usize, ec: ErrorCorrection },

    #[error("Encoder failure: {0}")]
    Encoder(String),
}

/// Ошибки конфигурации стиля
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Box size must be greater than zero")]
    InvalidBoxSize,

    #[error("Logo size must be greater than zero when a logo is requested")]
    InvalidLogoSize,

    #[error("QR image side of {0} px exceeds the limit of {} px", crate::modules::MAX_IMAGE_SIDE)]
    CanvasTooLarge(u64),

    #[error("Unknown error correction level: {0:?} (expected L, M, Q or H)")]
    InvalidErrorCorrection(String),

    #[error("Invalid color for {field}: {value:?}")]
    InvalidColor { field: &'static str, value: String },

    #[error("Border emboss requires a #RRGGBB fill color, got {0:?}")]
    BorderColorNotHex(String),

    #[error("Unknown gradient palette: {0}")]
    UnknownPalette(String),

    #[error("Unsupported style extension: {0}")]
    UnknownExtension(String),

    #[error("Unknown style preset: {0}")]
    UnknownPreset(String),
}

/// Проблемы с внешними ресурсами (логотип).
///
/// Никогда не прерывают генерацию: попадают в список предупреждений результата.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetError {
    #[error("Logo file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not read logo {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

/// Единственная ошибка, которую видит вызывающий код
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("QR encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Invalid style configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
