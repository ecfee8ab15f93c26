//! Построение матрицы модулей
//!
//! Сам алгоритм кодирования QR делегирован крейту `qrcode`; здесь только
//! подбор версии и перевод результата в булеву матрицу.

use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::error::EncodingError;
use crate::style::ErrorCorrection;

/// Максимальная версия обычного QR-кода
pub const MAX_VERSION: u8 = 40;

impl From<ErrorCorrection> for EcLevel {
    fn from(ec: ErrorCorrection) -> Self {
        match ec {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Квадратная булева матрица модулей, `true` = тёмный модуль
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    modules: Vec<bool>,
    version: Option<u8>,
}

impl ModuleMatrix {
    /// Матрица из строк. Возвращает `None`, если строки не образуют квадрат.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            modules: rows.into_iter().flatten().collect(),
            version: None,
        })
    }

    /// Сторона матрицы в модулях
    pub fn size(&self) -> usize {
        self.size
    }

    /// Версия QR, которой закодирована матрица (если известна)
    pub fn version(&self) -> Option<u8> {
        self.version
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// Количество тёмных модулей
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

/// Кодирование текста, начиная с `min_version`.
///
/// Если данные не помещаются, версия увеличивается до первой подходящей.
pub fn encode(text: &str, min_version: u8, ec: ErrorCorrection) -> Result<ModuleMatrix, EncodingError> {
    if text.is_empty() {
        return Err(EncodingError::EmptyData);
    }
    if !(1..=MAX_VERSION).contains(&min_version) {
        return Err(EncodingError::InvalidVersion(min_version));
    }

    for version in min_version..=MAX_VERSION {
        match QrCode::with_version(text.as_bytes(), Version::Normal(i16::from(version)), ec.into()) {
            Ok(code) => {
                if version != min_version {
                    log::debug!("Data needs QR version {} (requested {})", version, min_version);
                }
                let size = code.width();
                let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
                return Ok(ModuleMatrix {
                    size,
                    modules,
                    version: Some(version),
                });
            }
            Err(QrError::DataTooLong) => continue,
            Err(e) => return Err(EncodingError::Encoder(e.to_string())),
        }
    }

    Err(EncodingError::DataTooLong { len: text.len(), ec })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_version_is_used() {
        let matrix = encode("0x1234567890abcdef1234567890abcdef12345678", 5, ErrorCorrection::H).unwrap();
        assert_eq!(matrix.version(), Some(5));
        // 17 + 4 * version
        assert_eq!(matrix.size(), 37);
        assert!(matrix.dark_count() > 0);
    }

    #[test]
    fn test_version_grows_to_fit() {
        let long = "A".repeat(200);
        let matrix = encode(&long, 1, ErrorCorrection::H).unwrap();
        assert!(matrix.version().unwrap() > 1);
        assert_eq!(matrix.size(), 17 + 4 * matrix.version().unwrap() as usize);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(encode("", 5, ErrorCorrection::L), Err(EncodingError::EmptyData)));
        assert!(matches!(encode("abc", 0, ErrorCorrection::L), Err(EncodingError::InvalidVersion(0))));
        assert!(matches!(encode("abc", 41, ErrorCorrection::L), Err(EncodingError::InvalidVersion(41))));

        let huge = "x".repeat(4000);
        assert!(matches!(
            encode(&huge, 1, ErrorCorrection::H),
            Err(EncodingError::DataTooLong { .. })
        ));
    }

    #[test]
    fn test_finder_pattern_corner() {
        let matrix = encode("hello", 1, ErrorCorrection::M).unwrap();
        // Верхний левый finder pattern: тёмная рамка 7x7, светлое кольцо, тёмный центр
        assert!(matrix.get(0, 0));
        assert!(matrix.get(0, 6));
        assert!(matrix.get(6, 0));
        assert!(!matrix.get(1, 1));
        assert!(matrix.get(3, 3));
        assert!(!matrix.get(7, 7));
    }

    #[test]
    fn test_from_rows() {
        assert!(ModuleMatrix::from_rows(vec![vec![true, false], vec![false]]).is_none());
        let m = ModuleMatrix::from_rows(vec![vec![true, false], vec![false, true]]).unwrap();
        assert!(m.get(0, 0) && m.get(1, 1) && !m.get(0, 1));
        assert!(!m.get(5, 5));
    }
}
