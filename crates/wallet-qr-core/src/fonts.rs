//! Подбор шрифтов
//!
//! `FontCache::resolve` никогда не падает: перебирает упорядоченный список
//! кандидатов и, если ни один файл не загрузился, отдаёт встроенный
//! растровый шрифт 5x7.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use parking_lot::RwLock;

const REGULAR: &[&str] = &[
    "arial.ttf",
    "Arial.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

const BOLD: &[&str] = &[
    "arialbd.ttf",
    "Arial Bold.ttf",
    "/System/Library/Fonts/Arial Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
];

const ITALIC: &[&str] = &[
    "ariali.ttf",
    "Arial Italic.ttf",
    "/System/Library/Fonts/Arial Italic.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
];

const BOLD_ITALIC: &[&str] = &[
    "arialbi.ttf",
    "Arial Bold Italic.ttf",
    "/System/Library/Fonts/Arial Bold Italic.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
];

/// Общие семейства, пробуются после списков по начертанию
const GENERIC: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Ubuntu-R.ttf",
    "Roboto-Regular.ttf",
];

/// Ключ кэша: (размер, жирный, курсив)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

/// Готовый к отрисовке шрифт
#[derive(Clone)]
pub enum FontHandle {
    /// Векторный шрифт из файла
    Outline {
        font: Arc<FontVec>,
        scale: PxScale,
        source: PathBuf,
    },
    /// Встроенный растровый 5x7, масштабируется целым множителем
    Builtin { size: u32, bold: bool },
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline { scale, source, .. } => f
                .debug_struct("Outline")
                .field("scale", &scale.y)
                .field("source", source)
                .finish(),
            Self::Builtin { size, bold } => f
                .debug_struct("Builtin")
                .field("size", size)
                .field("bold", bold)
                .finish(),
        }
    }
}

impl FontHandle {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin { .. })
    }

    /// Ширина строки в пикселях
    pub fn text_width(&self, text: &str) -> u32 {
        match self {
            Self::Outline { font, scale, .. } => {
                let scaled = font.as_scaled(*scale);
                let mut caret = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
                caret.max(0.0).ceil() as u32
            }
            Self::Builtin { size, .. } => text.chars().count() as u32 * BUILTIN_ADVANCE * builtin_factor(*size),
        }
    }

    /// Высота строки в пикселях
    pub fn line_height(&self) -> u32 {
        match self {
            Self::Outline { font, scale, .. } => font.as_scaled(*scale).height().ceil() as u32,
            Self::Builtin { size, .. } => BUILTIN_HEIGHT * builtin_factor(*size),
        }
    }

    /// Растеризация строки с верхним левым углом в (x, y).
    ///
    /// `plot` получает координаты пикселя и покрытие 0.0..=1.0; координаты
    /// могут выходить за пределы холста.
    pub fn rasterize(&self, text: &str, x: i32, y: i32, mut plot: impl FnMut(i32, i32, f32)) {
        match self {
            Self::Outline { font, scale, .. } => {
                let scaled = font.as_scaled(*scale);
                let baseline = y as f32 + scaled.ascent();
                let mut caret = x as f32;
                let mut prev: Option<GlyphId> = None;

                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        caret += scaled.kern(p, id);
                    }
                    let glyph = id.with_scale_and_position(*scale, point(caret, baseline));
                    if let Some(outlined) = scaled.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            plot(bounds.min.x as i32 + gx as i32, bounds.min.y as i32 + gy as i32, coverage);
                        });
                    }
                    caret += scaled.h_advance(id);
                    prev = Some(id);
                }
            }
            Self::Builtin { size, bold } => {
                let factor = builtin_factor(*size) as i32;
                let mut cell_x = x;
                for ch in text.chars() {
                    let columns = builtin_glyph(ch);
                    for (col, bits) in columns.iter().enumerate() {
                        for row in 0..7 {
                            if bits & (1 << row) == 0 {
                                continue;
                            }
                            let px = cell_x + col as i32 * factor;
                            let py = y + row * factor;
                            let widths = if *bold { factor + 1 } else { factor };
                            for dy in 0..factor {
                                for dx in 0..widths {
                                    plot(px + dx, py + dy, 1.0);
                                }
                            }
                        }
                    }
                    cell_x += BUILTIN_ADVANCE as i32 * factor;
                }
            }
        }
    }
}

/// Потокобезопасный кэш шрифтов с чтением насквозь
pub struct FontCache {
    fonts: RwLock<HashMap<FontKey, FontHandle>>,
    candidates: Candidates,
}

#[derive(Debug, Clone)]
enum Candidates {
    System,
    Files(Vec<PathBuf>),
    BuiltinOnly,
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("cached", &self.fonts.read().len())
            .field("candidates", &self.candidates)
            .finish()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache {
    /// Кэш, перебирающий стандартные системные пути
    pub fn new() -> Self {
        Self::with_candidates(Candidates::System)
    }

    /// Только встроенный шрифт: одинаковый результат на любой машине
    pub fn builtin_only() -> Self {
        Self::with_candidates(Candidates::BuiltinOnly)
    }

    /// Явный список файлов, пробуется по порядку для любого начертания
    pub fn with_font_files(files: Vec<PathBuf>) -> Self {
        Self::with_candidates(Candidates::Files(files))
    }

    fn with_candidates(candidates: Candidates) -> Self {
        Self {
            fonts: RwLock::new(HashMap::new()),
            candidates,
        }
    }

    /// Количество закэшированных шрифтов
    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.read().is_empty()
    }

    /// Шрифт для (size, bold, italic). Повторная загрузка при гонке безвредна:
    /// в кэш попадает первый вставленный экземпляр.
    pub fn resolve(&self, size: u32, bold: bool, italic: bool) -> FontHandle {
        let key = FontKey { size, bold, italic };
        if let Some(handle) = self.fonts.read().get(&key) {
            return handle.clone();
        }

        let handle = self.load(key);
        self.fonts.write().entry(key).or_insert(handle).clone()
    }

    fn candidate_paths(&self, key: FontKey) -> Vec<PathBuf> {
        match &self.candidates {
            Candidates::System => {
                let by_style = match (key.bold, key.italic) {
                    (true, true) => BOLD_ITALIC,
                    (true, false) => BOLD,
                    (false, true) => ITALIC,
                    (false, false) => REGULAR,
                };
                by_style.iter().chain(GENERIC).map(|p| PathBuf::from(*p)).collect()
            }
            Candidates::Files(files) => files.clone(),
            Candidates::BuiltinOnly => Vec::new(),
        }
    }

    fn load(&self, key: FontKey) -> FontHandle {
        for path in self.candidate_paths(key) {
            if let Some(handle) = load_outline(&path, key.size) {
                log::debug!("Font {:?} resolved to {}", key, path.display());
                return handle;
            }
        }

        if !matches!(self.candidates, Candidates::BuiltinOnly) {
            log::warn!("No font file found for {:?}, using builtin bitmap font", key);
        }
        FontHandle::Builtin {
            size: key.size,
            bold: key.bold,
        }
    }
}

fn load_outline(path: &Path, size: u32) -> Option<FontHandle> {
    if !path.is_file() {
        return None;
    }
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Cannot read font {}: {}", path.display(), e);
            return None;
        }
    };
    let font = match FontVec::try_from_vec(bytes) {
        Ok(font) => font,
        Err(e) => {
            log::debug!("Cannot parse font {}: {}", path.display(), e);
            return None;
        }
    };
    let scale = font
        .pt_to_px_scale(size as f32)
        .unwrap_or_else(|| PxScale::from(size as f32));

    Some(FontHandle::Outline {
        font: Arc::new(font),
        scale,
        source: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Встроенный шрифт 5x7 (ASCII 0x20..=0x7E), столбцы, младший бит сверху
// ---------------------------------------------------------------------------

const BUILTIN_ADVANCE: u32 = 6;
const BUILTIN_HEIGHT: u32 = 8;

fn builtin_factor(size: u32) -> u32 {
    ((size + 4) / BUILTIN_HEIGHT).max(1)
}

fn builtin_glyph(ch: char) -> &'static [u8; 5] {
    let code = ch as u32;
    let index = if (0x20..=0x7E).contains(&code) { code - 0x20 } else { u32::from(b'?') - 0x20 };
    &BUILTIN_GLYPHS[index as usize]
}

#[rustfmt::skip]
const BUILTIN_GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00],
    [0x14, 0x7F, 0x14, 0x7F, 0x14], [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62],
    [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], [0x00, 0x1C, 0x22, 0x41, 0x00],
    [0x00, 0x41, 0x22, 0x1C, 0x00], [0x08, 0x2A, 0x1C, 0x2A, 0x08], [0x08, 0x08, 0x3E, 0x08, 0x08],
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00],
    [0x20, 0x10, 0x08, 0x04, 0x02],
    // 0-9
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46],
    [0x21, 0x41, 0x45, 0x4B, 0x31], [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39],
    [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03], [0x36, 0x49, 0x49, 0x49, 0x36],
    [0x06, 0x49, 0x49, 0x29, 0x1E],
    // : ; < = > ? @
    [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00], [0x08, 0x14, 0x22, 0x41, 0x00],
    [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06],
    [0x32, 0x49, 0x79, 0x41, 0x3E],
    // A-Z
    [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22],
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x01, 0x01],
    [0x3E, 0x41, 0x41, 0x51, 0x32], [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00],
    [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41], [0x7F, 0x40, 0x40, 0x40, 0x40],
    [0x7F, 0x02, 0x04, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E],
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46],
    [0x46, 0x49, 0x49, 0x49, 0x31], [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F],
    [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x7F, 0x20, 0x18, 0x20, 0x7F], [0x63, 0x14, 0x08, 0x14, 0x63],
    [0x03, 0x04, 0x78, 0x04, 0x03], [0x61, 0x51, 0x49, 0x45, 0x43],
    // [ \ ] ^ _ `
    [0x00, 0x7F, 0x41, 0x41, 0x00], [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00],
    [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40], [0x00, 0x01, 0x02, 0x04, 0x00],
    // a-z
    [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20],
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02],
    [0x08, 0x14, 0x54, 0x54, 0x3C], [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00],
    [0x20, 0x40, 0x44, 0x3D, 0x00], [0x00, 0x7F, 0x10, 0x28, 0x44], [0x00, 0x41, 0x7F, 0x40, 0x00],
    [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38],
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08],
    [0x48, 0x54, 0x54, 0x54, 0x20], [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C],
    [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C], [0x44, 0x28, 0x10, 0x28, 0x44],
    [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44],
    // { | } ~
    [0x00, 0x08, 0x36, 0x41, 0x00], [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00],
    [0x08, 0x04, 0x08, 0x10, 0x08],
];
