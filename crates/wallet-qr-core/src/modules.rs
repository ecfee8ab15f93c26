//! Растеризация матрицы модулей
//!
//! Модуль (r, c) занимает прямоугольник `box_size x box_size`, начиная с
//! `(border * box_size + c * box_size, border * box_size + r * box_size)`.
//! Сканеры читают центры модулей, поэтому сдвиг даже на пиксель недопустим.

use image::{Rgb, RgbImage};

use crate::encoder::ModuleMatrix;
use crate::error::ConfigError;
use crate::style::GradientPalette;

/// Наибольшая допустимая сторона QR-изображения в пикселях
pub const MAX_IMAGE_SIDE: u32 = 10_000;
/// Сторона матрицы версии 1
pub const MIN_MATRIX_SIZE: usize = 21;

/// Заливка тёмных модулей
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleFill {
    Solid(Rgb<u8>),
    Gradient(GradientPalette),
}

/// Рендерер модулей
#[derive(Debug, Clone, Copy)]
pub struct ModuleRenderer {
    box_size: u32,
    border: u32,
}

impl ModuleRenderer {
    pub fn new(box_size: u32, border: u32) -> Self {
        Self { box_size, border }
    }

    /// Сторона итогового изображения в пикселях
    pub fn image_size(&self, matrix: &ModuleMatrix) -> Result<u32, ConfigError> {
        self.side_for(matrix.size())
    }

    /// Сторона изображения для матрицы `modules x modules`.
    /// Ошибка, если она не укладывается в [`MAX_IMAGE_SIDE`].
    pub fn side_for(&self, modules: usize) -> Result<u32, ConfigError> {
        let side = (modules as u64)
            .checked_add(2 * u64::from(self.border))
            .and_then(|n| n.checked_mul(u64::from(self.box_size)))
            .unwrap_or(u64::MAX);
        if side > u64::from(MAX_IMAGE_SIDE) {
            return Err(ConfigError::CanvasTooLarge(side));
        }
        Ok(side as u32)
    }

    /// Левый верхний пиксель модуля (row, col)
    pub fn module_origin(&self, row: usize, col: usize) -> (u32, u32) {
        let offset = self.border * self.box_size;
        (offset + col as u32 * self.box_size, offset + row as u32 * self.box_size)
    }

    /// Отрисовка матрицы. Тихая зона всегда заливается `back`.
    pub fn render(&self, matrix: &ModuleMatrix, fill: ModuleFill, back: Rgb<u8>) -> Result<RgbImage, ConfigError> {
        let size = self.image_size(matrix)?;
        let mut img = RgbImage::from_pixel(size, size, back);

        for row in 0..matrix.size() {
            for col in 0..matrix.size() {
                if !matrix.get(row, col) {
                    continue;
                }
                let color = match fill {
                    ModuleFill::Solid(color) => color,
                    ModuleFill::Gradient(palette) => palette.color_at(row, col),
                };
                self.fill_module(&mut img, row, col, color);
            }
        }

        Ok(img)
    }

    fn fill_module(&self, img: &mut RgbImage, row: usize, col: usize, color: Rgb<u8>) {
        let (x0, y0) = self.module_origin(row, col);
        for y in y0..y0 + self.box_size {
            for x in x0..x0 + self.box_size {
                img.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: Rgb<u8> = Rgb([46, 134, 193]);
    const BACK: Rgb<u8> = Rgb([255, 255, 255]);

    fn checker(size: usize) -> ModuleMatrix {
        let rows = (0..size)
            .map(|r| (0..size).map(|c| (r * 7 + c * 3) % 5 < 2).collect())
            .collect();
        ModuleMatrix::from_rows(rows).unwrap()
    }

    fn center(renderer: &ModuleRenderer, row: usize, col: usize, box_size: u32) -> (u32, u32) {
        let (x, y) = renderer.module_origin(row, col);
        (x + box_size / 2, y + box_size / 2)
    }

    #[test]
    fn test_image_size() {
        let renderer = ModuleRenderer::new(12, 4);
        let matrix = checker(21);
        assert_eq!(renderer.image_size(&matrix).unwrap(), (21 + 8) * 12);
        assert_eq!(renderer.render(&matrix, ModuleFill::Solid(FILL), BACK).unwrap().width(), 348);
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let matrix = checker(21);
        let huge = ModuleRenderer::new(100_000_000, 4);
        assert!(matches!(huge.image_size(&matrix), Err(ConfigError::CanvasTooLarge(_))));
        assert!(matches!(
            huge.render(&matrix, ModuleFill::Solid(FILL), BACK),
            Err(ConfigError::CanvasTooLarge(_))
        ));

        // Переполнение u32 в промежуточной сумме тоже ловится
        let wide = ModuleRenderer::new(1, u32::MAX);
        assert!(matches!(wide.side_for(21), Err(ConfigError::CanvasTooLarge(_))));

        let edge = ModuleRenderer::new(MAX_IMAGE_SIDE / 25, 2);
        assert_eq!(edge.side_for(21).unwrap(), MAX_IMAGE_SIDE);
    }

    #[test]
    fn test_solid_module_centers() {
        let renderer = ModuleRenderer::new(10, 2);
        let matrix = checker(9);
        let img = renderer.render(&matrix, ModuleFill::Solid(FILL), BACK).unwrap();

        for r in 0..9 {
            for c in 0..9 {
                let (x, y) = center(&renderer, r, c, 10);
                let expected = if matrix.get(r, c) { FILL } else { BACK };
                assert_eq!(*img.get_pixel(x, y), expected, "module ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_module_edges_are_exact() {
        let renderer = ModuleRenderer::new(4, 1);
        let matrix = ModuleMatrix::from_rows(vec![vec![true, false], vec![false, true]]).unwrap();
        let img = renderer.render(&matrix, ModuleFill::Solid(FILL), BACK).unwrap();

        // Модуль (0,0) занимает [4, 8) по обеим осям
        assert_eq!(*img.get_pixel(3, 4), BACK);
        assert_eq!(*img.get_pixel(4, 4), FILL);
        assert_eq!(*img.get_pixel(7, 7), FILL);
        assert_eq!(*img.get_pixel(8, 7), BACK);
        assert_eq!(*img.get_pixel(8, 8), FILL);
    }

    #[test]
    fn test_border_stays_background() {
        let renderer = ModuleRenderer::new(5, 3);
        let matrix = ModuleMatrix::from_rows(vec![vec![true; 3]; 3]).unwrap();
        let img = renderer.render(&matrix, ModuleFill::Gradient(GradientPalette::Fire), BACK).unwrap();
        let edge = 3 * 5;
        for i in 0..img.width() {
            assert_eq!(*img.get_pixel(i, 0), BACK);
            assert_eq!(*img.get_pixel(i, edge - 1), BACK);
            assert_eq!(*img.get_pixel(edge - 1, i), BACK);
            assert_eq!(*img.get_pixel(img.width() - 1, i), BACK);
        }
    }

    #[test]
    fn test_gradient_palette_banding() {
        let renderer = ModuleRenderer::new(6, 2);
        let matrix = checker(11);
        let palette = GradientPalette::Sunset;
        let img = renderer.render(&matrix, ModuleFill::Gradient(palette), BACK).unwrap();

        for r in 0..11 {
            for c in 0..11 {
                let (x, y) = center(&renderer, r, c, 6);
                let expected = if matrix.get(r, c) { palette.colors()[(r + c) % 3] } else { BACK };
                assert_eq!(*img.get_pixel(x, y), expected);
            }
        }
    }
}
