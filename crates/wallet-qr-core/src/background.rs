//! Фон холста

use image::{Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use rand::Rng;

use crate::style::{parse_color, BackgroundStyle};

/// Сигма размытия градиентного фона
const GRADIENT_BLUR_SIGMA: f32 = 0.5;
/// Вес шумового слоя при смешивании
const NOISE_WEIGHT: f32 = 0.3;

/// Фон заданного размера.
///
/// `back_color` используется только для сплошной заливки. Принимаются
/// `#RRGGBB` и `#RGB`; именованные и прочие не-hex значения заменяются белым.
pub fn render_background(width: u32, height: u32, style: BackgroundStyle, back_color: &str) -> RgbImage {
    match style {
        BackgroundStyle::Solid => {
            let color = Some(back_color)
                .filter(|c| c.trim_start().starts_with('#'))
                .and_then(|c| parse_color("back_color", c).ok())
                .unwrap_or(Rgb([255, 255, 255]));
            RgbImage::from_pixel(width, height, color)
        }
        BackgroundStyle::Gradient => gradient(width, height),
        BackgroundStyle::Noise => noise(width, height, &mut rand::thread_rng()),
    }
}

/// Вертикальный градиент от светлого к чуть более тёмному
/// с лёгкой горизонтальной вариацией
fn gradient(width: u32, height: u32) -> RgbImage {
    if width == 0 || height == 0 {
        return RgbImage::new(width, height);
    }

    let base = RgbImage::from_fn(width, height, |x, y| {
        let t = y as f32 / height as f32;
        let variation = ((x as f32 / width as f32) * 10.0) as i32;
        let channel = |start: f32, drop: f32| {
            let value = (start - t * drop) as i32 + variation;
            value.clamp(0, 255) as u8
        };
        Rgb([channel(248.0, 20.0), channel(249.0, 30.0), channel(249.0, 40.0)])
    });

    gaussian_blur_f32(&base, GRADIENT_BLUR_SIGMA)
}

/// Почти белая основа, смешанная с полем случайных значений 240..250
fn noise(width: u32, height: u32, rng: &mut impl Rng) -> RgbImage {
    let base = 245.0f32;
    RgbImage::from_fn(width, height, |_, _| {
        let mut px = [0u8; 3];
        for channel in &mut px {
            let sample = f32::from(rng.gen_range(240u8..250));
            *channel = (base * (1.0 - NOISE_WEIGHT) + sample * NOISE_WEIGHT).round() as u8;
        }
        Rgb(px)
    })
}
