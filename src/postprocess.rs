//! Post-Processing for Particle Magic
//! CPU raster helpers and the glow pass: gaussian blur plus saturating additive merge

use glam::Vec2;
use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_filled_circle_mut;
use rayon::prelude::*;

/// Frame buffer for rendering
pub type FrameBuffer = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Scale every channel by `factor`, truncating and clamping to 0..=255
pub fn scale_color(color: Rgb<u8>, factor: f32) -> Rgb<u8> {
    let [r, g, b] = color.0;
    let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Rgb([scale(r), scale(g), scale(b)])
}

/// Filled circle with truncated integer centre; pixels are overwritten, not blended
pub fn fill_circle(canvas: &mut FrameBuffer, center: Vec2, radius: i32, color: Rgb<u8>) {
    if radius < 0 || !center.is_finite() {
        return;
    }
    draw_filled_circle_mut(canvas, (center.x as i32, center.y as i32), radius, color);
}

/// Soft bloom layer: particles paint wide discs into it, then it is blurred and added
pub struct GlowLayer {
    buffer: FrameBuffer,
}

impl GlowLayer {
    /// Zero-initialised layer matching the destination frame
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    pub fn canvas(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Blur the layer with the given sigma and add it onto `frame`
    pub fn composite(&self, frame: &mut FrameBuffer, sigma: f32) {
        let blurred = gaussian_blur(&self.buffer, sigma);
        add_saturating(frame, &blurred);
    }
}

/// Separable gaussian blur of an RGB image; edge pixels are clamped
pub fn gaussian_blur(image: &FrameBuffer, sigma: f32) -> Vec<[f32; 3]> {
    let width = image.width();
    let height = image.height();

    let mut pixels: Vec<[f32; 3]> = image
        .pixels()
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();

    if width == 0 || height == 0 || !(sigma > 0.0) {
        return pixels;
    }

    let kernel = gaussian_kernel(sigma);
    let mut temp = vec![[0.0f32; 3]; pixels.len()];

    blur_horizontal(&pixels, &mut temp, width, &kernel);
    blur_vertical(&temp, &mut pixels, width, height, &kernel);

    pixels
}

/// Normalised kernel with half-width round(3 * sigma)
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let half = (sigma * 3.0).round().max(1.0) as usize;
    let size = half * 2 + 1;
    let mut kernel = vec![0.0f32; size];
    let mut sum = 0.0;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - half as f32;
        *k = (-x * x / (2.0 * sigma * sigma)).exp();
        sum += *k;
    }

    // Normalize
    for k in &mut kernel {
        *k /= sum;
    }

    kernel
}

fn blur_horizontal(src: &[[f32; 3]], dst: &mut [[f32; 3]], width: u32, kernel: &[f32]) {
    let half = (kernel.len() / 2) as i32;
    let width = width as usize;

    dst.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(out, row)| {
            for (x, pixel) in out.iter_mut().enumerate() {
                let mut acc = [0.0f32; 3];

                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = (x as i32 + ki as i32 - half).clamp(0, width as i32 - 1) as usize;
                    acc[0] += row[sx][0] * kv;
                    acc[1] += row[sx][1] * kv;
                    acc[2] += row[sx][2] * kv;
                }

                *pixel = acc;
            }
        });
}

fn blur_vertical(src: &[[f32; 3]], dst: &mut [[f32; 3]], width: u32, height: u32, kernel: &[f32]) {
    let half = (kernel.len() / 2) as i32;
    let width = width as usize;
    let height = height as i32;

    dst.par_chunks_mut(width).enumerate().for_each(|(y, out)| {
        for (x, pixel) in out.iter_mut().enumerate() {
            let mut acc = [0.0f32; 3];

            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = (y as i32 + ki as i32 - half).clamp(0, height - 1) as usize;
                let idx = sy * width + x;
                acc[0] += src[idx][0] * kv;
                acc[1] += src[idx][1] * kv;
                acc[2] += src[idx][2] * kv;
            }

            *pixel = acc;
        }
    });
}

/// Per-channel saturating add of a float layer (rounded) onto the frame
pub fn add_saturating(frame: &mut FrameBuffer, layer: &[[f32; 3]]) {
    let raw: &mut [u8] = &mut *frame;
    raw.par_chunks_mut(3)
        .zip(layer.par_iter())
        .for_each(|(pixel, add)| {
            for c in 0..3 {
                let extra = add[c].round().clamp(0.0, 255.0) as u8;
                pixel[c] = pixel[c].saturating_add(extra);
            }
        });
}
