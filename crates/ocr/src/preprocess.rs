use image::{DynamicImage, GrayImage, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Longest edge kept before filtering. Tesseract works best around 300 DPI / ~2000 px.
const MAX_EDGE: u32 = 2000;

/// Bilateral filter parameters: diameter 11, sigma color 75, sigma space 75.
const BILATERAL_RADIUS: u32 = 5;
const BILATERAL_SIGMA_COLOR: f32 = 75.0;
const BILATERAL_SIGMA_SPACE: f32 = 75.0;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Process raw image bytes (JPEG / PNG / WEBP / …) and return denoised grayscale PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Downscale + grayscale + bilateral denoise.
fn normalize(img: DynamicImage) -> DynamicImage {
    let gray = downscale(img).to_luma8();
    DynamicImage::ImageLuma8(bilateral_filter(
        &gray,
        BILATERAL_RADIUS,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPACE,
    ))
}

fn downscale(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.resize(MAX_EDGE, MAX_EDGE, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Edge-preserving smoothing on a grayscale image.
///
/// Each output pixel is the mean of its `(2r+1)²` window weighted by spatial
/// distance and by intensity difference to the centre, so flat regions are
/// smoothed while text strokes keep their edges.
pub fn bilateral_filter(
    img: &GrayImage,
    radius: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut output = GrayImage::new(w, h);

    // Intensity differences are 0..=255, so the range kernel is a lookup table.
    let color_denom = 2.0 * sigma_color * sigma_color;
    let range_weights: Vec<f32> = (0..256)
        .map(|d| {
            let d = d as f32;
            (-(d * d) / color_denom).exp()
        })
        .collect();

    let side = (2 * radius + 1) as usize;
    let space_denom = 2.0 * sigma_space * sigma_space;
    let r = radius as i64;
    let mut space_weights = Vec::with_capacity(side * side);
    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f32;
            space_weights.push((-dist_sq / space_denom).exp());
        }
    }

    for y in 0..h {
        for x in 0..w {
            let center = img.get_pixel(x, y)[0];
            let mut sum = 0.0f32;
            let mut weight_sum = 0.0f32;

            let y_start = y.saturating_sub(radius);
            let y_end = (y + radius + 1).min(h);
            let x_start = x.saturating_sub(radius);
            let x_end = (x + radius + 1).min(w);

            for ny in y_start..y_end {
                let ky = (ny + radius - y) as usize;
                for nx in x_start..x_end {
                    let kx = (nx + radius - x) as usize;
                    let v = img.get_pixel(nx, ny)[0];
                    let weight =
                        space_weights[ky * side + kx] * range_weights[center.abs_diff(v) as usize];
                    sum += v as f32 * weight;
                    weight_sum += weight;
                }
            }

            let value = if weight_sum > 0.0 {
                (sum / weight_sum).round().clamp(0.0, 255.0) as u8
            } else {
                center
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }

    output
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
